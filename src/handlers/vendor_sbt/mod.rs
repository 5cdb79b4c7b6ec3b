//! Vendor SBT
//!
//! Game-vendor codes that entitle a player to a GAME item: the vendor backend
//! validates a code/password pair and reports the player's power, then the
//! granted item is minted through the vendor mint endpoint.

pub mod check;
pub mod mint;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorCheckRequest {
    pub code: String,
    pub password: String,
    pub chain_id: u64,
    pub contract: String,
    pub wallet: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorSbtMeta {
    pub category: u64,
}

/// Successful vendor check: the player's power and the item to issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorSbtGrant {
    pub guid: String,
    pub power: u64,
    pub meta: VendorSbtMeta,
}

/// `[wallet, category, quantity, guid, sourceTokenIds, tokenType]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VendorMintArgs(
    pub String,
    pub u64,
    pub u64,
    pub String,
    pub Vec<u64>,
    pub u8,
);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorMintRequest {
    pub chain_id: u64,
    pub contract: String,
    pub args: VendorMintArgs,
}
