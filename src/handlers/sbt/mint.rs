//! Mint Submitter
//!
//! Sends one engine mint request per row that still has something to mint.

use serde::Serialize;

use super::eligibility::{EligibilityRow, is_social_or_game};
use crate::constants::{ALREADY_MINTED_MARKER, ALREADY_MINTED_MESSAGE, UNEXPECTED_MINT_ERROR};
use crate::error::SbtError;
use crate::handlers::proxy::external::SbtBackend;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    Social,
    Game,
    Community,
}

impl TokenType {
    /// Numeric code the minting contract expects.
    pub fn code(self) -> u8 {
        match self {
            TokenType::Social => 0,
            TokenType::Game => 1,
            TokenType::Community => 2,
        }
    }

    pub fn for_row(row: &EligibilityRow, community_threshold: u64) -> Self {
        if is_social_or_game(row, community_threshold) {
            TokenType::Social
        } else {
            TokenType::Community
        }
    }
}

/// Where mints land: chain, authoritative contract, and both wallets.
#[derive(Debug, Clone)]
pub struct MintTarget {
    pub chain_id: u64,
    pub contract: String,
    pub wallet_address: String,
    pub external_address: String,
}

/// `[wallet, itemId, quantity, "", sourceTokenIds, tokenType]`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineMintArgs(
    pub String,
    pub u64,
    pub u64,
    pub String,
    pub Vec<u64>,
    pub u8,
);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineMintRequest {
    pub chain_id: u64,
    pub contract: String,
    pub args: EngineMintArgs,
    pub command: String,
    pub external_address: String,
}

impl EngineMintRequest {
    pub fn item_id(&self) -> u64 {
        self.args.1
    }

    pub fn quantity(&self) -> u64 {
        self.args.2
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum MintOutcome {
    Minted,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintSubmission {
    pub item_id: u64,
    pub token_type: TokenType,
    pub quantity: u64,
    pub outcome: MintOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintReport {
    pub submissions: Vec<MintSubmission>,
    /// At least one submission succeeded, or none failed.
    pub succeeded: bool,
}

impl MintReport {
    pub fn first_error(&self) -> Option<&str> {
        self.submissions.iter().find_map(|s| match &s.outcome {
            MintOutcome::Failed { message } => Some(message.as_str()),
            MintOutcome::Minted => None,
        })
    }
}

/// Build the engine request for a row, or `None` when nothing is mintable.
///
/// Community items are minted one at a time regardless of the mintable quantity.
pub fn build_mint_request(
    target: &MintTarget,
    row: &EligibilityRow,
    community_threshold: u64,
) -> Option<(TokenType, EngineMintRequest)> {
    if row.mintable_quantity <= 0 {
        return None;
    }

    let token_type = TokenType::for_row(row, community_threshold);
    let quantity = match token_type {
        TokenType::Community => 1,
        _ => row.mintable_quantity as u64,
    };

    let request = EngineMintRequest {
        chain_id: target.chain_id,
        contract: target.contract.clone(),
        args: EngineMintArgs(
            target.wallet_address.clone(),
            row.item_id,
            quantity,
            String::new(),
            row.source_token_ids.clone(),
            token_type.code(),
        ),
        command: "mint".to_string(),
        external_address: target.external_address.clone(),
    };

    Some((token_type, request))
}

/// Map an engine failure to the message shown to the user.
pub fn classify_mint_error(error: &SbtError) -> String {
    match error {
        SbtError::Api { message, .. } => {
            if message.to_lowercase().contains(ALREADY_MINTED_MARKER) {
                ALREADY_MINTED_MESSAGE.to_string()
            } else {
                message.clone()
            }
        }
        _ => UNEXPECTED_MINT_ERROR.to_string(),
    }
}

/// Submit mints for every row with a positive mintable quantity, in order.
///
/// A failed submission does not stop the remaining ones.
pub async fn submit_mints(
    backend: &dyn SbtBackend,
    target: &MintTarget,
    rows: &[EligibilityRow],
    community_threshold: u64,
) -> MintReport {
    let mut submissions = Vec::new();
    let mut any_success = false;
    let mut any_failure = false;

    for row in rows {
        let Some((token_type, request)) = build_mint_request(target, row, community_threshold)
        else {
            continue;
        };

        log::info!(
            "Minting item {} x{} ({:?}) for {} from token ids {:?}",
            row.item_id,
            request.quantity(),
            token_type,
            target.wallet_address,
            row.source_token_ids
        );

        let outcome = match backend.submit_engine_mint(&request).await {
            Ok(()) => {
                any_success = true;
                MintOutcome::Minted
            }
            Err(e) => {
                log::error!("Minting item {} failed: {}", row.item_id, e);
                any_failure = true;
                MintOutcome::Failed {
                    message: classify_mint_error(&e),
                }
            }
        };

        submissions.push(MintSubmission {
            item_id: row.item_id,
            token_type,
            quantity: request.quantity(),
            outcome,
        });
    }

    MintReport {
        submissions,
        succeeded: any_success || !any_failure,
    }
}
