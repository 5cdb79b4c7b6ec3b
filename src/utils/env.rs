use alloy::primitives::Address;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_BACKEND_API_BASE, DEFAULT_COMMUNITY_ITEM_THRESHOLD, DEFAULT_EVENT_BLOCK_RANGE,
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_IPFS_GATEWAY, DEFAULT_VENDOR_MIN_POWER,
};
use crate::error::SbtError;

#[derive(Clone, Debug)]
pub struct EnvVars {
    pub rpc_url: String,
    pub chain_id: u64,
    pub sbt_contract: Address,
    pub sbt_pre_contract: Address,
    pub sbt_community_pre_contract: Address,
    pub backend_api_base: String,
    pub ipfs_gateway: String,
    pub event_block_range: u64,
    pub community_item_threshold: u64,
    pub vendor_min_power: u64,
    pub http_timeout_secs: u64,
}

impl EnvVars {
    pub fn load() -> Result<Self, SbtError> {
        Ok(Self {
            rpc_url: required("RPC_URL")?,
            chain_id: parse_var("CHAIN_ID", None)?,
            sbt_contract: address_var("SBT_CONTRACT_ADDRESS")?,
            sbt_pre_contract: address_var("SBT_PRE_CONTRACT_ADDRESS")?,
            sbt_community_pre_contract: address_var("SBT_COMMUNITY_PRE_CONTRACT_ADDRESS")?,
            backend_api_base: std::env::var("BACKEND_API_BASE")
                .unwrap_or_else(|_| DEFAULT_BACKEND_API_BASE.to_string())
                .trim_end_matches('/')
                .to_string(),
            ipfs_gateway: std::env::var("IPFS_GATEWAY")
                .unwrap_or_else(|_| DEFAULT_IPFS_GATEWAY.to_string())
                .trim_end_matches('/')
                .to_string(),
            event_block_range: parse_var("EVENT_BLOCK_RANGE", Some(DEFAULT_EVENT_BLOCK_RANGE))?,
            community_item_threshold: parse_var(
                "COMMUNITY_ITEM_THRESHOLD",
                Some(DEFAULT_COMMUNITY_ITEM_THRESHOLD),
            )?,
            vendor_min_power: parse_var("VENDOR_MIN_POWER", Some(DEFAULT_VENDOR_MIN_POWER))?,
            http_timeout_secs: parse_var("HTTP_TIMEOUT_SECS", Some(DEFAULT_HTTP_TIMEOUT_SECS))?,
        })
    }
}

fn required(name: &str) -> Result<String, SbtError> {
    std::env::var(name).map_err(|_| SbtError::Config(format!("{} is not set", name)))
}

fn parse_var<T: FromStr>(name: &str, default: Option<T>) -> Result<T, SbtError> {
    match (std::env::var(name), default) {
        (Ok(value), _) => value
            .trim()
            .parse()
            .map_err(|_| SbtError::Config(format!("{} has an invalid value: {}", name, value))),
        (Err(_), Some(default)) => Ok(default),
        (Err(_), None) => Err(SbtError::Config(format!("{} is not set", name))),
    }
}

fn address_var(name: &str) -> Result<Address, SbtError> {
    let value = required(name)?;
    value
        .trim()
        .parse()
        .map_err(|_| SbtError::Config(format!("{} is not a valid address: {}", name, value)))
}
