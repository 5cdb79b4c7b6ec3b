//! Test utilities for the SBT pipeline
//!
//! In-memory implementations of the chain and backend traits, plus fixed
//! wallets and configuration used across test modules.

use alloy::primitives::Address;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::error::SbtError;
use crate::handlers::proxy::external::{ProxyMetadataEntry, SbtBackend};
use crate::handlers::sbt::chain::{Collection, SbtChain, TransferEvent};
use crate::handlers::sbt::mint::EngineMintRequest;
use crate::handlers::vendor_sbt::{VendorCheckRequest, VendorMintRequest, VendorSbtGrant};
use crate::utils::env::EnvVars;

pub fn in_app_wallet() -> Address {
    Address::with_last_byte(0xa1)
}

pub fn external_wallet() -> Address {
    Address::with_last_byte(0xe1)
}

pub fn test_env() -> EnvVars {
    EnvVars {
        rpc_url: "http://localhost:8545".to_string(),
        chain_id: 8453,
        sbt_contract: Address::with_last_byte(0xc0),
        sbt_pre_contract: Address::with_last_byte(0xc1),
        sbt_community_pre_contract: Address::with_last_byte(0xc2),
        backend_api_base: "http://localhost:3000".to_string(),
        ipfs_gateway: "https://ipfs.io".to_string(),
        event_block_range: 1_500_000,
        community_item_threshold: 14,
        vendor_min_power: 1_000_000,
        http_timeout_secs: 5,
    }
}

#[derive(Default)]
pub struct MockChain {
    events: HashMap<Collection, Vec<u64>>,
    uris: HashMap<(Collection, u64), String>,
    minted: HashSet<(Collection, u64)>,
    balances: HashMap<(Address, u64), u64>,
    failing_mint_lookups: HashSet<(Collection, u64)>,
    failing_balances: HashSet<u64>,
    fail_events: bool,
}

impl MockChain {
    pub fn with_events(mut self, collection: Collection, token_ids: &[u64]) -> Self {
        self.events.insert(collection, token_ids.to_vec());
        self
    }

    pub fn with_uri(mut self, collection: Collection, token_id: u64, uri: &str) -> Self {
        self.uris.insert((collection, token_id), uri.to_string());
        self
    }

    pub fn with_minted(mut self, collection: Collection, token_id: u64) -> Self {
        self.minted.insert((collection, token_id));
        self
    }

    pub fn with_balance(mut self, owner: Address, item_id: u64, balance: u64) -> Self {
        self.balances.insert((owner, item_id), balance);
        self
    }

    pub fn with_failing_mint_lookup(mut self, collection: Collection, token_id: u64) -> Self {
        self.failing_mint_lookups.insert((collection, token_id));
        self
    }

    pub fn with_failing_balance(mut self, item_id: u64) -> Self {
        self.failing_balances.insert(item_id);
        self
    }

    pub fn failing_events(mut self) -> Self {
        self.fail_events = true;
        self
    }
}

#[async_trait]
impl SbtChain for MockChain {
    async fn transfer_events(
        &self,
        collection: Collection,
        _to: Address,
        _block_window: u64,
    ) -> Result<Vec<TransferEvent>, SbtError> {
        if self.fail_events {
            return Err(SbtError::Chain("provider unavailable".to_string()));
        }
        Ok(self
            .events
            .get(&collection)
            .map(|ids| ids.iter().map(|&token_id| TransferEvent { token_id }).collect())
            .unwrap_or_default())
    }

    async fn token_uri(&self, collection: Collection, token_id: u64) -> Result<String, SbtError> {
        self.uris
            .get(&(collection, token_id))
            .cloned()
            .ok_or_else(|| SbtError::Chain(format!("tokenURI({}) reverted", token_id)))
    }

    async fn is_minted(&self, collection: Collection, token_id: u64) -> Result<bool, SbtError> {
        if self.failing_mint_lookups.contains(&(collection, token_id)) {
            return Err(SbtError::Chain(format!("minted({}) timed out", token_id)));
        }
        Ok(self.minted.contains(&(collection, token_id)))
    }

    async fn balance_of(&self, owner: Address, item_id: u64) -> Result<u64, SbtError> {
        if self.failing_balances.contains(&item_id) {
            return Err(SbtError::Chain(format!("balanceOf({}) timed out", item_id)));
        }
        Ok(self.balances.get(&(owner, item_id)).copied().unwrap_or(0))
    }
}

#[derive(Default)]
pub struct MockBackend {
    proxy: HashMap<String, ProxyMetadataEntry>,
    content: HashMap<String, Value>,
    mint_failures: HashMap<u64, (u16, String)>,
    vendor_grant: Option<VendorSbtGrant>,
    vendor_error: Option<(u16, String)>,
    vendor_mint_failure: Option<(u16, String)>,
    bulk_calls: Mutex<usize>,
    content_calls: Mutex<usize>,
    mints: Mutex<Vec<EngineMintRequest>>,
    refreshes: Mutex<Vec<String>>,
    checks: Mutex<Vec<VendorCheckRequest>>,
    vendor_mints: Mutex<Vec<VendorMintRequest>>,
}

impl MockBackend {
    pub fn with_proxy(mut self, uri: &str, item_id: Value, image: &str) -> Self {
        self.proxy.insert(
            uri.to_string(),
            ProxyMetadataEntry(item_id, Some(image.to_string())),
        );
        self
    }

    pub fn with_content(mut self, uri: &str, document: Value) -> Self {
        self.content.insert(uri.to_string(), document);
        self
    }

    pub fn with_mint_failure(mut self, item_id: u64, status: u16, message: &str) -> Self {
        self.mint_failures
            .insert(item_id, (status, message.to_string()));
        self
    }

    pub fn with_vendor_grant(mut self, grant: VendorSbtGrant) -> Self {
        self.vendor_grant = Some(grant);
        self
    }

    pub fn with_vendor_error(mut self, status: u16, detail: &str) -> Self {
        self.vendor_error = Some((status, detail.to_string()));
        self
    }

    pub fn with_vendor_mint_failure(mut self, status: u16, message: &str) -> Self {
        self.vendor_mint_failure = Some((status, message.to_string()));
        self
    }

    pub fn bulk_requests(&self) -> usize {
        *self.bulk_calls.lock().unwrap()
    }

    pub fn content_requests(&self) -> usize {
        *self.content_calls.lock().unwrap()
    }

    pub fn mint_requests(&self) -> Vec<EngineMintRequest> {
        self.mints.lock().unwrap().clone()
    }

    pub fn refreshed_wallets(&self) -> Vec<String> {
        self.refreshes.lock().unwrap().clone()
    }

    pub fn vendor_checks(&self) -> Vec<VendorCheckRequest> {
        self.checks.lock().unwrap().clone()
    }

    pub fn vendor_mints(&self) -> Vec<VendorMintRequest> {
        self.vendor_mints.lock().unwrap().clone()
    }
}

fn api_error((status, message): &(u16, String)) -> SbtError {
    SbtError::Api {
        status: *status,
        message: message.clone(),
    }
}

#[async_trait]
impl SbtBackend for MockBackend {
    async fn fetch_metadata_bulk(
        &self,
        uris: &[String],
    ) -> Result<Vec<ProxyMetadataEntry>, SbtError> {
        *self.bulk_calls.lock().unwrap() += 1;
        uris.iter()
            .map(|uri| {
                self.proxy
                    .get(uri)
                    .cloned()
                    .ok_or_else(|| SbtError::Metadata(format!("no proxy entry for {}", uri)))
            })
            .collect()
    }

    async fn fetch_content_json(&self, uri: &str) -> Result<Value, SbtError> {
        *self.content_calls.lock().unwrap() += 1;
        self.content.get(uri).cloned().ok_or_else(|| SbtError::Api {
            status: 404,
            message: format!("Content fetch for {} failed", uri),
        })
    }

    async fn submit_engine_mint(&self, request: &EngineMintRequest) -> Result<(), SbtError> {
        self.mints.lock().unwrap().push(request.clone());
        match self.mint_failures.get(&request.item_id()) {
            Some(failure) => Err(api_error(failure)),
            None => Ok(()),
        }
    }

    async fn refresh_sbt_cache(&self, wallet: &str) -> Result<(), SbtError> {
        self.refreshes.lock().unwrap().push(wallet.to_string());
        Ok(())
    }

    async fn check_vendor_sbt(
        &self,
        request: &VendorCheckRequest,
    ) -> Result<VendorSbtGrant, SbtError> {
        self.checks.lock().unwrap().push(request.clone());
        if let Some(error) = &self.vendor_error {
            return Err(api_error(error));
        }
        self.vendor_grant.clone().ok_or_else(|| SbtError::Api {
            status: 404,
            message: "CODE_NOT_EXISTS".to_string(),
        })
    }

    async fn mint_vendor_sbt(&self, request: &VendorMintRequest) -> Result<(), SbtError> {
        self.vendor_mints.lock().unwrap().push(request.clone());
        match &self.vendor_mint_failure {
            Some(failure) => Err(api_error(failure)),
            None => Ok(()),
        }
    }
}
