//! Chain Access
//!
//! Read-only access to the pre-sale contracts and the authoritative SBT
//! contract. The `SbtChain` trait is the seam the pipeline stages are written
//! against; `EvmSbtChain` implements it over an alloy HTTP provider.

use alloy::{
    primitives::{Address, U256},
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::types::Filter,
    sol,
    sol_types::SolEvent,
};
use async_trait::async_trait;
use serde::Serialize;

use crate::error::SbtError;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract SbtPreSale {
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
        function tokenURI(uint256 tokenId) external view returns (string);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    contract SbtAuthority {
        function minted(uint256 id) external view returns (bool);
        function communityMinted(uint256 id) external view returns (bool);
        function balanceOf(address _owner, uint256 _id) external view returns (uint256);
    }
}

/// Which pre-sale contract a token id came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    /// Social/game pre-sale. Guarded by `minted`, metadata via the bulk proxy.
    PreSale,
    /// Community pre-sale. Guarded by `communityMinted`, metadata fetched directly.
    Community,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferEvent {
    pub token_id: u64,
}

#[async_trait]
pub trait SbtChain: Send + Sync {
    /// Transfer events received by `to` over the trailing `block_window` blocks.
    async fn transfer_events(
        &self,
        collection: Collection,
        to: Address,
        block_window: u64,
    ) -> Result<Vec<TransferEvent>, SbtError>;

    async fn token_uri(&self, collection: Collection, token_id: u64) -> Result<String, SbtError>;

    /// Whether the authoritative contract already minted the pre-sale token.
    async fn is_minted(&self, collection: Collection, token_id: u64) -> Result<bool, SbtError>;

    async fn balance_of(&self, owner: Address, item_id: u64) -> Result<u64, SbtError>;
}

pub struct EvmSbtChain {
    provider: DynProvider,
    sbt_contract: Address,
    pre_sale_contract: Address,
    community_pre_sale_contract: Address,
}

impl EvmSbtChain {
    pub fn connect(
        rpc_url: &str,
        sbt_contract: Address,
        pre_sale_contract: Address,
        community_pre_sale_contract: Address,
    ) -> Result<Self, SbtError> {
        let url = rpc_url
            .parse()
            .map_err(|e| SbtError::Config(format!("Invalid RPC_URL {}: {}", rpc_url, e)))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();

        Ok(Self {
            provider,
            sbt_contract,
            pre_sale_contract,
            community_pre_sale_contract,
        })
    }

    fn collection_address(&self, collection: Collection) -> Address {
        match collection {
            Collection::PreSale => self.pre_sale_contract,
            Collection::Community => self.community_pre_sale_contract,
        }
    }
}

fn to_u64(value: U256) -> Result<u64, SbtError> {
    u64::try_from(value).map_err(|_| SbtError::TokenIdOverflow(value.to_string()))
}

#[async_trait]
impl SbtChain for EvmSbtChain {
    async fn transfer_events(
        &self,
        collection: Collection,
        to: Address,
        block_window: u64,
    ) -> Result<Vec<TransferEvent>, SbtError> {
        let latest = self
            .provider
            .get_block_number()
            .await
            .map_err(|e| SbtError::Chain(format!("Failed to get block number: {}", e)))?;
        let from_block = latest.saturating_sub(block_window);

        let filter = Filter::new()
            .address(self.collection_address(collection))
            .event_signature(SbtPreSale::Transfer::SIGNATURE_HASH)
            .topic2(to.into_word())
            .from_block(from_block)
            .to_block(latest);

        let logs = self.provider.get_logs(&filter).await.map_err(|e| {
            log::error!(
                "Failed to fetch {:?} transfer logs for {} in {}..={}: {}",
                collection,
                to,
                from_block,
                latest,
                e
            );
            SbtError::Chain(format!("Failed to fetch transfer logs: {}", e))
        })?;

        let mut events = Vec::with_capacity(logs.len());
        for raw in logs {
            match SbtPreSale::Transfer::decode_log(&raw.inner) {
                Ok(event) if event.to == to => {
                    events.push(TransferEvent {
                        token_id: to_u64(event.tokenId)?,
                    });
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("Failed to decode Transfer log: {}", e);
                }
            }
        }

        log::debug!(
            "Found {} {:?} transfer events for {} since block {}",
            events.len(),
            collection,
            to,
            from_block
        );
        Ok(events)
    }

    async fn token_uri(&self, collection: Collection, token_id: u64) -> Result<String, SbtError> {
        SbtPreSale::new(self.collection_address(collection), &self.provider)
            .tokenURI(U256::from(token_id))
            .call()
            .await
            .map_err(|e| {
                SbtError::Chain(format!("tokenURI({}) failed on {:?}: {}", token_id, collection, e))
            })
    }

    async fn is_minted(&self, collection: Collection, token_id: u64) -> Result<bool, SbtError> {
        let authority = SbtAuthority::new(self.sbt_contract, &self.provider);
        let id = U256::from(token_id);
        let result = match collection {
            Collection::PreSale => authority.minted(id).call().await,
            Collection::Community => authority.communityMinted(id).call().await,
        };
        result.map_err(|e| {
            SbtError::Chain(format!(
                "Mint status lookup for {} ({:?}) failed: {}",
                token_id, collection, e
            ))
        })
    }

    async fn balance_of(&self, owner: Address, item_id: u64) -> Result<u64, SbtError> {
        let balance = SbtAuthority::new(self.sbt_contract, &self.provider)
            .balanceOf(owner, U256::from(item_id))
            .call()
            .await
            .map_err(|e| {
                SbtError::Chain(format!("balanceOf({}, {}) failed: {}", owner, item_id, e))
            })?;
        to_u64(balance)
    }
}

/// Parse a user-supplied hex address.
pub fn parse_address(value: &str) -> Result<Address, SbtError> {
    value
        .trim()
        .parse()
        .map_err(|_| SbtError::InvalidAddress(value.to_string()))
}
