//! Event Collector
//!
//! Scans both pre-sale contracts for transfers into the external wallet.

use alloy::primitives::Address;

use super::chain::{Collection, SbtChain, TransferEvent};
use crate::error::SbtError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedEvents {
    pub pre_sale: Vec<TransferEvent>,
    pub community: Vec<TransferEvent>,
}

/// Collect transfer events received by `external_address` on the pre-sale
/// and community pre-sale contracts within the trailing `block_window`.
///
/// Both scans run concurrently. A contract with no matching logs yields an
/// empty sequence; provider failures are returned as errors.
pub async fn collect_transfer_events(
    chain: &dyn SbtChain,
    external_address: Address,
    block_window: u64,
) -> Result<CollectedEvents, SbtError> {
    let (pre_sale, community) = futures::future::try_join(
        chain.transfer_events(Collection::PreSale, external_address, block_window),
        chain.transfer_events(Collection::Community, external_address, block_window),
    )
    .await?;

    log::info!(
        "Collected {} pre-sale and {} community transfer events for {}",
        pre_sale.len(),
        community.len(),
        external_address
    );

    Ok(CollectedEvents {
        pre_sale,
        community,
    })
}
