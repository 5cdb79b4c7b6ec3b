//! Eligibility Pipeline
//!
//! Chains the stages: collect events, tally, filter minted, resolve metadata,
//! reconcile. Every run starts from scratch; nothing carries over between runs.

use alloy::primitives::Address;
use serde::Serialize;

use super::chain::{Collection, SbtChain};
use super::eligibility::{EligibilityRow, all_minted, importable_rows, reconcile};
use super::events::collect_transfer_events;
use super::metadata::resolve_metadata;
use super::mint_status::filter_unminted;
use super::tally::tally_token_ids;
use crate::error::SbtError;
use crate::handlers::proxy::external::SbtBackend;

/// Inputs of one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct PipelineContext {
    /// In-app wallet that receives mints and whose balances are subtracted.
    pub wallet_address: Address,
    /// External wallet whose pre-sale transfer history establishes eligibility.
    pub external_address: Address,
    pub block_window: u64,
    pub community_threshold: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityReport {
    pub rows: Vec<EligibilityRow>,
    pub importable: Vec<EligibilityRow>,
    pub all_minted: bool,
    pub unsupported: usize,
}

pub async fn run_eligibility(
    chain: &dyn SbtChain,
    backend: &dyn SbtBackend,
    ctx: PipelineContext,
) -> Result<EligibilityReport, SbtError> {
    let events = collect_transfer_events(chain, ctx.external_address, ctx.block_window).await?;

    let pre_sale_tally = tally_token_ids(&events.pre_sale);
    let community_tally = tally_token_ids(&events.community);

    let (pre_sale, community) = futures::future::try_join(
        filter_unminted(chain, Collection::PreSale, &pre_sale_tally),
        filter_unminted(chain, Collection::Community, &community_tally),
    )
    .await?;

    let items = resolve_metadata(chain, backend, &pre_sale, &community).await?;
    let reconciliation = reconcile(chain, ctx.wallet_address, items).await?;

    let importable = importable_rows(&reconciliation.rows, ctx.community_threshold);
    Ok(EligibilityReport {
        all_minted: all_minted(&reconciliation.rows, ctx.community_threshold),
        importable,
        unsupported: reconciliation.unsupported_positions.len(),
        rows: reconciliation.rows,
    })
}
