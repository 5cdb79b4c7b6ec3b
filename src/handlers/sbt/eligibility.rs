//! Eligibility Reconciler
//!
//! Merges resolved metadata into one row per item id and subtracts what the
//! in-app wallet already owns on the authoritative contract.

use std::collections::HashMap;

use alloy::primitives::Address;
use serde::Serialize;

use super::chain::SbtChain;
use super::metadata::ResolvedItem;
use super::tally::count_by_first_occurrence;
use crate::error::SbtError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityRow {
    pub item_id: u64,
    pub total_occurrences: u32,
    pub owned: u64,
    /// `total_occurrences - owned`; zero or negative means nothing left to mint.
    pub mintable_quantity: i64,
    pub source_token_ids: Vec<u64>,
    pub image_refs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub rows: Vec<EligibilityRow>,
    /// Positions, in merged metadata order, of the items dropped as unsupported.
    pub unsupported_positions: Vec<usize>,
}

/// Split resolved items into supported ones (item id >= 1) and the positions
/// of the unsupported ones.
pub fn partition_supported(items: Vec<ResolvedItem>) -> (Vec<(u64, ResolvedItem)>, Vec<usize>) {
    let mut supported = Vec::with_capacity(items.len());
    let mut unsupported = Vec::new();

    for (position, item) in items.into_iter().enumerate() {
        match item.item_id {
            Some(item_id) if item_id >= 1 => supported.push((item_id as u64, item)),
            _ => unsupported.push(position),
        }
    }

    (supported, unsupported)
}

/// Build rows from supported items and the owned balance of each item id.
///
/// Each item contributes its candidate's occurrence count. Rows follow the
/// first occurrence of their item id. An item id missing from `balances`
/// counts as nothing owned.
pub fn assemble_rows(
    supported: &[(u64, ResolvedItem)],
    balances: &HashMap<u64, u64>,
) -> Vec<EligibilityRow> {
    let order = count_by_first_occurrence(supported.iter().map(|(item_id, _)| *item_id));

    order
        .into_iter()
        .map(|(item_id, _)| {
            let members: Vec<&ResolvedItem> = supported
                .iter()
                .filter(|(id, _)| *id == item_id)
                .map(|(_, item)| item)
                .collect();
            let total_occurrences: u32 = members.iter().map(|item| item.candidate.count).sum();
            let owned = balances.get(&item_id).copied().unwrap_or(0);

            EligibilityRow {
                item_id,
                total_occurrences,
                owned,
                mintable_quantity: mintable_quantity(total_occurrences, owned),
                source_token_ids: members.iter().map(|item| item.candidate.token_id).collect(),
                image_refs: members
                    .iter()
                    .filter_map(|item| item.image_uri.clone())
                    .collect(),
            }
        })
        .collect()
}

/// Occurrences minus owned units. Balances beyond `i64::MAX` saturate, so the
/// result never exceeds `total_occurrences`.
pub fn mintable_quantity(total_occurrences: u32, owned: u64) -> i64 {
    i64::from(total_occurrences) - i64::try_from(owned).unwrap_or(i64::MAX)
}

/// Reconcile resolved metadata against the wallet's owned balances.
///
/// Balance lookups run concurrently, one per distinct item id; any failure
/// fails the stage.
pub async fn reconcile(
    chain: &dyn SbtChain,
    wallet_address: Address,
    items: Vec<ResolvedItem>,
) -> Result<Reconciliation, SbtError> {
    let (supported, unsupported_positions) = partition_supported(items);
    if !unsupported_positions.is_empty() {
        log::warn!(
            "Dropping {} unsupported metadata records at positions {:?}",
            unsupported_positions.len(),
            unsupported_positions
        );
    }

    let item_ids: Vec<u64> = count_by_first_occurrence(supported.iter().map(|(id, _)| *id))
        .into_iter()
        .map(|(item_id, _)| item_id)
        .collect();

    let lookups = item_ids
        .iter()
        .map(|&item_id| chain.balance_of(wallet_address, item_id));
    let owned = futures::future::try_join_all(lookups).await?;
    let balances: HashMap<u64, u64> = item_ids.into_iter().zip(owned).collect();

    let rows = assemble_rows(&supported, &balances);
    log::info!(
        "Reconciled {} item rows for {} ({} mintable)",
        rows.len(),
        wallet_address,
        rows.iter().filter(|row| row.mintable_quantity > 0).count()
    );

    Ok(Reconciliation {
        rows,
        unsupported_positions,
    })
}

/// Whether a row is offered to the user as "available to import".
///
/// Social/game items (below `community_threshold`) always are. Community
/// items only when nothing is owned yet and something is mintable.
pub fn show_never_minted(row: &EligibilityRow, community_threshold: u64) -> bool {
    if row.item_id < community_threshold {
        return true;
    }
    i64::from(row.total_occurrences) - row.mintable_quantity == 0 && row.mintable_quantity > 0
}

pub fn is_social_or_game(row: &EligibilityRow, community_threshold: u64) -> bool {
    row.item_id < community_threshold
}

/// Rows that still have something to mint and pass [`show_never_minted`].
pub fn importable_rows(rows: &[EligibilityRow], community_threshold: u64) -> Vec<EligibilityRow> {
    rows.iter()
        .filter(|row| row.mintable_quantity > 0)
        .filter(|row| show_never_minted(row, community_threshold))
        .cloned()
        .collect()
}

pub fn all_minted(rows: &[EligibilityRow], community_threshold: u64) -> bool {
    importable_rows(rows, community_threshold).is_empty()
}
