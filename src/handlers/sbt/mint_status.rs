//! Mint-Status Filter
//!
//! Drops tally entries the authoritative contract already minted. Pre-sale
//! entries are checked with `minted`, community entries with `communityMinted`.

use serde::Serialize;

use super::chain::{Collection, SbtChain};
use super::tally::TallyEntry;
use crate::error::SbtError;

/// A tally entry that has not been minted yet, tagged with its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateEntry {
    pub collection: Collection,
    pub token_id: u64,
    pub count: u32,
}

/// Keep the entries whose minted-predicate is false, in input order.
///
/// One lookup per entry is issued concurrently. If any lookup fails the whole
/// filter fails; a failed lookup is never treated as "not minted".
pub async fn filter_unminted(
    chain: &dyn SbtChain,
    collection: Collection,
    entries: &[TallyEntry],
) -> Result<Vec<CandidateEntry>, SbtError> {
    let lookups = entries
        .iter()
        .map(|entry| chain.is_minted(collection, entry.token_id));
    let minted = futures::future::try_join_all(lookups).await?;

    let candidates: Vec<CandidateEntry> = entries
        .iter()
        .zip(minted)
        .filter(|(_, minted)| !minted)
        .map(|(entry, _)| CandidateEntry {
            collection,
            token_id: entry.token_id,
            count: entry.count,
        })
        .collect();

    log::info!(
        "{:?}: {} of {} token ids are not minted yet",
        collection,
        candidates.len(),
        entries.len()
    );

    Ok(candidates)
}
