//! Token-ID Tally
//!
//! Group-count helpers shared by the token-id and item-id stages.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use super::chain::TransferEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyEntry {
    pub token_id: u64,
    pub count: u32,
}

/// Count occurrences per key, ordered by first occurrence.
pub fn count_by_first_occurrence<K, I>(keys: I) -> Vec<(K, u32)>
where
    K: Eq + Hash + Copy,
    I: IntoIterator<Item = K>,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, u32)> = Vec::new();

    for key in keys {
        match positions.get(&key) {
            Some(&index) => counts[index].1 += 1,
            None => {
                positions.insert(key, counts.len());
                counts.push((key, 1));
            }
        }
    }

    counts
}

pub fn tally_token_ids(events: &[TransferEvent]) -> Vec<TallyEntry> {
    count_by_first_occurrence(events.iter().map(|event| event.token_id))
        .into_iter()
        .map(|(token_id, count)| TallyEntry { token_id, count })
        .collect()
}
