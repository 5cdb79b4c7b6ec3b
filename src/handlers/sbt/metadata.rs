//! Metadata Resolver
//!
//! Turns unminted candidates into item ids and image references. Every
//! candidate first resolves its `tokenURI` on its own pre-sale contract, then:
//! - pre-sale URIs are pooled and resolved by the backend bulk proxy, which
//!   answers `[itemId, imageUrl]` pairs in request order;
//! - community URIs are fetched one by one through content-addressed
//!   retrieval and the item id is read off the URI's trailing path segment.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use super::chain::SbtChain;
use super::mint_status::CandidateEntry;
use crate::error::SbtError;
use crate::handlers::proxy::external::SbtBackend;

static TRAILING_ITEM_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(\d+)$").expect("trailing item id pattern is valid"));

/// One candidate with the metadata resolved for it.
///
/// `item_id` is `None` when the URI or proxy entry carried no parseable id;
/// such items are dropped by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedItem {
    pub candidate: CandidateEntry,
    pub item_id: Option<i64>,
    pub image_uri: Option<String>,
}

/// Extract the trailing numeric path segment of a metadata URI.
///
/// `ipfs://bafy.../42` gives `Some(42)`; a URI without trailing digits gives `None`.
pub fn extract_item_id(uri: &str) -> Option<i64> {
    TRAILING_ITEM_ID
        .captures(uri.trim())
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Parse an item id the proxy returned as either a JSON number or a numeric string.
pub fn parse_item_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

async fn resolve_token_uris(
    chain: &dyn SbtChain,
    candidates: &[CandidateEntry],
) -> Result<Vec<String>, SbtError> {
    let reads = candidates
        .iter()
        .map(|candidate| chain.token_uri(candidate.collection, candidate.token_id));
    futures::future::try_join_all(reads).await
}

async fn resolve_pre_sale(
    backend: &dyn SbtBackend,
    candidates: &[CandidateEntry],
    uris: Vec<String>,
) -> Result<Vec<ResolvedItem>, SbtError> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let entries = backend.fetch_metadata_bulk(&uris).await?;
    if entries.len() != candidates.len() {
        return Err(SbtError::Metadata(format!(
            "Metadata proxy returned {} results for {} URIs",
            entries.len(),
            candidates.len()
        )));
    }

    Ok(candidates
        .iter()
        .zip(entries)
        .map(|(candidate, entry)| ResolvedItem {
            candidate: *candidate,
            item_id: parse_item_id(&entry.0),
            image_uri: entry.1,
        })
        .collect())
}

async fn resolve_community_item(
    backend: &dyn SbtBackend,
    candidate: CandidateEntry,
    uri: String,
) -> Result<ResolvedItem, SbtError> {
    let Some(item_id) = extract_item_id(&uri) else {
        log::warn!(
            "Can't find an item id in metadata URI {} (token {})",
            uri,
            candidate.token_id
        );
        return Ok(ResolvedItem {
            candidate,
            item_id: None,
            image_uri: None,
        });
    };

    let document = backend.fetch_content_json(uri.trim()).await?;
    let image_uri = document
        .get("image")
        .and_then(Value::as_str)
        .map(str::to_string);
    if image_uri.is_none() {
        log::warn!("Metadata at {} has no image field", uri);
    }

    log::debug!("Resolved community token {} to item {}", candidate.token_id, item_id);

    Ok(ResolvedItem {
        candidate,
        item_id: Some(item_id),
        image_uri,
    })
}

async fn resolve_community(
    backend: &dyn SbtBackend,
    candidates: &[CandidateEntry],
    uris: Vec<String>,
) -> Result<Vec<ResolvedItem>, SbtError> {
    let fetches = candidates
        .iter()
        .zip(uris)
        .map(|(candidate, uri)| resolve_community_item(backend, *candidate, uri));
    futures::future::try_join_all(fetches).await
}

/// Resolve metadata for both candidate families.
///
/// Returns pre-sale items followed by community items, each family in its
/// candidate order. Any failed URI read or fetch fails the whole stage.
pub async fn resolve_metadata(
    chain: &dyn SbtChain,
    backend: &dyn SbtBackend,
    pre_sale: &[CandidateEntry],
    community: &[CandidateEntry],
) -> Result<Vec<ResolvedItem>, SbtError> {
    let (pre_sale_uris, community_uris) = futures::future::try_join(
        resolve_token_uris(chain, pre_sale),
        resolve_token_uris(chain, community),
    )
    .await?;

    let (mut items, community_items) = futures::future::try_join(
        resolve_pre_sale(backend, pre_sale, pre_sale_uris),
        resolve_community(backend, community, community_uris),
    )
    .await?;

    items.extend(community_items);
    log::info!("Resolved metadata for {} candidates", items.len());
    Ok(items)
}
