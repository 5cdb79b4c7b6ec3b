use async_trait::async_trait;
use moka::future::Cache;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

use crate::constants::{
    ENGINE_MINT_PATH, FETCH_WITH_CORS_PATH, SBT_REFRESH_PATH, VENDOR_SBT_CHECK_PATH,
    VENDOR_SBT_MINT_PATH,
};
use crate::error::SbtError;
use crate::handlers::sbt::mint::EngineMintRequest;
use crate::handlers::vendor_sbt::{VendorCheckRequest, VendorMintRequest, VendorSbtGrant};

/// One `[itemId, imageUrl]` pair returned by the bulk metadata proxy.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxyMetadataEntry(pub Value, pub Option<String>);

impl ProxyMetadataEntry {
    /// Read one proxy result. Anything that is not an `[itemId, imageUrl]`
    /// array becomes an entry with a `null` item id.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Array(mut pair) if !pair.is_empty() => {
                let image = pair.get(1).and_then(Value::as_str).map(str::to_string);
                ProxyMetadataEntry(pair.swap_remove(0), image)
            }
            other => {
                log::warn!("Unexpected metadata proxy entry: {}", other);
                ProxyMetadataEntry(Value::Null, None)
            }
        }
    }
}

#[derive(Deserialize)]
struct ProxyMetadataResponse {
    result: Vec<Value>,
}

/// Backend HTTP capabilities used by the pipeline, the mint submitter and
/// the vendor SBT flow.
#[async_trait]
pub trait SbtBackend: Send + Sync {
    /// Resolve pre-sale metadata URIs through the CORS-safe bulk proxy.
    /// Results come back in request order.
    async fn fetch_metadata_bulk(&self, uris: &[String])
    -> Result<Vec<ProxyMetadataEntry>, SbtError>;

    /// Fetch a JSON document by content-addressed URI.
    async fn fetch_content_json(&self, uri: &str) -> Result<Value, SbtError>;

    async fn submit_engine_mint(&self, request: &EngineMintRequest) -> Result<(), SbtError>;

    async fn refresh_sbt_cache(&self, wallet: &str) -> Result<(), SbtError>;

    async fn check_vendor_sbt(
        &self,
        request: &VendorCheckRequest,
    ) -> Result<VendorSbtGrant, SbtError>;

    async fn mint_vendor_sbt(&self, request: &VendorMintRequest) -> Result<(), SbtError>;
}

/// Pull the human-readable message out of an error body.
///
/// Backends answer `{"error": "..."}` or `{"detail": "..."}`; anything else
/// is surfaced as the raw body text.
pub fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["error", "detail", "message"] {
            match value.get(key) {
                Some(Value::String(message)) => return message.clone(),
                Some(Value::Object(inner)) => {
                    if let Some(Value::String(message)) = inner.get("message") {
                        return message.clone();
                    }
                }
                _ => {}
            }
        }
    }
    body.trim().to_string()
}

/// Map a content-addressed URI to a fetchable URL.
///
/// `ipfs://<cid>/<path>` goes through the gateway; `http(s)` URLs are used as is.
pub fn resolve_content_uri(uri: &str, gateway: &str) -> String {
    let uri = uri.trim();
    match uri.strip_prefix("ipfs://") {
        Some(rest) => {
            let rest = rest.strip_prefix("ipfs/").unwrap_or(rest);
            format!("{}/ipfs/{}", gateway.trim_end_matches('/'), rest)
        }
        None => uri.to_string(),
    }
}

pub struct HttpBackend {
    client: Client,
    cache: Cache<String, Value>,
    base_url: String,
    ipfs_gateway: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, ipfs_gateway: &str, timeout: Duration) -> Result<Self, SbtError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SbtError::Config(format!("Failed to build HTTP client: {}", e)))?;

        // Content-addressed documents never change, so they can be cached
        let cache = Cache::builder()
            .max_capacity(10_000)
            .time_to_live(Duration::from_secs(600))
            .build();

        Ok(Self {
            client,
            cache,
            base_url: base_url.trim_end_matches('/').to_string(),
            ipfs_gateway: ipfs_gateway.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// POST a JSON body; non-success responses become `SbtError::Api`.
    async fn post_json<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, SbtError> {
        let url = self.endpoint(path);
        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            log::error!("Failed to reach {}: {}", url, e);
            SbtError::Transport(format!("Failed to reach backend: {}", e))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = extract_error_message(&text);
        log::warn!("Backend {} returned {}: {}", url, status, message);
        Err(SbtError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl SbtBackend for HttpBackend {
    async fn fetch_metadata_bulk(
        &self,
        uris: &[String],
    ) -> Result<Vec<ProxyMetadataEntry>, SbtError> {
        if uris.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .post_json(FETCH_WITH_CORS_PATH, &json!({ "urls": uris }))
            .await?;
        let parsed: ProxyMetadataResponse = response.json().await.map_err(|e| {
            SbtError::Metadata(format!("Failed to parse metadata proxy response: {}", e))
        })?;

        Ok(parsed
            .result
            .into_iter()
            .map(ProxyMetadataEntry::from_value)
            .collect())
    }

    async fn fetch_content_json(&self, uri: &str) -> Result<Value, SbtError> {
        let cache_key = format!("content:{}", uri);
        if let Some(cached) = self.cache.get(&cache_key).await {
            log::debug!("Cache hit for {}", uri);
            return Ok(cached);
        }

        let url = resolve_content_uri(uri, &self.ipfs_gateway);
        let response = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                log::error!("Failed to fetch {}: {}", url, e);
                SbtError::Transport(format!("Failed to fetch {}: {}", uri, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SbtError::Api {
                status: status.as_u16(),
                message: format!("Content fetch for {} failed", uri),
            });
        }

        let document: Value = response
            .json()
            .await
            .map_err(|e| SbtError::Metadata(format!("Metadata at {} is not JSON: {}", uri, e)))?;

        self.cache.insert(cache_key, document.clone()).await;
        Ok(document)
    }

    async fn submit_engine_mint(&self, request: &EngineMintRequest) -> Result<(), SbtError> {
        self.post_json(ENGINE_MINT_PATH, request).await?;
        Ok(())
    }

    async fn refresh_sbt_cache(&self, wallet: &str) -> Result<(), SbtError> {
        self.post_json(SBT_REFRESH_PATH, &json!({ "wallet": wallet }))
            .await?;
        Ok(())
    }

    async fn check_vendor_sbt(
        &self,
        request: &VendorCheckRequest,
    ) -> Result<VendorSbtGrant, SbtError> {
        let response = self.post_json(VENDOR_SBT_CHECK_PATH, request).await?;
        response
            .json()
            .await
            .map_err(|e| SbtError::Metadata(format!("Failed to parse vendor check response: {}", e)))
    }

    async fn mint_vendor_sbt(&self, request: &VendorMintRequest) -> Result<(), SbtError> {
        self.post_json(VENDOR_SBT_MINT_PATH, request).await?;
        Ok(())
    }
}
