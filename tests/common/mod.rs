use alloy::primitives::Address;
use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use sbt_import::error::SbtError;
use sbt_import::handlers::sbt::chain::{Collection, SbtChain, TransferEvent};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

/// Item id the fake engine refuses as already minted
pub const ALREADY_MINTED_ITEM: u64 = 99;

/// Vendor code the fake vendor backend accepts
pub const GOOD_VENDOR_CODE: &str = "GOOD-CODE";

#[derive(Default)]
pub struct Recorded {
    pub bulk_bodies: Mutex<Vec<Value>>,
    pub ipfs_hits: AtomicUsize,
    pub engine_bodies: Mutex<Vec<Value>>,
    pub refresh_bodies: Mutex<Vec<Value>>,
    pub vendor_check_bodies: Mutex<Vec<Value>>,
    pub vendor_mint_bodies: Mutex<Vec<Value>>,
}

impl Recorded {
    pub fn ipfs_hits(&self) -> usize {
        self.ipfs_hits.load(Ordering::SeqCst)
    }
}

/// In-process stand-in for the backend API and the IPFS gateway
pub struct FakeBackend {
    pub base_url: String,
    pub recorded: Arc<Recorded>,
    handle: tokio::task::JoinHandle<()>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let recorded = Arc::new(Recorded::default());

        let app = Router::new()
            .route("/api/fetch-with-cors", post(fetch_with_cors))
            .route("/ipfs/{*path}", get(ipfs_document))
            .route("/api/engine", post(engine_mint))
            .route("/api/sbt-refresh", post(sbt_refresh))
            .route("/api/vendor-sbt-check", post(vendor_check))
            .route("/api/vendor-sbt-mint", post(vendor_mint))
            .with_state(recorded.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Fake backend has no address");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        FakeBackend {
            base_url: format!("http://{}", addr),
            recorded,
            handle,
        }
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// `https://meta.example.com/<n>` resolves to item `<n>`, `https://broken.example.com/..`
/// to a bare `null` entry, anything else to `[null, null]`
async fn fetch_with_cors(
    State(recorded): State<Arc<Recorded>>,
    Json(body): Json<Value>,
) -> Json<Value> {
    recorded.bulk_bodies.lock().unwrap().push(body.clone());

    let result: Vec<Value> = body["urls"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .map(|url| {
            let url = url.as_str().unwrap_or_default();
            if url.starts_with("https://broken.example.com/") {
                return Value::Null;
            }
            match url.strip_prefix("https://meta.example.com/") {
                Some(id) => json!([id, format!("https://img.example.com/{}.png", id)]),
                None => json!([null, null]),
            }
        })
        .collect();

    Json(json!({ "result": result }))
}

async fn ipfs_document(
    State(recorded): State<Arc<Recorded>>,
    Path(path): Path<String>,
) -> Result<Json<Value>, StatusCode> {
    recorded.ipfs_hits.fetch_add(1, Ordering::SeqCst);
    if path.ends_with("missing") {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({
        "name": "Community item",
        "image": format!("ipfs://images/{}.png", path),
    })))
}

async fn engine_mint(
    State(recorded): State<Arc<Recorded>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    recorded.engine_bodies.lock().unwrap().push(body.clone());
    if body["args"][1].as_u64() == Some(ALREADY_MINTED_ITEM) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Token already minted for this wallet" })),
        );
    }
    (StatusCode::OK, Json(json!({ "result": { "queueId": "q-1" } })))
}

async fn sbt_refresh(State(recorded): State<Arc<Recorded>>, Json(body): Json<Value>) -> Json<Value> {
    recorded.refresh_bodies.lock().unwrap().push(body);
    Json(json!({ "status": "ok" }))
}

async fn vendor_check(
    State(recorded): State<Arc<Recorded>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    recorded.vendor_check_bodies.lock().unwrap().push(body.clone());
    if body["code"] == GOOD_VENDOR_CODE {
        (
            StatusCode::OK,
            Json(json!({ "guid": "vendor-guid", "power": 1_500_000, "meta": { "category": 2 } })),
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "INVALID_CODE" })),
        )
    }
}

async fn vendor_mint(State(recorded): State<Arc<Recorded>>, Json(body): Json<Value>) -> Json<Value> {
    recorded.vendor_mint_bodies.lock().unwrap().push(body);
    Json(json!({ "status": "queued" }))
}

/// Fixed on-chain state for pipeline runs against the fake backend
#[derive(Default)]
pub struct StaticChain {
    pub events: HashMap<Collection, Vec<u64>>,
    pub uris: HashMap<(Collection, u64), String>,
    pub balances: HashMap<u64, u64>,
}

#[async_trait]
impl SbtChain for StaticChain {
    async fn transfer_events(
        &self,
        collection: Collection,
        _to: Address,
        _block_window: u64,
    ) -> Result<Vec<TransferEvent>, SbtError> {
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
            .ok_or_else(|| SbtError::Chain(format!("no tokenURI for {}", token_id)))
    }

    async fn is_minted(&self, _collection: Collection, _token_id: u64) -> Result<bool, SbtError> {
        Ok(false)
    }

    async fn balance_of(&self, _owner: Address, item_id: u64) -> Result<u64, SbtError> {
        Ok(self.balances.get(&item_id).copied().unwrap_or(0))
    }
}
