use axum::{
    Json, Router,
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::{AppState, handlers};

async fn health_check() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

pub fn create_routes(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/api/health", get(health_check))
        // SBT import endpoints
        .route(
            "/api/sbt/eligibility",
            get(handlers::sbt::import::get_eligibility),
        )
        .route("/api/sbt/import", post(handlers::sbt::import::import_sbts))
        .route(
            "/api/sbt/refresh",
            post(handlers::sbt::import::refresh_sbts),
        )
        // Vendor SBT endpoints
        .route(
            "/api/vendor-sbt/check",
            post(handlers::vendor_sbt::check::check_vendor_sbt),
        )
        .route(
            "/api/vendor-sbt/mint",
            post(handlers::vendor_sbt::mint::mint_vendor_sbt),
        )
        .with_state(state)
}
