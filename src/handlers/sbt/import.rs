use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use super::chain::parse_address;
use super::mint::{MintReport, MintTarget, submit_mints};
use super::pipeline::{EligibilityReport, PipelineContext, run_eligibility};
use crate::AppState;
use crate::error::SbtError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletPair {
    pub wallet_address: String,
    pub external_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub wallet_address: String,
}

fn pipeline_context(state: &AppState, wallets: &WalletPair) -> Result<PipelineContext, SbtError> {
    Ok(PipelineContext {
        wallet_address: parse_address(&wallets.wallet_address)?,
        external_address: parse_address(&wallets.external_address)?,
        block_window: state.env_vars.event_block_range,
        community_threshold: state.env_vars.community_item_threshold,
    })
}

/// Eligibility of the external wallet's pre-sale history for the in-app wallet
pub async fn get_eligibility(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WalletPair>,
) -> Result<Json<EligibilityReport>, (StatusCode, Json<Value>)> {
    let ctx = pipeline_context(&state, &params).map_err(SbtError::into_response_parts)?;

    let report = run_eligibility(state.chain.as_ref(), state.backend.as_ref(), ctx)
        .await
        .map_err(|e| {
            log::error!(
                "Eligibility check for {} failed: {}",
                params.external_address,
                e
            );
            e.into_response_parts()
        })?;

    Ok(Json(report))
}

/// Recompute eligibility and mint every row that still has something to mint
pub async fn import_sbts(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<WalletPair>,
) -> Result<(StatusCode, Json<MintReport>), (StatusCode, Json<Value>)> {
    let ctx = pipeline_context(&state, &payload).map_err(SbtError::into_response_parts)?;

    let report = run_eligibility(state.chain.as_ref(), state.backend.as_ref(), ctx)
        .await
        .map_err(|e| {
            log::error!("SBT import for {} failed: {}", payload.external_address, e);
            e.into_response_parts()
        })?;

    let target = MintTarget {
        chain_id: state.env_vars.chain_id,
        contract: state.env_vars.sbt_contract.to_string(),
        wallet_address: ctx.wallet_address.to_string(),
        external_address: ctx.external_address.to_string(),
    };

    let mint_report = submit_mints(
        state.backend.as_ref(),
        &target,
        &report.rows,
        ctx.community_threshold,
    )
    .await;

    let status = if mint_report.succeeded {
        StatusCode::OK
    } else {
        StatusCode::BAD_GATEWAY
    };
    Ok((status, Json(mint_report)))
}

/// Ask the backend to refresh its cached SBT holdings for the wallet
pub async fn refresh_sbts(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let wallet = parse_address(&payload.wallet_address).map_err(SbtError::into_response_parts)?;

    state
        .backend
        .refresh_sbt_cache(&wallet.to_string())
        .await
        .map_err(|e| {
            log::warn!("SBT refresh for {} failed: {}", wallet, e);
            e.into_response_parts()
        })?;

    Ok(Json(json!({ "status": "ok" })))
}
