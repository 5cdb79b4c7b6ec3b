use alloy::primitives::Address;
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

use super::{VendorMintArgs, VendorMintRequest, VendorSbtGrant};
use crate::AppState;
use crate::error::{SbtError, VendorRejection};
use crate::handlers::proxy::external::SbtBackend;
use crate::handlers::sbt::chain::parse_address;
use crate::handlers::sbt::mint::TokenType;
use crate::utils::env::EnvVars;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorMintBody {
    pub wallet_address: String,
    pub grant: VendorSbtGrant,
}

pub fn build_vendor_mint_request(
    env: &EnvVars,
    wallet: Address,
    grant: &VendorSbtGrant,
) -> VendorMintRequest {
    VendorMintRequest {
        chain_id: env.chain_id,
        contract: env.sbt_contract.to_string(),
        args: VendorMintArgs(
            wallet.to_string(),
            grant.meta.category,
            1,
            grant.guid.clone(),
            Vec::new(),
            TokenType::Game.code(),
        ),
    }
}

/// Mint the single GAME item a vendor grant unlocks.
///
/// The grant arrives from the caller, so its power is checked against the
/// configured minimum again before anything is sent.
pub async fn mint_granted_sbt(
    backend: &dyn SbtBackend,
    env: &EnvVars,
    wallet: Address,
    grant: &VendorSbtGrant,
) -> Result<(), SbtError> {
    if grant.power < env.vendor_min_power {
        log::warn!(
            "Refusing vendor mint for {}: power {} below {}",
            wallet,
            grant.power,
            env.vendor_min_power
        );
        return Err(SbtError::VendorRejected(
            VendorRejection::PowerBelowThreshold(env.vendor_min_power),
        ));
    }

    let request = build_vendor_mint_request(env, wallet, grant);

    backend.mint_vendor_sbt(&request).await.map_err(|e| {
        log::error!("Vendor SBT mint for {} failed: {}", wallet, e);
        match e {
            SbtError::Api { message, .. } => {
                SbtError::VendorRejected(VendorRejection::MintFailed(message))
            }
            other => other,
        }
    })?;

    log::info!(
        "Issued vendor SBT category {} to {}",
        grant.meta.category,
        wallet
    );
    Ok(())
}

pub async fn mint_vendor_sbt(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VendorMintBody>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let wallet = parse_address(&payload.wallet_address).map_err(SbtError::into_response_parts)?;

    mint_granted_sbt(
        state.backend.as_ref(),
        &state.env_vars,
        wallet,
        &payload.grant,
    )
    .await
    .map_err(SbtError::into_response_parts)?;

    Ok(Json(json!({ "status": "minted" })))
}
