use alloy::primitives::Address;
use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use super::{VendorCheckRequest, VendorSbtGrant};
use crate::AppState;
use crate::error::{SbtError, VendorRejection};
use crate::handlers::proxy::external::SbtBackend;
use crate::handlers::sbt::chain::parse_address;
use crate::utils::env::EnvVars;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorCheckBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub password: String,
    pub wallet_address: String,
}

/// Validate a vendor code for `wallet` and return the grant it unlocks.
///
/// Rejection details from the vendor are mapped to [`VendorRejection`]s, and
/// a grant whose power is below the configured minimum is refused.
pub async fn check_vendor_code(
    backend: &dyn SbtBackend,
    env: &EnvVars,
    code: &str,
    password: &str,
    wallet: Address,
) -> Result<VendorSbtGrant, SbtError> {
    if code.trim().is_empty() || password.is_empty() {
        return Err(SbtError::VendorRejected(VendorRejection::MissingCode));
    }

    let request = VendorCheckRequest {
        code: code.trim().to_string(),
        password: password.to_string(),
        chain_id: env.chain_id,
        contract: env.sbt_contract.to_string(),
        wallet: wallet.to_string(),
    };

    let grant = backend
        .check_vendor_sbt(&request)
        .await
        .map_err(|e| match e {
            SbtError::Api { message, .. } => {
                SbtError::VendorRejected(VendorRejection::from_detail(&message))
            }
            other => other,
        })?;

    if grant.power < env.vendor_min_power {
        log::info!(
            "Vendor grant for {} rejected: power {} below {}",
            wallet,
            grant.power,
            env.vendor_min_power
        );
        return Err(SbtError::VendorRejected(
            VendorRejection::PowerBelowThreshold(env.vendor_min_power),
        ));
    }

    Ok(grant)
}

pub async fn check_vendor_sbt(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<VendorCheckBody>,
) -> Result<Json<VendorSbtGrant>, (StatusCode, Json<Value>)> {
    let wallet = parse_address(&payload.wallet_address).map_err(SbtError::into_response_parts)?;

    check_vendor_code(
        state.backend.as_ref(),
        &state.env_vars,
        &payload.code,
        &payload.password,
        wallet,
    )
    .await
    .map(Json)
    .map_err(SbtError::into_response_parts)
}
