pub mod constants;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod utils;

use std::{sync::Arc, time::Duration};

use error::SbtError;
use handlers::proxy::external::{HttpBackend, SbtBackend};
use handlers::sbt::chain::{EvmSbtChain, SbtChain};

pub struct AppState {
    pub chain: Arc<dyn SbtChain>,
    pub backend: Arc<dyn SbtBackend>,
    pub env_vars: utils::env::EnvVars,
}

/// Initialize the application state from the environment
pub fn init_app_state() -> Result<AppState, SbtError> {
    let env_vars = utils::env::EnvVars::load()?;

    log::info!(
        "Connecting to chain {} via {} (SBT contract {})",
        env_vars.chain_id,
        env_vars.rpc_url,
        env_vars.sbt_contract
    );
    let chain = EvmSbtChain::connect(
        &env_vars.rpc_url,
        env_vars.sbt_contract,
        env_vars.sbt_pre_contract,
        env_vars.sbt_community_pre_contract,
    )?;

    let backend = HttpBackend::new(
        &env_vars.backend_api_base,
        &env_vars.ipfs_gateway,
        Duration::from_secs(env_vars.http_timeout_secs),
    )?;

    Ok(AppState {
        chain: Arc::new(chain),
        backend: Arc::new(backend),
        env_vars,
    })
}
