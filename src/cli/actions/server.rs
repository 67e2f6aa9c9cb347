//! Server bootstrap: wire the ledger matcher and session store together and
//! hand them to the HTTP layer.

use crate::api::{self, AuthConfig, AuthState};
use crate::ledger::{RpcClient, RpcMatcher};
use crate::session::sol_to_lamports;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub rpc_url: String,
    pub receiver: String,
    pub base_amount_sol: f64,
    pub session_timeout_seconds: i64,
    pub sweep_interval_seconds: u64,
    pub scan_limit: usize,
}

/// Execute the server action.
///
/// # Errors
/// Returns an error if the RPC endpoint is invalid or the server fails to
/// start.
pub async fn execute(args: Args) -> Result<()> {
    let endpoint = Url::parse(&args.rpc_url)
        .with_context(|| format!("Invalid ledger RPC endpoint: {}", args.rpc_url))?;

    let config = AuthConfig::new(args.receiver)
        .with_base_lamports(sol_to_lamports(args.base_amount_sol))
        .with_session_ttl_seconds(args.session_timeout_seconds)
        .with_scan_limit(args.scan_limit);

    let rpc = RpcClient::new(endpoint).context("Failed to build the ledger RPC client")?;
    let matcher = Arc::new(RpcMatcher::new(rpc, config.matcher_config()));

    info!(
        receiver = config.receiver_address(),
        base_lamports = config.base_lamports(),
        session_ttl_seconds = config.session_ttl_seconds(),
        "starting walletgate"
    );

    let state = Arc::new(AuthState::new(config, matcher));

    api::new(args.port, state, args.sweep_interval_seconds).await
}
