//! Map validated CLI matches to the server action.
//!
//! The receiver address is the one piece of configuration the whole flow
//! hangs off, so its absence or malformation is fatal here, before anything
//! is bound or spawned.

use crate::api::handlers::valid_wallet_address;
use crate::cli::actions::{server, Action};
use anyhow::{bail, Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let receiver = matches
        .get_one::<String>("receiver")
        .cloned()
        .context("missing required argument: --receiver")?;
    if !valid_wallet_address(&receiver) {
        bail!("invalid receiver address: {receiver}");
    }

    let rpc_url = matches
        .get_one::<String>("rpc-url")
        .cloned()
        .context("missing required argument: --rpc-url")?;

    Ok(Action::Server(server::Args {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        rpc_url,
        receiver,
        base_amount_sol: matches
            .get_one::<f64>("base-amount")
            .copied()
            .unwrap_or(0.00001),
        session_timeout_seconds: matches
            .get_one::<i64>("session-timeout")
            .copied()
            .unwrap_or(300),
        sweep_interval_seconds: matches
            .get_one::<u64>("sweep-interval")
            .copied()
            .unwrap_or(60),
        scan_limit: matches.get_one::<u64>("scan-limit").copied().unwrap_or(20) as usize,
    }))
}
