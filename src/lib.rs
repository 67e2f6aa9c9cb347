//! # Walletgate
//!
//! `walletgate` authenticates the owner of a Solana wallet without asking for
//! a message signature: the client proves control of the wallet by sending a
//! uniquely-amounted micro-payment to a receiver address owned by the service.
//!
//! ## How a login works
//!
//! 1. `POST /auth/initiate` with the claimed wallet address. The service mints
//!    a pending session with a correlation amount: the configured base amount
//!    plus a per-request perturbation of up to 999 lamports derived from the
//!    creation timestamp. That amount stands in for the memo field the ledger
//!    lacks; it is what binds an observed transfer back to one session.
//! 2. The client sends exactly that amount to the receiver address.
//! 3. The client polls `GET /auth/status/{session_id}`. Each poll scans the
//!    receiver's recent confirmed transactions once; when a transfer from the
//!    claimed wallet with the expected amount appears, the session commits to
//!    verified and stays there. Clients that already know the transaction
//!    signature can short-circuit the scan with `POST /auth/verify`.
//!
//! Sessions are single-use and expire after a configurable window. The match
//! tolerance is deliberately tight: concurrent pending sessions may differ by
//! a single lamport, so the scan accepts only exact amounts by default.

pub mod api;
pub mod cli;
pub mod ledger;
pub mod session;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(GIT_COMMIT_HASH.len() >= 7);
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
