//! Wallet authentication endpoints.
//!
//! The flow: `initiate` mints a pending session with its correlation amount,
//! `status` polls the ledger for the matching transfer (committing on the
//! first match), `verify` checks an explicitly claimed transaction signature,
//! `logout` invalidates the session.

pub mod initiate;
pub mod logout;
pub mod state;
pub mod status;
pub mod types;
pub mod verify;

pub use state::{AuthConfig, AuthState};

#[cfg(test)]
pub(crate) mod test_support;
