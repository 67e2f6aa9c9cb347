//! Ledger Matcher: read-only collaborator that answers one question, namely
//! whether a transfer matching a session's criteria landed on the ledger.
//!
//! The session flow consumes it through the [`LedgerMatcher`] trait and never
//! holds store state across its suspending calls.

pub mod matcher;
pub mod rpc;

pub use matcher::{LedgerMatcher, MatcherConfig, PaymentMatch, RpcMatcher, VerificationOutcome};
pub use rpc::{LedgerError, RpcClient};
