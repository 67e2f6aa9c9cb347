//! Session Store: the poll-driven state machine at the heart of the service.
//!
//! An [`AuthRequest`](models::AuthRequest) is created pending, carries a
//! correlation amount derived from its creation time, and either commits to
//! the verified partition exactly once or disappears when its window closes.

pub mod models;
pub mod store;

pub use models::{
    correlation_lamports, format_sol, lamports_to_sol, sol_to_lamports, AuthRequest,
    PendingSession, SessionStatus, VerifiedSession, LAMPORTS_PER_SOL,
};
pub use store::{spawn_sweeper, SessionConfig, SessionError, SessionStore};
