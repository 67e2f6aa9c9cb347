//! Data model for authentication requests and the correlation amount.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Lamports per SOL (the ledger's native 9-decimal unit).
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Convert a SOL amount (as configured on the command line) to lamports.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sol_to_lamports(sol: f64) -> u64 {
    (sol * LAMPORTS_PER_SOL as f64).round() as u64
}

/// Convert lamports to SOL for wire responses.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Render lamports as a 9-decimal SOL string, the exact amount a wallet UI
/// must send.
#[must_use]
pub fn format_sol(lamports: u64) -> String {
    format!("{:.9}", lamports_to_sol(lamports))
}

/// Derive the correlation amount for a request created at `epoch_millis`.
///
/// The low-order millisecond digits act as a cheap per-request nonce layered
/// onto the base amount, so many pending requests can share one receiver
/// address. Requests created in the same ms-mod-1000 bucket collide; that is
/// a documented limitation of the scheme, acceptable for a low-volume auth
/// flow.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub fn correlation_lamports(base_lamports: u64, epoch_millis: i64) -> u64 {
    base_lamports + epoch_millis.rem_euclid(1000) as u64
}

/// An authentication request, the only persistent entity.
///
/// Lives in exactly one of the store's two partitions at any time; `signature`
/// and `verified_at` are populated only on the transition to verified.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub session_id: Uuid,
    pub wallet_address: String,
    pub receiver_address: String,
    pub expected_lamports: u64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub signature: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
}

impl AuthRequest {
    pub(crate) fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// View of a pending request, carrying everything the poll path needs to ask
/// the ledger for a match without touching the store again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSession {
    pub session_id: Uuid,
    pub wallet_address: String,
    pub receiver_address: String,
    pub expected_lamports: u64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// View of a request that completed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedSession {
    pub session_id: Uuid,
    pub wallet_address: String,
    pub signature: String,
    pub verified_at: DateTime<Utc>,
}

/// Result of a status lookup. `Expired` and `NotFound` are derived responses,
/// never stored states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Pending(PendingSession),
    Verified(VerifiedSession),
    Expired,
    NotFound,
}

impl From<&AuthRequest> for PendingSession {
    fn from(request: &AuthRequest) -> Self {
        Self {
            session_id: request.session_id,
            wallet_address: request.wallet_address.clone(),
            receiver_address: request.receiver_address.clone(),
            expected_lamports: request.expected_lamports,
            created_at: request.created_at,
            expires_at: request.expires_at,
        }
    }
}
