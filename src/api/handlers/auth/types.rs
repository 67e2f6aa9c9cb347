//! Request/response types for the auth endpoints. Wire fields are camelCase.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::session::{format_sol, lamports_to_sol, PendingSession, VerifiedSession};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InitiateRequest {
    pub wallet_address: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InitiateResponse {
    pub session_id: Uuid,
    pub receiver_address: String,
    /// Exact SOL amount the wallet must transfer; this is the correlation key.
    pub expected_amount: f64,
    pub expires_at: DateTime<Utc>,
    pub message: String,
}

impl From<&PendingSession> for InitiateResponse {
    fn from(pending: &PendingSession) -> Self {
        let amount = format_sol(pending.expected_lamports);
        Self {
            session_id: pending.session_id,
            receiver_address: pending.receiver_address.clone(),
            expected_amount: lamports_to_sol(pending.expected_lamports),
            expires_at: pending.expires_at,
            message: format!(
                "Send exactly {amount} SOL to {} before {} to authenticate wallet {}",
                pending.receiver_address,
                pending.expires_at.to_rfc3339(),
                pending.wallet_address,
            ),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub session_id: String,
    /// Transaction signature claimed as the payment; omit to just read the
    /// current status.
    #[serde(default)]
    pub signature: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub session_id: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Wire form of a session's lifecycle state.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Pending,
    Verified,
    Expired,
    NotFound,
}

/// Status view returned by the status and verify endpoints. Fields beyond
/// `status` are populated per state.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: SessionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
}

impl StatusResponse {
    #[must_use]
    pub fn pending(view: &PendingSession) -> Self {
        Self {
            status: SessionState::Pending,
            session_id: Some(view.session_id),
            wallet_address: Some(view.wallet_address.clone()),
            receiver_address: Some(view.receiver_address.clone()),
            expected_amount: Some(lamports_to_sol(view.expected_lamports)),
            expires_at: Some(view.expires_at),
            signature: None,
            verified_at: None,
        }
    }

    #[must_use]
    pub fn verified(view: &VerifiedSession) -> Self {
        Self {
            status: SessionState::Verified,
            session_id: Some(view.session_id),
            wallet_address: Some(view.wallet_address.clone()),
            receiver_address: None,
            expected_amount: None,
            expires_at: None,
            signature: Some(view.signature.clone()),
            verified_at: Some(view.verified_at),
        }
    }

    #[must_use]
    pub fn expired() -> Self {
        Self::bare(SessionState::Expired)
    }

    #[must_use]
    pub fn not_found() -> Self {
        Self::bare(SessionState::NotFound)
    }

    fn bare(status: SessionState) -> Self {
        Self {
            status,
            session_id: None,
            wallet_address: None,
            receiver_address: None,
            expected_amount: None,
            expires_at: None,
            signature: None,
            verified_at: None,
        }
    }
}
