//! Poll the state of an authentication request.
//!
//! Terminal states answer immediately. A pending session triggers one ledger
//! scan per poll; the first match commits the session to verified. Ledger
//! failures degrade to "still pending": the client-facing answer never
//! depends on the ledger being reachable, and expiry is evaluated either way.

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::warn;

use super::state::AuthState;
use super::types::StatusResponse;
use crate::api::handlers::parse_session_id;
use crate::session::{PendingSession, SessionError, SessionStatus};

#[utoipa::path(
    get,
    path = "/auth/status/{session_id}",
    params(
        ("session_id" = String, Path, description = "Session id returned by initiate")
    ),
    responses(
        (status = 200, description = "Current session status", body = StatusResponse)
    ),
    tag = "auth"
)]
pub async fn status(
    Path(session_id): Path<String>,
    state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    let Some(session_id) = parse_session_id(&session_id) else {
        return (StatusCode::OK, Json(StatusResponse::not_found()));
    };

    let response = match state.store().status(session_id).await {
        SessionStatus::Verified(view) => StatusResponse::verified(&view),
        SessionStatus::Expired => StatusResponse::expired(),
        SessionStatus::NotFound => StatusResponse::not_found(),
        SessionStatus::Pending(pending) => poll_ledger(&state, &pending).await,
    };

    (StatusCode::OK, Json(response))
}

/// One ledger scan for a pending session. No store lock is held across the
/// suspending matcher call; the commit re-checks state under the lock.
async fn poll_ledger(state: &AuthState, pending: &PendingSession) -> StatusResponse {
    let found = state
        .matcher()
        .find_match(
            &pending.wallet_address,
            &pending.receiver_address,
            pending.expected_lamports,
        )
        .await;

    let matched = match found {
        Ok(matched) => matched,
        Err(err) => {
            // Explicit policy, not suppression: the failure is visible to
            // monitoring while the client simply polls again.
            warn!(
                session_id = %pending.session_id,
                error = %err,
                "ledger query failed, treating as no match this poll"
            );
            None
        }
    };

    let Some(payment) = matched else {
        return StatusResponse::pending(pending);
    };

    match state
        .store()
        .commit_verified(pending.session_id, &payment.signature)
        .await
    {
        Ok(view) => StatusResponse::verified(&view),
        // the window closed or the session was invalidated while the ledger
        // call was in flight
        Err(SessionError::Expired) => StatusResponse::expired(),
        Err(SessionError::NotFound) => StatusResponse::not_found(),
    }
}
