//! Verify an authentication request against a claimed transaction signature.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::warn;

use super::state::AuthState;
use super::types::{StatusResponse, VerifyRequest};
use crate::api::handlers::{parse_session_id, valid_signature};
use crate::ledger::VerificationOutcome;
use crate::session::{PendingSession, SessionError, SessionStatus};

#[utoipa::path(
    post,
    path = "/auth/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Verified view, or current status when no signature was supplied", body = StatusResponse),
        (status = 400, description = "Session expired or verification failed (session stays pending)", body = String),
        (status = 404, description = "Unknown session", body = String)
    ),
    tag = "auth"
)]
pub async fn verify(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<VerifyRequest>>,
) -> impl IntoResponse {
    let request: VerifyRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let Some(session_id) = parse_session_id(&request.session_id) else {
        return (StatusCode::NOT_FOUND, "Unknown session".to_string()).into_response();
    };

    let signature = request
        .signature
        .as_deref()
        .map(str::trim)
        .filter(|signature| !signature.is_empty());

    match state.store().status(session_id).await {
        SessionStatus::NotFound => {
            (StatusCode::NOT_FOUND, "Unknown session".to_string()).into_response()
        }
        SessionStatus::Expired => {
            (StatusCode::BAD_REQUEST, "Session expired".to_string()).into_response()
        }
        // Re-verifying an already-verified session is a no-op returning the
        // stored result, whether or not a signature came along.
        SessionStatus::Verified(view) => {
            (StatusCode::OK, Json(StatusResponse::verified(&view))).into_response()
        }
        SessionStatus::Pending(pending) => match signature {
            None => (StatusCode::OK, Json(StatusResponse::pending(&pending))).into_response(),
            Some(signature) => {
                verify_with_signature(&state, &pending, signature)
                    .await
                    .into_response()
            }
        },
    }
}

async fn verify_with_signature(
    state: &AuthState,
    pending: &PendingSession,
    signature: &str,
) -> axum::response::Response {
    if !valid_signature(signature) {
        return (
            StatusCode::BAD_REQUEST,
            "Invalid transaction signature".to_string(),
        )
            .into_response();
    }

    let outcome = state
        .matcher()
        .verify_signature(
            signature,
            &pending.wallet_address,
            &pending.receiver_address,
            pending.expected_lamports,
        )
        .await;

    let payment = match outcome {
        Ok(VerificationOutcome::Confirmed(payment)) => payment,
        Ok(VerificationOutcome::Rejected { reason }) => {
            // The session stays pending; the caller may retry with a fresh
            // proof.
            return (
                StatusCode::BAD_REQUEST,
                format!("Verification failed: {reason}"),
            )
                .into_response();
        }
        Err(err) => {
            warn!(
                session_id = %pending.session_id,
                error = %err,
                "ledger query failed while verifying a claimed signature"
            );
            return (
                StatusCode::BAD_REQUEST,
                "Verification failed: ledger unreachable, retry".to_string(),
            )
                .into_response();
        }
    };

    match state
        .store()
        .commit_verified(pending.session_id, &payment.signature)
        .await
    {
        Ok(view) => (StatusCode::OK, Json(StatusResponse::verified(&view))).into_response(),
        Err(SessionError::Expired) => {
            (StatusCode::BAD_REQUEST, "Session expired".to_string()).into_response()
        }
        Err(SessionError::NotFound) => {
            (StatusCode::NOT_FOUND, "Unknown session".to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{
        auth_state, auth_state_with_ttl, body_json, payment, MatcherScript, SIGNATURE, WALLET,
    };
    use super::*;
    use anyhow::Result;

    fn request(session_id: String, signature: Option<&str>) -> Option<Json<VerifyRequest>> {
        Some(Json(VerifyRequest {
            session_id,
            signature: signature.map(ToString::to_string),
        }))
    }

    #[tokio::test]
    async fn verify_missing_payload() {
        let response = verify(Extension(auth_state(MatcherScript::NoMatch)), None)
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn verify_unknown_session_is_404() {
        let state = auth_state(MatcherScript::NoMatch);
        for session_id in [
            "00000000-0000-0000-0000-000000000000".to_string(),
            "not-a-uuid".to_string(),
        ] {
            let response = verify(Extension(Arc::clone(&state)), request(session_id, None))
                .await
                .into_response();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn verify_without_signature_returns_current_status() -> Result<()> {
        let state = auth_state(MatcherScript::NoMatch);
        let pending = state.store().create(WALLET).await;
        let response = verify(
            Extension(Arc::clone(&state)),
            request(pending.session_id.to_string(), None),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await?;
        assert_eq!(body["status"], "pending");
        Ok(())
    }

    #[tokio::test]
    async fn verify_expired_session_is_400() {
        let state = auth_state_with_ttl(MatcherScript::NoMatch, -1);
        let pending = state.store().create(WALLET).await;
        let response = verify(
            Extension(Arc::clone(&state)),
            request(pending.session_id.to_string(), Some(SIGNATURE)),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn verify_rejects_malformed_signature() {
        let state = auth_state(MatcherScript::NoMatch);
        let pending = state.store().create(WALLET).await;
        let response = verify(
            Extension(Arc::clone(&state)),
            request(pending.session_id.to_string(), Some("not base58!")),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn confirmed_signature_verifies_the_session() -> Result<()> {
        let state = auth_state(MatcherScript::Match(payment(SIGNATURE, 10_042)));
        let pending = state.store().create(WALLET).await;
        let response = verify(
            Extension(Arc::clone(&state)),
            request(pending.session_id.to_string(), Some(SIGNATURE)),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await?;
        assert_eq!(body["status"], "verified");
        assert_eq!(body["signature"], SIGNATURE);
        assert_eq!(body["walletAddress"], WALLET);
        Ok(())
    }

    #[tokio::test]
    async fn verify_is_idempotent_once_verified() -> Result<()> {
        let state = auth_state(MatcherScript::Match(payment(SIGNATURE, 10_042)));
        let pending = state.store().create(WALLET).await;

        let first = verify(
            Extension(Arc::clone(&state)),
            request(pending.session_id.to_string(), Some(SIGNATURE)),
        )
        .await
        .into_response();
        let first = body_json(first).await?;

        // repeat with no signature at all: same verified payload
        let second = verify(
            Extension(Arc::clone(&state)),
            request(pending.session_id.to_string(), None),
        )
        .await
        .into_response();
        assert_eq!(second.status(), StatusCode::OK);
        let second = body_json(second).await?;
        assert_eq!(second["status"], "verified");
        assert_eq!(second["verifiedAt"], first["verifiedAt"]);
        assert_eq!(second["signature"], first["signature"]);
        Ok(())
    }

    #[tokio::test]
    async fn rejected_signature_leaves_the_session_pending() -> Result<()> {
        let state = auth_state(MatcherScript::Reject("amount mismatch".to_string()));
        let pending = state.store().create(WALLET).await;
        let response = verify(
            Extension(Arc::clone(&state)),
            request(pending.session_id.to_string(), Some(SIGNATURE)),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // still pending and retryable afterwards
        let response = verify(
            Extension(Arc::clone(&state)),
            request(pending.session_id.to_string(), None),
        )
        .await
        .into_response();
        let body = body_json(response).await?;
        assert_eq!(body["status"], "pending");
        Ok(())
    }

    #[tokio::test]
    async fn ledger_failure_on_verify_is_retryable() -> Result<()> {
        let state = auth_state(MatcherScript::Error);
        let pending = state.store().create(WALLET).await;
        let response = verify(
            Extension(Arc::clone(&state)),
            request(pending.session_id.to_string(), Some(SIGNATURE)),
        )
        .await
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = verify(
            Extension(Arc::clone(&state)),
            request(pending.session_id.to_string(), None),
        )
        .await
        .into_response();
        let body = body_json(response).await?;
        assert_eq!(body["status"], "pending");
        Ok(())
    }
}
