//! Invalidate an authentication request.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use super::state::AuthState;
use super::types::{LogoutRequest, LogoutResponse};
use crate::api::handlers::parse_session_id;

#[utoipa::path(
    post,
    path = "/auth/logout",
    request_body = LogoutRequest,
    responses(
        (status = 200, description = "Session removed (idempotent)", body = LogoutResponse)
    ),
    tag = "auth"
)]
pub async fn logout(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<LogoutRequest>>,
) -> impl IntoResponse {
    // Removal is unconditional and idempotent: unknown, expired and malformed
    // ids all report success.
    if let Some(Json(request)) = payload {
        if let Some(session_id) = parse_session_id(&request.session_id) {
            state.store().invalidate(session_id).await;
        }
    }
    (StatusCode::OK, Json(LogoutResponse { success: true }))
}
