//! Start an authentication request for a claimed wallet address.

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::debug;

use super::state::AuthState;
use super::types::{InitiateRequest, InitiateResponse};
use crate::api::handlers::valid_wallet_address;

#[utoipa::path(
    post,
    path = "/auth/initiate",
    request_body = InitiateRequest,
    responses(
        (status = 200, description = "Pending session created", body = InitiateResponse),
        (status = 400, description = "Missing or invalid wallet address", body = String)
    ),
    tag = "auth"
)]
pub async fn initiate(
    state: Extension<Arc<AuthState>>,
    payload: Option<Json<InitiateRequest>>,
) -> impl IntoResponse {
    let request: InitiateRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let wallet_address = request.wallet_address.trim();
    if wallet_address.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            "Missing wallet address".to_string(),
        )
            .into_response();
    }
    if !valid_wallet_address(wallet_address) {
        return (
            StatusCode::BAD_REQUEST,
            "Invalid wallet address".to_string(),
        )
            .into_response();
    }

    let pending = state.store().create(wallet_address).await;
    debug!(
        session_id = %pending.session_id,
        expected_lamports = pending.expected_lamports,
        "auth request created"
    );

    (StatusCode::OK, Json(InitiateResponse::from(&pending))).into_response()
}
