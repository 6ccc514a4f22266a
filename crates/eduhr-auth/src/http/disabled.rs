//! Local account flows that are switched off while federated login applies.
//!
//! Password reset and registration make no sense for accounts whose
//! credentials live at the identity provider. Without the federated flow
//! this workspace provides no such flows either, so they answer 404.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use tracing::debug;

use super::state::{AuthState, redirect};
use crate::error::ErrorCode;

/// GET /lost-password and GET /reset-password handler.
pub async fn password_reset(State(state): State<AuthState>, jar: CookieJar) -> Response {
    reject_when_applied(&state, &jar, ErrorCode::DisabledPasswordManipulation).await
}

/// GET /register handler.
pub async fn register(State(state): State<AuthState>, jar: CookieJar) -> Response {
    reject_when_applied(&state, &jar, ErrorCode::RegistrationDisabled).await
}

async fn reject_when_applied(state: &AuthState, jar: &CookieJar, code: ErrorCode) -> Response {
    match state.activation(None, jar).await {
        Ok(activation) if activation.is_applied() => {
            debug!(code = %code, "Local account flow disabled");
            redirect(state.urls.rejection(code))
        }
        Ok(_) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => state.failure_redirect("Failed to load settings", &e),
    }
}
