//! Logout endpoint handler.
//!
//! Ends the local session and, when the federated flow applies and the
//! browser still holds an SP session, sends it through the SP's logout
//! before landing on `?code=logout`.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use tracing::{error, info, warn};

use super::state::{AuthState, redirect};
use crate::activation::Activation;
use crate::federation::IdpRequest;

/// GET /logout handler.
pub async fn logout(State(state): State<AuthState>, headers: HeaderMap, jar: CookieJar) -> Response {
    match state.current_account(&jar).await {
        Ok(Some((session, account))) => {
            if let Err(e) = state.sessions.revoke(&session.token).await {
                return state.failure_redirect("Failed to revoke session", &e);
            }
            info!(login = %account.login, "User logged out");
        }
        Ok(None) => {}
        Err(e) => return state.failure_redirect("Failed to look up session", &e),
    }

    let jar = state.clear_session_cookie(jar);
    let landing = state.urls.after_logout();

    let activation = match state.activation(None, &jar).await {
        Ok(activation) => activation,
        Err(e) => {
            error!(error = %e, "Failed to load settings during logout");
            return (jar, redirect(landing)).into_response();
        }
    };

    if let Activation::Applied(settings) = activation {
        let request = IdpRequest::new(settings.service, &headers);
        match state.idp.is_authenticated(request).await {
            Ok(true) => match state.idp.logout(request, &landing).await {
                Ok(url) => return (jar, redirect(url)).into_response(),
                Err(e) => error!(error = %e, "Identity provider logout failed"),
            },
            Ok(false) => {}
            Err(e) => warn!(error = %e, "Could not check identity provider session"),
        }
    }

    (jar, redirect(landing)).into_response()
}
