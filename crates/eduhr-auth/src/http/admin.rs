//! Administrator extractor for the settings pages.
//!
//! # Example
//!
//! ```ignore
//! async fn settings_handler(admin: SettingsAdmin) -> String {
//!     format!("Hello {}", admin.account.login)
//! }
//! ```

use axum::extract::{FromRef, FromRequestParts};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::CookieJar;
use tracing::{debug, warn};

use super::state::{AuthState, redirect};
use super::templates::render_error_page;
use crate::storage::Account;

/// A logged-in account allowed to manage settings.
#[derive(Debug, Clone)]
pub struct SettingsAdmin {
    pub account: Account,
}

impl<S> FromRequestParts<S> for SettingsAdmin
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AuthState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);

        let account = match state.current_account(&jar).await {
            Ok(Some((_, account))) => account,
            Ok(None) => {
                debug!(path = %parts.uri.path(), "Settings require login");
                return Err(login_redirect(&state, parts.uri.path()));
            }
            Err(e) => return Err(state.failure_redirect("Failed to look up session", &e)),
        };

        if !account.can_manage_settings() {
            warn!(login = %account.login, "Settings access denied");
            return Err((
                StatusCode::FORBIDDEN,
                Html(render_error_page(
                    "Access denied",
                    "You are not allowed to manage these settings.",
                )),
            )
                .into_response());
        }

        Ok(Self { account })
    }
}

fn login_redirect(state: &AuthState, path: &str) -> Response {
    match state.urls.resolve("login") {
        Ok(mut url) => {
            url.query_pairs_mut().append_pair("redirect_to", path);
            redirect(url)
        }
        Err(e) => state.failure_redirect("Failed to build login URL", &e),
    }
}
