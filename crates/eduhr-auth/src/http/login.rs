//! Login endpoint handlers.
//!
//! `GET /login` runs the federated flow when it applies:
//!
//! ```text
//! GET /login?redirect_to=...
//!   ├─► already logged in → post-login redirect
//!   ├─► not applied (settings invalid / bypassed) → local login form
//!   └─► applied
//!       ├─► no SP session → redirect to the identity provider
//!       └─► SP session → reconcile
//!           ├─► ok → session cookie, post-login redirect
//!           └─► rejected → landing with ?code=error&errors=<code>
//! ```
//!
//! `POST /login` verifies local credentials, but only while the federated
//! flow does not apply.

use axum::Form;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::state::{AuthState, redirect};
use super::templates::{render_error_page, render_login_form};
use crate::activation::Activation;
use crate::bypass;
use crate::error::{ErrorCode, ReconcileError};
use crate::federation::{AuthRequirement, IdpError, IdpRequest};
use crate::password::verify_password;
use crate::settings::Settings;
use crate::storage::Account;

/// Query parameters for `GET /login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    /// Bypass secret.
    #[serde(default, rename = "aabs")]
    pub bypass: Option<String>,
    /// Where administrators go after login.
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// Form data for `POST /login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Login or email.
    pub log: String,
    /// Password.
    pub pwd: String,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// GET /login handler.
pub async fn login_get(
    State(state): State<AuthState>,
    Query(params): Query<LoginQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response {
    let activation = match state.activation(params.bypass.as_deref(), &jar).await {
        Ok(activation) => activation,
        Err(e) => return state.failure_redirect("Failed to load settings", &e),
    };

    match state.current_account(&jar).await {
        Ok(Some((_, account))) => {
            debug!(login = %account.login, "Visitor already logged in");
            let target = state.urls.after_login(&account, params.redirect_to.as_deref());
            return (bypass::clear_marker(jar), redirect(target)).into_response();
        }
        Ok(None) => {}
        Err(e) => return state.failure_redirect("Failed to look up session", &e),
    }

    match activation {
        Activation::Applied(settings) => {
            federated_login(&state, &settings, &headers, params.redirect_to.as_deref(), jar).await
        }
        Activation::BypassRequested => {
            let jar = jar.add(bypass::marker_cookie(state.cookies.secure));
            (jar, Html(render_login_form(params.redirect_to.as_deref(), None))).into_response()
        }
        Activation::Bypassed | Activation::Disabled(_) => {
            Html(render_login_form(params.redirect_to.as_deref(), None)).into_response()
        }
    }
}

async fn federated_login(
    state: &AuthState,
    settings: &Settings,
    headers: &HeaderMap,
    redirect_to: Option<&str>,
    jar: CookieJar,
) -> Response {
    let request = IdpRequest::new(settings.service, headers);

    let return_to = match login_return_url(state, redirect_to) {
        Ok(url) => url,
        Err(e) => return state.failure_redirect("Failed to build return URL", &e),
    };

    match state.idp.require_auth(request, &return_to).await {
        Ok(AuthRequirement::Authenticated) => {}
        Ok(AuthRequirement::Redirect(url)) => {
            debug!(redirect = %url, "Sending browser to the identity provider");
            return redirect(url);
        }
        Err(e) => return idp_failure(state, e),
    }

    let attributes = match state.idp.attributes(request).await {
        Ok(attributes) => attributes,
        Err(e) => return idp_failure(state, e),
    };

    match state.reconciler().reconcile(&attributes, settings).await {
        Ok(outcome) => {
            info!(
                login = %outcome.account.login,
                action = %outcome.action,
                backfilled = outcome.backfilled,
                "Federated login succeeded"
            );
            let jar = bypass::clear_marker(jar).add(state.session_cookie(&outcome.session));
            let target = state.urls.after_login(&outcome.account, redirect_to);
            (jar, redirect(target)).into_response()
        }
        Err(ReconcileError::Rejected(code)) => redirect(state.urls.rejection(code)),
        Err(e) => state.failure_redirect("Federated login failed", &e),
    }
}

/// `/login` on this site, carrying `redirect_to` through the SP round trip.
fn login_return_url(
    state: &AuthState,
    redirect_to: Option<&str>,
) -> Result<url::Url, url::ParseError> {
    let mut url = state.urls.resolve("login")?;
    if let Some(target) = redirect_to.filter(|t| !t.is_empty()) {
        url.query_pairs_mut().append_pair("redirect_to", target);
    }
    Ok(url)
}

fn idp_failure(state: &AuthState, err: IdpError) -> Response {
    match err {
        IdpError::Unavailable(reason) => {
            warn!(reason = %reason, "Identity provider client is not available");
            redirect(state.urls.rejection(ErrorCode::SimpleSamlphpNotLoaded))
        }
        other => state.failure_redirect("Identity provider request failed", &other),
    }
}

/// POST /login handler.
///
/// Local credentials are only accepted while the federated flow does not
/// apply.
pub async fn login_post(
    State(state): State<AuthState>,
    Query(params): Query<LoginQuery>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let activation = match state.activation(params.bypass.as_deref(), &jar).await {
        Ok(activation) => activation,
        Err(e) => return state.failure_redirect("Failed to load settings", &e),
    };

    if activation.is_applied() {
        warn!(login = %form.log, "Local login attempted while federated login is applied");
        return (
            StatusCode::FORBIDDEN,
            Html(render_error_page(
                "Local login disabled",
                "Users need to use AAI@EduHr identities to log in.",
            )),
        )
            .into_response();
    }

    let account = match find_local_account(&state, form.log.trim()).await {
        Ok(account) => account,
        Err(e) => return state.failure_redirect("Failed to look up account", &e),
    };

    let verified = account
        .as_ref()
        .is_some_and(|account| password_matches(account, &form.pwd));

    let Some(account) = account.filter(|_| verified) else {
        warn!(login = %form.log, "Local login failed");
        return (
            StatusCode::UNAUTHORIZED,
            Html(render_login_form(
                form.redirect_to.as_deref(),
                Some("Invalid username or password."),
            )),
        )
            .into_response();
    };

    let session = match state.sessions.establish(&account.id).await {
        Ok(session) => session,
        Err(e) => return state.failure_redirect("Failed to establish session", &e),
    };
    info!(login = %account.login, "Local login succeeded");

    let jar = bypass::clear_marker(jar).add(state.session_cookie(&session));
    let target = state.urls.after_login(&account, form.redirect_to.as_deref());
    (jar, redirect(target)).into_response()
}

/// Checks `password` against the account's stored hash. A malformed hash
/// is logged and counts as a mismatch.
fn password_matches(account: &Account, password: &str) -> bool {
    let Some(hash) = account.password_hash.as_deref() else {
        return false;
    };
    match verify_password(password, hash) {
        Ok(matches) => matches,
        Err(e) => {
            error!(login = %account.login, error = %e, "Stored password hash is unusable");
            false
        }
    }
}

async fn find_local_account(
    state: &AuthState,
    login_or_email: &str,
) -> crate::storage::StoreResult<Option<Account>> {
    if let Some(account) = state.accounts.find_by_login(login_or_email).await? {
        return Ok(Some(account));
    }
    state.accounts.find_by_email(login_or_email).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::password::hash_password;
    use std::collections::BTreeMap;
    use time::OffsetDateTime;

    fn account(password_hash: Option<String>) -> Account {
        Account {
            id: "1".to_string(),
            login: "editor".to_string(),
            email: "editor@site.hr".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            nickname: String::new(),
            roles: Vec::new(),
            password_hash,
            metadata: BTreeMap::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn test_password_matches() {
        let account = account(Some(hash_password("pw!").unwrap()));
        assert!(password_matches(&account, "pw!"));
        assert!(!password_matches(&account, "nope"));
    }

    #[test]
    fn test_malformed_or_missing_hash_never_matches() {
        assert!(!password_matches(&account(Some("not-a-phc-string".to_string())), "pw!"));
        assert!(!password_matches(&account(None), "pw!"));
    }
}
