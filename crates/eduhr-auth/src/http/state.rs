//! Shared state for the HTTP handlers.

use std::sync::Arc;
use std::time::Duration;

use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::CookieJar;
use cookie::{Cookie, SameSite};
use tracing::{error, warn};
use url::Url;

use crate::activation::Activation;
use crate::bypass;
use crate::federation::{IdentityProviderClient, Reconciler};
use crate::routing::SiteUrls;
use crate::settings::{FileProbe, LibraryProbe};
use crate::storage::{Account, AccountStore, Session, SessionStore, SettingsStore, StoreResult};

/// Default session cookie name.
pub const DEFAULT_SESSION_COOKIE: &str = "eduhr_session";

/// Session cookie configuration.
#[derive(Debug, Clone)]
pub struct CookieSettings {
    /// Name of the session cookie.
    pub session_cookie: String,
    /// Whether cookies carry the `Secure` attribute.
    pub secure: bool,
    /// Session cookie lifetime.
    pub session_ttl: Duration,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            session_cookie: DEFAULT_SESSION_COOKIE.to_string(),
            secure: false,
            session_ttl: Duration::from_secs(8 * 60 * 60),
        }
    }
}

/// State for the federated login handlers.
#[derive(Clone)]
pub struct AuthState {
    /// Local accounts.
    pub accounts: Arc<dyn AccountStore>,
    /// Login sessions.
    pub sessions: Arc<dyn SessionStore>,
    /// The persisted settings record.
    pub settings: Arc<dyn SettingsStore>,
    /// The external SAML SP client.
    pub idp: Arc<dyn IdentityProviderClient>,
    /// Probe for the SP client library.
    pub probe: Arc<dyn LibraryProbe>,
    /// Site, admin and landing URLs.
    pub urls: SiteUrls,
    /// Session cookie configuration.
    pub cookies: CookieSettings,
}

impl AuthState {
    /// Creates a new state with the file probe and default cookie settings.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        sessions: Arc<dyn SessionStore>,
        settings: Arc<dyn SettingsStore>,
        idp: Arc<dyn IdentityProviderClient>,
        urls: SiteUrls,
    ) -> Self {
        Self {
            accounts,
            sessions,
            settings,
            idp,
            probe: Arc::new(FileProbe),
            urls,
            cookies: CookieSettings::default(),
        }
    }

    /// Replaces the library probe.
    pub fn with_probe(mut self, probe: Arc<dyn LibraryProbe>) -> Self {
        self.probe = probe;
        self
    }

    /// Replaces the cookie settings.
    pub fn with_cookies(mut self, cookies: CookieSettings) -> Self {
        self.cookies = cookies;
        self
    }

    /// The reconciler over this state's stores.
    #[must_use]
    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(self.accounts.clone(), self.sessions.clone())
    }

    /// Loads and validates the settings record and resolves the activation
    /// for this request.
    pub async fn activation(
        &self,
        bypass_param: Option<&str>,
        jar: &CookieJar,
    ) -> StoreResult<Activation> {
        let record = self.settings.load().await?;
        let activation = Activation::resolve(
            record.validate(self.probe.as_ref()),
            bypass_param,
            bypass::has_marker(jar),
        );

        if let Activation::Disabled(err) = &activation {
            warn!(problems = %err, "Federated login is not applied");
        }
        Ok(activation)
    }

    /// The session and account behind the session cookie, if any.
    pub async fn current_account(&self, jar: &CookieJar) -> StoreResult<Option<(Session, Account)>> {
        let Some(token) = jar.get(&self.cookies.session_cookie) else {
            return Ok(None);
        };

        let Some(session) = self.sessions.find(token.value()).await? else {
            return Ok(None);
        };

        match self.accounts.find_by_id(&session.account_id).await? {
            Some(account) => Ok(Some((session, account))),
            None => Ok(None),
        }
    }

    /// Builds the session cookie.
    #[must_use]
    pub fn session_cookie(&self, session: &Session) -> Cookie<'static> {
        Cookie::build((self.cookies.session_cookie.clone(), session.token.clone()))
            .http_only(true)
            .secure(self.cookies.secure)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(bypass::cookie_max_age(self.cookies.session_ttl))
            .build()
    }

    /// Removes the session cookie from the jar.
    #[must_use]
    pub fn clear_session_cookie(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(self.cookies.session_cookie.clone()).path("/"))
    }

    /// Logs an infrastructure failure and redirects to the generic error
    /// landing page.
    pub(crate) fn failure_redirect(&self, context: &str, err: &dyn std::fmt::Display) -> Response {
        error!(error = %err, "{}", context);
        redirect(self.urls.failure())
    }
}

/// Redirects the browser to `url`.
pub(crate) fn redirect(url: Url) -> Response {
    Redirect::to(url.as_str()).into_response()
}
