//! Redirect targets after login, logout and rejection.
//!
//! Every outcome of the federated flow ends in a browser redirect:
//!
//! - administrators go to the requested page (when it is on this site) or the
//!   admin dashboard
//! - everybody else lands on the site URL with `?code=login`
//! - logout lands on `?code=logout`
//! - rejections land on `?code=error&errors=<codes>`

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::ErrorCode;
use crate::storage::Account;

/// Status carried in the landing URL's `code` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthStatus {
    Login,
    Logout,
    Error,
}

impl AuthStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Logout => "logout",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(Self::Login),
            "logout" => Ok(Self::Logout),
            "error" => Ok(Self::Error),
            other => Err(format!("Unknown status: {other}")),
        }
    }
}

/// Well-known URLs of the host site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteUrls {
    site: Url,
    admin: Url,
}

impl SiteUrls {
    /// Creates the URL set. A site URL without a trailing slash gets one so
    /// relative paths resolve under it.
    #[must_use]
    pub fn new(mut site: Url, admin: Url) -> Self {
        if !site.path().ends_with('/') {
            let path = format!("{}/", site.path());
            site.set_path(&path);
        }
        Self { site, admin }
    }

    /// The site's landing URL.
    #[must_use]
    pub fn site(&self) -> &Url {
        &self.site
    }

    /// The admin dashboard URL.
    #[must_use]
    pub fn admin(&self) -> &Url {
        &self.admin
    }

    /// Resolves a path relative to the site URL.
    ///
    /// # Errors
    ///
    /// Returns the parse error when `path` cannot be joined.
    pub fn resolve(&self, path: &str) -> Result<Url, url::ParseError> {
        self.site.join(path.trim_start_matches('/'))
    }

    /// Landing URL with the status and, when present, the error codes.
    #[must_use]
    pub fn landing(&self, status: AuthStatus, errors: &[ErrorCode]) -> Url {
        let mut url = self.site.clone();
        let mut query = format!("code={status}");
        if !errors.is_empty() {
            let codes: Vec<&str> = errors.iter().map(ErrorCode::as_str).collect();
            query.push_str("&errors=");
            query.push_str(&codes.join(","));
        }
        url.set_query(Some(&query));
        url
    }

    /// Landing URL after a rejection.
    #[must_use]
    pub fn rejection(&self, code: ErrorCode) -> Url {
        self.landing(AuthStatus::Error, &[code])
    }

    /// Landing URL after an infrastructure failure. No codes are exposed.
    #[must_use]
    pub fn failure(&self) -> Url {
        self.landing(AuthStatus::Error, &[])
    }

    /// Landing URL after logout.
    #[must_use]
    pub fn after_logout(&self) -> Url {
        self.landing(AuthStatus::Logout, &[])
    }

    /// Where to send `account` after a successful login.
    ///
    /// Only administrators honor `redirect_to`; unsafe targets fall back to
    /// the admin dashboard.
    #[must_use]
    pub fn after_login(&self, account: &Account, redirect_to: Option<&str>) -> Url {
        if account.can_manage_settings() {
            redirect_to
                .and_then(|target| self.safe_redirect(target))
                .unwrap_or_else(|| self.admin.clone())
        } else {
            self.landing(AuthStatus::Login, &[])
        }
    }

    /// Accepts a redirect target only when it stays on this site.
    ///
    /// Allowed are relative paths with a single leading `/` and absolute
    /// `http(s)` URLs whose host and port match the site's.
    #[must_use]
    pub fn safe_redirect(&self, candidate: &str) -> Option<Url> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return None;
        }

        if candidate.starts_with('/') {
            if candidate.starts_with("//") || candidate.starts_with("/\\") {
                return None;
            }
            return self.site.join(candidate).ok();
        }

        let url = Url::parse(candidate).ok()?;
        let same_origin = matches!(url.scheme(), "http" | "https")
            && url.host_str() == self.site.host_str()
            && url.port_or_known_default() == self.site.port_or_known_default();
        same_origin.then_some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::account::ADMIN_ROLE;
    use time::OffsetDateTime;

    fn urls() -> SiteUrls {
        SiteUrls::new(
            Url::parse("https://site.hr/blog").unwrap(),
            Url::parse("https://site.hr/blog/settings").unwrap(),
        )
    }

    fn account(roles: &[&str]) -> Account {
        Account {
            id: "1".to_string(),
            login: "ivo@srce.hr".to_string(),
            email: "ivo@srce.hr".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            nickname: String::new(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            password_hash: None,
            metadata: Default::default(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn test_site_gets_trailing_slash() {
        assert_eq!(urls().site().as_str(), "https://site.hr/blog/");
        assert_eq!(
            urls().resolve("/login").unwrap().as_str(),
            "https://site.hr/blog/login"
        );
    }

    #[test]
    fn test_landing_urls() {
        let urls = urls();
        assert_eq!(
            urls.after_logout().as_str(),
            "https://site.hr/blog/?code=logout"
        );
        assert_eq!(
            urls.rejection(ErrorCode::RealmNotAllowed).as_str(),
            "https://site.hr/blog/?code=error&errors=realm_not_allowed"
        );
        assert_eq!(
            urls.landing(
                AuthStatus::Error,
                &[ErrorCode::UsernameExists, ErrorCode::EmailInvalid]
            )
            .as_str(),
            "https://site.hr/blog/?code=error&errors=username_exists,email_invalid"
        );
        assert_eq!(urls.failure().as_str(), "https://site.hr/blog/?code=error");
    }

    #[test]
    fn test_after_login_regular_user() {
        let target = urls().after_login(&account(&[]), Some("/blog/private"));
        assert_eq!(target.as_str(), "https://site.hr/blog/?code=login");
    }

    #[test]
    fn test_after_login_administrator() {
        let urls = urls();
        let admin = account(&[ADMIN_ROLE]);

        assert_eq!(
            urls.after_login(&admin, None).as_str(),
            "https://site.hr/blog/settings"
        );
        assert_eq!(
            urls.after_login(&admin, Some("/blog/post/1")).as_str(),
            "https://site.hr/blog/post/1"
        );
        assert_eq!(
            urls.after_login(&admin, Some("https://evil.example/")).as_str(),
            "https://site.hr/blog/settings"
        );
    }

    #[test]
    fn test_safe_redirect() {
        let urls = urls();
        assert!(urls.safe_redirect("/wp-admin").is_some());
        assert!(urls.safe_redirect("https://site.hr/other").is_some());
        assert!(urls.safe_redirect("//evil.example/x").is_none());
        assert!(urls.safe_redirect("/\\evil.example").is_none());
        assert!(urls.safe_redirect("https://site.hr:8443/").is_none());
        assert!(urls.safe_redirect("javascript:alert(1)").is_none());
        assert!(urls.safe_redirect("relative/path").is_none());
        assert!(urls.safe_redirect("  ").is_none());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("login".parse::<AuthStatus>(), Ok(AuthStatus::Login));
        assert!("other".parse::<AuthStatus>().is_err());
    }
}
