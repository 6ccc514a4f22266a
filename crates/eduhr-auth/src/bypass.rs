//! Secret-gated fallback to local credential login.
//!
//! A site maintainer without a federated identity opens
//! `/login?aabs=<secret>`. When the parameter equals the configured secret the
//! federated flow is skipped and a marker cookie keeps it skipped for an hour,
//! until the maintainer holds a local session.

use std::time::Duration;

use axum_extra::extract::CookieJar;
use cookie::{Cookie, SameSite};

/// Query parameter carrying the bypass secret.
pub const BYPASS_PARAM: &str = "aabs";

/// Marker cookie set once the bypass was requested.
pub const BYPASS_COOKIE: &str = "eduhr-auth-aabs";

/// Lifetime of the marker cookie.
pub const BYPASS_TTL: Duration = Duration::from_secs(60 * 60);

/// Returns `true` when `param` matches the configured secret.
///
/// Both values must be present and non-empty; comparison is exact.
#[must_use]
pub fn is_bypass_requested(param: Option<&str>, secret: Option<&str>) -> bool {
    match (param, secret) {
        (Some(param), Some(secret)) => !param.is_empty() && !secret.is_empty() && param == secret,
        _ => false,
    }
}

/// Returns `true` if the browser carries the marker cookie.
#[must_use]
pub fn has_marker(jar: &CookieJar) -> bool {
    jar.get(BYPASS_COOKIE).is_some()
}

/// Builds the marker cookie.
#[must_use]
pub fn marker_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((BYPASS_COOKIE, "1"))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(cookie_max_age(BYPASS_TTL))
        .build()
}

/// Converts a lifetime to a cookie `Max-Age`, saturating at `i64::MAX`
/// seconds.
#[must_use]
pub fn cookie_max_age(ttl: Duration) -> time::Duration {
    time::Duration::seconds(i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX))
}

/// Removes the marker cookie from the jar.
#[must_use]
pub fn clear_marker(jar: CookieJar) -> CookieJar {
    if has_marker(&jar) {
        jar.remove(Cookie::build(BYPASS_COOKIE).path("/"))
    } else {
        jar
    }
}
