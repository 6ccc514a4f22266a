//! Login session storage trait.
//!
//! A session binds a browser (via an opaque cookie token) to the account
//! that is the active session identity.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, PrimitiveDateTime};

use super::StoreResult;

/// An established login session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque token carried in the session cookie.
    pub token: String,

    /// ID of the account this session authenticates.
    pub account_id: String,

    /// When the session was established.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the session stops being valid.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl Session {
    /// Creates a session for `account_id` valid for `ttl`, with a fresh
    /// random token.
    #[must_use]
    pub fn new(account_id: impl Into<String>, ttl: std::time::Duration) -> Self {
        let now = OffsetDateTime::now_utc();
        let expires_at = time::Duration::try_from(ttl)
            .ok()
            .and_then(|ttl| now.checked_add(ttl))
            .unwrap_or(PrimitiveDateTime::MAX.assume_utc());
        Self {
            token: uuid::Uuid::new_v4().to_string(),
            account_id: account_id.into(),
            created_at: now,
            expires_at,
        }
    }

    /// Returns `true` if the session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() >= self.expires_at
    }
}

/// Storage operations for login sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Establish a session making `account_id` the active session identity.
    async fn establish(&self, account_id: &str) -> StoreResult<Session>;

    /// Find a live session by token. Expired sessions are not returned.
    async fn find(&self, token: &str) -> StoreResult<Option<Session>>;

    /// Revoke a session. Revoking an unknown token is not an error.
    async fn revoke(&self, token: &str) -> StoreResult<()>;

    /// Delete every expired session. Returns the number removed.
    async fn cleanup_expired(&self) -> StoreResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_session_is_live() {
        let session = Session::new("42", Duration::from_secs(60));
        assert_eq!(session.account_id, "42");
        assert!(!session.is_expired());
        assert!(session.expires_at > session.created_at);
    }

    #[test]
    fn test_zero_ttl_session_is_expired() {
        let session = Session::new("42", Duration::ZERO);
        assert!(session.is_expired());
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let session = Session::new("42", Duration::MAX);
        assert!(!session.is_expired());
        assert_eq!(session.expires_at, PrimitiveDateTime::MAX.assume_utc());
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = Session::new("1", Duration::from_secs(60));
        let b = Session::new("1", Duration::from_secs(60));
        assert_ne!(a.token, b.token);
    }
}
