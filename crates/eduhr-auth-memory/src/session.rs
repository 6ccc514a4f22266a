//! In-memory session store.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use eduhr_auth::storage::{Session, SessionStore, StoreResult};

/// Default session lifetime.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(8 * 60 * 60);

/// Session store backed by a concurrent map keyed by token.
///
/// Expired sessions are dropped when looked up and swept on every
/// [`SessionStore::establish`], so abandoned tokens do not accumulate.
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: DashMap<String, Session>,
    ttl: Duration,
}

impl MemorySessionStore {
    /// Creates a store whose sessions live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored sessions, expired ones included.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no sessions are stored.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Sessions belonging to `account_id`.
    pub fn sessions_for(&self, account_id: &str) -> Vec<Session> {
        self.sessions
            .iter()
            .filter(|entry| entry.account_id == account_id)
            .map(|entry| entry.value().clone())
            .collect()
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TTL)
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn establish(&self, account_id: &str) -> StoreResult<Session> {
        self.cleanup_expired().await?;
        let session = Session::new(account_id, self.ttl);
        self.sessions.insert(session.token.clone(), session.clone());
        Ok(session)
    }

    async fn find(&self, token: &str) -> StoreResult<Option<Session>> {
        let session = self.sessions.get(token).map(|entry| entry.value().clone());
        match session {
            Some(session) if session.is_expired() => {
                self.sessions.remove(token);
                Ok(None)
            }
            other => Ok(other),
        }
    }

    async fn revoke(&self, token: &str) -> StoreResult<()> {
        self.sessions.remove(token);
        Ok(())
    }

    async fn cleanup_expired(&self) -> StoreResult<u64> {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired());
        let removed = before.saturating_sub(self.sessions.len()) as u64;
        if removed > 0 {
            tracing::debug!(removed, "Expired sessions removed");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_establish_find_revoke() {
        let store = MemorySessionStore::default();
        let session = store.establish("account-1").await.unwrap();

        assert_eq!(store.find(&session.token).await.unwrap(), Some(session.clone()));
        assert_eq!(store.sessions_for("account-1").len(), 1);

        store.revoke(&session.token).await.unwrap();
        assert_eq!(store.find(&session.token).await.unwrap(), None);
        store.revoke("unknown").await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped() {
        let store = MemorySessionStore::new(Duration::ZERO);
        let session = store.establish("account-1").await.unwrap();

        assert_eq!(store.find(&session.token).await.unwrap(), None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_abandoned_sessions_are_swept() {
        let store = MemorySessionStore::new(Duration::from_millis(1));
        for i in 0..100 {
            store.establish(&format!("account-{i}")).await.unwrap();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;

        let live = store.establish("account-live").await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.sessions_for("account-live"), vec![live]);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_live_sessions() {
        let store = MemorySessionStore::default();
        store.establish("account-1").await.unwrap();

        assert_eq!(store.cleanup_expired().await.unwrap(), 0);
        assert_eq!(store.len(), 1);
    }
}
