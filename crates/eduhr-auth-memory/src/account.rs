//! In-memory account store.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use eduhr_auth::storage::{Account, AccountStore, NewAccount, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Inner {
    accounts: HashMap<String, Account>,
    by_login: HashMap<String, String>,
    by_email: HashMap<String, String>,
}

/// Account store backed by hash maps.
///
/// One write lock covers the account table and both unique indexes, so the
/// uniqueness check and the insert in [`AccountStore::create`] are atomic.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    inner: RwLock<Inner>,
}

impl MemoryAccountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.inner.read().await.accounts.len()
    }

    /// Returns `true` if no accounts are stored.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.accounts.is_empty()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Account>> {
        Ok(self.inner.read().await.accounts.get(id).cloned())
    }

    async fn find_by_login(&self, login: &str) -> StoreResult<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_login
            .get(login)
            .and_then(|id| inner.accounts.get(id))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_email
            .get(&email.to_lowercase())
            .and_then(|id| inner.accounts.get(id))
            .cloned())
    }

    async fn create(&self, account: NewAccount) -> StoreResult<Account> {
        let mut inner = self.inner.write().await;

        if inner.by_login.contains_key(&account.login) {
            return Err(StoreError::LoginExists(account.login));
        }
        let email_key = account.email.to_lowercase();
        if inner.by_email.contains_key(&email_key) {
            return Err(StoreError::EmailExists(account.email));
        }

        let account = Account {
            id: Uuid::new_v4().to_string(),
            login: account.login,
            email: account.email,
            first_name: account.first_name,
            last_name: account.last_name,
            nickname: account.nickname,
            roles: account.roles,
            password_hash: account.password_hash,
            metadata: account.metadata,
            created_at: OffsetDateTime::now_utc(),
        };

        inner.by_login.insert(account.login.clone(), account.id.clone());
        inner.by_email.insert(email_key, account.id.clone());
        inner.accounts.insert(account.id.clone(), account.clone());

        tracing::debug!(id = %account.id, login = %account.login, "Account created");
        Ok(account)
    }

    async fn set_metadata(&self, id: &str, entries: &BTreeMap<String, String>) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let account = inner
            .accounts
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("Account/{id}")))?;
        account
            .metadata
            .extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
        Ok(())
    }

    async fn set_password_hash(&self, id: &str, hash: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let account = inner
            .accounts
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("Account/{id}")))?;
        account.password_hash = Some(hash.to_string());
        Ok(())
    }
}
