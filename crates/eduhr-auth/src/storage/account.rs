//! Account storage trait.
//!
//! Defines the interface for local account persistence operations.
//! Implementations are provided by storage backends.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::StoreResult;

/// Role granting the "manage settings" capability.
pub const ADMIN_ROLE: &str = "administrator";

/// Metadata key marking an account as federated.
pub const META_ACCOUNT: &str = "eduhr_account";

/// Value of [`META_ACCOUNT`] for federated accounts.
pub const FEDERATED: &str = "federated";

/// Metadata key holding the originally asserted email.
pub const META_ORIGINAL_MAIL: &str = "eduhr_original_mail";

/// Metadata key holding the national identification code.
pub const META_NATIONAL_ID: &str = "eduhr_national_id";

/// Metadata key holding the persistent identifier.
pub const META_PERSISTENT_ID: &str = "eduhr_persistent_id";

// =============================================================================
// Account Type
// =============================================================================

/// A local account.
///
/// Accounts are owned by the account store; the federated login flow only
/// creates them and adds metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier assigned by the store.
    pub id: String,

    /// Unique login name. For federated accounts this is the federation
    /// unique identifier.
    pub login: String,

    /// Unique email address.
    pub email: String,

    /// Given name.
    #[serde(default)]
    pub first_name: String,

    /// Family name.
    #[serde(default)]
    pub last_name: String,

    /// Nickname, the given name on creation.
    #[serde(default)]
    pub nickname: String,

    /// Roles for capability checks.
    #[serde(default)]
    pub roles: Vec<String>,

    /// Argon2 PHC hash of the local password.
    #[serde(default, skip_serializing)]
    pub password_hash: Option<String>,

    /// Opaque metadata bag.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,

    /// When the account was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Account {
    /// Creates a new account builder.
    #[must_use]
    pub fn builder(login: impl Into<String>, email: impl Into<String>) -> AccountBuilder {
        AccountBuilder::new(login, email)
    }

    /// Returns `true` if the account has a specific role.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Returns `true` if the account may manage settings and reach the
    /// administrative dashboard.
    #[must_use]
    pub fn can_manage_settings(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    /// Returns `true` if the account was created by or has logged in through
    /// the federation at least once.
    #[must_use]
    pub fn is_federated(&self) -> bool {
        self.metadata.get(META_ACCOUNT).map(String::as_str) == Some(FEDERATED)
    }

    /// Display name built from first and last name, falling back to login.
    #[must_use]
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.login.clone()
        } else {
            full.to_string()
        }
    }
}

// =============================================================================
// New Account
// =============================================================================

/// Data for creating an account. The store assigns the ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub login: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub nickname: String,
    pub roles: Vec<String>,
    pub password_hash: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

/// Builder for [`NewAccount`].
pub struct AccountBuilder {
    account: NewAccount,
}

impl AccountBuilder {
    fn new(login: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            account: NewAccount {
                login: login.into(),
                email: email.into(),
                first_name: String::new(),
                last_name: String::new(),
                nickname: String::new(),
                roles: Vec::new(),
                password_hash: None,
                metadata: BTreeMap::new(),
            },
        }
    }

    /// Sets first name and nickname.
    #[must_use]
    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        let first_name = first_name.into();
        self.account.nickname = first_name.clone();
        self.account.first_name = first_name;
        self
    }

    /// Sets the last name.
    #[must_use]
    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.account.last_name = last_name.into();
        self
    }

    /// Adds a role.
    #[must_use]
    pub fn add_role(mut self, role: impl Into<String>) -> Self {
        self.account.roles.push(role.into());
        self
    }

    /// Sets the password hash.
    #[must_use]
    pub fn password_hash(mut self, hash: impl Into<String>) -> Self {
        self.account.password_hash = Some(hash.into());
        self
    }

    /// Sets the metadata bag.
    #[must_use]
    pub fn metadata(mut self, metadata: BTreeMap<String, String>) -> Self {
        self.account.metadata = metadata;
        self
    }

    /// Builds the account data.
    #[must_use]
    pub fn build(self) -> NewAccount {
        self.account
    }
}

// =============================================================================
// Account Storage Trait
// =============================================================================

/// Storage operations for local accounts.
///
/// Login and email uniqueness must be enforced by the store itself at
/// creation time; callers do not lock.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find an account by its store-assigned ID.
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Account>>;

    /// Find an account by login.
    async fn find_by_login(&self, login: &str) -> StoreResult<Option<Account>>;

    /// Find an account by email.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>>;

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::LoginExists`](super::StoreError::LoginExists) or
    /// [`StoreError::EmailExists`](super::StoreError::EmailExists) when a
    /// uniqueness constraint is violated.
    async fn create(&self, account: NewAccount) -> StoreResult<Account>;

    /// Insert or overwrite metadata entries. Existing keys not in `entries`
    /// are kept.
    async fn set_metadata(&self, id: &str, entries: &BTreeMap<String, String>) -> StoreResult<()>;

    /// Replace the stored password hash.
    async fn set_password_hash(&self, id: &str, hash: &str) -> StoreResult<()>;
}
