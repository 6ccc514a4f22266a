//! Bootstrap of the initial administrator.
//!
//! Local credential login stays available through the bypass for sites where
//! the federation is misconfigured, so the site needs at least one account
//! that can log in with a password and manage the settings.

use eduhr_auth::password::hash_password;
use eduhr_auth::storage::account::ADMIN_ROLE;
use eduhr_auth::storage::{Account, AccountStore, StoreError};
use tracing::info;

use crate::config::AdminUserConfig;

/// Errors while bootstrapping the administrator.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    #[error("Failed to hash administrator password: {0}")]
    Password(#[from] eduhr_auth::password::PasswordError),

    #[error("Failed to store administrator: {0}")]
    Store(#[from] StoreError),
}

/// Creates the configured administrator unless an account with that login
/// already exists.
///
/// Returns `true` if the account was created.
pub async fn bootstrap_admin(
    accounts: &dyn AccountStore,
    admin: &AdminUserConfig,
) -> Result<bool, BootstrapError> {
    if accounts.find_by_login(&admin.username).await?.is_some() {
        info!(username = %admin.username, "Administrator already exists, skipping");
        return Ok(false);
    }

    let email = admin
        .email
        .clone()
        .unwrap_or_else(|| format!("{}@localhost", admin.username));
    let account = Account::builder(admin.username.clone(), email)
        .first_name(admin.username.clone())
        .add_role(ADMIN_ROLE)
        .password_hash(hash_password(&admin.password)?)
        .build();

    let created = accounts.create(account).await?;
    info!(id = %created.id, username = %created.login, "Administrator bootstrapped");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use eduhr_auth::password::verify_password;
    use eduhr_auth_memory::MemoryAccountStore;

    fn admin() -> AdminUserConfig {
        AdminUserConfig {
            username: "admin".to_string(),
            password: "s3cret".to_string(),
            email: None,
        }
    }

    #[tokio::test]
    async fn test_bootstrap_admin_is_idempotent() {
        let store = MemoryAccountStore::new();

        assert!(bootstrap_admin(&store, &admin()).await.unwrap());
        assert!(!bootstrap_admin(&store, &admin()).await.unwrap());
        assert_eq!(store.len().await, 1);

        let account = store.find_by_login("admin").await.unwrap().unwrap();
        assert!(account.can_manage_settings());
        assert_eq!(account.email, "admin@localhost");
        let hash = account.password_hash.unwrap();
        assert!(verify_password("s3cret", &hash).unwrap());
    }
}
