//! Identity reconciliation for federated login.
//!
//! This module provides the [`Reconciler`], which maps a verified assertion
//! onto a local account and establishes the login session.
//!
//! # Overview
//!
//! The flow is a sequential decision chain; the first failing check ends it
//! with a rejection and no session:
//!
//! 1. **Unique ID** - the assertion must carry the stable identifier
//! 2. **Realm** - when an allowlist is configured, the realm must be on it
//! 3. **Lookup** - find the account whose login is the unique ID
//! 4. **Existing account** - backfill federated metadata once, replace the
//!    local password, establish the session
//! 5. **New account** - when onboarding is allowed, validate and create the
//!    account, then establish the session
//!
//! # Example
//!
//! ```ignore
//! use eduhr_auth::federation::Reconciler;
//!
//! let reconciler = Reconciler::new(accounts, sessions);
//! let outcome = reconciler.reconcile(&attributes, &settings).await?;
//! println!("{} logged in ({})", outcome.account.login, outcome.action);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::assertion::{Assertion, AttributeMap};
use crate::AuthResult;
use crate::error::{ErrorCode, ReconcileError};
use crate::password::unusable_password_hash;
use crate::settings::Settings;
use crate::storage::account::{
    FEDERATED, META_ACCOUNT, META_NATIONAL_ID, META_ORIGINAL_MAIL, META_PERSISTENT_ID,
};
use crate::storage::{Account, AccountStore, NewAccount, Session, SessionStore, StoreError};
use crate::text::{is_email, sanitize_text_field};

/// The action taken for a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// An account with the unique ID already existed.
    ExistingUser,

    /// A new account was created.
    NewUser,
}

impl ReconcileAction {
    /// Returns `true` if a new account was created.
    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Self::NewUser)
    }
}

impl fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExistingUser => write!(f, "existing_user"),
            Self::NewUser => write!(f, "new_user"),
        }
    }
}

/// Result of a successful reconciliation.
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// The account that is now the active session identity.
    pub account: Account,

    /// The action that was taken.
    pub action: ReconcileAction,

    /// Whether federated metadata was backfilled on an existing account.
    pub backfilled: bool,

    /// The established session.
    pub session: Session,
}

/// Metadata written at creation or at the first federated login.
#[must_use]
pub fn federated_metadata(assertion: &Assertion) -> BTreeMap<String, String> {
    let mut meta = BTreeMap::new();
    meta.insert(META_ACCOUNT.to_string(), FEDERATED.to_string());

    let optional = [
        (META_ORIGINAL_MAIL, &assertion.email),
        (META_NATIONAL_ID, &assertion.national_id),
        (META_PERSISTENT_ID, &assertion.persistent_id),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            meta.insert(key.to_string(), value.clone());
        }
    }

    meta
}

/// Account fields derived from an assertion.
///
/// The email falls back to the unique ID so email uniqueness tracks login
/// uniqueness when no real email is asserted.
#[must_use]
pub fn new_account_from_assertion(assertion: &Assertion, password_hash: String) -> NewAccount {
    let email = assertion
        .email
        .clone()
        .unwrap_or_else(|| assertion.unique_id.clone());

    let first_name = assertion
        .given_name
        .as_deref()
        .map(sanitize_text_field)
        .unwrap_or_default();
    let last_name = assertion
        .surname
        .as_deref()
        .map(sanitize_text_field)
        .unwrap_or_default();

    Account::builder(assertion.unique_id.clone(), email)
        .first_name(first_name)
        .last_name(last_name)
        .password_hash(password_hash)
        .metadata(federated_metadata(assertion))
        .build()
}

/// Maps verified assertions onto local accounts.
#[derive(Clone)]
pub struct Reconciler {
    accounts: Arc<dyn AccountStore>,
    sessions: Arc<dyn SessionStore>,
}

impl Reconciler {
    /// Creates a reconciler over the given stores.
    pub fn new(accounts: Arc<dyn AccountStore>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { accounts, sessions }
    }

    /// Reconciles a released attribute map.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Rejected`] with `no_unique_id` when the
    /// unique identifier is absent (no store access), otherwise whatever
    /// [`Reconciler::reconcile_assertion`] returns.
    pub async fn reconcile(
        &self,
        attributes: &AttributeMap,
        settings: &Settings,
    ) -> AuthResult<ReconcileOutcome> {
        let assertion = Assertion::from_attributes(attributes).map_err(|code| {
            warn!(code = %code, "Identity provider did not release a unique ID");
            ReconcileError::rejected(code)
        })?;
        self.reconcile_assertion(&assertion, settings).await
    }

    /// Reconciles a typed assertion.
    ///
    /// # Errors
    ///
    /// - `Rejected(realm_not_allowed)` - realm not in a non-empty allowlist
    /// - `Rejected(user_creation_disabled)` - no account and onboarding off
    /// - `Rejected(username_exists | email_invalid | existing_user_email)` -
    ///   account creation failed validation
    /// - `Storage` / `Password` - infrastructure failures
    pub async fn reconcile_assertion(
        &self,
        assertion: &Assertion,
        settings: &Settings,
    ) -> AuthResult<ReconcileOutcome> {
        if !settings.is_realm_allowed(assertion.realm()) {
            warn!(
                login = %assertion.unique_id,
                realm = %assertion.realm(),
                "Realm is not allowed"
            );
            return Err(ReconcileError::rejected(ErrorCode::RealmNotAllowed));
        }

        match self.accounts.find_by_login(&assertion.unique_id).await? {
            Some(account) => self.login_existing(account, assertion).await,
            None => self.login_new(assertion, settings).await,
        }
    }

    async fn login_existing(
        &self,
        mut account: Account,
        assertion: &Assertion,
    ) -> AuthResult<ReconcileOutcome> {
        let backfilled = !account.is_federated();

        if backfilled {
            let meta = federated_metadata(assertion);
            self.accounts.set_metadata(&account.id, &meta).await?;

            // An administrator may have seen the initial password when the
            // account was created by hand.
            let hash = unusable_password_hash(true)?;
            self.accounts.set_password_hash(&account.id, &hash).await?;

            account.metadata.extend(meta);
            account.password_hash = Some(hash);
            info!(login = %account.login, "Backfilled federated metadata on first federated login");
        }

        let session = self.sessions.establish(&account.id).await?;
        info!(login = %account.login, "Existing user logged in");

        Ok(ReconcileOutcome {
            account,
            action: ReconcileAction::ExistingUser,
            backfilled,
            session,
        })
    }

    async fn login_new(
        &self,
        assertion: &Assertion,
        settings: &Settings,
    ) -> AuthResult<ReconcileOutcome> {
        if !settings.auto_create_users {
            warn!(login = %assertion.unique_id, "User creation is disabled");
            return Err(ReconcileError::rejected(ErrorCode::UserCreationDisabled));
        }

        let new_account = new_account_from_assertion(assertion, unusable_password_hash(false)?);

        if self.accounts.find_by_login(&new_account.login).await?.is_some() {
            return Err(ReconcileError::rejected(ErrorCode::UsernameExists));
        }
        if !is_email(&new_account.email) {
            warn!(login = %new_account.login, email = %new_account.email, "Derived email is invalid");
            return Err(ReconcileError::rejected(ErrorCode::EmailInvalid));
        }

        let account = match self.accounts.create(new_account).await {
            Ok(account) => account,
            Err(StoreError::LoginExists(login)) => {
                debug!(login = %login, "Login created concurrently");
                return Err(ReconcileError::rejected(ErrorCode::UsernameExists));
            }
            Err(StoreError::EmailExists(email)) => {
                warn!(email = %email, "Email already used by another account");
                return Err(ReconcileError::rejected(ErrorCode::ExistingUserEmail));
            }
            Err(e) => return Err(e.into()),
        };

        let session = self.sessions.establish(&account.id).await?;
        info!(login = %account.login, "New user created and logged in");

        Ok(ReconcileOutcome {
            account,
            action: ReconcileAction::NewUser,
            backfilled: false,
            session,
        })
    }
}
