//! # eduhr-auth
//!
//! Federated login for web sites using the AAI@EduHr identity federation.
//!
//! Credential verification is delegated to an external SAML service provider
//! (SimpleSAMLphp or an equivalent SP). This crate provides:
//! - Strongly-typed assertions built from released SAML attributes
//! - Settings validation (SP library presence, service identifier, realms)
//! - The identity reconciliation flow (find-or-create local accounts)
//! - Post-login routing and the bypass escape hatch
//! - Storage traits for accounts, sessions and the settings record
//! - Axum HTTP handlers for login, logout, status and settings pages
//!
//! ## Modules
//!
//! - [`settings`] - Persisted settings record and its validation
//! - [`federation`] - Assertions, the identity-provider client and reconciliation
//! - [`routing`] - Redirect targets after login, logout and rejection
//! - [`bypass`] - Secret-gated fallback to local credential login
//! - [`activation`] - Per-request decision whether the federated flow applies
//! - [`messages`] - Human-readable status and error messages
//! - [`password`] - Random password generation and Argon2 hashing
//! - [`storage`] - Storage traits for accounts, sessions and settings
//! - [`http`] - Axum HTTP handlers

pub mod activation;
pub mod bypass;
pub mod error;
pub mod federation;
pub mod http;
pub mod messages;
pub mod password;
pub mod routing;
pub mod settings;
pub mod storage;
pub mod text;

pub use activation::{Activation, Notice, NoticeLevel};
pub use error::{ErrorCode, ReconcileError};
pub use federation::{
    Assertion, AttributeMap, AuthRequirement, IdentityProviderClient, IdpError, IdpRequest,
    ReconcileAction, ReconcileOutcome, Reconciler,
};
pub use http::{AuthState, CookieSettings, auth_router};
pub use routing::{AuthStatus, SiteUrls};
pub use settings::{
    FileProbe, LibraryProbe, ServiceIdentifier, Settings, SettingsError, SettingsProblem,
    SettingsRecord,
};
pub use storage::{
    Account, AccountStore, NewAccount, Session, SessionStore, SettingsStore, StoreError,
    StoreResult,
};

/// Type alias for reconciliation results.
pub type AuthResult<T> = Result<T, ReconcileError>;
