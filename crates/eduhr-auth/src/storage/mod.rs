//! Storage traits for federated login data.
//!
//! This module defines storage interfaces for:
//!
//! - Local accounts (lookup, creation, metadata, password replacement)
//! - Login sessions (the "active session identity")
//! - The single persisted settings record
//!
//! # Implementations
//!
//! Storage implementations are provided in separate crates:
//!
//! - `eduhr-auth-memory` - In-memory stores and a JSON-file settings store

pub mod account;
pub mod session;
pub mod settings;

pub use account::{Account, AccountBuilder, AccountStore, NewAccount};
pub use session::{Session, SessionStore};
pub use settings::SettingsStore;

/// Errors returned by storage backends.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// An account with this login already exists.
    #[error("Login already exists: {0}")]
    LoginExists(String),

    /// An account with this email already exists.
    #[error("Email already exists: {0}")]
    EmailExists(String),

    /// The referenced record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend failed.
    #[error("Storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Creates a `Backend` error.
    #[must_use]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// Returns `true` if this is a uniqueness constraint violation.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::LoginExists(_) | Self::EmailExists(_))
    }
}

/// Type alias for storage results.
pub type StoreResult<T> = Result<T, StoreError>;
