//! Error types for the federated login flow.
//!
//! [`ErrorCode`] is the user/operator-visible taxonomy carried in redirect
//! URLs (`?code=error&errors=...`). [`ReconcileError`] separates policy
//! rejections (which become such redirects) from infrastructure failures.

use std::fmt;
use std::str::FromStr;

use crate::password::PasswordError;
use crate::storage::StoreError;

/// Codes surfaced to users and operators.
///
/// None of these are fatal and none are retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The identity provider omitted the mandatory stable identifier.
    NoUniqueId,
    /// The identifier's realm is not in the configured allowlist.
    RealmNotAllowed,
    /// No local account exists and onboarding is disabled.
    UserCreationDisabled,
    /// The login is already taken.
    UsernameExists,
    /// The derived email failed format validation.
    EmailInvalid,
    /// Another account already uses the derived email.
    ExistingUserEmail,
    /// The SP client library could not be located or loaded.
    SimpleSamlphpNotLoaded,
    /// Password reset flows are disabled while federated login is active.
    DisabledPasswordManipulation,
    /// Local registration is disabled while federated login is active.
    RegistrationDisabled,
}

impl ErrorCode {
    /// All known codes.
    pub const ALL: [ErrorCode; 9] = [
        Self::NoUniqueId,
        Self::RealmNotAllowed,
        Self::UserCreationDisabled,
        Self::UsernameExists,
        Self::EmailInvalid,
        Self::ExistingUserEmail,
        Self::SimpleSamlphpNotLoaded,
        Self::DisabledPasswordManipulation,
        Self::RegistrationDisabled,
    ];

    /// Returns the wire representation used in query parameters.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoUniqueId => "no_unique_id",
            Self::RealmNotAllowed => "realm_not_allowed",
            Self::UserCreationDisabled => "user_creation_disabled",
            Self::UsernameExists => "username_exists",
            Self::EmailInvalid => "email_invalid",
            Self::ExistingUserEmail => "existing_user_email",
            Self::SimpleSamlphpNotLoaded => "simplesamlphp_not_loaded",
            Self::DisabledPasswordManipulation => "disabled_password_manipulation",
            Self::RegistrationDisabled => "registration_disabled",
        }
    }

    /// Returns `true` for rejections where the identity provider assertion
    /// was valid but local policy refused the login.
    #[must_use]
    pub fn is_soft_rejection(&self) -> bool {
        matches!(self, Self::UserCreationDisabled | Self::RealmNotAllowed)
    }

    /// Returns `true` for account-creation validation failures.
    #[must_use]
    pub fn is_creation_error(&self) -> bool {
        matches!(
            self,
            Self::UsernameExists | Self::EmailInvalid | Self::ExistingUserEmail
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unrecognized error code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownErrorCode(s.to_string()))
    }
}

/// Errors that end a reconciliation without establishing a session.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Local policy or validation rejected the login.
    #[error("Login rejected: {0}")]
    Rejected(ErrorCode),

    /// The account or session store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Generating or hashing the replacement password failed.
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),
}

impl ReconcileError {
    /// Creates a rejection with the given code.
    #[must_use]
    pub fn rejected(code: ErrorCode) -> Self {
        Self::Rejected(code)
    }

    /// Returns the rejection code, if this is a policy rejection.
    #[must_use]
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Rejected(code) => Some(*code),
            _ => None,
        }
    }

    /// Returns `true` if this is a policy rejection rather than a failure.
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}
