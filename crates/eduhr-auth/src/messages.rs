//! Human-readable status and error messages.
//!
//! Codes arrive as raw query parameters, so lookups take strings and fall
//! back to generic messages for anything unrecognized.

use serde::Serialize;

use crate::error::ErrorCode;
use crate::routing::AuthStatus;

/// Alert severity, rendered as a CSS class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Danger,
}

impl Severity {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

/// Message for a status code (`login`, `logout`, `error`).
#[must_use]
pub fn status_message(code: &str) -> &'static str {
    match code.parse::<AuthStatus>() {
        Ok(AuthStatus::Login) => "Login successful.",
        Ok(AuthStatus::Logout) => "Logout successful.",
        Ok(AuthStatus::Error) => "Oops, there was an error:",
        Err(_) => "This message is not yet defined.",
    }
}

/// Message for an error code.
#[must_use]
pub fn error_message(code: &str) -> &'static str {
    let Ok(code) = code.parse::<ErrorCode>() else {
        return "An unknown error occurred. Please try again later.";
    };

    match code {
        ErrorCode::NoUniqueId => "AAI@EduHr service did not provide unique user ID.",
        ErrorCode::UserCreationDisabled => {
            "You were successfully authenticated using AAI@EduHr service, however your account is currently not allowed to enter (new user creation is disabled)."
        }
        ErrorCode::UsernameExists => "Username is already taken.",
        ErrorCode::EmailInvalid => "Email is not valid.",
        ErrorCode::ExistingUserEmail => "Email is already used.",
        ErrorCode::RealmNotAllowed => {
            "You were successfully authenticated using AAI@EduHr service, however your realm is currently not allowed."
        }
        ErrorCode::SimpleSamlphpNotLoaded => {
            "simpleSAMLphp package was not loaded. Is the path to simpleSAMLphp correct?"
        }
        ErrorCode::DisabledPasswordManipulation => {
            "Password manipulation is disabled since AAI@EduHr system is being used."
        }
        ErrorCode::RegistrationDisabled => {
            "User registration is disabled since AAI@EduHr system is being used."
        }
    }
}

/// Severity for a status or error code. Unknown codes are warnings.
#[must_use]
pub fn severity(code: &str) -> Severity {
    if let Ok(status) = code.parse::<AuthStatus>() {
        return match status {
            AuthStatus::Login | AuthStatus::Logout => Severity::Success,
            AuthStatus::Error => Severity::Warning,
        };
    }

    match code.parse::<ErrorCode>() {
        Ok(
            ErrorCode::NoUniqueId
            | ErrorCode::EmailInvalid
            | ErrorCode::SimpleSamlphpNotLoaded
            | ErrorCode::DisabledPasswordManipulation
            | ErrorCode::RegistrationDisabled,
        ) => Severity::Danger,
        _ => Severity::Warning,
    }
}

/// One line of the status page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertLine {
    pub message: &'static str,
    pub severity: Severity,
}

/// The status page alert built from `code` and `errors` query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub status: Option<AlertLine>,
    pub errors: Vec<AlertLine>,
}

impl Alert {
    /// Builds the alert. `errors` is a comma-separated list of codes.
    #[must_use]
    pub fn from_query(code: Option<&str>, errors: Option<&str>) -> Self {
        let status = code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| AlertLine {
                message: status_message(c),
                severity: severity(c),
            });

        let errors = errors
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|c| AlertLine {
                message: error_message(c),
                severity: severity(c),
            })
            .collect();

        Self { status, errors }
    }

    /// Returns `true` if there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.errors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_messages() {
        assert_eq!(status_message("login"), "Login successful.");
        assert_eq!(status_message("logout"), "Logout successful.");
        assert_eq!(status_message("error"), "Oops, there was an error:");
        assert_eq!(status_message("bogus"), "This message is not yet defined.");
    }

    #[test]
    fn test_every_error_code_has_a_message() {
        for code in ErrorCode::ALL {
            assert_ne!(
                error_message(code.as_str()),
                error_message("unknown"),
                "{code} has no message"
            );
        }
        assert_eq!(
            error_message("unknown"),
            "An unknown error occurred. Please try again later."
        );
    }

    #[test]
    fn test_severity() {
        assert_eq!(severity("login"), Severity::Success);
        assert_eq!(severity("error"), Severity::Warning);
        assert_eq!(severity("no_unique_id"), Severity::Danger);
        assert_eq!(severity("email_invalid"), Severity::Danger);
        assert_eq!(severity("realm_not_allowed"), Severity::Warning);
        assert_eq!(severity("existing_user_email"), Severity::Warning);
        assert_eq!(severity("whatever"), Severity::Warning);
    }

    #[test]
    fn test_alert_from_query() {
        let alert = Alert::from_query(Some("error"), Some("username_exists, ,no_unique_id"));
        assert_eq!(
            alert.status,
            Some(AlertLine {
                message: "Oops, there was an error:",
                severity: Severity::Warning,
            })
        );
        assert_eq!(alert.errors.len(), 2);
        assert_eq!(alert.errors[0].message, "Username is already taken.");
        assert_eq!(alert.errors[1].severity, Severity::Danger);

        assert!(Alert::from_query(None, None).is_empty());
        assert!(Alert::from_query(Some(""), Some("")).is_empty());
    }
}
