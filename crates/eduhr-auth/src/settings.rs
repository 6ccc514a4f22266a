//! Persisted settings record and its validation.
//!
//! The settings form writes a [`SettingsRecord`]. Every flow invocation loads
//! the record and validates it into [`Settings`]; an invalid record disables
//! federated login entirely and the site falls back to local authentication.
//!
//! # Example (JSON record)
//!
//! ```json
//! {
//!   "identity_provider_library_path": "/var/www/simplesamlphp/src/_autoload.php",
//!   "service_identifier": "default-sp",
//!   "auto_create_users": true,
//!   "allowed_realms": "srce.hr, sfzg.hr",
//!   "bypass_secret": "s3cr3t-long-and-hard-to-guess"
//! }
//! ```

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::text::sanitize_text_field;

// =============================================================================
// Service Identifier
// =============================================================================

/// SP service (authentication source) names the federation recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceIdentifier {
    /// The federation test lab service.
    #[serde(rename = "fedlab-sp")]
    FedlabSp,
    /// The production service.
    #[serde(rename = "default-sp")]
    DefaultSp,
}

impl ServiceIdentifier {
    /// All recognized identifiers.
    pub const ALL: [ServiceIdentifier; 2] = [Self::FedlabSp, Self::DefaultSp];

    /// Returns the configured name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FedlabSp => "fedlab-sp",
            Self::DefaultSp => "default-sp",
        }
    }
}

impl fmt::Display for ServiceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceIdentifier {
    type Err = SettingsProblem;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or(SettingsProblem::InvalidServiceIdentifier)
    }
}

// =============================================================================
// Library Probe
// =============================================================================

/// Checks that the identity-provider client library can be located and
/// loaded.
pub trait LibraryProbe: Send + Sync {
    /// Returns `true` if the library at `path` is usable.
    fn is_loadable(&self, path: &Path) -> bool;
}

/// Probe requiring an existing, readable regular file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileProbe;

impl LibraryProbe for FileProbe {
    fn is_loadable(&self, path: &Path) -> bool {
        path.is_file() && File::open(path).is_ok()
    }
}

// =============================================================================
// Settings Record
// =============================================================================

/// The persisted settings record, exactly as the settings form stores it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsRecord {
    /// Filesystem path of the SP client library (e.g. its autoloader).
    pub identity_provider_library_path: Option<String>,

    /// SP service name; must be one of [`ServiceIdentifier::ALL`].
    pub service_identifier: Option<String>,

    /// Whether unknown federated users get a local account on first login.
    pub auto_create_users: bool,

    /// Comma-separated realm allowlist. Empty allows every realm.
    pub allowed_realms: String,

    /// Secret enabling the local-login escape hatch.
    pub bypass_secret: Option<String>,
}

impl SettingsRecord {
    /// Sanitizes form input: trims values, strips markup and turns empty
    /// strings into `None`.
    #[must_use]
    pub fn sanitized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| sanitize_text_field(&v))
                .filter(|v| !v.is_empty())
        }

        Self {
            identity_provider_library_path: clean(self.identity_provider_library_path),
            service_identifier: clean(self.service_identifier),
            auto_create_users: self.auto_create_users,
            allowed_realms: parse_realms(&self.allowed_realms).join(", "),
            bypass_secret: clean(self.bypass_secret),
        }
    }

    /// Validates the record.
    ///
    /// # Errors
    ///
    /// Returns a [`SettingsError`] listing every failing check.
    pub fn validate(&self, probe: &dyn LibraryProbe) -> Result<Settings, SettingsError> {
        let mut problems = Vec::new();

        let library_path = self
            .identity_provider_library_path
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        let library_path = match library_path {
            Some(path) if probe.is_loadable(&path) => Some(path),
            _ => {
                problems.push(SettingsProblem::LibraryNotLoaded);
                None
            }
        };

        let service = match self.service_identifier.as_deref().map(str::trim) {
            Some(name) => match name.parse::<ServiceIdentifier>() {
                Ok(service) => Some(service),
                Err(problem) => {
                    problems.push(problem);
                    None
                }
            },
            None => {
                problems.push(SettingsProblem::InvalidServiceIdentifier);
                None
            }
        };

        match (library_path, service) {
            (Some(library_path), Some(service)) => Ok(Settings {
                library_path,
                service,
                auto_create_users: self.auto_create_users,
                allowed_realms: parse_realms(&self.allowed_realms),
                bypass_secret: self
                    .bypass_secret
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            }),
            _ => Err(SettingsError { problems }),
        }
    }
}

/// Splits a comma-separated realm list, trimming entries and dropping empty
/// ones.
#[must_use]
pub fn parse_realms(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|realm| !realm.is_empty())
        .map(str::to_string)
        .collect()
}

// =============================================================================
// Validated Settings
// =============================================================================

/// Validated settings passed explicitly into the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub library_path: PathBuf,
    pub service: ServiceIdentifier,
    pub auto_create_users: bool,
    /// Realm allowlist. Empty allows every realm.
    pub allowed_realms: Vec<String>,
    pub bypass_secret: Option<String>,
}

impl Settings {
    /// Returns `true` if `realm` may log in. Exact, case-sensitive match.
    #[must_use]
    pub fn is_realm_allowed(&self, realm: &str) -> bool {
        self.allowed_realms.is_empty() || self.allowed_realms.iter().any(|r| r == realm)
    }
}

// =============================================================================
// Errors
// =============================================================================

/// A single failing settings check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SettingsProblem {
    /// The SP client library is missing or cannot be loaded.
    #[error("Can not load simpleSAMLphp.")]
    LibraryNotLoaded,

    /// The service identifier is missing or not recognized.
    #[error("Service type is not valid.")]
    InvalidServiceIdentifier,
}

/// Settings failed validation; federated login stays dormant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsError {
    pub problems: Vec<SettingsProblem>,
}

impl SettingsError {
    /// Returns `true` if the SP client library could not be loaded.
    #[must_use]
    pub fn library_not_loaded(&self) -> bool {
        self.problems.contains(&SettingsProblem::LibraryNotLoaded)
    }
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.problems.iter().map(ToString::to_string).collect();
        f.write_str(&messages.join(" "))
    }
}

impl std::error::Error for SettingsError {}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysLoadable;

    impl LibraryProbe for AlwaysLoadable {
        fn is_loadable(&self, _path: &Path) -> bool {
            true
        }
    }

    fn valid_record() -> SettingsRecord {
        SettingsRecord {
            identity_provider_library_path: Some("/opt/ssp/_autoload.php".to_string()),
            service_identifier: Some("default-sp".to_string()),
            auto_create_users: true,
            allowed_realms: " srce.hr , sfzg.hr,, ".to_string(),
            bypass_secret: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_validate_ok() {
        let settings = valid_record().validate(&AlwaysLoadable).unwrap();
        assert_eq!(settings.service, ServiceIdentifier::DefaultSp);
        assert_eq!(settings.allowed_realms, vec!["srce.hr", "sfzg.hr"]);
        assert!(settings.auto_create_users);
        assert_eq!(settings.bypass_secret, None);
    }

    #[test]
    fn test_validate_reports_every_problem() {
        let record = SettingsRecord::default();
        let err = record.validate(&AlwaysLoadable).unwrap_err();
        assert_eq!(
            err.problems,
            vec![
                SettingsProblem::LibraryNotLoaded,
                SettingsProblem::InvalidServiceIdentifier
            ]
        );
        assert_eq!(
            err.to_string(),
            "Can not load simpleSAMLphp. Service type is not valid."
        );
    }

    #[test]
    fn test_validate_unknown_service() {
        let mut record = valid_record();
        record.service_identifier = Some("other-sp".to_string());
        let err = record.validate(&AlwaysLoadable).unwrap_err();
        assert_eq!(err.problems, vec![SettingsProblem::InvalidServiceIdentifier]);
        assert!(!err.library_not_loaded());
    }

    #[test]
    fn test_file_probe() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("_autoload.php");
        std::fs::write(&file, "<?php").unwrap();

        assert!(FileProbe.is_loadable(&file));
        assert!(!FileProbe.is_loadable(dir.path()));
        assert!(!FileProbe.is_loadable(&dir.path().join("missing.php")));

        let mut record = valid_record();
        record.identity_provider_library_path = Some(dir.path().display().to_string());
        let err = record.validate(&FileProbe).unwrap_err();
        assert!(err.library_not_loaded());
    }

    #[test]
    fn test_realm_allowlist() {
        let mut settings = valid_record().validate(&AlwaysLoadable).unwrap();
        assert!(settings.is_realm_allowed("srce.hr"));
        assert!(!settings.is_realm_allowed("SRCE.HR"));
        assert!(!settings.is_realm_allowed("uni.hr"));

        settings.allowed_realms.clear();
        assert!(settings.is_realm_allowed("anything.hr"));
    }

    #[test]
    fn test_sanitized_record() {
        let record = SettingsRecord {
            identity_provider_library_path: Some("  /opt/ssp/_autoload.php ".to_string()),
            service_identifier: Some("<b>default-sp</b>".to_string()),
            auto_create_users: false,
            allowed_realms: "srce.hr,  ,sfzg.hr".to_string(),
            bypass_secret: Some(String::new()),
        }
        .sanitized();

        assert_eq!(
            record.identity_provider_library_path.as_deref(),
            Some("/opt/ssp/_autoload.php")
        );
        assert_eq!(record.service_identifier.as_deref(), Some("default-sp"));
        assert_eq!(record.allowed_realms, "srce.hr, sfzg.hr");
        assert_eq!(record.bypass_secret, None);
    }

    #[test]
    fn test_record_json_defaults() {
        let record: SettingsRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, SettingsRecord::default());
    }
}
