//! Per-request decision whether the federated flow applies.
//!
//! Settings are validated on every request. Invalid settings leave local
//! authentication untouched; a bypass (requested now, or remembered by the
//! marker cookie) does the same for one browser.

use serde::Serialize;
use tracing::warn;

use crate::bypass::is_bypass_requested;
use crate::settings::{Settings, SettingsError};

/// Whether, and why not, the federated flow applies to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Settings are invalid; the flow is dormant.
    Disabled(SettingsError),

    /// The request carries the bypass secret. The marker cookie must be set.
    BypassRequested,

    /// The browser carries the bypass marker cookie.
    Bypassed,

    /// The flow applies with these settings.
    Applied(Settings),
}

impl Activation {
    /// Resolves the activation for a request.
    ///
    /// Invalid settings win over any bypass; a bypass secret in the request
    /// wins over an existing marker.
    #[must_use]
    pub fn resolve(
        validated: Result<Settings, SettingsError>,
        bypass_param: Option<&str>,
        has_marker: bool,
    ) -> Self {
        match validated {
            Err(err) => Self::Disabled(err),
            Ok(settings) => {
                if is_bypass_requested(bypass_param, settings.bypass_secret.as_deref()) {
                    warn!("Federated login bypassed with the configured secret");
                    Self::BypassRequested
                } else if has_marker {
                    Self::Bypassed
                } else {
                    Self::Applied(settings)
                }
            }
        }
    }

    /// Settings the flow runs with, when it applies.
    #[must_use]
    pub fn settings(&self) -> Option<&Settings> {
        match self {
            Self::Applied(settings) => Some(settings),
            _ => None,
        }
    }

    /// Returns `true` if the federated flow replaces local login.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// Returns `true` for either bypass state.
    #[must_use]
    pub fn is_bypassed(&self) -> bool {
        matches!(self, Self::BypassRequested | Self::Bypassed)
    }

    /// The operator notice for this activation.
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Applied(_) => Notice::success(
                "AAI@EduHr authentication is applied. Users need to use AAI@EduHr identities to log in.",
            ),
            Self::Disabled(err) => Notice::warning(format!(
                "AAI@EduHr authentication is NOT applied. Please check AAI@EduHr Auth settings. {err}"
            )),
            Self::BypassRequested | Self::Bypassed => {
                Notice::warning("AAI@EduHr authentication has been bypassed for current user.")
            }
        }
    }
}

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
}

impl NoticeLevel {
    /// CSS class of the rendered notice.
    #[must_use]
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Success => "notice notice-success",
            Self::Warning => "notice notice-warning",
        }
    }
}

/// A notice shown to operators on the settings page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}
