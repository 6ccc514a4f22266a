//! Settings page handlers (administrators only).

use axum::extract::State;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use tracing::info;

use super::admin::SettingsAdmin;
use super::state::AuthState;
use super::templates::render_settings_page;
use crate::activation::Notice;
use crate::password::generate_password;
use crate::settings::SettingsRecord;

/// Length of the suggested bypass secret.
const EXAMPLE_SECRET_LENGTH: usize = 32;

/// Form data for `POST /settings`.
#[derive(Debug, Default, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub identity_provider_library_path: Option<String>,
    #[serde(default)]
    pub service_identifier: Option<String>,
    /// Checkbox; present when ticked.
    #[serde(default)]
    pub auto_create_users: Option<String>,
    #[serde(default)]
    pub allowed_realms: Option<String>,
    #[serde(default)]
    pub bypass_secret: Option<String>,
}

impl From<SettingsForm> for SettingsRecord {
    fn from(form: SettingsForm) -> Self {
        SettingsRecord {
            identity_provider_library_path: form.identity_provider_library_path,
            service_identifier: form.service_identifier,
            auto_create_users: form.auto_create_users.is_some_and(|v| !v.is_empty()),
            allowed_realms: form.allowed_realms.unwrap_or_default(),
            bypass_secret: form.bypass_secret,
        }
        .sanitized()
    }
}

/// GET /settings handler.
pub async fn settings_get(
    State(state): State<AuthState>,
    _admin: SettingsAdmin,
    jar: CookieJar,
) -> Response {
    let record = match state.settings.load().await {
        Ok(record) => record,
        Err(e) => return state.failure_redirect("Failed to load settings", &e),
    };

    let notice = match current_notice(&state, &jar).await {
        Ok(notice) => notice,
        Err(response) => return response,
    };

    let example = record
        .bypass_secret
        .is_none()
        .then(|| generate_password(EXAMPLE_SECRET_LENGTH, false));

    Html(render_settings_page(&record, &notice, example.as_deref())).into_response()
}

/// POST /settings handler.
pub async fn settings_post(
    State(state): State<AuthState>,
    admin: SettingsAdmin,
    Form(form): Form<SettingsForm>,
) -> Response {
    let record = SettingsRecord::from(form);

    if let Err(e) = state.settings.save(&record).await {
        return state.failure_redirect("Failed to save settings", &e);
    }
    info!(
        login = %admin.account.login,
        service = ?record.service_identifier,
        auto_create_users = record.auto_create_users,
        allowed_realms = %record.allowed_realms,
        "Settings saved"
    );

    match state.urls.resolve("settings") {
        Ok(url) => Redirect::to(url.as_str()).into_response(),
        Err(e) => state.failure_redirect("Failed to build settings URL", &e),
    }
}

/// GET /settings/notice handler.
pub async fn settings_notice(
    State(state): State<AuthState>,
    _admin: SettingsAdmin,
    jar: CookieJar,
) -> Response {
    match current_notice(&state, &jar).await {
        Ok(notice) => Json(notice).into_response(),
        Err(response) => response,
    }
}

async fn current_notice(state: &AuthState, jar: &CookieJar) -> Result<Notice, Response> {
    let activation = state
        .activation(None, jar)
        .await
        .map_err(|e| state.failure_redirect("Failed to load settings", &e))?;

    let notice = activation.notice();
    info!(level = ?notice.level, message = %notice.message, "Operator notice");
    Ok(notice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_into_record() {
        let form = SettingsForm {
            identity_provider_library_path: Some(" /opt/ssp/_autoload.php ".to_string()),
            service_identifier: Some("default-sp".to_string()),
            auto_create_users: Some("1".to_string()),
            allowed_realms: Some("srce.hr,, sfzg.hr ".to_string()),
            bypass_secret: Some(String::new()),
        };

        let record = SettingsRecord::from(form);
        assert_eq!(
            record.identity_provider_library_path.as_deref(),
            Some("/opt/ssp/_autoload.php")
        );
        assert!(record.auto_create_users);
        assert_eq!(record.allowed_realms, "srce.hr, sfzg.hr");
        assert_eq!(record.bypass_secret, None);
    }

    #[test]
    fn test_unticked_checkbox() {
        let record = SettingsRecord::from(SettingsForm::default());
        assert!(!record.auto_create_users);
        assert_eq!(record, SettingsRecord::default());
    }
}
