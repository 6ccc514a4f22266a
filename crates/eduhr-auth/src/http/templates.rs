//! HTML templates for the status, login and settings pages.
//!
//! Server-rendered pages with a small shared stylesheet. Every interpolated
//! value goes through [`html_escape`].

use crate::activation::Notice;
use crate::bypass::BYPASS_PARAM;
use crate::messages::Alert;
use crate::settings::{ServiceIdentifier, SettingsRecord};

/// Shared CSS styles for all pages.
const SHARED_STYLES: &str = r#"
:root {
    --brand-primary: #1d4f91;
    --brand-primary-light: #3a73c0;
    --text-primary: #1f2328;
    --text-dimmed: #6c757d;
    --surface-1: #f6f8fa;
    --border-subtle: #d0d7de;
    --radius-md: 6px;
}

* {
    margin: 0;
    padding: 0;
    box-sizing: border-box;
}

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    background: var(--surface-1);
    color: var(--text-primary);
    line-height: 1.5;
}

.container {
    max-width: 640px;
    margin: 3rem auto;
    padding: 1rem;
}

.card {
    background: white;
    border: 1px solid var(--border-subtle);
    border-radius: var(--radius-md);
    padding: 1.5rem;
}

.card-title {
    font-size: 1.25rem;
    font-weight: 600;
    margin-bottom: 1rem;
}

.form-group {
    margin-bottom: 1rem;
}

.form-label {
    display: block;
    font-size: 0.875rem;
    font-weight: 500;
    margin-bottom: 0.25rem;
}

.form-input {
    width: 100%;
    padding: 0.5rem 0.75rem;
    border: 1px solid var(--border-subtle);
    border-radius: var(--radius-md);
    font-size: 0.875rem;
}

.description {
    font-size: 0.75rem;
    color: var(--text-dimmed);
    margin-top: 0.25rem;
}

.btn {
    padding: 0.5rem 1rem;
    border: none;
    border-radius: var(--radius-md);
    background: var(--brand-primary);
    color: white;
    font-size: 0.875rem;
    cursor: pointer;
}

.btn:hover {
    background: var(--brand-primary-light);
}

.alert {
    padding: 0.75rem 1rem;
    border-radius: var(--radius-md);
    font-size: 0.875rem;
    margin-bottom: 0.75rem;
}

.alert-success { background: #dafbe1; border: 1px solid #2da44e; }
.alert-warning { background: #fff8c5; border: 1px solid #bf8700; }
.alert-danger { background: #ffebe9; border: 1px solid #cf222e; }

.notice { padding: 0.75rem 1rem; margin-bottom: 1rem; border-left: 4px solid; }
.notice-success { border-color: #2da44e; background: #dafbe1; }
.notice-warning { border-color: #bf8700; background: #fff8c5; }
"#;

/// Base HTML template wrapper.
fn html_page(title: &str, content: &str) -> String {
    let mut html = String::with_capacity(content.len() + 2000);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    html.push_str("    <title>");
    html.push_str(&html_escape(title));
    html.push_str(" - AAI@EduHr</title>\n");
    html.push_str("    <style>");
    html.push_str(SHARED_STYLES);
    html.push_str("</style>\n</head>\n<body>\n    <div class=\"container\">\n");
    html.push_str(content);
    html.push_str("\n    </div>\n</body>\n</html>");
    html
}

/// Renders the status page alert.
///
/// # Arguments
///
/// * `alert` - Status and error lines from the landing URL
/// * `home_url` - Link back to the site
pub fn render_status_page(alert: &Alert, home_url: &str) -> String {
    let mut content = String::with_capacity(2048);

    content.push_str("<div class=\"card\">\n");
    content.push_str("<div class=\"card-title\">AAI@EduHr</div>\n");

    if let Some(status) = &alert.status {
        content.push_str("<div class=\"alert alert-");
        content.push_str(status.severity.as_str());
        content.push_str("\">");
        content.push_str(&html_escape(status.message));
        content.push_str("</div>\n");
    }

    if !alert.errors.is_empty() {
        content.push_str("<ul class=\"errors\">\n");
        for error in &alert.errors {
            content.push_str("<li class=\"alert alert-");
            content.push_str(error.severity.as_str());
            content.push_str("\">");
            content.push_str(&html_escape(error.message));
            content.push_str("</li>\n");
        }
        content.push_str("</ul>\n");
    }

    content.push_str("<p><a href=\"");
    content.push_str(&html_escape(home_url));
    content.push_str("\">Go to homepage</a></p>\n");
    content.push_str("</div>");

    html_page("AAI@EduHr", &content)
}

/// Renders the local login form.
///
/// # Arguments
///
/// * `redirect_to` - Optional target passed through the form
/// * `error` - Optional error message to display
pub fn render_login_form(redirect_to: Option<&str>, error: Option<&str>) -> String {
    let mut content = String::with_capacity(2048);

    content.push_str("<div class=\"card\">\n");
    content.push_str("<div class=\"card-title\">Sign In</div>\n\n");

    if let Some(e) = error {
        content.push_str("<div class=\"alert alert-danger\">");
        content.push_str(&html_escape(e));
        content.push_str("</div>\n\n");
    }

    content.push_str("<form method=\"POST\" action=\"login\">\n");
    if let Some(target) = redirect_to {
        content.push_str("<input type=\"hidden\" name=\"redirect_to\" value=\"");
        content.push_str(&html_escape(target));
        content.push_str("\">\n");
    }

    content.push_str("<div class=\"form-group\">\n");
    content.push_str("<label class=\"form-label\" for=\"log\">Username or Email</label>\n");
    content.push_str(
        "<input type=\"text\" id=\"log\" name=\"log\" class=\"form-input\" required autocomplete=\"username\">\n",
    );
    content.push_str("</div>\n\n");

    content.push_str("<div class=\"form-group\">\n");
    content.push_str("<label class=\"form-label\" for=\"pwd\">Password</label>\n");
    content.push_str(
        "<input type=\"password\" id=\"pwd\" name=\"pwd\" class=\"form-input\" required autocomplete=\"current-password\">\n",
    );
    content.push_str("</div>\n\n");

    content.push_str("<button type=\"submit\" class=\"btn\">Sign In</button>\n");
    content.push_str("</form>\n</div>");

    html_page("Sign In", &content)
}

/// Renders the settings form.
///
/// # Arguments
///
/// * `record` - The stored settings record
/// * `notice` - Operator notice for the current activation
/// * `example_secret` - Suggested bypass secret, shown when none is set
pub fn render_settings_page(
    record: &SettingsRecord,
    notice: &Notice,
    example_secret: Option<&str>,
) -> String {
    let mut content = String::with_capacity(4096);

    content.push_str("<div class=\"");
    content.push_str(notice.level.css_class());
    content.push_str("\">");
    content.push_str(&html_escape(&notice.message));
    content.push_str("</div>\n\n");

    content.push_str("<div class=\"card\">\n");
    content.push_str("<div class=\"card-title\">AAI@EduHr Auth Settings</div>\n\n");
    content.push_str("<form method=\"POST\">\n");

    // Library path
    text_field(
        &mut content,
        "identity_provider_library_path",
        "simpleSAMLphp autoloader path",
        record.identity_provider_library_path.as_deref().unwrap_or_default(),
        "Full path to simpleSAMLphp autoloader, e.g. /var/www/simplesamlphp/src/_autoload.php",
    );

    // Service identifier
    content.push_str("<div class=\"form-group\">\n");
    content.push_str(
        "<label class=\"form-label\" for=\"service_identifier\">Service type</label>\n",
    );
    content.push_str(
        "<select id=\"service_identifier\" name=\"service_identifier\" class=\"form-input\">\n",
    );
    let current = record.service_identifier.as_deref();
    for service in ServiceIdentifier::ALL {
        let selected = if current == Some(service.as_str()) {
            " selected"
        } else {
            ""
        };
        content.push_str("<option value=\"");
        content.push_str(service.as_str());
        content.push_str("\"");
        content.push_str(selected);
        content.push('>');
        content.push_str(service.as_str());
        content.push_str("</option>\n");
    }
    content.push_str("</select>\n</div>\n\n");

    // Auto-create users
    content.push_str("<div class=\"form-group\">\n<label class=\"form-label\">");
    content.push_str("<input type=\"checkbox\" name=\"auto_create_users\" value=\"1\"");
    if record.auto_create_users {
        content.push_str(" checked");
    }
    content.push_str("> Create new users</label>\n");
    content.push_str(
        "<p class=\"description\">Create a local account when an AAI@EduHr user logs in for the first time.</p>\n",
    );
    content.push_str("</div>\n\n");

    text_field(
        &mut content,
        "allowed_realms",
        "Allowed realms",
        &record.allowed_realms,
        "Comma separated list of realms allowed to log in, e.g. srce.hr, sfzg.hr. Leave empty to allow all.",
    );

    // Bypass secret
    let mut description = format!(
        "Secret which can be used to bypass AAI@EduHr authentication and show the local login form: /login?{BYPASS_PARAM}=some-secret"
    );
    if let Some(example) = example_secret {
        description.push_str(". Example secret to use: ");
        description.push_str(example);
    }
    text_field(
        &mut content,
        "bypass_secret",
        "Bypass secret",
        record.bypass_secret.as_deref().unwrap_or_default(),
        &description,
    );

    content.push_str("<button type=\"submit\" class=\"btn\">Save Changes</button>\n");
    content.push_str("</form>\n</div>");

    html_page("Settings", &content)
}

fn text_field(content: &mut String, name: &str, label: &str, value: &str, description: &str) {
    content.push_str("<div class=\"form-group\">\n");
    content.push_str("<label class=\"form-label\" for=\"");
    content.push_str(name);
    content.push_str("\">");
    content.push_str(&html_escape(label));
    content.push_str("</label>\n<input type=\"text\" id=\"");
    content.push_str(name);
    content.push_str("\" name=\"");
    content.push_str(name);
    content.push_str("\" class=\"form-input\" value=\"");
    content.push_str(&html_escape(value));
    content.push_str("\">\n<p class=\"description\">");
    content.push_str(&html_escape(description));
    content.push_str("</p>\n</div>\n\n");
}

/// Renders a plain error page.
pub fn render_error_page(title: &str, description: &str) -> String {
    let mut content = String::with_capacity(512);

    content.push_str("<div class=\"card\">\n<div class=\"card-title\">");
    content.push_str(&html_escape(title));
    content.push_str("</div>\n<p>");
    content.push_str(&html_escape(description));
    content.push_str("</p>\n</div>");

    html_page(title, &content)
}

/// Simple HTML escaping to prevent XSS.
pub(crate) fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
