use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use eduhr_auth::SettingsRecord;
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// SAML service provider gateway
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Federated login settings record
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// Bootstrap configuration (initial administrator)
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        // Server validations
        if self.server.port == 0 {
            return Err("server.port must be > 0".into());
        }
        if let Some(base_url) = &self.server.base_url {
            let url = Url::parse(base_url).map_err(|e| format!("server.base_url is invalid: {e}"))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err("server.base_url must be an http(s) URL".into());
            }
        }
        if !self.server.admin_path.starts_with('/') {
            return Err("server.admin_path must start with '/'".into());
        }
        // Logging validation
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        // Gateway validation
        Url::parse(&self.gateway.base_url)
            .map_err(|e| format!("gateway.base_url is invalid: {e}"))?;
        if self.gateway.attribute_header_prefix.trim().is_empty() {
            return Err("gateway.attribute_header_prefix must not be empty".into());
        }
        if let Some(secret) = &self.gateway.proxy_secret {
            if secret.trim().is_empty() {
                return Err("gateway.proxy_secret must not be empty when set".into());
            }
            if axum::http::HeaderName::try_from(self.gateway.proxy_secret_header.as_str()).is_err() {
                return Err("gateway.proxy_secret_header is not a valid header name".into());
            }
            if self
                .gateway
                .proxy_secret_header
                .to_ascii_lowercase()
                .starts_with(&self.gateway.attribute_header_prefix.to_ascii_lowercase())
            {
                return Err(
                    "gateway.proxy_secret_header must not use the attribute header prefix".into(),
                );
            }
        }
        // Session validation
        if self.session.cookie_name.trim().is_empty() {
            return Err("session.cookie_name must not be empty".into());
        }
        if self.session.idle_timeout.is_zero() {
            return Err("session.idle_timeout must be > 0".into());
        }
        // Bootstrap validation
        if let Some(admin) = &self.bootstrap.admin_user {
            if admin.username.trim().is_empty() || admin.password.is_empty() {
                return Err("bootstrap.admin_user requires username and password".into());
            }
        }
        Ok(())
    }

    pub fn addr(&self) -> SocketAddr {
        let ip: std::net::IpAddr = self
            .server
            .host
            .parse()
            .unwrap_or(std::net::IpAddr::from([0, 0, 0, 0]));
        SocketAddr::new(ip, self.server.port)
    }

    /// Public site URL: `server.base_url`, or `http://{host}:{port}/`.
    pub fn site_url(&self) -> Result<Url, String> {
        let raw = match &self.server.base_url {
            Some(base) => base.clone(),
            None => format!("http://{}:{}/", self.server.host, self.server.port),
        };
        Url::parse(&raw).map_err(|e| format!("invalid site URL {raw}: {e}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of the site, used for landing and return URLs.
    /// If not set, defaults to http://{host}:{port}/
    #[serde(default)]
    pub base_url: Option<String>,
    /// Path of the admin dashboard administrators land on after login.
    #[serde(default = "default_admin_path")]
    pub admin_path: String,
    /// Set the `Secure` attribute on cookies (true behind TLS).
    #[serde(default)]
    pub secure_cookies: bool,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_admin_path() -> String {
    "/settings".into()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: None,
            admin_path: default_admin_path(),
            secure_cookies: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// SAML service provider gateway configuration.
///
/// The SP (SimpleSAMLphp) runs behind the same fronting proxy. Login and
/// logout go through its `as_login.php` / `as_logout.php` endpoints; released
/// attributes arrive as request headers the proxy injects.
///
/// Attribute headers decide who is logged in. The proxy must strip any
/// client-supplied header starting with `attribute_header_prefix`, otherwise
/// a browser can claim any identity. Set `proxy_secret` so attribute headers
/// are only read from requests that also carry the secret in
/// `proxy_secret_header`, a value only the proxy knows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the SP endpoints, e.g. https://site.hr/simplesaml/module.php/core/
    #[serde(default = "default_gateway_base_url")]
    pub base_url: String,
    /// Prefix of attribute headers, e.g. `x-saml-` for `x-saml-mail`.
    #[serde(default = "default_attribute_header_prefix")]
    pub attribute_header_prefix: String,
    /// Header the proxy sets to `proxy_secret` on every forwarded request.
    #[serde(default = "default_proxy_secret_header")]
    pub proxy_secret_header: String,
    /// Shared secret proving a request passed through the proxy.
    /// Prefer EDUHR__GATEWAY__PROXY_SECRET over the file.
    #[serde(default)]
    pub proxy_secret: Option<String>,
}

fn default_gateway_base_url() -> String {
    "http://localhost/simplesaml/module.php/core/".into()
}
fn default_attribute_header_prefix() -> String {
    "x-saml-".into()
}
fn default_proxy_secret_header() -> String {
    "x-eduhr-proxy-secret".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_gateway_base_url(),
            attribute_header_prefix: default_attribute_header_prefix(),
            proxy_secret_header: default_proxy_secret_header(),
            proxy_secret: None,
        }
    }
}

/// Where the federated login settings record lives.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SettingsConfig {
    /// JSON file holding the record. Kept in memory when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Record written on first start when no file exists yet.
    #[serde(default)]
    pub initial: SettingsRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    #[serde(default = "default_idle_timeout", with = "humantime_serde")]
    pub idle_timeout: Duration,
}

fn default_cookie_name() -> String {
    eduhr_auth::http::DEFAULT_SESSION_COOKIE.into()
}
fn default_idle_timeout() -> Duration {
    Duration::from_secs(8 * 60 * 60)
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            idle_timeout: default_idle_timeout(),
        }
    }
}

/// Bootstrap configuration for initial setup.
///
/// Env overrides:
/// - EDUHR__BOOTSTRAP__ADMIN_USER__USERNAME
/// - EDUHR__BOOTSTRAP__ADMIN_USER__PASSWORD
/// - EDUHR__BOOTSTRAP__ADMIN_USER__EMAIL
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BootstrapConfig {
    /// If set, creates an administrator on startup (if not already exists)
    #[serde(default)]
    pub admin_user: Option<AdminUserConfig>,
}

/// Configuration for bootstrapping an administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUserConfig {
    pub username: String,
    /// Plain text password (will be hashed).
    /// Prefer EDUHR__BOOTSTRAP__ADMIN_USER__PASSWORD over the file.
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Default configuration file.
    pub const DEFAULT_CONFIG_PATH: &str = "eduhr.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_PATH));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., EDUHR__SERVER__PORT=9090
        builder = builder.add_source(
            Environment::with_prefix("EDUHR")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
