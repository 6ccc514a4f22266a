use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{Json, Router, routing::get};
use eduhr_auth::http::{AuthState, CookieSettings, auth_router};
use eduhr_auth::routing::SiteUrls;
use eduhr_auth::storage::SettingsStore;
use eduhr_auth_memory::{
    FileSettingsStore, MemoryAccountStore, MemorySessionStore, MemorySettingsStore,
};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::bootstrap::bootstrap_admin;
use crate::config::AppConfig;
use crate::gateway::SspGatewayClient;

pub struct EduhrServer {
    addr: SocketAddr,
    app: Router,
}

pub fn build_app(state: AuthState) -> Router {
    auth_router(state)
        .route("/healthz", get(healthz))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.target = %req.uri().path(),
                        http.status_code = Empty,
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
}

async fn healthz() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Wires stores, the gateway client and URLs from the configuration.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AuthState> {
    let accounts = Arc::new(MemoryAccountStore::new());
    let sessions = Arc::new(MemorySessionStore::new(cfg.session.idle_timeout));

    let initial = cfg.settings.initial.clone().sanitized();
    let settings: Arc<dyn SettingsStore> = match &cfg.settings.path {
        Some(path) => {
            let store = FileSettingsStore::new(path);
            if store.seed(&initial).await? {
                tracing::info!(path = %path.display(), "Settings file created from configuration");
            }
            Arc::new(store)
        }
        None => Arc::new(MemorySettingsStore::new(initial)),
    };

    if let Some(admin) = &cfg.bootstrap.admin_user {
        bootstrap_admin(accounts.as_ref(), admin).await?;
    }

    let idp = Arc::new(SspGatewayClient::from_config(&cfg.gateway)?);

    let site = cfg.site_url().map_err(anyhow::Error::msg)?;
    let admin = site
        .join(cfg.server.admin_path.trim_start_matches('/'))
        .context("invalid server.admin_path")?;
    let urls = SiteUrls::new(site, admin);

    let cookies = CookieSettings {
        session_cookie: cfg.session.cookie_name.clone(),
        secure: cfg.server.secure_cookies,
        session_ttl: cfg.session.idle_timeout,
    };

    Ok(AuthState::new(accounts, sessions, settings, idp, urls).with_cookies(cookies))
}

pub struct ServerBuilder {
    addr: SocketAddr,
    config: AppConfig,
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ServerBuilder {
    pub fn new() -> Self {
        let cfg = AppConfig::default();
        Self {
            addr: cfg.addr(),
            config: cfg,
        }
    }

    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_config(mut self, cfg: AppConfig) -> Self {
        self.addr = cfg.addr();
        self.config = cfg;
        self
    }

    pub async fn build(self) -> anyhow::Result<EduhrServer> {
        let state = build_state(&self.config).await?;
        tracing::info!(
            site = %state.urls.site(),
            admin = %state.urls.admin(),
            "Federated login wired"
        );

        Ok(EduhrServer {
            addr: self.addr,
            app: build_app(state),
        })
    }
}

impl EduhrServer {
    pub async fn run(self) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
