//! HTTP handlers for federated login.
//!
//! # Routes
//!
//! | method | path | handler |
//! |---|---|---|
//! | GET | `/` | [`status::status_page`] |
//! | GET, POST | `/login` | [`login::login_get`], [`login::login_post`] |
//! | GET | `/logout` | [`logout::logout`] |
//! | GET | `/lost-password`, `/reset-password` | [`disabled::password_reset`] |
//! | GET | `/register` | [`disabled::register`] |
//! | GET, POST | `/settings` | [`settings::settings_get`], [`settings::settings_post`] |
//! | GET | `/settings/notice` | [`settings::settings_notice`] |

pub mod admin;
pub mod disabled;
pub mod login;
pub mod logout;
pub mod settings;
pub mod state;
pub mod status;
pub mod templates;

use axum::Router;
use axum::routing::get;

pub use admin::SettingsAdmin;
pub use state::{AuthState, CookieSettings, DEFAULT_SESSION_COOKIE};

/// Builds the router for every federated login route.
pub fn auth_router(state: AuthState) -> Router {
    Router::new()
        .route("/", get(status::status_page))
        .route("/login", get(login::login_get).post(login::login_post))
        .route("/logout", get(logout::logout))
        .route("/lost-password", get(disabled::password_reset))
        .route("/reset-password", get(disabled::password_reset))
        .route("/register", get(disabled::register))
        .route(
            "/settings",
            get(settings::settings_get).post(settings::settings_post),
        )
        .route("/settings/notice", get(settings::settings_notice))
        .with_state(state)
}
