//! Status page shown on the landing URL.

use axum::extract::{Query, State};
use axum::response::Html;
use serde::Deserialize;

use super::state::AuthState;
use super::templates::render_status_page;
use crate::messages::Alert;

/// Query parameters of the landing URL.
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub code: Option<String>,
    /// Comma-separated error codes.
    #[serde(default)]
    pub errors: Option<String>,
}

/// GET / handler.
pub async fn status_page(
    State(state): State<AuthState>,
    Query(params): Query<StatusQuery>,
) -> Html<String> {
    let alert = Alert::from_query(params.code.as_deref(), params.errors.as_deref());
    Html(render_status_page(&alert, state.urls.site().as_str()))
}
