use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{list_languages, switch_language};

pub fn init_language_router() -> Router<AppState> {
    Router::new().route("/language/{code}", get(switch_language))
}

/// Mounted under `/api`.
pub fn init_language_api_router() -> Router<AppState> {
    Router::new().route("/languages", get(list_languages))
}
