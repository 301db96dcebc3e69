use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::get_translations;

pub fn init_translations_router() -> Router<AppState> {
    Router::new().route("/translations", get(get_translations))
}
