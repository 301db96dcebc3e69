use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{forbidden, health, home, localized_home};

pub fn init_pages_router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .route("/403", get(forbidden))
        .route("/{lang}", get(localized_home))
}
