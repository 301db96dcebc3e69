use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::logging::logging_middleware;
use crate::middleware::auth::authenticate;
use crate::middleware::language::localize;
use crate::modules::admin::init_admin_router;
use crate::modules::auth::init_auth_router;
use crate::modules::language::{init_language_api_router, init_language_router};
use crate::modules::pages::init_pages_router;
use crate::modules::translations::init_translations_router;
use crate::session::session_layer;
use crate::state::AppState;

/// Builds the application router.
///
/// Requests pass, outermost first: request logging, HTTP trace span, CORS,
/// session, [`authenticate`], [`localize`], then the route.
pub fn init_router(state: AppState) -> Router {
    let allowed_origins: Vec<HeaderValue> = state
        .app_config
        .cors
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true);

    Router::new()
        .merge(init_pages_router())
        .merge(init_auth_router())
        .merge(init_language_router())
        .nest("/admin", init_admin_router())
        .nest(
            "/api",
            Router::new()
                .merge(init_language_api_router())
                .merge(init_translations_router()),
        )
        .layer(middleware::from_fn_with_state(state.clone(), localize))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate))
        .layer(session_layer(&state.app_config.session))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}
