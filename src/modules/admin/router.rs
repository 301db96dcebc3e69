use axum::{
    Router, middleware,
    routing::{delete, get},
};

use crate::middleware::auth::enforce_auth;
use crate::state::AppState;

use super::controller::{
    dashboard, delete_project, list_projects, list_users, personal_info, submit_project,
    update_personal_info,
};

/// Back-office routes, mounted under `/admin`. Every route needs a login.
pub fn init_admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/projects", get(list_projects).post(submit_project))
        .route("/projects/{id}", delete(delete_project))
        .route("/personal-info", get(personal_info).put(update_personal_info))
        .route("/users", get(list_users))
        .route_layer(middleware::from_fn(enforce_auth))
}
