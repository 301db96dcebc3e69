use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{login_status, login_user, logout_user};

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_status).post(login_user))
        .route("/logout", post(logout_user))
}
