#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use folio::folio_config::ConfigManager;
use folio::middleware::language::StaticLanguageSource;
use folio::modules::users::{MemoryUserStore, User};
use folio::router::init_router;
use folio::state::{AppState, Settings};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-secret-key-at-least-32-characters-long";
pub const TOKEN_NAME: &str = "portfolio_token";
pub const REFRESH_NAME: &str = "portfolio_token_refresh";
pub const SESSION_COOKIE: &str = "id";
pub const PASSWORD: &str = "correct horse battery";

/// Well-known role IDs of the built-in role table
pub mod roles {
    pub const ADMIN: i64 = 1;
    pub const MANAGER: i64 = 2;
    pub const EDITOR: i64 = 3;
    pub const USER: i64 = 4;
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub users: MemoryUserStore,
    _cache_dir: TempDir,
}

pub fn test_user(id: i64, email: &str, role_id: i64) -> User {
    User {
        id,
        user_name: format!("user{id}"),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: email.to_string(),
        // Low cost keeps the suite fast; verification reads the cost from the hash.
        password_hash: bcrypt::hash(PASSWORD, 4).unwrap(),
        role_id,
        profile_picture_url: None,
        created_at: chrono::Utc::now(),
    }
}

/// Router over an in-memory user store, a static `en,fr` language list and a
/// throwaway cache directory.
pub fn test_app(users: Vec<User>) -> TestApp {
    let cache_dir = TempDir::new().unwrap();
    let cache_path = cache_dir.path().to_string_lossy().to_string();

    let manager = ConfigManager::from_vars([
        ("JWT_SECRET", JWT_SECRET),
        ("JWT_NAME", TOKEN_NAME),
        ("JWT_EXPIRY", "1800"),
        ("JWT_REFRESH_EXPIRY", "604800"),
        ("JWT_REFRESH_WINDOW", "300"),
        ("CACHE_DIR", cache_path.as_str()),
        ("DEFAULT_LANGUAGE", "en"),
        ("AVAILABLE_LANGUAGES", "en,fr"),
        ("APP_URL", "http://localhost:3000"),
    ]);
    let settings = Settings::load(&manager).unwrap();

    let store = MemoryUserStore::with_users(users);
    let state = AppState::new(
        settings,
        Arc::new(store.clone()),
        Arc::new(StaticLanguageSource(vec!["en".to_string(), "fr".to_string()])),
    );

    TestApp {
        router: init_router(state.clone()),
        state,
        users: store,
        _cache_dir: cache_dir,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    /// Raw `Set-Cookie` header for `name`, if the response sets it.
    pub fn set_cookie(&self, name: &str) -> Option<String> {
        let prefix = format!("{name}=");
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find(|value| value.starts_with(&prefix))
            .map(str::to_string)
    }

    /// Value of cookie `name` as set by the response.
    pub fn cookie_value(&self, name: &str) -> Option<String> {
        let raw = self.set_cookie(name)?;
        let pair = raw.split(';').next()?;
        pair.split_once('=').map(|(_, value)| value.to_string())
    }
}

pub async fn send(app: &TestApp, request: Request<Body>) -> TestResponse {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    TestResponse {
        status,
        headers,
        body,
    }
}

pub fn get(uri: &str) -> axum::http::request::Builder {
    Request::builder().method("GET").uri(uri)
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// `Cookie` header value from name/value pairs.
pub fn cookie_header(pairs: &[(&str, &str)]) -> String {
    pairs
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ")
}
