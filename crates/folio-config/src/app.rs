//! Application-level settings: bind address, session cookie and CORS.

use crate::ConfigView;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub env: String,
    pub debug: bool,
    pub url: String,
    pub bind_addr: String,
    pub static_url: String,
    pub session: SessionConfig,
    pub cors: CorsConfig,
}

impl AppConfig {
    pub fn from_view(view: &ConfigView) -> Self {
        let url = view.get_or("APP_URL", "http://localhost:3000");
        Self {
            env: view.get_or("APP_ENV", "development"),
            debug: view.get_bool("APP_DEBUG", false),
            bind_addr: view.get_or("APP_BIND_ADDR", "0.0.0.0:3000"),
            static_url: view.get_or("STATIC_URL", "/assets"),
            session: SessionConfig::from_view(view),
            cors: CorsConfig::from_view(view, &url),
            url,
        }
    }

    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Send the session cookie over HTTPS only.
    pub secure: bool,
    pub idle_minutes: i64,
    /// Upper bound on sessions held in memory.
    pub max_entries: u64,
}

impl SessionConfig {
    pub fn from_view(view: &ConfigView) -> Self {
        Self {
            secure: view.get_bool("SESSION_SECURE", false),
            idle_minutes: view.get_int("SESSION_IDLE_MINUTES", 120).max(1),
            max_entries: view.get_int("SESSION_MAX_ENTRIES", 10_000).max(1) as u64,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secure: false,
            idle_minutes: 120,
            max_entries: 10_000,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    fn from_view(view: &ConfigView, app_url: &str) -> Self {
        let allowed_origins = view
            .get_or("CORS_ALLOWED_ORIGINS", app_url)
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self { allowed_origins }
    }
}
