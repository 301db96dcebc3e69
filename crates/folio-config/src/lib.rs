//! # Folio Config
//!
//! Configuration for the Folio portfolio, loaded once from the environment.
//!
//! - [`manager`]: the [`ConfigManager`] singleton and per-consumer [`ConfigView`]s
//! - [`app`]: application, session and CORS settings
//! - [`cache`]: file cache location and default TTL
//! - [`database`]: Postgres connection URL
//! - [`jwt`]: token secret, cookie name and lifetimes
//! - [`language`]: supported languages and translation catalogue location
//!
//! Each typed config is built from the view granted to its consumer, so a
//! component only ever sees the variables it is allowed to read:
//!
//! ```ignore
//! use folio_config::{CacheConfig, ConfigConsumer, ConfigManager};
//!
//! let manager = ConfigManager::global();
//! let cache = CacheConfig::from_view(&manager.config_for(ConfigConsumer::CacheService)?);
//! ```

pub mod app;
pub mod cache;
pub mod database;
pub mod jwt;
pub mod language;
pub mod manager;

// Re-export commonly used types at crate root
pub use app::{AppConfig, CorsConfig, SessionConfig};
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use jwt::JwtConfig;
pub use language::{LanguageConfig, TranslationConfig};
pub use manager::{ConfigConsumer, ConfigManager, ConfigView};

/// Configuration failures. These abort start-up.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Consumer '{0}' is not authorized to access configuration")]
    Unauthorized(&'static str),

    #[error("Missing required configuration value {key} for {consumer}")]
    Missing {
        key: &'static str,
        consumer: &'static str,
    },

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}
