//! Maintenance commands behind `folio-cli`.
//!
//! The binary only parses arguments and prints; the work happens here so it
//! can be tested without a terminal.

use folio_cache::FileCache;
use folio_config::{CacheConfig, ConfigConsumer, ConfigError, ConfigManager, DatabaseConfig};
use folio_db::{init_db_pool, run_migrations};

/// Variables the server needs, and whether start-up fails without them.
pub const CHECKED_VARIABLES: &[(&str, bool)] = &[
    ("JWT_SECRET", true),
    ("DATABASE_URL", false),
    ("DB_HOST", false),
    ("DB_NAME", false),
    ("APP_URL", false),
    ("DEFAULT_LANGUAGE", false),
    ("AVAILABLE_LANGUAGES", false),
    ("CACHE_DIR", false),
    ("TRANSLATIONS_DIR", false),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableStatus {
    pub key: &'static str,
    pub present: bool,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigReport {
    pub variables: Vec<VariableStatus>,
    pub database_configured: bool,
}

impl ConfigReport {
    /// True when nothing the server needs at start-up is missing.
    pub fn is_ok(&self) -> bool {
        self.database_configured
            && self
                .variables
                .iter()
                .all(|status| status.present || !status.required)
    }
}

pub fn check_config(manager: &ConfigManager) -> ConfigReport {
    let variables: Vec<VariableStatus> = CHECKED_VARIABLES
        .iter()
        .map(|&(key, required)| VariableStatus {
            key,
            present: manager.has_variable(key),
            required,
        })
        .collect();

    let database_configured = manager.has_variable("DATABASE_URL")
        || (manager.has_variable("DB_HOST") && manager.has_variable("DB_NAME"));

    ConfigReport {
        variables,
        database_configured,
    }
}

/// Cache configured for the CLI consumer.
pub fn cli_cache(manager: &ConfigManager) -> Result<FileCache, ConfigError> {
    let view = manager.config_for(ConfigConsumer::Cli)?;
    Ok(FileCache::from_config(&CacheConfig::from_view(&view)))
}

/// Connects with the database settings and applies pending migrations.
pub async fn migrate_database(manager: &ConfigManager) -> anyhow::Result<()> {
    let config = DatabaseConfig::from_view(&manager.config_for(ConfigConsumer::Database)?)?;
    let pool = init_db_pool(&config)?;
    run_migrations(&pool).await?;
    Ok(())
}
