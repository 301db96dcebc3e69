//! # Folio DB
//!
//! Postgres pool initialisation.
//!
//! The pool connects lazily: the site keeps serving public pages (and the
//! cached identity data) while the database is unreachable, and individual
//! queries fail instead of start-up.
//!
//! ```ignore
//! use folio_config::{ConfigConsumer, ConfigManager, DatabaseConfig};
//! use folio_db::init_db_pool;
//!
//! let view = ConfigManager::global().config_for(ConfigConsumer::Database)?;
//! let pool = init_db_pool(&DatabaseConfig::from_view(&view)?)?;
//! ```

use folio_config::DatabaseConfig;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// Schema migrations shipped in the repository's `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Builds a lazily connecting Postgres pool.
///
/// # Errors
///
/// Returns an error only when the URL cannot be parsed.
pub fn init_db_pool(config: &DatabaseConfig) -> Result<sqlx::PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect_lazy(&config.url)?;

    info!(max_connections = config.max_connections, "Database pool initialised");

    Ok(pool)
}

/// Applies pending migrations.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    info!(migrations = MIGRATOR.migrations.len(), "Database migrations applied");
    Ok(())
}

// Re-export PgPool for convenience
pub use sqlx::PgPool;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_migration_is_embedded() {
        let first = MIGRATOR.migrations.first().expect("embedded migration");
        assert_eq!(first.version, 1);
        assert_eq!(first.description, "init");
    }

    #[test]
    fn test_lazy_pool_rejects_malformed_url() {
        let config = DatabaseConfig {
            url: "not a url".to_string(),
            max_connections: 2,
        };
        assert!(init_db_pool(&config).is_err());
    }
}
