//! Process-wide configuration store with a per-consumer allowlist.
//!
//! The environment is read once (`.env` through dotenvy, then the process
//! environment) into a [`ConfigManager`]. Components never read variables
//! directly: they ask for a [`ConfigView`] scoped to their
//! [`ConfigConsumer`] and build their typed config from it.
//!
//! ```ignore
//! use folio_config::{ConfigConsumer, ConfigManager, JwtConfig};
//!
//! let view = ConfigManager::global().config_for(ConfigConsumer::TokenService)?;
//! let jwt = JwtConfig::from_view(&view)?;
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use tracing::{debug, warn};

use crate::ConfigError;

static INSTANCE: OnceLock<ConfigManager> = OnceLock::new();

/// Components allowed to read configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigConsumer {
    Application,
    Database,
    TokenService,
    CacheService,
    LanguageResolver,
    TranslationService,
    Cli,
}

impl ConfigConsumer {
    pub const fn name(self) -> &'static str {
        match self {
            ConfigConsumer::Application => "application",
            ConfigConsumer::Database => "database",
            ConfigConsumer::TokenService => "token_service",
            ConfigConsumer::CacheService => "cache_service",
            ConfigConsumer::LanguageResolver => "language_resolver",
            ConfigConsumer::TranslationService => "translation_service",
            ConfigConsumer::Cli => "cli",
        }
    }

    /// Consumer whose allowlist applies when this one has no entry of its own.
    pub const fn parent(self) -> Option<ConfigConsumer> {
        match self {
            ConfigConsumer::Cli => Some(ConfigConsumer::CacheService),
            _ => None,
        }
    }
}

impl std::fmt::Display for ConfigConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const APPLICATION_KEYS: &[&str] = &[
    "APP_ENV",
    "APP_DEBUG",
    "APP_URL",
    "APP_BIND_ADDR",
    "STATIC_URL",
    "DEFAULT_LANGUAGE",
    "CORS_ALLOWED_ORIGINS",
    "SESSION_SECURE",
    "SESSION_IDLE_MINUTES",
    "SESSION_MAX_ENTRIES",
];
const DATABASE_KEYS: &[&str] = &[
    "DATABASE_URL",
    "DB_HOST",
    "DB_USER",
    "DB_PASSWORD",
    "DB_NAME",
    "DB_PORT",
];
const TOKEN_KEYS: &[&str] = &[
    "JWT_SECRET",
    "JWT_NAME",
    "JWT_EXPIRY",
    "JWT_REFRESH_EXPIRY",
    "JWT_REFRESH_WINDOW",
];
const CACHE_KEYS: &[&str] = &["CACHE_DIR", "CACHE_TTL", "CACHE_ENABLED"];
const LANGUAGE_KEYS: &[&str] = &["DEFAULT_LANGUAGE", "AVAILABLE_LANGUAGES"];
const TRANSLATION_KEYS: &[&str] = &["DEFAULT_LANGUAGE", "AVAILABLE_LANGUAGES", "TRANSLATIONS_DIR"];

fn default_access_map() -> HashMap<ConfigConsumer, &'static [&'static str]> {
    HashMap::from([
        (ConfigConsumer::Application, APPLICATION_KEYS),
        (ConfigConsumer::Database, DATABASE_KEYS),
        (ConfigConsumer::TokenService, TOKEN_KEYS),
        (ConfigConsumer::CacheService, CACHE_KEYS),
        (ConfigConsumer::LanguageResolver, LANGUAGE_KEYS),
        (ConfigConsumer::TranslationService, TRANSLATION_KEYS),
    ])
}

/// Holds every loaded variable and decides who may see which.
#[derive(Debug)]
pub struct ConfigManager {
    variables: HashMap<String, String>,
    access_map: HashMap<ConfigConsumer, &'static [&'static str]>,
}

impl ConfigManager {
    /// Returns the process-wide instance, loading the environment on first use.
    pub fn global() -> &'static ConfigManager {
        INSTANCE.get_or_init(|| {
            if let Err(e) = dotenvy::dotenv() {
                debug!(error = %e, "No .env file loaded");
            }
            Self::from_vars(std::env::vars())
        })
    }

    /// Builds a standalone manager from explicit variables.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            variables: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            access_map: default_access_map(),
        }
    }

    /// Returns a read-only view of the variables `consumer` may read.
    ///
    /// Falls back to the parent consumer's allowlist when `consumer` has no
    /// entry of its own.
    pub fn config_for(&self, consumer: ConfigConsumer) -> Result<ConfigView, ConfigError> {
        let Some((granted_as, allowed_keys)) = self.allowed_keys(consumer) else {
            warn!(consumer = %consumer, "Unauthorized config access attempt");
            return Err(ConfigError::Unauthorized(consumer.name()));
        };

        let mut variables = BTreeMap::new();
        for key in allowed_keys {
            match self.variables.get(*key) {
                Some(value) => {
                    variables.insert((*key).to_string(), value.clone());
                }
                None => {
                    debug!(key = %key, consumer = %consumer, "Missing configuration value");
                }
            }
        }

        Ok(ConfigView {
            consumer: Some(granted_as),
            variables,
        })
    }

    /// Whether `key` was present in the loaded environment.
    pub fn has_variable(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    fn allowed_keys(
        &self,
        consumer: ConfigConsumer,
    ) -> Option<(ConfigConsumer, &'static [&'static str])> {
        if let Some(keys) = self.access_map.get(&consumer) {
            return Some((consumer, *keys));
        }
        let parent = consumer.parent()?;
        self.access_map.get(&parent).map(|keys| (parent, *keys))
    }
}

/// Immutable subset of the configuration handed to one consumer.
#[derive(Debug, Clone, Default)]
pub struct ConfigView {
    consumer: Option<ConfigConsumer>,
    variables: BTreeMap<String, String>,
}

impl ConfigView {
    /// View over arbitrary values, bypassing the allowlist. Used by tests and
    /// callers that assemble configuration by hand.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            consumer: None,
            variables: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The allowlist entry this view was granted under.
    pub fn consumer(&self) -> Option<ConfigConsumer> {
        self.consumer
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Integer value, or `default` when absent or not numeric.
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        self.get(key)
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Boolean value (`true/1/yes/on`, `false/0/no/off`), or `default`.
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key).map(|v| v.trim().to_ascii_lowercase()) {
            Some(v) if matches!(v.as_str(), "true" | "1" | "yes" | "on") => true,
            Some(v) if matches!(v.as_str(), "false" | "0" | "no" | "off") => false,
            _ => default,
        }
    }

    pub fn has(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn all(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    pub(crate) fn require(&self, key: &'static str) -> Result<&str, ConfigError> {
        self.get(key)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::Missing {
                key,
                consumer: self.consumer.map(ConfigConsumer::name).unwrap_or("manual"),
            })
    }
}
