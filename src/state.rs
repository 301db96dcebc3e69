use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use folio_auth::TokenService;
use folio_cache::FileCache;
use folio_config::{
    AppConfig, CacheConfig, ConfigConsumer, ConfigManager, DatabaseConfig, JwtConfig,
    LanguageConfig, TranslationConfig,
};
use folio_db::init_db_pool;

use crate::middleware::auth::AuthResolver;
use crate::middleware::language::{LanguageResolver, LanguageSource, PgLanguageSource};
use crate::modules::translations::TranslationService;
use crate::modules::users::{PgUserStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub app_config: AppConfig,
    pub cache: FileCache,
    pub auth: AuthResolver,
    pub users: Arc<dyn UserStore>,
    pub languages: LanguageResolver,
    pub translations: TranslationService,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("app_config", &self.app_config)
            .field("cache", &self.cache)
            .field("languages", &self.languages)
            .finish_non_exhaustive()
    }
}

/// Typed configuration for every component, read once at start-up.
#[derive(Clone, Debug)]
pub struct Settings {
    pub app: AppConfig,
    pub cache: CacheConfig,
    pub jwt: JwtConfig,
    pub language: LanguageConfig,
    pub translation: TranslationConfig,
}

impl Settings {
    pub fn load(manager: &ConfigManager) -> anyhow::Result<Self> {
        Ok(Self {
            app: AppConfig::from_view(&manager.config_for(ConfigConsumer::Application)?),
            cache: CacheConfig::from_view(&manager.config_for(ConfigConsumer::CacheService)?),
            jwt: JwtConfig::from_view(&manager.config_for(ConfigConsumer::TokenService)?)?,
            language: LanguageConfig::from_view(
                &manager.config_for(ConfigConsumer::LanguageResolver)?,
            ),
            translation: TranslationConfig::from_view(
                &manager.config_for(ConfigConsumer::TranslationService)?,
            ),
        })
    }
}

impl AppState {
    /// Wires the components together around the given stores.
    pub fn new(
        settings: Settings,
        users: Arc<dyn UserStore>,
        language_source: Arc<dyn LanguageSource>,
    ) -> Self {
        let cache = FileCache::from_config(&settings.cache);
        let auth = AuthResolver::new(
            TokenService::new(settings.jwt),
            cache.clone(),
            users.clone(),
        );
        let languages = LanguageResolver::new(cache.clone(), settings.language, language_source);
        let translations = TranslationService::new(cache.clone(), settings.translation);

        Self {
            app_config: settings.app,
            cache,
            auth,
            users,
            languages,
            translations,
        }
    }
}

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let manager = ConfigManager::global();
    let settings = Settings::load(manager)?;

    let database = DatabaseConfig::from_view(&manager.config_for(ConfigConsumer::Database)?)?;
    let pool = init_db_pool(&database).context("Invalid database configuration")?;

    info!(
        env = %settings.app.env,
        cache_dir = %settings.cache.dir.display(),
        "Application state initialised"
    );

    Ok(AppState::new(
        settings,
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgLanguageSource::new(pool)),
    ))
}
