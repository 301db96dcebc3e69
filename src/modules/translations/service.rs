use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use folio_cache::{FileCache, keys};
use folio_config::TranslationConfig;

/// Translation catalogue: dotted key to text.
pub type Catalogue = BTreeMap<String, String>;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").expect("valid placeholder pattern"));

const BUILTIN_EN: &[(&str, &str)] = &[
    ("admin.title", "Dashboard"),
    ("admin.welcome", "Welcome back, :name!"),
    ("errors.forbidden", "You do not have permission to access this page."),
    ("language.switched", "Language changed to :language."),
    ("login.error.invalid_credentials", "Invalid email or password."),
    ("login.logout_success", "You have been logged out."),
    ("login.remember_me", "Remember me"),
    ("login.title", "Log in"),
    ("nav.admin", "Admin"),
    ("nav.home", "Home"),
    ("nav.projects", "Projects"),
];

const BUILTIN_FR: &[(&str, &str)] = &[
    ("admin.title", "Tableau de bord"),
    ("admin.welcome", "Bon retour, :name !"),
    ("errors.forbidden", "Vous n'avez pas la permission d'accéder à cette page."),
    ("language.switched", "Langue changée en :language."),
    ("login.error.invalid_credentials", "Adresse e-mail ou mot de passe invalide."),
    ("login.logout_success", "Vous avez été déconnecté."),
    ("login.remember_me", "Se souvenir de moi"),
    ("login.title", "Connexion"),
    ("nav.admin", "Administration"),
    ("nav.home", "Accueil"),
    ("nav.projects", "Projets"),
];

fn builtin(language: &str) -> Option<Catalogue> {
    let table = match language {
        "en" => BUILTIN_EN,
        "fr" => BUILTIN_FR,
        _ => return None,
    };

    Some(
        table
            .iter()
            .map(|(key, text)| (key.to_string(), text.to_string()))
            .collect(),
    )
}

/// Flattens nested JSON objects into dotted keys. Non-string leaves are
/// rendered as JSON text.
fn flatten(prefix: &str, value: &Value, out: &mut Catalogue) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, out);
            }
        }
        Value::String(text) => {
            out.insert(prefix.to_string(), text.clone());
        }
        Value::Null => {}
        other => {
            out.insert(prefix.to_string(), other.to_string());
        }
    }
}

/// Replaces `:name` placeholders with their parameter; unknown names stay.
pub fn interpolate(text: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return text.to_string();
    }

    PLACEHOLDER
        .replace_all(text, |caps: &Captures| {
            let name = &caps[1];
            params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Looks up UI strings per language.
///
/// Catalogues come from the cache, then `{TRANSLATIONS_DIR}/{lang}.json`,
/// then the built-in English and French tables.
#[derive(Clone, Debug)]
pub struct TranslationService {
    cache: FileCache,
    config: TranslationConfig,
}

impl TranslationService {
    pub fn new(cache: FileCache, config: TranslationConfig) -> Self {
        Self { cache, config }
    }

    fn catalogue_path(&self, language: &str) -> Option<PathBuf> {
        let dir = self.config.dir.as_ref()?;
        // Codes are two ASCII letters; anything else never touches the disk.
        let safe = language.len() == 2 && language.chars().all(|c| c.is_ascii_lowercase());
        safe.then(|| dir.join(format!("{language}.json")))
    }

    async fn load_file(&self, language: &str) -> Option<Catalogue> {
        let path = self.catalogue_path(language)?;
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No translation file");
                return None;
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => {
                let mut catalogue = Catalogue::new();
                flatten("", &value, &mut catalogue);
                Some(catalogue)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Translation file is not valid JSON");
                None
            }
        }
    }

    /// Every string for `language`. Languages without a catalogue get the
    /// default language's built-in table.
    #[instrument(skip(self))]
    pub async fn all(&self, language: &str) -> Catalogue {
        let key = keys::translations(language);
        if let Some(cached) = self.cache.get::<Catalogue>(&key).await {
            return cached;
        }

        let catalogue = match self.load_file(language).await {
            Some(catalogue) => catalogue,
            None => builtin(language)
                .or_else(|| builtin(&self.config.default_language))
                .or_else(|| builtin("en"))
                .unwrap_or_default(),
        };

        self.cache
            .set(&key, &catalogue, Some(keys::TRANSLATIONS_TTL))
            .await;
        catalogue
    }

    /// Translated text for `key`, or the key itself when it is missing.
    pub async fn translate(&self, language: &str, key: &str, params: &[(&str, &str)]) -> String {
        match self.all(language).await.get(key) {
            Some(text) => interpolate(text, params),
            None => key.to_string(),
        }
    }

    pub async fn has(&self, language: &str, key: &str) -> bool {
        self.all(language).await.contains_key(key)
    }

    /// Drops one cached catalogue, or all of them.
    pub async fn clear_cache(&self, language: Option<&str>) -> bool {
        match language {
            Some(language) => self.cache.delete(&keys::translations(language)).await,
            None => self.cache.clear(Some(keys::TRANSLATIONS_PREFIX)).await,
        }
    }
}
