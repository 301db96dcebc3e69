//! Locale resolution.
//!
//! The language of a request is taken from the first of these that names a
//! supported code:
//!
//! 1. `?lang=xx`
//! 2. the `language` session value
//! 3. the URL path (`/fr/...`, or words like `english`/`français`)
//! 4. `Accept-Language`, by descending quality
//! 5. the configured default
//!
//! Whatever wins is written back to the session so the next request
//! short-circuits at step 2.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Query, Request, State},
    http::{HeaderMap, Uri, header},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tower_sessions::Session;
use tracing::{debug, instrument, warn};

use folio_cache::{FileCache, keys};
use folio_config::LanguageConfig;

use crate::context::{Identity, RequestContext};
use crate::session::SessionKeys;
use crate::state::AppState;

/// Where the resolved language came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedFrom {
    Query,
    Session,
    Path,
    AcceptLanguage,
    Default,
}

/// Supplies the list of active languages.
#[async_trait]
pub trait LanguageSource: Send + Sync {
    async fn active_languages(&self) -> anyhow::Result<Vec<String>>;
}

/// Reads active codes from the `languages` table.
#[derive(Clone, Debug)]
pub struct PgLanguageSource {
    pool: PgPool,
}

impl PgLanguageSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LanguageSource for PgLanguageSource {
    async fn active_languages(&self) -> anyhow::Result<Vec<String>> {
        let codes = sqlx::query_scalar::<_, String>(
            "SELECT code FROM languages WHERE active ORDER BY position, code",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }
}

/// A fixed list, for tests and database-less runs.
#[derive(Clone, Debug, Default)]
pub struct StaticLanguageSource(pub Vec<String>);

#[async_trait]
impl LanguageSource for StaticLanguageSource {
    async fn active_languages(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.0.clone())
    }
}

/// Raw language hints carried by one request.
#[derive(Debug, Clone, Default)]
pub struct LanguageSignals {
    pub query: Option<String>,
    pub session: Option<String>,
    pub path: String,
    pub accept_language: Option<String>,
}

#[derive(Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

impl LanguageSignals {
    pub fn from_request(uri: &Uri, headers: &HeaderMap, session: Option<String>) -> Self {
        let query = Query::<LangQuery>::try_from_uri(uri)
            .ok()
            .and_then(|Query(q)| q.lang);

        Self {
            query,
            session,
            path: uri.path().to_string(),
            accept_language: headers
                .get(header::ACCEPT_LANGUAGE)
                .and_then(|value| value.to_str().ok())
                .map(str::to_string),
        }
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_ascii_lowercase()
}

fn is_supported(code: &str, available: &[String]) -> bool {
    available.iter().any(|supported| supported == code)
}

/// Parses an `Accept-Language` value into `(tag, quality)` pairs, highest
/// quality first. A missing `q` counts as 1.0, an unparsable one as 0.0.
/// Equal qualities keep their header order.
pub fn parse_accept_language(header: &str) -> Vec<(String, f32)> {
    let mut entries: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() {
                return None;
            }

            let quality = pieces
                .filter_map(|param| param.trim().strip_prefix("q="))
                .map(|q| q.trim().parse::<f32>().ok().filter(|q| q.is_finite()).unwrap_or(0.0))
                .next_back()
                .unwrap_or(1.0);

            Some((tag.to_string(), quality))
        })
        .collect();

    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    entries
}

/// First language tag whose two-letter primary subtag is supported.
fn language_from_accept_header(header: &str, available: &[String]) -> Option<String> {
    parse_accept_language(header)
        .into_iter()
        .filter_map(|(tag, _)| tag.get(..2).map(normalize))
        .find(|code| is_supported(code, available))
}

/// Substrings that hint at a language anywhere in a path, in priority order.
const PATH_HINTS: &[(&str, &[&str])] = &[
    ("en", &["en", "english"]),
    ("fr", &["fr", "french", "francais", "français"]),
];

/// Language named by the path: a leading two-letter segment, or any
/// case-insensitive substring hinting at a supported language.
fn language_from_path(path: &str, available: &[String]) -> Option<String> {
    let first = path.trim_start_matches('/').split('/').next().unwrap_or("");
    if first.len() == 2 {
        let code = normalize(first);
        if is_supported(&code, available) {
            return Some(code);
        }
    }

    let lowered = path.to_lowercase();
    PATH_HINTS
        .iter()
        .find(|(code, hints)| {
            is_supported(code, available) && hints.iter().any(|hint| lowered.contains(hint))
        })
        .map(|(code, _)| code.to_string())
}

/// Rewrites the language segment of `path` to `target`.
///
/// A supported two-letter first segment is replaced; otherwise `target` is
/// prefixed. `/` becomes `/{target}`.
pub fn language_url(path: &str, target: &str, available: &[String]) -> String {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty() {
        return format!("/{target}");
    }

    let (first, rest) = trimmed.split_once('/').unwrap_or((trimmed, ""));
    if first.len() == 2 && is_supported(&normalize(first), available) {
        if rest.is_empty() {
            format!("/{target}")
        } else {
            format!("/{target}/{rest}")
        }
    } else {
        format!("/{target}/{trimmed}")
    }
}

#[derive(Clone)]
pub struct LanguageResolver {
    cache: FileCache,
    config: LanguageConfig,
    source: Arc<dyn LanguageSource>,
}

impl std::fmt::Debug for LanguageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LanguageResolver {
    pub fn new(cache: FileCache, config: LanguageConfig, source: Arc<dyn LanguageSource>) -> Self {
        Self {
            cache,
            config,
            source,
        }
    }

    pub fn config(&self) -> &LanguageConfig {
        &self.config
    }

    /// Supported language codes, cached for an hour.
    ///
    /// Falls back to `AVAILABLE_LANGUAGES` when the source fails or is empty.
    #[instrument(skip(self))]
    pub async fn available_languages(&self) -> Vec<String> {
        let key = keys::available_languages();
        if let Some(cached) = self.cache.get::<Vec<String>>(&key).await
            && !cached.is_empty()
        {
            return cached;
        }

        let mut languages: Vec<String> = Vec::new();
        match self.source.active_languages().await {
            Ok(codes) => {
                for code in codes.iter().map(|c| normalize(c)) {
                    if !code.is_empty() && !languages.contains(&code) {
                        languages.push(code);
                    }
                }
            }
            Err(e) => warn!(error = %e, "Failed to load languages, using configured list"),
        }

        if languages.is_empty() {
            languages = self.config.available_languages.clone();
        }

        self.cache
            .set(&key, &languages, Some(keys::AVAILABLE_LANGUAGES_TTL))
            .await;
        languages
    }

    /// Configured default if supported, else the first supported language,
    /// else `en`.
    pub fn default_language(&self, available: &[String]) -> String {
        let configured = normalize(&self.config.default_language);
        if is_supported(&configured, available) {
            return configured;
        }

        available
            .first()
            .cloned()
            .unwrap_or_else(|| "en".to_string())
    }

    pub fn is_supported(&self, code: &str, available: &[String]) -> bool {
        is_supported(&normalize(code), available)
    }

    /// Picks the request language. Pure: no I/O, no session writes.
    pub fn resolve(&self, signals: &LanguageSignals, available: &[String]) -> (String, ResolvedFrom) {
        let supported = |code: &Option<String>| {
            code.as_deref()
                .map(normalize)
                .filter(|code| is_supported(code, available))
        };

        if let Some(code) = supported(&signals.query) {
            return (code, ResolvedFrom::Query);
        }

        if let Some(code) = supported(&signals.session) {
            return (code, ResolvedFrom::Session);
        }

        if let Some(code) = language_from_path(&signals.path, available) {
            return (code, ResolvedFrom::Path);
        }

        if let Some(code) = signals
            .accept_language
            .as_deref()
            .and_then(|header| language_from_accept_header(header, available))
        {
            return (code, ResolvedFrom::AcceptLanguage);
        }

        (self.default_language(available), ResolvedFrom::Default)
    }

    pub async fn language_url(&self, path: &str, target: &str) -> String {
        language_url(path, target, &self.available_languages().await)
    }
}

/// Resolves the request language and publishes the [`RequestContext`].
///
/// Must run inside the session layer and after
/// [`authenticate`](super::auth::authenticate).
pub async fn localize(
    State(state): State<AppState>,
    session: Session,
    mut req: Request,
    next: Next,
) -> Response {
    let identity = req
        .extensions()
        .get::<Identity>()
        .cloned()
        .unwrap_or_default();

    let stored = match session.get::<String>(SessionKeys::LANGUAGE).await {
        Ok(stored) => stored,
        Err(e) => {
            warn!(error = %e, "Failed to read language from session");
            None
        }
    };

    let signals = LanguageSignals::from_request(req.uri(), req.headers(), stored.clone());
    let available = state.languages.available_languages().await;
    let (language, source) = state.languages.resolve(&signals, &available);
    debug!(language = %language, source = ?source, "Language resolved");

    if stored.as_deref() != Some(language.as_str())
        && let Err(e) = session.insert(SessionKeys::LANGUAGE, &language).await
    {
        warn!(error = %e, "Failed to store language in session");
    }

    req.extensions_mut()
        .insert(RequestContext::new(identity, language, source));

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn available() -> Vec<String> {
        vec!["en".to_string(), "fr".to_string()]
    }

    fn resolver(cache: FileCache, default: &str) -> LanguageResolver {
        LanguageResolver::new(
            cache,
            LanguageConfig {
                default_language: default.to_string(),
                available_languages: available(),
            },
            Arc::new(StaticLanguageSource(available())),
        )
    }

    fn signals(
        query: Option<&str>,
        session: Option<&str>,
        path: &str,
        accept: Option<&str>,
    ) -> LanguageSignals {
        LanguageSignals {
            query: query.map(str::to_string),
            session: session.map(str::to_string),
            path: path.to_string(),
            accept_language: accept.map(str::to_string),
        }
    }

    struct FailingSource;

    #[async_trait]
    impl LanguageSource for FailingSource {
        async fn active_languages(&self) -> anyhow::Result<Vec<String>> {
            Err(anyhow::anyhow!("database down"))
        }
    }

    #[test]
    fn test_query_beats_session() {
        let r = resolver(FileCache::disabled(), "en");
        let got = r.resolve(&signals(Some("en"), Some("fr"), "/", None), &available());
        assert_eq!(got, ("en".to_string(), ResolvedFrom::Query));
    }

    #[test]
    fn test_session_beats_path() {
        let r = resolver(FileCache::disabled(), "en");
        let got = r.resolve(&signals(None, Some("fr"), "/en/contact", None), &available());
        assert_eq!(got, ("fr".to_string(), ResolvedFrom::Session));
    }

    #[test]
    fn test_unsupported_query_is_ignored() {
        let r = resolver(FileCache::disabled(), "en");
        let got = r.resolve(&signals(Some("de"), None, "/fr/projects", None), &available());
        assert_eq!(got, ("fr".to_string(), ResolvedFrom::Path));
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let r = resolver(FileCache::disabled(), "en");
        let got = r.resolve(&signals(Some(" FR "), None, "/", None), &available());
        assert_eq!(got.0, "fr");
    }

    #[test]
    fn test_accept_language_quality_wins() {
        let r = resolver(FileCache::disabled(), "fr");
        let got = r.resolve(
            &signals(None, None, "/", Some("fr-FR;q=0.9,en;q=1.0")),
            &available(),
        );
        assert_eq!(got, ("en".to_string(), ResolvedFrom::AcceptLanguage));
    }

    #[test]
    fn test_default_when_nothing_matches() {
        let r = resolver(FileCache::disabled(), "fr");
        let got = r.resolve(&signals(None, None, "/projects", Some("de,es;q=0.5")), &available());
        assert_eq!(got, ("fr".to_string(), ResolvedFrom::Default));
    }

    #[test]
    fn test_unsupported_default_falls_back_to_first() {
        let r = resolver(FileCache::disabled(), "de");
        assert_eq!(r.default_language(&available()), "en");
        assert_eq!(r.default_language(&[]), "en");
        assert_eq!(r.default_language(&["fr".to_string()]), "fr");
    }

    #[test]
    fn test_path_heuristics() {
        assert_eq!(language_from_path("/fr", &available()).as_deref(), Some("fr"));
        assert_eq!(
            language_from_path("/blog/francais/post", &available()).as_deref(),
            Some("fr")
        );
        assert_eq!(
            language_from_path("/docs/english-version", &available()).as_deref(),
            Some("en")
        );
        assert_eq!(
            language_from_path("/pages/français", &available()).as_deref(),
            Some("fr")
        );
        assert_eq!(language_from_path("/de/projects", &available()), None);
        assert_eq!(language_from_path("/about/contact", &available()), None);
        assert_eq!(
            language_from_path("/french", &["en".to_string()]),
            None,
            "heuristic codes must be supported"
        );
    }

    #[test]
    fn test_path_hints_match_substrings() {
        assert_eq!(language_from_path("/englishblog", &available()).as_deref(), Some("en"));
        assert_eq!(language_from_path("/content", &available()).as_deref(), Some("en"));
        assert_eq!(language_from_path("/frontend", &available()).as_deref(), Some("en"));
        assert_eq!(language_from_path("/FRANCAIS/blog", &available()).as_deref(), Some("fr"));
        assert_eq!(language_from_path("/frites", &available()).as_deref(), Some("fr"));
        assert_eq!(
            language_from_path("/frontend", &["fr".to_string()]).as_deref(),
            Some("fr"),
            "an unsupported hint gives way to the next one"
        );
    }

    #[test]
    fn test_path_hint_resolves_before_default() {
        let r = resolver(FileCache::disabled(), "fr");
        for path in ["/englishblog", "/content", "/frontend"] {
            let got = r.resolve(&signals(None, None, path, None), &available());
            assert_eq!(got, ("en".to_string(), ResolvedFrom::Path), "{path}");
        }
    }

    #[test]
    fn test_parse_accept_language() {
        let parsed = parse_accept_language("fr-CH, fr;q=0.9, en;q=0.8, de;q=abc, *;q=0.5");
        let tags: Vec<&str> = parsed.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tags, vec!["fr-CH", "fr", "en", "*", "de"]);
        assert_eq!(parsed[0].1, 1.0);
        assert_eq!(parsed[4].1, 0.0);
    }

    #[test]
    fn test_parse_accept_language_is_stable() {
        let parsed = parse_accept_language("es,de,en");
        let tags: Vec<&str> = parsed.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tags, vec!["es", "de", "en"]);
        assert!(parse_accept_language("").is_empty());
        assert!(parse_accept_language(" , ;q=1").is_empty());
    }

    #[test]
    fn test_language_url() {
        let available = available();
        assert_eq!(language_url("/en/projects", "fr", &available), "/fr/projects");
        assert_eq!(language_url("/en", "fr", &available), "/fr");
        assert_eq!(language_url("/", "fr", &available), "/fr");
        assert_eq!(language_url("", "en", &available), "/en");
        assert_eq!(language_url("/projects/42", "en", &available), "/en/projects/42");
        assert_eq!(language_url("/de/projects", "fr", &available), "/fr/de/projects");
    }

    #[test]
    fn test_signals_from_request() {
        let uri: Uri = "/fr/projects?lang=en&page=2".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT_LANGUAGE, "fr;q=0.5".parse().unwrap());

        let signals = LanguageSignals::from_request(&uri, &headers, Some("fr".to_string()));
        assert_eq!(signals.query.as_deref(), Some("en"));
        assert_eq!(signals.session.as_deref(), Some("fr"));
        assert_eq!(signals.path, "/fr/projects");
        assert_eq!(signals.accept_language.as_deref(), Some("fr;q=0.5"));
    }

    #[tokio::test]
    async fn test_available_languages_are_cached() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::new(dir.path(), Duration::from_secs(60));
        let r = LanguageResolver::new(
            cache.clone(),
            LanguageConfig::default(),
            Arc::new(StaticLanguageSource(vec!["FR".to_string(), "en".to_string(), "fr".to_string()])),
        );

        assert_eq!(r.available_languages().await, vec!["fr", "en"]);
        let cached: Option<Vec<String>> = cache.get("available_languages").await;
        assert_eq!(cached, Some(vec!["fr".to_string(), "en".to_string()]));
    }

    #[tokio::test]
    async fn test_available_languages_fall_back_to_config() {
        let r = LanguageResolver::new(
            FileCache::disabled(),
            LanguageConfig {
                default_language: "en".to_string(),
                available_languages: vec!["en".to_string(), "nl".to_string()],
            },
            Arc::new(FailingSource),
        );
        assert_eq!(r.available_languages().await, vec!["en", "nl"]);

        let empty = LanguageResolver::new(
            FileCache::disabled(),
            LanguageConfig::default(),
            Arc::new(StaticLanguageSource::default()),
        );
        assert_eq!(empty.available_languages().await, vec!["en", "fr"]);
    }
}
