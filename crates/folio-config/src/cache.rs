//! File cache configuration.
//!
//! # Environment Variables
//!
//! - `CACHE_DIR`: directory holding one file per cache key (default: `var/cache`)
//! - `CACHE_TTL`: default time-to-live in seconds (default: `3600`)
//! - `CACHE_ENABLED`: turn caching off entirely (default: `true`)

use std::path::PathBuf;
use std::time::Duration;

use crate::ConfigView;

#[derive(Clone, Debug)]
pub struct CacheConfig {
    pub dir: PathBuf,
    pub default_ttl: Duration,
    pub enabled: bool,
}

impl CacheConfig {
    pub fn from_view(view: &ConfigView) -> Self {
        let ttl = view.get_int("CACHE_TTL", 3600).max(0) as u64;

        Self {
            dir: view
                .get("CACHE_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("var/cache")),
            default_ttl: Duration::from_secs(ttl),
            enabled: view.get_bool("CACHE_ENABLED", true),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("var/cache"),
            default_ttl: Duration::from_secs(3600),
            enabled: true,
        }
    }
}
