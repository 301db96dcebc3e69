//! File-per-key cache with JSON envelopes.
//!
//! Layout: `{dir}/{sanitized_key}_{md5(key)}.cache` holding
//! `{"expires": <unix seconds>, "value": <payload>}`. An entry is dead once
//! `now >= expires`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use md5::{Digest, Md5};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use folio_config::CacheConfig;

const EXTENSION: &str = "cache";

#[derive(Debug, thiserror::Error)]
pub(crate) enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    expires: i64,
    value: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    expires: i64,
    value: serde_json::Value,
}

impl Envelope {
    fn is_expired(&self, now: i64) -> bool {
        now >= self.expires
    }
}

/// Replaces every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[derive(Clone, Debug)]
pub struct FileCache {
    dir: PathBuf,
    default_ttl: Duration,
    enabled: bool,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>, default_ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            default_ttl,
            enabled: true,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            default_ttl: config.default_ttl,
            enabled: config.enabled,
        }
    }

    /// A cache that never stores anything.
    pub fn disabled() -> Self {
        Self {
            dir: PathBuf::new(),
            default_ttl: Duration::ZERO,
            enabled: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// File backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let hash = hex::encode(Md5::digest(key.as_bytes()));
        self.dir
            .join(format!("{}_{}.{}", sanitize_key(key), hash, EXTENSION))
    }

    /// Returns the live value stored under `key`.
    ///
    /// Absent, expired, unreadable and unparsable entries are all misses.
    /// Expired files are removed on the way out.
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        if !self.enabled {
            return None;
        }

        let path = self.path_for(key);
        let envelope = match read_envelope(&path).await {
            Ok(Some(envelope)) => envelope,
            Ok(None) => {
                debug!(cache.key = %key, "Cache miss");
                return None;
            }
            Err(e) => {
                warn!(cache.key = %key, error = %e, "Cache read error");
                return None;
            }
        };

        if envelope.is_expired(Utc::now().timestamp()) {
            debug!(cache.key = %key, "Cache entry expired");
            match fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(cache.key = %key, error = %e, "Failed to remove expired cache entry");
                }
            }
            return None;
        }

        match serde_json::from_value(envelope.value) {
            Ok(value) => {
                debug!(cache.key = %key, "Cache hit");
                Some(value)
            }
            Err(e) => {
                warn!(cache.key = %key, error = %e, "Cached value has unexpected shape");
                None
            }
        }
    }

    /// Stores `value` under `key` for `ttl` (or the default TTL).
    ///
    /// The entry is written to a unique temp file and renamed into place, so
    /// readers never observe a partial write. Concurrent writers to the same
    /// key are last-writer-wins.
    #[instrument(skip(self, value), fields(cache.operation = "SET"))]
    pub async fn set<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> bool
    where
        T: Serialize,
    {
        if !self.enabled {
            return false;
        }

        let ttl = ttl.unwrap_or(self.default_ttl);
        match self.write_entry(key, value, ttl).await {
            Ok(()) => {
                debug!(cache.key = %key, cache.ttl_secs = ttl.as_secs(), "Cache set");
                true
            }
            Err(e) => {
                warn!(cache.key = %key, error = %e, "Cache write error");
                false
            }
        }
    }

    /// Removes `key`. Already-absent entries count as removed.
    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    pub async fn delete(&self, key: &str) -> bool {
        if !self.enabled {
            return true;
        }

        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => true,
            Err(e) => {
                warn!(cache.key = %key, error = %e, "Cache delete error");
                false
            }
        }
    }

    /// Removes every entry, or only those whose file name starts with the
    /// sanitised `prefix`.
    #[instrument(skip(self), fields(cache.operation = "CLEAR"))]
    pub async fn clear(&self, prefix: Option<&str>) -> bool {
        if !self.enabled {
            return true;
        }

        let prefix = prefix.map(sanitize_key);
        let files = match self.entry_files().await {
            Ok(files) => files,
            Err(e) => {
                warn!(error = %e, "Cache clear error");
                return false;
            }
        };

        let mut success = true;
        let mut removed = 0usize;
        for path in files {
            let matches = match (&prefix, path.file_name().and_then(|n| n.to_str())) {
                (None, _) => true,
                (Some(prefix), Some(name)) => name.starts_with(prefix.as_str()),
                (Some(_), None) => false,
            };
            if !matches {
                continue;
            }

            match fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove cache entry");
                    success = false;
                }
            }
        }

        info!(removed, prefix = ?prefix, "Cache cleared");
        success
    }

    /// Removes expired and malformed entries, returning how many were removed.
    #[instrument(skip(self), fields(cache.operation = "CLEAN"))]
    pub async fn clean_expired(&self) -> usize {
        if !self.enabled {
            return 0;
        }

        let files = match self.entry_files().await {
            Ok(files) => files,
            Err(e) => {
                warn!(error = %e, "Cache cleanup error");
                return 0;
            }
        };

        let now = Utc::now().timestamp();
        let mut count = 0;
        for path in files {
            let dead = match read_envelope(&path).await {
                Ok(Some(envelope)) => envelope.is_expired(now),
                Ok(None) => false,
                Err(CacheError::Serialization(_)) => true,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Skipping unreadable cache entry");
                    false
                }
            };

            if dead && fs::remove_file(&path).await.is_ok() {
                count += 1;
            }
        }

        info!(count, "Expired cache entries removed");
        count
    }

    async fn write_entry<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let envelope = EnvelopeRef {
            expires: Utc::now().timestamp().saturating_add(ttl_secs),
            value,
        };
        let bytes = serde_json::to_vec(&envelope)?;

        fs::create_dir_all(&self.dir).await?;

        let target = self.path_for(key);
        let temp = self
            .dir
            .join(format!(".{}.tmp", Uuid::new_v4().simple()));

        fs::write(&temp, &bytes).await?;
        if let Err(e) = fs::rename(&temp, &target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn entry_files(&self) -> Result<Vec<PathBuf>, CacheError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some(EXTENSION)
                && entry.file_type().await?.is_file()
            {
                files.push(path);
            }
        }

        Ok(files)
    }
}

async fn read_envelope(path: &Path) -> Result<Option<Envelope>, CacheError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    Ok(Some(serde_json::from_slice(&bytes)?))
}
