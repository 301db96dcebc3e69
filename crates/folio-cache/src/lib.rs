//! # Folio Cache
//!
//! File-backed key/value cache with per-entry expiry.
//!
//! This crate provides:
//! - [`FileCache`]: one JSON file per key, written atomically
//! - [`keys`]: the cache keys shared by the auth, language and translation layers
//! - [`roles`]: cached role permission rows with a built-in fallback table
//!
//! Every failure is absorbed: a broken or unreadable entry is a miss, a
//! failed write is `false`. The cache is an optimisation, never a source of
//! truth.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use folio_cache::FileCache;
//! use folio_config::CacheConfig;
//!
//! let cache = FileCache::from_config(&CacheConfig::default());
//!
//! cache.set("greeting", &"hello", Some(Duration::from_secs(60))).await;
//! let value: Option<String> = cache.get("greeting").await;
//! ```

pub mod file;
pub mod keys;
pub mod roles;

pub use file::FileCache;
pub use roles::builtin_role_permissions;
