//! Server-side session storage.
//!
//! Sessions hold two values: the chosen language and the page to return to
//! after logging in. They live in a bounded in-process cache that drops a
//! record once its expiry date passes, or when the cache is full. Restarting
//! the server only costs users their language choice and a pending redirect.

use std::time::{Duration as StdDuration, Instant};

use async_trait::async_trait;
use moka::Expiry as CacheExpiry;
use moka::future::Cache;
use time::{Duration, OffsetDateTime};
use tower_sessions::cookie::SameSite;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};
use tower_sessions::{Expiry, SessionManagerLayer};

use folio_config::SessionConfig;

/// Session keys used for storing data
pub struct SessionKeys;

impl SessionKeys {
    pub const LANGUAGE: &'static str = "language";
    pub const REDIRECT_AFTER_LOGIN: &'static str = "redirect_after_login";
}

/// Evicts each record at its own `expiry_date`.
struct RecordExpiry;

impl RecordExpiry {
    fn remaining(record: &Record) -> Option<StdDuration> {
        let left = record.expiry_date - OffsetDateTime::now_utc();
        Some(left.try_into().unwrap_or(StdDuration::ZERO))
    }
}

impl CacheExpiry<Id, Record> for RecordExpiry {
    fn expire_after_create(&self, _id: &Id, record: &Record, _at: Instant) -> Option<StdDuration> {
        Self::remaining(record)
    }

    fn expire_after_update(
        &self,
        _id: &Id,
        record: &Record,
        _at: Instant,
        _current: Option<StdDuration>,
    ) -> Option<StdDuration> {
        Self::remaining(record)
    }
}

/// In-memory session store with a capacity bound and per-record expiry.
#[derive(Clone)]
pub struct BoundedMemoryStore {
    sessions: Cache<Id, Record>,
}

impl std::fmt::Debug for BoundedMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedMemoryStore")
            .field("entries", &self.sessions.entry_count())
            .finish()
    }
}

impl BoundedMemoryStore {
    pub fn new(max_entries: u64) -> Self {
        Self {
            sessions: Cache::builder()
                .max_capacity(max_entries)
                .expire_after(RecordExpiry)
                .build(),
        }
    }
}

#[async_trait]
impl SessionStore for BoundedMemoryStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.sessions.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.sessions.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.sessions.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .sessions
            .get(id)
            .await
            .filter(|record| record.expiry_date > OffsetDateTime::now_utc()))
    }

    async fn delete(&self, id: &Id) -> session_store::Result<()> {
        self.sessions.invalidate(id).await;
        Ok(())
    }
}

pub fn session_layer(config: &SessionConfig) -> SessionManagerLayer<BoundedMemoryStore> {
    SessionManagerLayer::new(BoundedMemoryStore::new(config.max_entries))
        .with_secure(config.secure)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::minutes(config.idle_minutes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(expires_in: Duration) -> Record {
        let mut data = std::collections::HashMap::new();
        data.insert(SessionKeys::LANGUAGE.to_string(), serde_json::json!("fr"));
        Record {
            id: Id::default(),
            data,
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_live_session_loads() {
        let store = BoundedMemoryStore::new(10);
        let live = record(Duration::minutes(10));
        store.save(&live).await.unwrap();

        let loaded = store.load(&live.id).await.unwrap().expect("live session");
        assert_eq!(loaded.data[SessionKeys::LANGUAGE], "fr");
    }

    #[tokio::test]
    async fn test_expired_session_is_removed() {
        let store = BoundedMemoryStore::new(10);
        let expired = record(Duration::minutes(-1));
        store.save(&expired).await.unwrap();

        assert!(store.load(&expired.id).await.unwrap().is_none());
        store.sessions.run_pending_tasks().await;
        assert_eq!(store.sessions.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_store_is_bounded() {
        let store = BoundedMemoryStore::new(3);
        for _ in 0..50 {
            store.save(&record(Duration::minutes(10))).await.unwrap();
        }

        store.sessions.run_pending_tasks().await;
        assert!(store.sessions.entry_count() <= 3);
    }

    #[tokio::test]
    async fn test_delete_removes_session() {
        let store = BoundedMemoryStore::new(10);
        let live = record(Duration::minutes(10));
        store.save(&live).await.unwrap();

        store.delete(&live.id).await.unwrap();
        assert!(store.load(&live.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_avoids_id_collision() {
        let store = BoundedMemoryStore::new(10);
        let first = record(Duration::minutes(10));
        store.save(&first).await.unwrap();

        let mut second = record(Duration::minutes(10));
        second.id = first.id;
        store.create(&mut second).await.unwrap();

        assert_ne!(second.id, first.id);
        assert!(store.load(&first.id).await.unwrap().is_some());
        assert!(store.load(&second.id).await.unwrap().is_some());
    }
}
