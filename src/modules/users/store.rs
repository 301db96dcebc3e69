//! User lookups behind a trait so the auth pipeline can run without Postgres.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::instrument;

use super::model::User;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn list(&self) -> Result<Vec<User>>;
}

const FIND_BY_ID: &str = "SELECT id, user_name, first_name, last_name, email, password_hash, \
    role_id, profile_picture_url, created_at FROM users WHERE id = $1";

const FIND_BY_EMAIL: &str = "SELECT id, user_name, first_name, last_name, email, password_hash, \
    role_id, profile_picture_url, created_at FROM users WHERE LOWER(email) = LOWER($1)";

const LIST: &str = "SELECT id, user_name, first_name, last_name, email, password_hash, \
    role_id, profile_picture_url, created_at FROM users ORDER BY id";

#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(FIND_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(FIND_BY_EMAIL)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(LIST)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }
}

/// In-process store for tests and database-less runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<BTreeMap<i64, User>>>,
    unavailable: bool,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: Arc::new(RwLock::new(
                users.into_iter().map(|user| (user.id, user)).collect(),
            )),
            unavailable: false,
        }
    }

    /// A store whose every lookup fails, standing in for a database outage.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    pub async fn remove(&self, id: i64) -> Option<User> {
        self.users.write().await.remove(&id)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            return Err(anyhow!("user store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        self.check_available()?;
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.check_available()?;
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<User>> {
        self.check_available()?;
        Ok(self.users.read().await.values().cloned().collect())
    }
}
