//! Per-user session storage
//!
//! Sessions are opaque key/value bags addressed by a [`SessionId`]. The
//! presentation layer only sees the [`SessionStore`] trait, so it runs the same
//! against Redis in production and an in-memory map in tests.

use crate::{
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{
    collections::HashMap,
    fmt::Display,
    sync::Arc,
    time::{Duration, Instant},
};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Session key holding the curated movie list
pub const MOVIES_KEY: &str = "movies";

/// Identifier of one browser session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(value: &str) -> Option<Self> {
        Uuid::parse_str(value).ok().map(SessionId)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session: SessionId, key: &str) -> AppResult<Option<Value>>;

    async fn set(&self, session: SessionId, key: &str, value: Value) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

struct MemorySession {
    created: Instant,
    values: HashMap<String, Value>,
}

impl MemorySession {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created.elapsed() >= ttl
    }
}

/// Session store kept in process memory
///
/// A session expires `ttl` after its first write. Expired sessions read as
/// empty and are dropped on the next write to any session.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, MemorySession>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Number of sessions held, expired ones included until the next prune
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session: SessionId, key: &str) -> AppResult<Option<Value>> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .get(&session)
            .filter(|entry| !entry.is_expired(self.ttl))
            .and_then(|entry| entry.values.get(key))
            .cloned())
    }

    async fn set(&self, session: SessionId, key: &str, value: Value) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;

        let before = sessions.len();
        sessions.retain(|_, entry| !entry.is_expired(self.ttl));
        if sessions.len() < before {
            tracing::debug!(pruned = before - sessions.len(), "Expired sessions dropped");
        }

        sessions
            .entry(session)
            .or_insert_with(|| MemorySession {
                created: Instant::now(),
                values: HashMap::new(),
            })
            .values
            .insert(key.to_string(), value);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Session store backed by Redis, expiring each value after `ttl` seconds
#[derive(Clone)]
pub struct RedisSessionStore {
    cache: Cache,
    ttl: u64,
}

impl RedisSessionStore {
    pub fn new(cache: Cache, ttl: u64) -> Self {
        Self { cache, ttl }
    }

    fn key(session: SessionId, key: &str) -> CacheKey {
        CacheKey::SessionField {
            session_id: session.0,
            field: key.to_string(),
        }
    }
}

#[async_trait::async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, session: SessionId, key: &str) -> AppResult<Option<Value>> {
        self.cache.get_from_cache(&Self::key(session, key)).await
    }

    async fn set(&self, session: SessionId, key: &str, value: Value) -> AppResult<()> {
        self.cache
            .set_in_cache(&Self::key(session, key), &value, self.ttl)
            .await
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

/// Typed view over one user's session
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
    id: SessionId,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>, id: SessionId) -> Self {
        Self { store, id }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Reads and decodes `key`
    ///
    /// `None` if the session has no such value, or if the stored value no
    /// longer decodes as `T`; callers then rebuild and overwrite it.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> AppResult<Option<T>> {
        let Some(value) = self.store.get(self.id, key).await? else {
            return Ok(None);
        };

        match serde_json::from_value(value) {
            Ok(decoded) => Ok(Some(decoded)),
            Err(e) => {
                tracing::warn!(
                    session_id = %self.id,
                    key,
                    error = %e,
                    "Discarding undecodable session value"
                );
                Ok(None)
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> AppResult<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| AppError::Internal(format!("Session serialization error: {}", e)))?;
        self.store.set(self.id, key, value).await
    }
}
