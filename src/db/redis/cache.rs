use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use uuid::Uuid;

use crate::error::AppError;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// One named value stored in a user session
    SessionField { session_id: Uuid, field: String },
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::SessionField { session_id, field } => {
                write!(f, "session:{}:{}", session_id, field)
            }
        }
    }
}

/// Creates a Redis client for session storage
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Cache handler for storing and retrieving data from Redis
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
}

impl Cache {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }

    /// Retrieves and deserializes a value, or `None` if the key is absent
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(format!("{}", key)).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value that expires after `ttl` seconds
    ///
    /// Returns once Redis has acknowledged the write, so a read that follows
    /// sees the new value.
    pub async fn set_in_cache<T: serde::Serialize>(
        &self,
        key: &CacheKey,
        value: &T,
        ttl: u64,
    ) -> AppResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Cache serialization error: {}", e)))?;

        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(format!("{}", key), json, ttl).await?;

        tracing::debug!(key = %key, ttl, "Cache entry stored");
        Ok(())
    }
}
