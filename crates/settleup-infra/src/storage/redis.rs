//! Redis key-value store, for clients sharing a session across processes.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};

use settleup_core::StorageError;
use settleup_core::ports::KeyValueStore;

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis URL (e.g., redis://localhost:6379)
    pub url: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Prefix prepended to every key
    pub key_prefix: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connect_timeout: Duration::from_secs(5),
            key_prefix: "settleup:".to_string(),
        }
    }
}

impl RedisConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            connect_timeout: Duration::from_secs(
                std::env::var("REDIS_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            key_prefix: std::env::var("REDIS_KEY_PREFIX")
                .unwrap_or_else(|_| "settleup:".to_string()),
        }
    }
}

/// Redis-backed key-value store.
///
/// `MSET` and multi-key `DEL` are single commands, so both multi-key
/// operations are atomic on the server.
pub struct RedisKeyValueStore {
    conn: ConnectionManager,
    config: RedisConfig,
}

impl RedisKeyValueStore {
    pub async fn new(config: RedisConfig) -> Result<Self, StorageError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        // Use timeout to prevent hanging if Redis is unreachable
        let conn = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| StorageError::Unavailable("Connection timed out".to_string()))?
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        tracing::info!(url = %config.url, "Connected to Redis storage");

        Ok(Self { conn, config })
    }

    /// Create from environment configuration.
    pub async fn from_env() -> Result<Self, StorageError> {
        Self::new(RedisConfig::from_env()).await
    }

    fn key(&self, key: &str) -> String {
        format!("{}{key}", self.config.key_prefix)
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(self.key(key))
            .await
            .map_err(|e| {
                tracing::warn!(key = %key, error = %e, "Redis GET failed");
                StorageError::Io(e.to_string())
            })
    }

    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<Option<String>>, StorageError> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = keys.iter().map(|key| self.key(key)).collect();

        conn.mget::<_, Vec<Option<String>>>(&keys)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))
    }

    async fn multi_set(&self, entries: &[(&str, &str)]) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        let entries: Vec<(String, &str)> = entries
            .iter()
            .map(|(key, value)| (self.key(key), *value))
            .collect();

        conn.mset::<_, _, ()>(&entries)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))
    }

    async fn multi_remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = keys.iter().map(|key| self.key(key)).collect();

        conn.del::<_, ()>(keys)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))
    }
}
