//! Network backends for [`RedisStore`](crate::RedisStore).

use async_trait::async_trait;
use futures::StreamExt;
use redis::AsyncCommands;
use redis::AsyncConnectionConfig;
use redis::aio::MultiplexedConnection;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::error::BackendError;
use crate::utils::ttl_millis;

/// The raw key/value commands a remote store needs from its substrate.
///
/// Keys and values arrive already namespaced and serialized. Implementations
/// report failures as [`BackendError`] so the store can decide between a
/// one-off fallback and a reconnect.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Establish (or re-establish) the connection.
    async fn connect(&self) -> Result<(), BackendError>;

    async fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Store `value`, expiring after `ttl` when given.
    async fn set(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), BackendError>;

    /// Returns whether the key existed.
    async fn delete(&self, key: &str) -> Result<bool, BackendError>;

    async fn exists(&self, key: &str) -> Result<bool, BackendError>;

    /// All keys matching a glob `pattern`. A key may be reported twice.
    async fn scan(&self, pattern: &str) -> Result<Vec<String>, BackendError>;

    /// Returns the number of keys removed.
    async fn delete_many(&self, keys: &[String]) -> Result<usize, BackendError>;

    /// Release the connection.
    async fn disconnect(&self) -> Result<(), BackendError>;
}

/// Redis backend over a multiplexed async connection.
///
/// TTLs are sent as `SET key value PX <ms>`. Bulk lookups use `SCAN MATCH`,
/// never `KEYS`, but still walk the whole keyspace: fine for the key counts
/// of rate limiting, not for unbounded key spaces.
pub struct RedisBackend {
    url: String,
    connection_timeout: Duration,
    response_timeout: Duration,
    connection: RwLock<Option<MultiplexedConnection>>,
}

impl RedisBackend {
    /// Create an unconnected backend.
    ///
    /// # Arguments
    /// * `url` - `redis://[username:password@]host[:port][/database]`
    /// * `connection_timeout` - Limit for establishing the connection
    /// * `response_timeout` - Limit for each command
    pub fn new(
        url: impl Into<String>,
        connection_timeout: Duration,
        response_timeout: Duration,
    ) -> Self {
        RedisBackend {
            url: url.into(),
            connection_timeout,
            response_timeout,
            connection: RwLock::new(None),
        }
    }

    async fn connection(&self) -> Result<MultiplexedConnection, BackendError> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or_else(|| BackendError::Connection("not connected".to_string()))
    }
}

#[async_trait]
impl Backend for RedisBackend {
    async fn connect(&self) -> Result<(), BackendError> {
        let client = redis::Client::open(self.url.as_str())
            .map_err(|e| BackendError::Connection(format!("invalid Redis URL: {}", e)))?;

        let config = AsyncConnectionConfig::new()
            .set_connection_timeout(self.connection_timeout)
            .set_response_timeout(self.response_timeout);
        let connection = client
            .get_multiplexed_async_connection_with_config(&config)
            .await
            .map_err(|e| BackendError::Connection(e.to_string()))?;

        *self.connection.write().await = Some(connection);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| BackendError::from_redis("GET", key, &e))?;
        Ok(value)
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), BackendError> {
        let mut conn = self.connection().await?;

        let result: redis::RedisResult<()> = match ttl {
            Some(ttl) => conn.pset_ex(key, value, ttl_millis(ttl)).await,
            None => conn.set(key, value).await,
        };
        result.map_err(|e| BackendError::from_redis("SET", key, &e))
    }

    async fn delete(&self, key: &str) -> Result<bool, BackendError> {
        let mut conn = self.connection().await?;
        let removed: usize = conn
            .del(key)
            .await
            .map_err(|e| BackendError::from_redis("DEL", key, &e))?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool, BackendError> {
        let mut conn = self.connection().await?;
        conn.exists(key)
            .await
            .map_err(|e| BackendError::from_redis("EXISTS", key, &e))
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>, BackendError> {
        let mut conn = self.connection().await?;
        let iter = conn
            .scan_match::<_, String>(pattern)
            .await
            .map_err(|e| BackendError::from_redis("SCAN", pattern, &e))?;
        Ok(iter.collect().await)
    }

    async fn delete_many(&self, keys: &[String]) -> Result<usize, BackendError> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.connection().await?;
        conn.del(keys)
            .await
            .map_err(|e| BackendError::from_redis("DEL", &keys.join(","), &e))
    }

    async fn disconnect(&self) -> Result<(), BackendError> {
        // The multiplexed connection closes once its last handle is dropped.
        self.connection.write().await.take();
        Ok(())
    }
}
