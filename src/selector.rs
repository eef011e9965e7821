use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;

use crate::config::StoreConfig;
use crate::store::Store;
use crate::stores::memory::MemoryStore;
use crate::stores::redis::RedisStore;

/// Create the store backing one rate limiter.
///
/// This is the only place the backend is chosen: a [`RedisStore`] when
/// `config.use_redis` is set, a [`MemoryStore`] otherwise. Call it once per
/// limiter at startup; it never fails, a Redis store that cannot connect is
/// handed back degraded.
///
/// # Example
/// ```ignore
/// let config = StoreConfig::from_env();
/// let attempts: Arc<dyn Store<u64>> = create_store("login-attempts", &config).await;
/// attempts.set("user:42", 1, Some(Duration::from_secs(60))).await;
/// ```
pub async fn create_store<V>(name: &str, config: &StoreConfig) -> Arc<dyn Store<V>>
where
    V: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    if config.use_redis {
        let store: RedisStore<V> = RedisStore::new(name, config.redis.clone()).await;
        tracing::info!(store = name, state = %store.state(), "using redis rate-limit store");
        Arc::new(store)
    } else {
        tracing::info!(store = name, "using in-memory rate-limit store");
        Arc::new(MemoryStore::<V>::new())
    }
}
