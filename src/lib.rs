//! ratelimit-store - Pluggable key/value storage for API rate limiting
//!
//! This library provides the storage substrate rate limiters are built on:
//! - One async [`Store`] contract (get/set/delete/has/size/keys/clear)
//! - An in-process [`MemoryStore`] with cancellable per-key expiry
//! - A Redis-backed [`RedisStore`] with key namespacing, connection retries
//!   and automatic failover to a local store when Redis is unavailable
//! - A single [`create_store`] selector driven by configuration
//!
//! None of the operations fail. When Redis is down a `RedisStore` keeps
//! answering from process memory, so limits become per-process until the
//! process restarts: availability is favoured over cluster-wide consistency.
//!
//! # Example
//!
//! ```ignore
//! use ratelimit_store::{StoreConfig, create_store};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     // RATE_LIMIT_USE_REDIS=true REDIS_URL=redis://cache:6379
//!     let config = StoreConfig::from_env();
//!     let attempts = create_store::<u64>("login-attempts", &config).await;
//!
//!     let count = attempts.get("user:42").await.unwrap_or(0) + 1;
//!     attempts.set("user:42", count, Some(Duration::from_secs(60))).await;
//!
//!     attempts.shutdown().await;
//! }
//! ```

mod config;
mod error;
mod selector;
mod store;
pub mod stores;
mod utils;

// Re-export public API
pub use config::{
    ENV_MAX_ATTEMPTS, ENV_REDIS_URL, ENV_RETRY_BASE_MS, ENV_RETRY_MAX_MS, ENV_USE_REDIS,
    StoreConfig,
};
pub use error::BackendError;
pub use selector::create_store;
pub use store::Store;
pub use stores::backend::{Backend, RedisBackend};
pub use stores::connection::{ConnectionEvent, ConnectionState, RetryPolicy};
pub use stores::memory::MemoryStore;
pub use stores::metrics::{MetricsSink, MetricsStore, ScanOperation, StoreMetric};
pub use stores::redis::{DEFAULT_REDIS_URL, RedisStore, RedisStoreConfig};
pub use utils::namespace_prefix;
