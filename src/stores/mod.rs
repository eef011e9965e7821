//! Store implementations for the rate-limit store library.

pub mod backend;
pub mod connection;
pub mod memory;
pub mod metrics;
pub mod redis;

pub use backend::{Backend, RedisBackend};
pub use connection::{ConnectionEvent, ConnectionState, RetryPolicy};
pub use memory::MemoryStore;
pub use metrics::{MetricsSink, MetricsStore, ScanOperation, StoreMetric};
pub use redis::{DEFAULT_REDIS_URL, RedisStore, RedisStoreConfig};
