//! Metrics middleware for stores.
//!
//! This module provides a `MetricsStore` wrapper that emits metrics for all
//! store operations (reads, writes, deletes, lookups, scans) to a
//! user-provided sink.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ratelimit_store::{MemoryStore, MetricsSink, MetricsStore, Store};
//!
//! // Create metrics sink
//! let sink = Arc::new(MyMetricsSink::new());
//!
//! // Wrap store with metrics
//! let memory: Arc<dyn Store<u64>> = Arc::new(MemoryStore::new());
//! let store: Arc<dyn Store<u64>> = Arc::new(MetricsStore::new(memory, sink.clone()));
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::store::Store;

/// Bulk operations that walk the whole namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOperation {
    Size,
    Keys,
    Clear,
}

/// Metrics emitted by the MetricsStore wrapper.
#[derive(Debug, Clone)]
pub enum StoreMetric {
    /// Emitted on every `get`.
    Read {
        /// The key that was read.
        key: String,
        /// Whether a value was returned.
        hit: bool,
        /// Latency of the operation in milliseconds.
        latency_ms: f64,
        /// Name of the wrapped store (from Store::name()).
        store: String,
    },
    /// Emitted on every `set`.
    Write {
        key: String,
        /// TTL requested by the caller, in milliseconds.
        ttl_ms: Option<u64>,
        latency_ms: f64,
        store: String,
    },
    /// Emitted on every `delete`.
    Delete {
        key: String,
        /// Whether something was removed.
        removed: bool,
        latency_ms: f64,
        store: String,
    },
    /// Emitted on every `has`.
    Lookup {
        key: String,
        found: bool,
        latency_ms: f64,
        store: String,
    },
    /// Emitted on `size`, `keys` and `clear`.
    Scan {
        operation: ScanOperation,
        /// Entries counted or listed; `None` for `clear`.
        entries: Option<usize>,
        latency_ms: f64,
        store: String,
    },
}

/// Trait for receiving store metrics.
///
/// Implement this trait to collect metrics from `MetricsStore`.
#[async_trait]
pub trait MetricsSink: Send + Sync {
    /// Emit a single metric.
    ///
    /// This is called synchronously in the hot path of every operation.
    /// Implementations should be fast (e.g., buffer metrics in memory).
    fn emit(&self, metric: StoreMetric);

    /// Flush any buffered metrics.
    ///
    /// Called when the wrapping store shuts down.
    async fn flush(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// A store wrapper that emits metrics for all operations.
///
/// `MetricsStore` wraps any `Store` implementation and reports every call
/// with its latency to a user-provided sink.
pub struct MetricsStore<V> {
    inner: Arc<dyn Store<V>>,
    sink: Arc<dyn MetricsSink>,
    store_name: String,
}

impl<V> MetricsStore<V>
where
    V: Send + Sync + 'static,
{
    /// Create a new MetricsStore wrapping the given store.
    ///
    /// # Arguments
    /// * `inner` - The store to wrap
    /// * `sink` - The metrics sink to emit metrics to
    pub fn new(inner: Arc<dyn Store<V>>, sink: Arc<dyn MetricsSink>) -> Self {
        let store_name = inner.name().to_string();
        MetricsStore {
            inner,
            sink,
            store_name,
        }
    }

    /// Get a reference to the metrics sink.
    pub fn sink(&self) -> &Arc<dyn MetricsSink> {
        &self.sink
    }

    fn elapsed_ms(start: Instant) -> f64 {
        start.elapsed().as_secs_f64() * 1000.0
    }

    fn emit_scan(&self, operation: ScanOperation, entries: Option<usize>, start: Instant) {
        self.sink.emit(StoreMetric::Scan {
            operation,
            entries,
            latency_ms: Self::elapsed_ms(start),
            store: self.store_name.clone(),
        });
    }
}

#[async_trait]
impl<V> Store<V> for MetricsStore<V>
where
    V: Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn get(&self, key: &str) -> Option<V> {
        let start = Instant::now();
        let result = self.inner.get(key).await;

        self.sink.emit(StoreMetric::Read {
            key: key.to_string(),
            hit: result.is_some(),
            latency_ms: Self::elapsed_ms(start),
            store: self.store_name.clone(),
        });

        result
    }

    async fn set(&self, key: &str, value: V, ttl: Option<Duration>) {
        let start = Instant::now();
        self.inner.set(key, value, ttl).await;

        self.sink.emit(StoreMetric::Write {
            key: key.to_string(),
            ttl_ms: ttl.map(|ttl| ttl.as_millis() as u64),
            latency_ms: Self::elapsed_ms(start),
            store: self.store_name.clone(),
        });
    }

    async fn delete(&self, key: &str) -> bool {
        let start = Instant::now();
        let removed = self.inner.delete(key).await;

        self.sink.emit(StoreMetric::Delete {
            key: key.to_string(),
            removed,
            latency_ms: Self::elapsed_ms(start),
            store: self.store_name.clone(),
        });

        removed
    }

    async fn has(&self, key: &str) -> bool {
        let start = Instant::now();
        let found = self.inner.has(key).await;

        self.sink.emit(StoreMetric::Lookup {
            key: key.to_string(),
            found,
            latency_ms: Self::elapsed_ms(start),
            store: self.store_name.clone(),
        });

        found
    }

    async fn size(&self) -> usize {
        let start = Instant::now();
        let size = self.inner.size().await;
        self.emit_scan(ScanOperation::Size, Some(size), start);
        size
    }

    async fn keys(&self) -> Vec<String> {
        let start = Instant::now();
        let keys = self.inner.keys().await;
        self.emit_scan(ScanOperation::Keys, Some(keys.len()), start);
        keys
    }

    async fn clear(&self) {
        let start = Instant::now();
        self.inner.clear().await;
        self.emit_scan(ScanOperation::Clear, None, start);
    }

    async fn shutdown(&self) {
        self.inner.shutdown().await;
        if let Err(e) = self.sink.flush().await {
            tracing::warn!(store = %self.store_name, error = %e, "failed to flush store metrics");
        }
    }
}
