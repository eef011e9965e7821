use async_trait::async_trait;
use std::time::Duration;

/// A store is a common interface for storing, reading and deleting key-value pairs.
///
/// This is the only surface rate-limit middleware is expected to use. Every
/// backend is interchangeable through it: none of the operations fail, a
/// missing key is reported as absence, and infrastructure problems are
/// absorbed by the implementation.
///
/// Values are opaque to the store. Keys are scoped to the store instance:
/// `keys`, `size` and `clear` never see entries owned by another store, even
/// when both share the same substrate.
#[async_trait]
pub trait Store<V>: Send + Sync
where
    V: Send + Sync + 'static,
{
    /// A name for metrics/tracing.
    ///
    /// # Example
    /// - "memory"
    /// - "redis"
    fn name(&self) -> &'static str;

    /// Return the stored value.
    ///
    /// The response must be `None` for misses and for expired entries.
    async fn get(&self, key: &str) -> Option<V>;

    /// Sets the value for the given key.
    ///
    /// A `ttl` of `None` or zero stores the value without expiry. Setting a key
    /// replaces both its value and its expiry.
    async fn set(&self, key: &str, value: V, ttl: Option<Duration>);

    /// Removes the key. Returns whether something was removed.
    async fn delete(&self, key: &str) -> bool;

    /// Whether a live entry exists for the key.
    async fn has(&self, key: &str) -> bool;

    /// Number of live entries owned by this store.
    async fn size(&self) -> usize;

    /// All live keys owned by this store, in no particular order.
    async fn keys(&self) -> Vec<String>;

    /// Removes every entry owned by this store.
    async fn clear(&self);

    /// Release any held connection. Errors are logged, never returned.
    async fn shutdown(&self) {}
}

/// Normalize a caller-supplied TTL: zero means "no expiry".
pub(crate) fn effective_ttl(ttl: Option<Duration>) -> Option<Duration> {
    ttl.filter(|ttl| !ttl.is_zero())
}
