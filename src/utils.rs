//! Shared utilities for the store implementations.

use std::time::Duration;

/// Root of every key this crate writes to a shared substrate.
pub const KEY_ROOT: &str = "ratelimit";

/// Build the namespace prefix for a store.
///
/// Format: `ratelimit:{name}:`
pub fn namespace_prefix(name: &str) -> String {
    format!("{}:{}:", KEY_ROOT, name)
}

/// Build a composite key from a namespace prefix and a caller key.
pub fn build_store_key(prefix: &str, key: &str) -> String {
    format!("{}{}", prefix, key)
}

/// Strip the namespace prefix from a substrate key.
///
/// Returns `None` for keys outside the namespace.
pub fn strip_store_key<'a>(prefix: &str, key: &'a str) -> Option<&'a str> {
    key.strip_prefix(prefix)
}

/// Build a SCAN MATCH pattern selecting every key under `prefix`.
///
/// Glob metacharacters in the prefix are escaped so that a store named
/// `a*` never matches the keys of a store named `ab`.
pub fn scan_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

/// Convert a TTL into whole milliseconds for `SET ... PX`.
///
/// Sub-millisecond TTLs round up to 1ms so they never turn into "no expiry".
pub fn ttl_millis(ttl: Duration) -> u64 {
    let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
    millis.max(1)
}
