//! Process-wide store configuration loaded from the environment.

use std::str::FromStr;
use std::time::Duration;

use crate::stores::connection::RetryPolicy;
use crate::stores::redis::{DEFAULT_REDIS_URL, RedisStoreConfig};

/// Selects Redis when truthy (`1`, `true`, `yes`, `on`).
pub const ENV_USE_REDIS: &str = "RATE_LIMIT_USE_REDIS";
/// Redis connection URL.
pub const ENV_REDIS_URL: &str = "REDIS_URL";
/// Connection attempts before a Redis store degrades.
pub const ENV_MAX_ATTEMPTS: &str = "RATE_LIMIT_REDIS_MAX_ATTEMPTS";
/// Backoff growth per failed attempt, in milliseconds.
pub const ENV_RETRY_BASE_MS: &str = "RATE_LIMIT_REDIS_RETRY_BASE_MS";
/// Backoff cap, in milliseconds.
pub const ENV_RETRY_MAX_MS: &str = "RATE_LIMIT_REDIS_RETRY_MAX_MS";

/// Configuration consumed by [`create_store`](crate::create_store).
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Use a [`RedisStore`](crate::RedisStore) instead of a
    /// [`MemoryStore`](crate::MemoryStore).
    pub use_redis: bool,

    /// Redis settings, ignored unless `use_redis` is set.
    pub redis: RedisStoreConfig,
}

impl StoreConfig {
    /// Load the configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration from an arbitrary variable lookup.
    ///
    /// Missing variables use defaults; malformed numbers are logged and
    /// replaced by their default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = RetryPolicy::default();

        let use_redis = lookup(ENV_USE_REDIS).is_some_and(|value| is_truthy(&value));
        let url = lookup(ENV_REDIS_URL)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_REDIS_URL.to_string());

        let retry = RetryPolicy {
            max_attempts: parse_or(&lookup, ENV_MAX_ATTEMPTS, defaults.max_attempts),
            base_delay: Duration::from_millis(parse_or(
                &lookup,
                ENV_RETRY_BASE_MS,
                defaults.base_delay.as_millis() as u64,
            )),
            max_delay: Duration::from_millis(parse_or(
                &lookup,
                ENV_RETRY_MAX_MS,
                defaults.max_delay.as_millis() as u64,
            )),
        };

        StoreConfig {
            use_redis,
            redis: RedisStoreConfig {
                url,
                retry,
                ..Default::default()
            },
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn parse_or<F, T>(lookup: &F, name: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    let Some(raw) = lookup(name) else {
        return default;
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(
                variable = name,
                value = %raw,
                default = %default,
                "ignoring malformed setting"
            );
            default
        }
    }
}
