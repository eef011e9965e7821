//! In-memory stand-in for Redis, shared by several stores and able to fail
//! on demand.

#![allow(dead_code)]

use async_trait::async_trait;
use ratelimit_store::{Backend, BackendError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Default)]
struct Substrate {
    entries: HashMap<String, (String, Option<Instant>)>,
}

impl Substrate {
    fn live(&mut self, key: &str) -> Option<&(String, Option<Instant>)> {
        let expired = self
            .entries
            .get(key)
            .is_some_and(|(_, at)| at.is_some_and(|at| at <= Instant::now()));
        if expired {
            self.entries.remove(key);
        }
        self.entries.get(key)
    }
}

/// A shared fake substrate. Clone it to hand the same data to several stores.
#[derive(Clone, Default)]
pub struct FakeRedis {
    substrate: Arc<Mutex<Substrate>>,
    fail_connect: Arc<AtomicBool>,
    command_error: Arc<Mutex<Option<BackendError>>>,
    repeat_scan_results: Arc<AtomicBool>,
    largest_delete: Arc<AtomicUsize>,
    connects: Arc<AtomicUsize>,
    commands: Arc<AtomicUsize>,
    disconnects: Arc<AtomicUsize>,
}

impl FakeRedis {
    pub fn new() -> Self {
        Self::default()
    }

    /// A substrate that refuses every connection and every command.
    pub fn unreachable() -> Self {
        let fake = Self::new();
        fake.set_fail_connect(true);
        fake.fail_commands_with(Some(BackendError::Connection("refused".into())));
        fake
    }

    pub fn set_fail_connect(&self, fail: bool) {
        self.fail_connect.store(fail, Ordering::SeqCst);
    }

    pub fn fail_commands_with(&self, error: Option<BackendError>) {
        *self.command_error.lock().unwrap() = error;
    }

    /// Make every call succeed again.
    pub fn recover(&self) {
        self.set_fail_connect(false);
        self.fail_commands_with(None);
    }

    /// Report every scanned key twice, as SCAN may during a rehash.
    pub fn repeat_scan_results(&self, repeat: bool) {
        self.repeat_scan_results.store(repeat, Ordering::SeqCst);
    }

    /// Most keys sent in a single bulk delete.
    pub fn largest_delete(&self) -> usize {
        self.largest_delete.load(Ordering::SeqCst)
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn commands(&self) -> usize {
        self.commands.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    /// Raw substrate keys, including prefixes.
    pub fn raw_keys(&self) -> Vec<String> {
        let substrate = self.substrate.lock().unwrap();
        let mut keys: Vec<_> = substrate.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn raw_get(&self, key: &str) -> Option<String> {
        let mut substrate = self.substrate.lock().unwrap();
        substrate.live(key).map(|(value, _)| value.clone())
    }

    pub fn raw_set(&self, key: &str, value: &str) {
        let mut substrate = self.substrate.lock().unwrap();
        substrate
            .entries
            .insert(key.to_string(), (value.to_string(), None));
    }

    pub fn has_expiry(&self, key: &str) -> bool {
        let substrate = self.substrate.lock().unwrap();
        substrate
            .entries
            .get(key)
            .is_some_and(|(_, at)| at.is_some())
    }

    fn command(&self) -> Result<std::sync::MutexGuard<'_, Substrate>, BackendError> {
        self.commands.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.command_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.substrate.lock().unwrap())
    }
}

/// Undo the glob escaping of a `prefix*` pattern.
fn pattern_prefix(pattern: &str) -> String {
    let body = pattern.strip_suffix('*').unwrap_or(pattern);
    let mut prefix = String::new();
    let mut escaped = false;
    for c in body.chars() {
        if c == '\\' && !escaped {
            escaped = true;
            continue;
        }
        escaped = false;
        prefix.push(c);
    }
    prefix
}

#[async_trait]
impl Backend for FakeRedis {
    async fn connect(&self) -> Result<(), BackendError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect.load(Ordering::SeqCst) {
            return Err(BackendError::Connection("connection refused".into()));
        }
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let mut substrate = self.command()?;
        Ok(substrate.live(key).map(|(value, _)| value.clone()))
    }

    async fn set(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), BackendError> {
        let mut substrate = self.command()?;
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        substrate
            .entries
            .insert(key.to_string(), (value, expires_at));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, BackendError> {
        let mut substrate = self.command()?;
        let existed = substrate.live(key).is_some();
        substrate.entries.remove(key);
        Ok(existed)
    }

    async fn exists(&self, key: &str) -> Result<bool, BackendError> {
        let mut substrate = self.command()?;
        Ok(substrate.live(key).is_some())
    }

    async fn scan(&self, pattern: &str) -> Result<Vec<String>, BackendError> {
        let mut substrate = self.command()?;
        let prefix = pattern_prefix(pattern);
        let candidates: Vec<String> = substrate
            .entries
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .cloned()
            .collect();
        let live: Vec<String> = candidates
            .into_iter()
            .filter(|key| substrate.live(key).is_some())
            .collect();
        if self.repeat_scan_results.load(Ordering::SeqCst) {
            return Ok(live.iter().chain(live.iter()).cloned().collect());
        }
        Ok(live)
    }

    async fn delete_many(&self, keys: &[String]) -> Result<usize, BackendError> {
        let mut substrate = self.command()?;
        self.largest_delete.fetch_max(keys.len(), Ordering::SeqCst);
        Ok(keys
            .iter()
            .filter(|key| substrate.entries.remove(key.as_str()).is_some())
            .count())
    }

    async fn disconnect(&self) -> Result<(), BackendError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
