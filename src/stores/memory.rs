use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::store::{Store, effective_ttl};

/// Internal stored entry with its expiry bookkeeping.
struct Slot<V> {
    value: V,
    expires_at: Option<Instant>,
    /// Identifies the write that created this slot; expiry timers only
    /// remove the slot they were scheduled for.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl<V> Slot<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| at > now)
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct State<V> {
    slots: HashMap<String, Slot<V>>,
    next_generation: u64,
}

fn lock<V>(state: &Mutex<State<V>>) -> MutexGuard<'_, State<V>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process store backed by a `HashMap` behind a mutex.
///
/// Entries set with a TTL get their own expiry task on the Tokio runtime.
/// Overwriting or deleting a key aborts its pending task, so a timer never
/// evicts a newer value. Reads also ignore entries whose expiry instant has
/// passed, which keeps the store correct when no runtime is available to
/// run timers.
///
/// Entries are only visible to this instance: use it for single-process
/// deployments, or as the fallback of a [`RedisStore`](crate::RedisStore).
pub struct MemoryStore<V> {
    state: Arc<Mutex<State<V>>>,
}

impl<V> MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty store.
    pub fn new() -> Self {
        MemoryStore {
            state: Arc::new(Mutex::new(State {
                slots: HashMap::new(),
                next_generation: 0,
            })),
        }
    }

    fn schedule_expiry(
        &self,
        key: String,
        generation: u64,
        ttl: Duration,
    ) -> Option<JoinHandle<()>> {
        let handle = Handle::try_current().ok()?;
        let state: Weak<Mutex<State<V>>> = Arc::downgrade(&self.state);

        Some(handle.spawn(async move {
            tokio::time::sleep(ttl).await;

            let Some(state) = state.upgrade() else {
                return;
            };
            let mut state = lock(&state);
            let current = state
                .slots
                .get(&key)
                .is_some_and(|slot| slot.generation == generation);
            if current {
                state.slots.remove(&key);
                tracing::trace!(key = %key, "expired entry removed");
            }
        }))
    }
}

impl<V> Default for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> Drop for MemoryStore<V> {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        for slot in state.slots.values_mut() {
            slot.cancel_timer();
        }
    }
}

#[async_trait]
impl<V> Store<V> for MemoryStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Option<V> {
        let mut state = lock(&self.state);
        let live = state.slots.get(key)?.is_live(Instant::now());

        if !live {
            // Expired but its timer has not run yet.
            if let Some(mut slot) = state.slots.remove(key) {
                slot.cancel_timer();
            }
            return None;
        }

        state.slots.get(key).map(|slot| slot.value.clone())
    }

    async fn set(&self, key: &str, value: V, ttl: Option<Duration>) {
        let ttl = effective_ttl(ttl);
        let mut state = lock(&self.state);

        state.next_generation += 1;
        let generation = state.next_generation;

        let now = Instant::now();
        let expires_at = ttl.and_then(|ttl| now.checked_add(ttl));
        let timer = match (ttl, expires_at) {
            (Some(ttl), Some(_)) => self.schedule_expiry(key.to_string(), generation, ttl),
            _ => None,
        };

        let slot = Slot {
            value,
            expires_at,
            generation,
            timer,
        };
        if let Some(mut previous) = state.slots.insert(key.to_string(), slot) {
            previous.cancel_timer();
        }
    }

    async fn delete(&self, key: &str) -> bool {
        let mut state = lock(&self.state);
        match state.slots.remove(key) {
            Some(mut slot) => {
                slot.cancel_timer();
                slot.is_live(Instant::now())
            }
            None => false,
        }
    }

    async fn has(&self, key: &str) -> bool {
        let state = lock(&self.state);
        state
            .slots
            .get(key)
            .is_some_and(|slot| slot.is_live(Instant::now()))
    }

    async fn size(&self) -> usize {
        let state = lock(&self.state);
        let now = Instant::now();
        state.slots.values().filter(|slot| slot.is_live(now)).count()
    }

    async fn keys(&self) -> Vec<String> {
        let state = lock(&self.state);
        let now = Instant::now();
        state
            .slots
            .iter()
            .filter(|(_, slot)| slot.is_live(now))
            .map(|(key, _)| key.clone())
            .collect()
    }

    async fn clear(&self) {
        let mut state = lock(&self.state);
        for (_, mut slot) in state.slots.drain() {
            slot.cancel_timer();
        }
    }
}
