use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fixed-window counter, the typical value a rate limiter stores.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WindowCounter {
    pub count: u32,
    pub window_start_ms: u64,
}

impl WindowCounter {
    pub fn first(window_start_ms: u64) -> Self {
        Self {
            count: 1,
            window_start_ms,
        }
    }

    pub fn incremented(&self) -> Self {
        Self {
            count: self.count + 1,
            window_start_ms: self.window_start_ms,
        }
    }
}

/// Generate client keys for different traffic patterns
pub struct KeyGenerator {
    num_keys: usize,
}

impl KeyGenerator {
    pub fn new(num_keys: usize) -> Self {
        Self { num_keys }
    }

    /// Generate sequential keys (every client seen once)
    pub fn sequential(&self) -> Vec<String> {
        (0..self.num_keys).map(|i| format!("ip:{}", i)).collect()
    }

    /// Generate keys with Zipf distribution (realistic - few noisy clients)
    pub fn zipf_random(&self, count: usize) -> Vec<String> {
        let mut rng = rand::thread_rng();
        let mut keys = Vec::with_capacity(count);

        for _ in 0..count {
            // Simplified Zipf: 80% of requests come from 20% of clients
            let key_id = if rng.gen_bool(0.8) {
                rng.gen_range(0..(self.num_keys / 5).max(1))
            } else {
                rng.gen_range((self.num_keys / 5)..self.num_keys)
            };
            keys.push(format!("ip:{}", key_id));
        }

        keys
    }
}
