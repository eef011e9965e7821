//! Connection lifecycle of a [`RedisStore`](crate::RedisStore).
//!
//! ```text
//! disconnected --(connect attempt)--> connecting
//! connecting --(success)--> ready
//! connecting --(failure, attempts < max)--> connecting (after backoff)
//! connecting --(failure, attempts >= max)--> degraded   [terminal]
//! ready --(network error)--> connecting
//! ready --(read-only error)--> connecting
//! degraded --(anything)--> degraded                      [terminal]
//! ```
//!
//! Only `Ready` sends commands to the network; every other state is served
//! by the local fallback. `Degraded` never exits: once the retry budget is
//! spent the instance stays local until the process restarts.

use std::fmt;
use std::time::Duration;

/// State of the connection to the network backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection and no attempt in progress.
    Disconnected,
    /// A connection attempt is in progress. `attempt` is 1-based.
    Connecting { attempt: u32 },
    /// Connected; commands go to the network backend.
    Ready,
    /// Retries exhausted; everything is served locally.
    Degraded,
}

/// Events driving [`ConnectionState`] transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    ConnectAttempt,
    ConnectSucceeded,
    ConnectFailed,
    NetworkError,
    ReadOnlyError,
    Shutdown,
}

impl ConnectionState {
    /// Compute the state that follows `event`.
    ///
    /// `max_attempts` is the number of consecutive failed connection
    /// attempts after which the state becomes `Degraded`.
    pub fn on(self, event: ConnectionEvent, max_attempts: u32) -> ConnectionState {
        use ConnectionEvent::*;
        use ConnectionState::*;

        match (self, event) {
            (Degraded, _) => Degraded,
            (Disconnected, ConnectAttempt) => Connecting { attempt: 1 },
            (Connecting { .. }, ConnectSucceeded) => Ready,
            (Connecting { attempt }, ConnectFailed) if attempt >= max_attempts.max(1) => Degraded,
            (Connecting { attempt }, ConnectFailed) => Connecting {
                attempt: attempt + 1,
            },
            (Ready, NetworkError | ReadOnlyError) => Connecting { attempt: 1 },
            (_, Shutdown) => Disconnected,
            (state, _) => state,
        }
    }

    /// Whether commands may be sent to the network backend.
    pub fn is_ready(self) -> bool {
        self == ConnectionState::Ready
    }

    pub fn is_degraded(self) -> bool {
        self == ConnectionState::Degraded
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Disconnected => write!(f, "disconnected"),
            ConnectionState::Connecting { attempt } => {
                write!(f, "connecting (attempt {})", attempt)
            }
            ConnectionState::Ready => write!(f, "ready"),
            ConnectionState::Degraded => write!(f, "degraded"),
        }
    }
}

/// Connection retry policy.
///
/// The delay after failed attempt `n` is `min(n * base_delay, max_delay)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Number of connection attempts before the store degrades permanently.
    pub max_attempts: u32,

    /// Delay growth per failed attempt.
    pub base_delay: Duration,

    /// Upper bound for the delay between two attempts.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 10,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(2_000),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt).min(self.max_delay)
    }
}
