/// Error raised by a network backend.
///
/// These never cross the [`Store`](crate::Store) contract. The remote store
/// logs them and answers from its local fallback instead; the class decides
/// whether the connection state machine has to react.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// The connection could not be established or was lost.
    #[error("connection error: {0}")]
    Connection(String),
    /// The backend is a read-only replica, usually during an upstream failover.
    #[error("backend is read-only: {0}")]
    ReadOnly(String),
    /// A single command failed while the connection itself is fine.
    #[error("command '{command}' failed for key '{key}': {message}")]
    Command {
        command: &'static str,
        key: String,
        message: String,
    },
    /// Serialization or deserialization of a value failed.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl BackendError {
    /// Create a new command error.
    pub fn command(
        command: &'static str,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        BackendError::Command {
            command,
            key: key.into(),
            message: message.into(),
        }
    }

    /// Classify a Redis client error raised while running `command` on `key`.
    pub fn from_redis(command: &'static str, key: &str, err: &redis::RedisError) -> Self {
        if err.kind() == redis::ErrorKind::ReadOnly {
            BackendError::ReadOnly(err.to_string())
        } else if err.is_io_error()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
            || err.is_timeout()
        {
            BackendError::Connection(err.to_string())
        } else {
            BackendError::command(command, key, err.to_string())
        }
    }

    /// Whether this error means the connection must be re-established.
    pub fn requires_reconnect(&self) -> bool {
        matches!(self, BackendError::Connection(_) | BackendError::ReadOnly(_))
    }
}
