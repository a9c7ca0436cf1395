use thiserror::Error;

/// Pool-specific error types
#[derive(Debug, Error)]
pub enum PoolError {
    /// Every replica failed every try within a single acquisition. The log
    /// carries one line per failed attempt, in encounter order.
    #[error("All connection tries failed. Log: \n\n{log}\n")]
    AllConnectionTriesFailed { log: String },

    #[error("Replica unavailable: {0}")]
    ReplicaUnavailable(String),

    #[error("Cannot read system clock: {0}")]
    ClockError(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<String> for PoolError {
    fn from(msg: String) -> Self {
        PoolError::Internal(msg)
    }
}

impl From<&str> for PoolError {
    fn from(msg: &str) -> Self {
        PoolError::Internal(msg.to_string())
    }
}

impl PoolError {
    pub fn replica_unavailable<S: Into<String>>(msg: S) -> Self {
        PoolError::ReplicaUnavailable(msg.into())
    }

    pub fn clock<S: Into<String>>(msg: S) -> Self {
        PoolError::ClockError(msg.into())
    }

    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        PoolError::ConfigurationError(msg.into())
    }

    pub fn internal<S: Into<String>>(msg: S) -> Self {
        PoolError::Internal(msg.into())
    }
}

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;
