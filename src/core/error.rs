//! Error types for the worker pool

/// Result type for worker pool operations
pub type Result<T> = std::result::Result<T, PoolError>;

/// Errors that can occur in the worker pool
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum PoolError {
    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// Failed to spawn a worker thread with details
    ///
    /// `spawned` carries the number of workers successfully created before
    /// the failure, so callers can observe partial success.
    #[error("Failed to spawn worker #{worker_id} ({spawned} spawned): {message}")]
    SpawnError {
        /// ID of the worker that failed to spawn
        worker_id: usize,
        /// Number of workers successfully spawned before the failure
        spawned: usize,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Task submission rejected because the queue is at capacity
    #[error("Task rejected: queue is full ({pending}/{capacity} pending)")]
    Rejected {
        /// Current number of pending tasks
        pending: usize,
        /// Maximum queue capacity
        capacity: usize,
    },

    /// The pool has been shut down and no longer accepts work
    #[error("Worker pool is shutting down")]
    ShuttingDown,

    /// Failed to join a worker thread during shutdown
    #[error("Failed to join worker #{worker_id}: {message}")]
    JoinError {
        /// ID of the worker that failed to join
        worker_id: usize,
        /// Error message
        message: String,
    },
}

impl PoolError {
    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        PoolError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a spawn error
    pub fn spawn(worker_id: usize, spawned: usize, message: impl Into<String>) -> Self {
        PoolError::SpawnError {
            worker_id,
            spawned,
            message: message.into(),
            source: None,
        }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        worker_id: usize,
        spawned: usize,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        PoolError::SpawnError {
            worker_id,
            spawned,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create a rejected error
    pub fn rejected(pending: usize, capacity: usize) -> Self {
        PoolError::Rejected { pending, capacity }
    }

    /// Create a join error
    pub fn join(worker_id: usize, message: impl Into<String>) -> Self {
        PoolError::JoinError {
            worker_id,
            message: message.into(),
        }
    }

    /// Attach the number of successfully spawned workers to a spawn error
    ///
    /// Leaves any other error variant unchanged.
    pub fn with_spawned(self, spawned: usize) -> Self {
        match self {
            PoolError::SpawnError {
                worker_id,
                message,
                source,
                ..
            } => PoolError::SpawnError {
                worker_id,
                spawned,
                message,
                source,
            },
            other => other,
        }
    }
}
