//! Cooperative stop signal for worker threads
//!
//! A [`StopSignal`] is the pool's only interruption primitive. It is set by
//! the controller when a worker should retire (see `WorkerPool::shrink`) and
//! observed by the worker exclusively at its dequeue wait point. Because the
//! signal is never acted upon while the worker holds the queue lock or is
//! mid-task, a stopping worker can never strand the lock or tear down a task
//! partway.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A thread-safe, monotonic stop flag shared between a worker and the pool
/// controller
///
/// Cloning produces a handle to the same underlying flag. Once set, the
/// signal is never cleared.
///
/// # Example
///
/// ```rust
/// use rust_worker_pool::StopSignal;
///
/// let signal = StopSignal::new();
/// let observer = signal.clone();
///
/// assert!(!observer.is_set());
/// signal.set();
/// assert!(observer.is_set());
/// ```
#[derive(Clone, Default)]
pub struct StopSignal {
    inner: Arc<AtomicBool>,
}

impl StopSignal {
    /// Create a new stop signal (not set)
    pub fn new() -> Self {
        Self {
            inner: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request a stop
    ///
    /// Idempotent; the flag never transitions back to unset.
    pub fn set(&self) {
        self.inner.store(true, Ordering::Release);
    }

    /// Check whether a stop has been requested
    ///
    /// Lock-free, suitable for checking inside the wait loop.
    #[inline]
    pub fn is_set(&self) -> bool {
        self.inner.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for StopSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StopSignal")
            .field("set", &self.is_set())
            .finish()
    }
}
