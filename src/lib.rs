//! # Rust Worker Pool
//!
//! A fixed-capacity worker thread pool: a shared FIFO task queue consumed by
//! long-lived worker threads, with runtime resizing and a coordinated
//! shutdown protocol.
//!
//! ## Features
//!
//! - **Shared FIFO queue**: One capacity-limited queue serves every worker;
//!   submissions over capacity are rejected, not buffered
//! - **Condition-variable wakeups**: Idle workers block on a condvar; each
//!   submission wakes exactly one, shutdown wakes all
//! - **Runtime resizing**: `grow` adds workers up to a configurable ceiling,
//!   `shrink` retires the most recently added ones cooperatively
//! - **Coordinated shutdown**: `shutdown_and_join` drains the queue and
//!   joins every worker thread, including retired ones
//! - **Panic containment**: A panicking task is logged and counted; the
//!   worker survives it
//!
//! ## Quick Start
//!
//! ```rust
//! use rust_worker_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! // Create a pool with 4 worker threads
//! let pool = WorkerPool::with_workers(4)?;
//!
//! // Submit tasks
//! for i in 0..10 {
//!     pool.execute(move || {
//!         println!("task {} executing", i);
//!     })?;
//! }
//!
//! // Drain the queue and join every worker
//! pool.shutdown_and_join()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Pool Configuration
//!
//! ```rust
//! use rust_worker_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let config = WorkerPoolConfig::new(4)
//!     .with_max_workers(16)
//!     .with_queue_capacity(100)
//!     .with_thread_name_prefix("my-worker");
//!
//! let pool = WorkerPool::with_config(config)?;
//! # pool.shutdown_and_join()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Resizing at Runtime
//!
//! ```rust
//! use rust_worker_pool::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let pool = WorkerPool::with_workers(2)?;
//!
//! // Add workers under load
//! let added = pool.grow(3)?;
//! assert_eq!(added, 3);
//!
//! // Retire them again; never below one live worker
//! let remaining = pool.shrink(3);
//! assert_eq!(remaining, 2);
//!
//! pool.shutdown_and_join()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Tasks
//!
//! ```rust
//! use rust_worker_pool::prelude::*;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! struct CountingTask {
//!     counter: Arc<AtomicUsize>,
//! }
//!
//! impl Task for CountingTask {
//!     fn run(&mut self) {
//!         self.counter.fetch_add(1, Ordering::SeqCst);
//!     }
//!
//!     fn task_type(&self) -> &str {
//!         "CountingTask"
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let pool = WorkerPool::with_workers(2)?;
//! let counter = Arc::new(AtomicUsize::new(0));
//!
//! pool.submit(CountingTask {
//!     counter: Arc::clone(&counter),
//! })?;
//!
//! pool.shutdown_and_join()?;
//! assert_eq!(counter.load(Ordering::SeqCst), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Limitations
//!
//! The pool deliberately carries no timeouts: a task that never returns
//! blocks shutdown forever, and a worker waiting on an empty, open queue
//! waits indefinitely. Tasks cannot report results or failures back to
//! their submitter; capture a side channel in the closure if you need one.
//! `grow`, `shrink` and `shutdown_and_join` are expected to be driven by a
//! single controlling thread.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod core;
pub mod pool;
pub mod prelude;
pub mod queue;

pub use crate::core::{BoxedTask, ClosureTask, PoolError, Result, StopSignal, Task};
pub use crate::pool::{
    Worker, WorkerPool, WorkerPoolConfig, WorkerStats, DEFAULT_MAX_WORKERS,
    DEFAULT_QUEUE_CAPACITY,
};
pub use crate::queue::{Dequeued, EnqueueError, TaskQueue};
