//! Convenient re-exports for common types and traits

pub use crate::core::{BoxedTask, ClosureTask, PoolError, Result, StopSignal, Task};
pub use crate::pool::{WorkerPool, WorkerPoolConfig, WorkerStats};
