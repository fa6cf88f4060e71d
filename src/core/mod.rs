//! Core types and traits for the worker pool

pub mod error;
pub mod stop;
pub mod task;

pub use error::{PoolError, Result};
pub use stop::StopSignal;
pub use task::{BoxedTask, ClosureTask, Task};
