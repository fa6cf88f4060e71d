//! Pool controller and worker implementations

pub mod worker;
pub mod worker_pool;

pub use worker::{Worker, WorkerStats};
pub use worker_pool::{
    WorkerPool, WorkerPoolConfig, DEFAULT_MAX_WORKERS, DEFAULT_QUEUE_CAPACITY,
};
