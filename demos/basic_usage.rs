//! Basic worker pool usage example
//!
//! Constructs a pool, submits a single long-running task, waits a while and
//! shuts the pool down.
//!
//! Run with: cargo run --example basic_usage

use rust_worker_pool::prelude::*;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();

    // Create a pool with 5 worker threads
    let pool = WorkerPool::with_workers(5)?;
    println!("pool started with {} workers", pool.active_count());

    // Submit one task
    pool.execute(|| {
        for _ in 0..3 {
            thread::sleep(Duration::from_secs(1));
            println!("task running on {:?}", thread::current().name());
        }
    })?;
    println!("task submitted");

    // Let the task make progress, then tear everything down
    thread::sleep(Duration::from_secs(5));

    println!("tasks executed: {}", pool.total_tasks_executed());
    pool.shutdown_and_join()?;
    println!("pool shut down");

    Ok(())
}
