//! Worker thread implementation

use crate::core::{BoxedTask, PoolError, Result, StopSignal};
use crate::queue::{Dequeued, TaskQueue};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

/// Statistics for a worker thread
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Total number of tasks executed to completion
    pub tasks_executed: AtomicU64,
    /// Total number of tasks that panicked
    pub tasks_panicked: AtomicU64,
}

impl WorkerStats {
    /// Create new worker statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the executed counter
    pub fn increment_executed(&self) {
        self.tasks_executed.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the panicked counter
    pub fn increment_panicked(&self) {
        self.tasks_panicked.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total tasks executed
    pub fn get_tasks_executed(&self) -> u64 {
        self.tasks_executed.load(Ordering::Relaxed)
    }

    /// Get total tasks panicked
    pub fn get_tasks_panicked(&self) -> u64 {
        self.tasks_panicked.load(Ordering::Relaxed)
    }
}

/// One persistent thread running the dequeue-execute loop
///
/// A worker loops on [`TaskQueue::dequeue_blocking`] and runs each task
/// outside the queue lock. It exits when the queue reports `Shutdown`
/// (queue empty and shut down) or when its own [`StopSignal`] is observed
/// at the wait point.
#[derive(Debug)]
pub struct Worker {
    id: usize,
    stop: StopSignal,
    stats: Arc<WorkerStats>,
    thread: Option<thread::JoinHandle<()>>,
}

impl Worker {
    /// Spawn a new worker thread consuming from `queue`
    ///
    /// The thread is named `{name_prefix}-{id}`.
    pub fn spawn(id: usize, queue: Arc<TaskQueue>, name_prefix: &str) -> Result<Self> {
        let stop = StopSignal::new();
        let stats = Arc::new(WorkerStats::new());

        let thread = thread::Builder::new()
            .name(format!("{}-{}", name_prefix, id))
            .spawn({
                let stop = stop.clone();
                let stats = Arc::clone(&stats);
                move || Self::run(id, queue, stop, stats)
            })
            .map_err(|e| {
                PoolError::spawn_with_source(id, 0, "failed to spawn worker thread", e)
            })?;

        Ok(Self {
            id,
            stop,
            stats,
            thread: Some(thread),
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Get worker statistics
    pub fn stats(&self) -> Arc<WorkerStats> {
        Arc::clone(&self.stats)
    }

    /// Request that this worker stop at its next wait point
    ///
    /// A worker mid-task finishes the task first; the signal is only
    /// observed between tasks. Callers should follow up with
    /// [`TaskQueue::wake_all`] so an idle worker notices promptly.
    pub fn stop(&self) {
        self.stop.set();
    }

    /// Join the worker thread
    pub fn join(mut self) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| PoolError::join(self.id, "worker thread panicked"))?;
        }
        Ok(())
    }

    /// Main worker loop
    fn run(id: usize, queue: Arc<TaskQueue>, stop: StopSignal, stats: Arc<WorkerStats>) {
        log::debug!("worker {} started", id);

        loop {
            match queue.dequeue_blocking(&stop) {
                Dequeued::Task(mut task) => {
                    Self::execute_task(id, &mut task, &stats);
                }
                Dequeued::Stopped => {
                    log::debug!(
                        "worker {} retiring on stop request ({} tasks executed)",
                        id,
                        stats.get_tasks_executed()
                    );
                    break;
                }
                Dequeued::Shutdown => {
                    log::debug!(
                        "worker {} exiting on shutdown ({} tasks executed)",
                        id,
                        stats.get_tasks_executed()
                    );
                    break;
                }
            }
        }
    }

    /// Execute a single task with panic protection
    ///
    /// Runs with the queue lock released. A panic is contained here so that
    /// the worker survives it; nothing is reported to the submitter.
    fn execute_task(id: usize, task: &mut BoxedTask, stats: &WorkerStats) {
        match catch_unwind(AssertUnwindSafe(|| task.run())) {
            Ok(()) => {
                stats.increment_executed();
            }
            Err(panic_info) => {
                let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_info.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                log::error!(
                    "worker {}: task '{}' panicked: {}",
                    id,
                    task.task_type(),
                    panic_msg
                );
                stats.increment_panicked();
            }
        }
    }
}
