//! Pool controller implementation

use crate::core::{BoxedTask, ClosureTask, PoolError, Result, Task};
use crate::pool::worker::{Worker, WorkerStats};
use crate::queue::{EnqueueError, TaskQueue};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Default ceiling on the number of live workers
pub const DEFAULT_MAX_WORKERS: usize = 64;

/// Default maximum number of pending tasks
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

fn default_workers() -> usize {
    num_cpus::get().clamp(1, DEFAULT_MAX_WORKERS)
}

/// Configuration for a worker pool
#[derive(Clone, Debug)]
pub struct WorkerPoolConfig {
    /// Number of workers spawned at init (0 = number of CPUs)
    pub initial_workers: usize,
    /// Ceiling on the number of live workers; `grow` stops here
    pub max_workers: usize,
    /// Maximum number of pending tasks tolerated simultaneously
    pub queue_capacity: usize,
    /// Thread name prefix
    pub thread_name_prefix: String,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            initial_workers: default_workers(),
            max_workers: DEFAULT_MAX_WORKERS,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            thread_name_prefix: "worker".to_string(),
        }
    }
}

impl WorkerPoolConfig {
    /// Create a new configuration with the specified initial worker count
    #[must_use]
    pub fn new(initial_workers: usize) -> Self {
        Self {
            initial_workers: if initial_workers == 0 {
                default_workers()
            } else {
                initial_workers
            },
            ..Default::default()
        }
    }

    /// Set the worker ceiling
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers;
        self
    }

    /// Set the queue capacity
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.initial_workers == 0 {
            return Err(PoolError::invalid_config(
                "initial_workers",
                "initial worker count must be greater than 0",
            ));
        }
        if self.max_workers == 0 {
            return Err(PoolError::invalid_config(
                "max_workers",
                "worker ceiling must be greater than 0",
            ));
        }
        if self.initial_workers > self.max_workers {
            return Err(PoolError::invalid_config(
                "initial_workers",
                "initial worker count exceeds max_workers",
            ));
        }
        if self.queue_capacity == 0 {
            return Err(PoolError::invalid_config(
                "queue_capacity",
                "queue capacity must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// A fixed-capacity pool of worker threads draining one shared FIFO queue
///
/// The pool owns the [`TaskQueue`] and the worker set and mediates all
/// synchronization. Workers are spawned at construction, can be added with
/// [`grow`](Self::grow) and retired with [`shrink`](Self::shrink), and are
/// all joined by [`shutdown_and_join`](Self::shutdown_and_join).
///
/// # Resize and shutdown serialization
///
/// `grow`, `shrink` and `shutdown_and_join` are meant to be driven by a
/// single controlling thread. They are memory-safe under concurrent use,
/// but the resulting worker counts are unspecified; serialize these calls.
/// `submit`/`execute` may be called freely from any number of threads.
pub struct WorkerPool {
    config: WorkerPoolConfig,
    queue: Arc<TaskQueue>,
    workers: RwLock<Vec<Worker>>,
    // Stopped by shrink but not yet joined; joined during shutdown.
    retired: Mutex<Vec<Worker>>,
    next_worker_id: AtomicUsize,
    shutdown: AtomicBool,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .field("active_workers", &self.workers.read().len())
            .field("pending_tasks", &self.queue.len())
            .field("shutdown", &self.shutdown.load(Ordering::Relaxed))
            .finish()
    }
}

impl WorkerPool {
    /// Create a pool with the default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(WorkerPoolConfig::default())
    }

    /// Create a pool with the specified number of workers
    pub fn with_workers(initial_workers: usize) -> Result<Self> {
        Self::with_config(WorkerPoolConfig::new(initial_workers))
    }

    /// Create a pool with a custom configuration and spawn its workers
    ///
    /// # Errors
    ///
    /// - [`PoolError::InvalidConfig`] if the configuration is rejected by
    ///   [`WorkerPoolConfig::validate`].
    /// - [`PoolError::SpawnError`] if thread creation fails partway. The
    ///   workers spawned before the failure are stopped and joined before
    ///   the error is returned; its `spawned` field records how many there
    ///   were.
    pub fn with_config(config: WorkerPoolConfig) -> Result<Self> {
        config.validate()?;

        let queue = Arc::new(TaskQueue::new(config.queue_capacity));
        let pool = Self {
            queue,
            workers: RwLock::new(Vec::with_capacity(config.initial_workers)),
            retired: Mutex::new(Vec::new()),
            next_worker_id: AtomicUsize::new(0),
            shutdown: AtomicBool::new(false),
            config,
        };

        {
            let mut workers = pool.workers.write();
            for _ in 0..pool.config.initial_workers {
                match pool.spawn_worker() {
                    Ok(worker) => workers.push(worker),
                    Err(err) => {
                        let spawned = workers.len();
                        log::error!(
                            "worker pool init failed after {} of {} workers: {}",
                            spawned,
                            pool.config.initial_workers,
                            err
                        );
                        for worker in workers.iter() {
                            worker.stop();
                        }
                        pool.queue.wake_all();
                        for worker in workers.drain(..) {
                            let _ = worker.join();
                        }
                        return Err(err.with_spawned(spawned));
                    }
                }
            }
        }

        Ok(pool)
    }

    fn spawn_worker(&self) -> Result<Worker> {
        let id = self.next_worker_id.fetch_add(1, Ordering::Relaxed);
        Worker::spawn(id, Arc::clone(&self.queue), &self.config.thread_name_prefix)
    }

    /// Submit a task to the pool
    ///
    /// On success the task is appended in FIFO order and exactly one waiting
    /// worker is woken. There is no notification of eventual completion.
    ///
    /// # Errors
    ///
    /// - [`PoolError::Rejected`] if the queue is at capacity; the task is
    ///   dropped and the queue is unchanged. The caller may retry later.
    /// - [`PoolError::ShuttingDown`] if the pool has been shut down.
    pub fn submit<T: Task + 'static>(&self, task: T) -> Result<()> {
        self.submit_boxed(Box::new(task))
    }

    /// Submit a closure as a task
    pub fn execute<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(ClosureTask::new(f))
    }

    fn submit_boxed(&self, task: BoxedTask) -> Result<()> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(PoolError::ShuttingDown);
        }

        match self.queue.enqueue(task) {
            Ok(()) => Ok(()),
            Err(EnqueueError::Full(_)) => Err(PoolError::rejected(
                self.queue.len(),
                self.queue.capacity(),
            )),
            Err(EnqueueError::Shutdown(_)) => Err(PoolError::ShuttingDown),
        }
    }

    /// Add up to `n` workers, returning the count actually created
    ///
    /// Stops early at the `max_workers` ceiling; hitting the ceiling is not
    /// an error and simply yields a smaller count, possibly `Ok(0)`. A spawn
    /// failure after at least one success logs a warning and returns the
    /// partial count.
    ///
    /// # Errors
    ///
    /// - [`PoolError::SpawnError`] if thread creation fails before any
    ///   worker was created.
    /// - [`PoolError::ShuttingDown`] if the pool has been shut down.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rust_worker_pool::prelude::*;
    ///
    /// # fn main() -> Result<()> {
    /// let pool = WorkerPool::with_workers(2)?;
    /// let added = pool.grow(2)?;
    /// assert_eq!(added, 2);
    /// assert_eq!(pool.active_count(), 4);
    /// # pool.shutdown_and_join()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn grow(&self, n: usize) -> Result<usize> {
        if self.shutdown.load(Ordering::Acquire) {
            return Err(PoolError::ShuttingDown);
        }
        if n == 0 {
            return Ok(0);
        }

        let mut workers = self.workers.write();
        let room = self.config.max_workers.saturating_sub(workers.len());
        let goal = n.min(room);

        let mut created = 0;
        for _ in 0..goal {
            match self.spawn_worker() {
                Ok(worker) => {
                    workers.push(worker);
                    created += 1;
                }
                Err(err) => {
                    if created == 0 {
                        return Err(err.with_spawned(0));
                    }
                    log::warn!(
                        "grow stopped after {} of {} workers: {}",
                        created,
                        n,
                        err
                    );
                    break;
                }
            }
        }

        Ok(created)
    }

    /// Retire up to `n` workers, returning the new active count
    ///
    /// The most-recently-spawned workers are stopped first. The pool never
    /// shrinks below one live worker, favoring liveness over honoring an
    /// aggressive request. Retirement is cooperative: each targeted worker
    /// gets its stop signal set and the queue is woken; a worker mid-task
    /// finishes that task and exits at its next wait point. Retired workers
    /// are joined by [`shutdown_and_join`](Self::shutdown_and_join).
    ///
    /// # Example
    ///
    /// ```rust
    /// use rust_worker_pool::prelude::*;
    ///
    /// # fn main() -> Result<()> {
    /// let pool = WorkerPool::with_workers(4)?;
    /// assert_eq!(pool.shrink(2), 2);
    /// // Never below one live worker
    /// assert_eq!(pool.shrink(100), 1);
    /// # pool.shutdown_and_join()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn shrink(&self, n: usize) -> usize {
        let mut workers = self.workers.write();
        if n == 0 || workers.is_empty() {
            return workers.len();
        }

        let target = workers.len().saturating_sub(n).max(1);
        {
            let mut retired = self.retired.lock();
            while workers.len() > target {
                if let Some(worker) = workers.pop() {
                    log::debug!("retiring worker {}", worker.id());
                    worker.stop();
                    retired.push(worker);
                }
            }
        }
        let remaining = workers.len();
        drop(workers);

        // Rouse idle workers so the stop signals are observed promptly
        self.queue.wake_all();
        remaining
    }

    /// Shut the pool down and join every worker
    ///
    /// Sets the shutdown flag, wakes all waiters, then joins every live
    /// worker in spawn order followed by the workers retired by `shrink`.
    /// Workers drain the queue before exiting, so every task pending at
    /// shutdown time executes first. Individual join failures are logged
    /// and do not abort the teardown.
    ///
    /// Idempotent: subsequent calls return `Ok(())` immediately. Blocks for
    /// as long as the slowest in-flight task takes; there is no timeout.
    pub fn shutdown_and_join(&self) -> Result<()> {
        if self.shutdown.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        self.queue.shutdown();

        let live = std::mem::take(&mut *self.workers.write());
        let retired = std::mem::take(&mut *self.retired.lock());
        for worker in live.into_iter().chain(retired) {
            let id = worker.id();
            if let Err(err) = worker.join() {
                log::warn!("failed to join worker {}: {}", id, err);
            }
        }

        Ok(())
    }

    /// Number of live workers
    pub fn active_count(&self) -> usize {
        self.workers.read().len()
    }

    /// Number of tasks currently pending in the queue
    pub fn pending_count(&self) -> usize {
        self.queue.len()
    }

    /// Maximum number of pending tasks
    pub fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Ceiling on the number of live workers
    pub fn max_workers(&self) -> usize {
        self.config.max_workers
    }

    /// Check whether the pool has been shut down
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Get statistics for all live workers
    pub fn worker_stats(&self) -> Vec<Arc<WorkerStats>> {
        self.workers.read().iter().map(|w| w.stats()).collect()
    }

    /// Total tasks executed across all live workers
    pub fn total_tasks_executed(&self) -> u64 {
        self.workers
            .read()
            .iter()
            .map(|w| w.stats().get_tasks_executed())
            .sum()
    }

    /// Total tasks panicked across all live workers
    pub fn total_tasks_panicked(&self) -> u64 {
        self.workers
            .read()
            .iter()
            .map(|w| w.stats().get_tasks_panicked())
            .sum()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if !self.shutdown.load(Ordering::Acquire) {
            if let Err(err) = self.shutdown_and_join() {
                log::error!("failed to shut down worker pool during drop: {}", err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_pool_creation() {
        let pool = WorkerPool::with_workers(4).expect("failed to create pool");
        assert_eq!(pool.active_count(), 4);
        assert!(!pool.is_shutdown());

        pool.shutdown_and_join().expect("failed to shut down pool");
        assert!(pool.is_shutdown());
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_default_pool_uses_cpu_count() {
        let pool = WorkerPool::new().expect("failed to create pool");
        assert_eq!(pool.active_count(), num_cpus::get().clamp(1, DEFAULT_MAX_WORKERS));
        pool.shutdown_and_join().expect("failed to shut down pool");
    }

    #[test]
    fn test_config_validation() {
        let config = WorkerPoolConfig {
            initial_workers: 0,
            ..Default::default()
        };
        assert!(matches!(
            WorkerPool::with_config(config),
            Err(PoolError::InvalidConfig { .. })
        ));

        let config = WorkerPoolConfig::new(8).with_max_workers(4);
        assert!(matches!(
            WorkerPool::with_config(config),
            Err(PoolError::InvalidConfig { .. })
        ));

        let config = WorkerPoolConfig::new(2).with_queue_capacity(0);
        assert!(matches!(
            WorkerPool::with_config(config),
            Err(PoolError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_task_execution() {
        let pool = WorkerPool::with_workers(2).expect("failed to create pool");
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let counter_clone = Arc::clone(&counter);
            pool.execute(move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            })
            .expect("failed to submit task");
        }

        // Shutdown drains the queue, so all tasks have run afterwards
        pool.shutdown_and_join().expect("failed to shut down pool");
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_rejection_at_capacity_and_recovery() {
        let config = WorkerPoolConfig::new(1).with_queue_capacity(10);
        let pool = WorkerPool::with_config(config).expect("failed to create pool");

        // Hold the single worker busy so the queue fills up
        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let (done_tx, done_rx) = std::sync::mpsc::channel::<()>();
        pool.execute(move || {
            started_tx.send(()).unwrap();
            let _ = done_rx.recv();
        })
        .expect("failed to submit blocking task");
        started_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("blocking task should start");

        // Fill the queue to capacity
        for _ in 0..10 {
            pool.execute(|| {}).expect("failed to fill queue");
        }
        assert_eq!(pool.pending_count(), 10);

        // The 11th submit is rejected and leaves the queue unchanged
        let result = pool.execute(|| {});
        assert!(
            matches!(result, Err(PoolError::Rejected { pending: 10, capacity: 10 })),
            "expected Rejected, got: {:?}",
            result
        );
        assert_eq!(pool.pending_count(), 10);

        // After the queue drains, submission succeeds again
        done_tx.send(()).unwrap();
        while pool.pending_count() > 0 {
            thread::sleep(Duration::from_millis(10));
        }
        pool.execute(|| {}).expect("submit should succeed after drain");

        pool.shutdown_and_join().expect("failed to shut down pool");
    }

    #[test]
    fn test_grow() {
        let pool = WorkerPool::with_workers(2).expect("failed to create pool");

        assert_eq!(pool.grow(0).unwrap(), 0);
        assert_eq!(pool.active_count(), 2);

        assert_eq!(pool.grow(3).unwrap(), 3);
        assert_eq!(pool.active_count(), 5);

        pool.shutdown_and_join().expect("failed to shut down pool");
    }

    #[test]
    fn test_grow_stops_at_ceiling() {
        let config = WorkerPoolConfig::new(2).with_max_workers(4);
        let pool = WorkerPool::with_config(config).expect("failed to create pool");

        // Only room for 2 more
        assert_eq!(pool.grow(10).unwrap(), 2);
        assert_eq!(pool.active_count(), 4);

        // At the ceiling: healthy, zero created
        assert_eq!(pool.grow(1).unwrap(), 0);
        assert_eq!(pool.active_count(), 4);

        pool.shutdown_and_join().expect("failed to shut down pool");
    }

    #[test]
    fn test_shrink_floor_of_one() {
        let pool = WorkerPool::with_workers(3).expect("failed to create pool");

        assert_eq!(pool.shrink(0), 3);
        assert_eq!(pool.shrink(100), 1);
        assert_eq!(pool.active_count(), 1);

        // The surviving worker still serves tasks
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        pool.execute(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        })
        .expect("failed to submit task");

        pool.shutdown_and_join().expect("failed to shut down pool");
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_grow_then_shrink_round_trip() {
        let pool = WorkerPool::with_workers(2).expect("failed to create pool");

        assert_eq!(pool.grow(3).unwrap(), 3);
        assert_eq!(pool.shrink(3), 2);
        assert_eq!(pool.active_count(), 2);

        // Shutdown joins the live and the retired workers without hanging
        pool.shutdown_and_join().expect("failed to shut down pool");
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_shrink_returns_while_task_in_flight() {
        let pool = WorkerPool::with_workers(2).expect("failed to create pool");

        let (started_tx, started_rx) = std::sync::mpsc::channel();
        let (done_tx, done_rx) = std::sync::mpsc::channel::<()>();
        pool.execute(move || {
            started_tx.send(()).unwrap();
            let _ = done_rx.recv();
        })
        .expect("failed to submit blocking task");
        started_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("blocking task should start");

        // Shrink returns immediately even though one worker is mid-task
        assert_eq!(pool.shrink(1), 1);

        // Release the task; the retired worker exits at its next wait point
        done_tx.send(()).unwrap();
        pool.shutdown_and_join().expect("failed to shut down pool");
    }

    #[test]
    fn test_submit_after_shutdown() {
        let pool = WorkerPool::with_workers(2).expect("failed to create pool");
        pool.shutdown_and_join().expect("failed to shut down pool");

        let result = pool.execute(|| {});
        assert!(matches!(result, Err(PoolError::ShuttingDown)));

        let result = pool.grow(1);
        assert!(matches!(result, Err(PoolError::ShuttingDown)));

        assert_eq!(pool.shrink(1), 0);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let pool = WorkerPool::with_workers(2).expect("failed to create pool");
        pool.shutdown_and_join().expect("first shutdown failed");
        pool.shutdown_and_join().expect("second shutdown failed");
    }

    #[test]
    fn test_shutdown_drains_pending_tasks() {
        let pool = WorkerPool::with_workers(1).expect("failed to create pool");
        let counter = Arc::new(AtomicUsize::new(0));

        // Slow tasks pile up behind the single worker
        for _ in 0..5 {
            let counter_clone = Arc::clone(&counter);
            pool.execute(move || {
                thread::sleep(Duration::from_millis(10));
                counter_clone.fetch_add(1, Ordering::SeqCst);
            })
            .expect("failed to submit task");
        }

        pool.shutdown_and_join().expect("failed to shut down pool");
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }

    #[test]
    fn test_concurrent_submit() {
        let pool = Arc::new(WorkerPool::with_workers(4).expect("failed to create pool"));
        let counter = Arc::new(AtomicUsize::new(0));
        let mut handles = vec![];

        for _ in 0..10 {
            let pool_clone = Arc::clone(&pool);
            let counter_clone = Arc::clone(&counter);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    let counter_inner = Arc::clone(&counter_clone);
                    pool_clone
                        .execute(move || {
                            counter_inner.fetch_add(1, Ordering::SeqCst);
                        })
                        .expect("failed to submit task");
                }
            }));
        }

        for handle in handles {
            handle.join().expect("submitter panicked");
        }

        pool.shutdown_and_join().expect("failed to shut down pool");
        assert_eq!(counter.load(Ordering::SeqCst), 1000);
    }

    #[test]
    fn test_worker_stats_aggregation() {
        let pool = WorkerPool::with_workers(2).expect("failed to create pool");
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..20 {
            let counter_clone = Arc::clone(&counter);
            pool.execute(move || {
                counter_clone.fetch_add(1, Ordering::SeqCst);
            })
            .expect("failed to submit task");
        }

        // Wait for the queue to drain while the workers are still live
        while pool.pending_count() > 0 {
            thread::sleep(Duration::from_millis(10));
        }
        thread::sleep(Duration::from_millis(50));

        assert_eq!(pool.total_tasks_executed(), 20);
        assert_eq!(pool.total_tasks_panicked(), 0);
        assert_eq!(pool.worker_stats().len(), 2);

        pool.shutdown_and_join().expect("failed to shut down pool");
    }

    #[test]
    fn test_panicking_task_is_contained() {
        let pool = WorkerPool::with_workers(1).expect("failed to create pool");

        pool.execute(|| panic!("intentional panic for testing"))
            .expect("failed to submit task");

        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = Arc::clone(&counter);
        pool.execute(move || {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        })
        .expect("failed to submit task");

        while pool.pending_count() > 0 {
            thread::sleep(Duration::from_millis(10));
        }
        thread::sleep(Duration::from_millis(50));

        assert_eq!(pool.total_tasks_panicked(), 1);
        assert_eq!(pool.total_tasks_executed(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        pool.shutdown_and_join().expect("failed to shut down pool");
    }

    #[test]
    fn test_drop_shuts_down() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::with_workers(2).expect("failed to create pool");
            for _ in 0..5 {
                let counter_clone = Arc::clone(&counter);
                pool.execute(move || {
                    counter_clone.fetch_add(1, Ordering::SeqCst);
                })
                .expect("failed to submit task");
            }
            // Pool dropped here without an explicit shutdown
        }
        assert_eq!(counter.load(Ordering::SeqCst), 5);
    }
}
