//! The shared FIFO task queue
//!
//! One [`TaskQueue`] serves every worker in the pool. It is a bounded FIFO
//! protected end-to-end by a single mutex plus one condition variable; there
//! are no finer-grained or lock-free paths. Submitters append under the lock
//! and signal one waiter; shutdown flips a monotonic flag under the lock and
//! wakes every waiter.
//!
//! Tasks execute in submission order relative to each other, though which
//! worker services a given task is unspecified.

use crate::core::{BoxedTask, StopSignal};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::fmt;

/// Outcome of a blocking dequeue
#[derive(Debug)]
pub enum Dequeued {
    /// The head task, removed from the queue
    Task(BoxedTask),
    /// The queue is shut down and empty; the worker should exit
    Shutdown,
    /// This worker's stop signal is set; the worker should exit without
    /// taking a task
    Stopped,
}

/// Errors returned by [`TaskQueue::enqueue`]
///
/// Both variants hand the task back to the caller, who is responsible for
/// disposing of it or retrying later.
#[derive(Debug)]
pub enum EnqueueError {
    /// The queue is at capacity
    Full(BoxedTask),
    /// The queue has been shut down
    Shutdown(BoxedTask),
}

impl fmt::Display for EnqueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnqueueError::Full(_) => write!(f, "queue is full"),
            EnqueueError::Shutdown(_) => write!(f, "queue is shut down"),
        }
    }
}

impl std::error::Error for EnqueueError {}

struct QueueState {
    tasks: VecDeque<BoxedTask>,
    // Monotonic: once true, never reset.
    shutdown: bool,
}

/// A capacity-limited FIFO of pending tasks with condition-variable wakeups
///
/// # Example
///
/// ```rust
/// use rust_worker_pool::queue::{Dequeued, EnqueueError, TaskQueue};
/// use rust_worker_pool::{ClosureTask, StopSignal};
///
/// let queue = TaskQueue::new(2);
///
/// queue.enqueue(Box::new(ClosureTask::new(|| {}))).unwrap();
/// queue.enqueue(Box::new(ClosureTask::new(|| {}))).unwrap();
///
/// // Queue is now full
/// match queue.enqueue(Box::new(ClosureTask::new(|| {}))) {
///     Err(EnqueueError::Full(_)) => {}
///     _ => panic!("expected Full error"),
/// }
///
/// // Drain one task
/// let stop = StopSignal::new();
/// match queue.dequeue_blocking(&stop) {
///     Dequeued::Task(_) => {}
///     _ => panic!("expected a task"),
/// }
/// assert_eq!(queue.len(), 1);
/// ```
pub struct TaskQueue {
    state: Mutex<QueueState>,
    not_empty: Condvar,
    capacity: usize,
}

impl TaskQueue {
    /// Creates a new queue with the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        Self {
            state: Mutex::new(QueueState {
                tasks: VecDeque::new(),
                shutdown: false,
            }),
            not_empty: Condvar::new(),
            capacity,
        }
    }

    /// Appends a task to the tail and signals one waiting worker.
    ///
    /// # Errors
    ///
    /// - [`EnqueueError::Full`] if the queue already holds `capacity` tasks.
    ///   The queue is left unchanged and the task is handed back.
    /// - [`EnqueueError::Shutdown`] if the queue has been shut down.
    pub fn enqueue(&self, task: BoxedTask) -> Result<(), EnqueueError> {
        {
            let mut state = self.state.lock();
            if state.shutdown {
                return Err(EnqueueError::Shutdown(task));
            }
            if state.tasks.len() == self.capacity {
                return Err(EnqueueError::Full(task));
            }
            state.tasks.push_back(task);
        }
        self.not_empty.notify_one();
        Ok(())
    }

    /// Blocks until a task is available, the queue shuts down, or `stop` is
    /// set, and reports which.
    ///
    /// The lock is held only inside this call; it is released while waiting
    /// on the condition variable and again before returning, so the returned
    /// task is always executed outside the lock. Spurious wakeups are
    /// tolerated by re-checking the predicate in a loop.
    ///
    /// The stop signal takes precedence over pending tasks: a stopping
    /// worker exits without dequeuing even when work remains.
    pub fn dequeue_blocking(&self, stop: &StopSignal) -> Dequeued {
        let mut state = self.state.lock();
        while state.tasks.is_empty() && !state.shutdown && !stop.is_set() {
            self.not_empty.wait(&mut state);
        }
        if stop.is_set() {
            return Dequeued::Stopped;
        }
        match state.tasks.pop_front() {
            Some(task) => Dequeued::Task(task),
            None => Dequeued::Shutdown,
        }
    }

    /// Shuts the queue down and wakes every waiter.
    ///
    /// Pending tasks are not discarded; workers keep dequeuing until the
    /// queue is empty and only then exit.
    pub fn shutdown(&self) {
        {
            let mut state = self.state.lock();
            state.shutdown = true;
        }
        self.not_empty.notify_all();
    }

    /// Wakes every waiting worker without changing queue state.
    ///
    /// Used after setting stop signals: taking the lock first orders the
    /// wakeup after any in-flight predicate check, so a worker either sees
    /// its stop flag before waiting or is already waiting and gets notified.
    pub fn wake_all(&self) {
        drop(self.state.lock());
        self.not_empty.notify_all();
    }

    /// Returns the current number of pending tasks.
    pub fn len(&self) -> usize {
        self.state.lock().tasks.len()
    }

    /// Returns `true` if no tasks are pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of pending tasks.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if the queue has been shut down.
    pub fn is_shutdown(&self) -> bool {
        self.state.lock().shutdown
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TaskQueue")
            .field("pending", &state.tasks.len())
            .field("capacity", &self.capacity)
            .field("shutdown", &state.shutdown)
            .finish()
    }
}
