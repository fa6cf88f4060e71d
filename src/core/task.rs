//! Task trait and related types

use std::fmt;

/// A trait representing one deferred unit of work consumed by the pool
///
/// The pool never inspects what a task produces: `run` returns nothing, and
/// there is no channel for a task to report failure back to its submitter.
/// A task that must communicate results should capture its own side channel
/// (a counter, a channel sender) when it is created.
pub trait Task: Send {
    /// Execute the task
    fn run(&mut self);

    /// Get the task's type name for logging
    fn task_type(&self) -> &str {
        "Task"
    }
}

impl fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Task({})", self.task_type())
    }
}

/// A boxed task that can be sent across threads
pub type BoxedTask = Box<dyn Task>;

/// Helper to create a task from a closure
///
/// The closure captures whatever data it needs, so ownership of the task's
/// input travels with the task itself.
pub struct ClosureTask<F>
where
    F: FnOnce() + Send,
{
    closure: Option<F>,
    name: String,
}

impl<F> ClosureTask<F>
where
    F: FnOnce() + Send,
{
    /// Create a new closure task
    pub fn new(closure: F) -> Self {
        Self {
            closure: Some(closure),
            name: "ClosureTask".to_string(),
        }
    }

    /// Create a new closure task with a custom name
    pub fn with_name<S: Into<String>>(closure: F, name: S) -> Self {
        Self {
            closure: Some(closure),
            name: name.into(),
        }
    }
}

impl<F> Task for ClosureTask<F>
where
    F: FnOnce() + Send,
{
    fn run(&mut self) {
        // A task is dequeued by exactly one worker and dropped after it
        // returns, so the closure is present on every real invocation.
        debug_assert!(self.closure.is_some(), "closure task ran twice");
        if let Some(closure) = self.closure.take() {
            closure();
        }
    }

    fn task_type(&self) -> &str {
        &self.name
    }
}
