use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future a task runs to completion
pub type TaskFuture<E> = Pin<Box<dyn Future<Output = Result<(), E>> + Send>>;

/// A unit of work: a label for error reporting plus the future to run
pub struct Task<E> {
    pub(crate) label: String,
    pub(crate) future: TaskFuture<E>,
}

impl<E> Task<E> {
    /// Creates a task from a label and the work to perform
    pub fn new<F>(label: impl Into<String>, future: F) -> Self
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
    {
        Self {
            label: label.into(),
            future: Box::pin(future),
        }
    }

    /// Label used when reporting this task's failure
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl<E> fmt::Debug for Task<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("label", &self.label).finish()
    }
}

/// Why a task did not complete successfully
#[derive(Debug, Error)]
pub enum TaskError<E> {
    /// The task returned an error
    #[error("{0}")]
    Failed(E),

    /// The task panicked
    #[error("task panicked: {0}")]
    Panicked(String),
}
