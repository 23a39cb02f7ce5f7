//! Bounded-queue worker pool
//!
//! A fixed number of workers pull [`Task`]s from one shared bounded queue.
//! Submitting to a full queue waits until a worker frees a slot, which is the
//! pool's only form of backpressure. Every task runs in isolation: its error
//! or panic is handed to the error handler together with the task's label and
//! never affects other tasks or workers.
//!
//! Lifecycle: [`WorkPool::new`] → [`WorkPool::start`] → [`WorkPool::submit`]... →
//! [`WorkPool::stop`]. `stop` closes the queue and waits until every task that
//! was already queued has run.

mod task;

pub use task::{Task, TaskError, TaskFuture};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default queue capacity when none is given
pub const DEFAULT_QUEUE_CAPACITY: usize = 1 << 10;

/// Callback receiving `(label, error)` for every failed task
///
/// Invoked on the worker that ran the task, so it must tolerate concurrent
/// calls. A panic inside the handler terminates that worker.
pub type ErrorHandler<E> = Arc<dyn Fn(&str, TaskError<E>) + Send + Sync>;

/// Errors returned when submitting to a pool
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Pool is stopped, task {label:?} was not queued")]
    Closed { label: String },
}

type SharedReceiver<E> = Arc<tokio::sync::Mutex<mpsc::Receiver<Task<E>>>>;

/// Fixed-concurrency task executor with a bounded queue
pub struct WorkPool<E> {
    concurrency: usize,
    queue_capacity: usize,
    error_handler: ErrorHandler<E>,
    sender: Mutex<Option<mpsc::Sender<Task<E>>>>,
    receiver: Mutex<Option<mpsc::Receiver<Task<E>>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl<E> WorkPool<E>
where
    E: Send + 'static,
{
    /// Creates a stopped pool
    ///
    /// # Arguments
    ///
    /// * `concurrency` - Number of workers; 0 falls back to the available parallelism
    /// * `queue_capacity` - Queue slots; 0 falls back to [`DEFAULT_QUEUE_CAPACITY`]
    /// * `error_handler` - Receives the label and error of every failed task
    ///
    /// # Returns
    ///
    /// A pool that accepts submissions but runs nothing until [`WorkPool::start`]
    pub fn new<H>(concurrency: usize, queue_capacity: usize, error_handler: H) -> Self
    where
        H: Fn(&str, TaskError<E>) + Send + Sync + 'static,
    {
        let concurrency = if concurrency == 0 {
            default_concurrency()
        } else {
            concurrency
        };
        let queue_capacity = if queue_capacity == 0 {
            DEFAULT_QUEUE_CAPACITY
        } else {
            queue_capacity
        };

        let (sender, receiver) = mpsc::channel(queue_capacity);

        Self {
            concurrency,
            queue_capacity,
            error_handler: Arc::new(error_handler),
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
            workers: Mutex::new(Vec::new()),
        }
    }

    /// Number of workers this pool runs
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Maximum number of queued, not yet running tasks
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Spawns the workers; later calls are no-ops
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&self) {
        let Some(receiver) = lock(&self.receiver).take() else {
            return;
        };
        let receiver: SharedReceiver<E> = Arc::new(tokio::sync::Mutex::new(receiver));

        let mut workers = lock(&self.workers);
        for id in 0..self.concurrency {
            let receiver = Arc::clone(&receiver);
            let handler = Arc::clone(&self.error_handler);
            workers.push(tokio::spawn(run_worker(id, receiver, handler)));
        }

        tracing::debug!(workers = self.concurrency, "work pool started");
    }

    /// Queues a task, waiting while the queue is full
    pub async fn submit(&self, task: Task<E>) -> Result<(), PoolError> {
        let Some(sender) = self.sender() else {
            return Err(PoolError::Closed { label: task.label });
        };

        sender
            .send(task)
            .await
            .map_err(|e| PoolError::Closed { label: e.0.label })
    }

    /// Queues a task from synchronous code, blocking the thread while the
    /// queue is full
    ///
    /// # Panics
    ///
    /// Panics when called from an async context; use it from
    /// `spawn_blocking` jobs or plain threads.
    pub fn blocking_submit(&self, task: Task<E>) -> Result<(), PoolError> {
        let Some(sender) = self.sender() else {
            return Err(PoolError::Closed { label: task.label });
        };

        sender
            .blocking_send(task)
            .map_err(|e| PoolError::Closed { label: e.0.label })
    }

    /// Closes the queue and waits until every worker has drained it and exited
    ///
    /// A pool that was never started is started here so that already queued
    /// tasks still run.
    pub async fn stop(&self) {
        self.start();

        // Dropping the last sender closes the queue once it is drained
        drop(lock(&self.sender).take());

        let workers: Vec<_> = lock(&self.workers).drain(..).collect();
        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "pool worker exited abnormally");
            }
        }

        tracing::debug!("work pool stopped");
    }

    fn sender(&self) -> Option<mpsc::Sender<Task<E>>> {
        lock(&self.sender).clone()
    }
}

/// Worker loop: runs tasks until the queue is closed and empty
async fn run_worker<E>(id: usize, receiver: SharedReceiver<E>, handler: ErrorHandler<E>)
where
    E: Send + 'static,
{
    loop {
        let next = receiver.lock().await.recv().await;
        let Some(task) = next else {
            break;
        };

        let Task { label, future } = task;
        tracing::trace!(worker = id, task = %label, "running task");

        match tokio::spawn(future).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => handler(&label, TaskError::Failed(e)),
            Err(e) => handler(&label, TaskError::Panicked(e.to_string())),
        }
    }

    tracing::trace!(worker = id, "worker exiting");
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
