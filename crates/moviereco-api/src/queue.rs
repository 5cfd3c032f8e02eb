//! `RequestQueue` - fixed worker pool over a FIFO channel.
//!
//! Units start in submission order, at most `max_concurrent` at a time.
//! They may finish in any order. Each unit's result goes straight back to
//! whoever awaited [`RequestQueue::queue_request`]; the workers never look
//! at it, never retry, and never requeue.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use futures::future::BoxFuture;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::error::ApiError;

/// Default worker count.
pub const MAX_CONCURRENT_REQUESTS: usize = 4;

/// A type-erased unit of work.
type Job = BoxFuture<'static, ()>;

/// Bounded-concurrency queue for deferred requests.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct RequestQueue {
    sender: mpsc::UnboundedSender<Job>,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Job>>>,
    active: Arc<AtomicUsize>,
    max_concurrent: usize,
    workers: StdMutex<Vec<JoinHandle<()>>>,
}

impl Default for RequestQueue {
    fn default() -> Self {
        Self::new(MAX_CONCURRENT_REQUESTS)
    }
}

impl RequestQueue {
    /// Creates a queue served by `max_concurrent` workers (at least one).
    ///
    /// Workers are spawned on the current tokio runtime the first time a
    /// unit is queued. Workers that stopped, for example because their
    /// runtime shut down, are replaced on the next call.
    #[must_use]
    pub fn new(max_concurrent: usize) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Arc::new(Mutex::new(receiver)),
            active: Arc::new(AtomicUsize::new(0)),
            max_concurrent: max_concurrent.max(1),
            workers: StdMutex::new(Vec::new()),
        }
    }

    /// Number of units currently running.
    #[must_use]
    pub fn active_requests(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Worker count.
    #[must_use]
    pub const fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Appends `unit` to the queue and waits for its result.
    ///
    /// # Errors
    ///
    /// Returns whatever `unit` returns, or [`ApiError::QueueClosed`] if the
    /// unit panicked or the queue shut down before it ran.
    pub async fn queue_request<F, T>(&self, unit: F) -> Result<T, ApiError>
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
        T: Send + 'static,
    {
        self.ensure_workers();

        let (tx, rx) = oneshot::channel();
        let job: Job = Box::pin(async move {
            let result = unit.await;
            // The caller may have stopped waiting; the result is dropped then.
            let _ = tx.send(result);
        });

        if self.sender.send(job).is_err() {
            return Err(ApiError::QueueClosed);
        }
        tracing::trace!(active = self.active_requests(), "Request queued");

        rx.await.unwrap_or(Err(ApiError::QueueClosed))
    }

    /// Tops the pool up to `max_concurrent` live workers.
    fn ensure_workers(&self) {
        let mut workers = self.workers.lock().unwrap_or_else(PoisonError::into_inner);
        workers.retain(|handle| !handle.is_finished());
        if workers.len() >= self.max_concurrent {
            return;
        }
        let missing = self.max_concurrent.saturating_sub(workers.len());
        for id in workers.len()..self.max_concurrent {
            let receiver = Arc::clone(&self.receiver);
            let active = Arc::clone(&self.active);
            workers.push(tokio::spawn(worker_loop(id, receiver, active)));
        }
        tracing::debug!(spawned = missing, "Request queue workers started");
    }
}

/// Pulls jobs until the queue is dropped.
async fn worker_loop(
    id: usize,
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<Job>>>,
    active: Arc<AtomicUsize>,
) {
    loop {
        let next = receiver.lock().await.recv().await;
        let Some(job) = next else {
            break;
        };

        active.fetch_add(1, Ordering::SeqCst);
        // Run on its own task so a panicking unit does not take the worker down.
        if let Err(e) = tokio::spawn(job).await {
            tracing::error!(worker = id, error = %e, "Queued request aborted");
        }
        active.fetch_sub(1, Ordering::SeqCst);
    }
    tracing::trace!(worker = id, "Request queue worker stopped");
}
