/*!
# Fail-Fast Combinator

Runs a batch of independent asynchronous units of work and completes when
either all of them succeed or the first one fails. On failure the remainder
are cancelled: the shared [`CancellationFlag`] asks cooperative tasks to
stop at their next checkpoint, and the batch aborts whatever is parked at an
await point. Results of cancelled work are discarded.

The combinator owns no resources and performs no retries; it only signals.
*/

use crate::skillcast::engine::worker_pool::WorkerPool;
use crate::skillcast::error::{EvaluationError, EvaluationResult};
use log::debug;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Advisory cancellation signal shared by one batch of work.
///
/// Cancellation is cooperative: setting the flag never preempts a task, it
/// only asks tasks that poll [`is_cancelled`](Self::is_cancelled) between
/// stages to stop before starting the next one.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; idempotent
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A batch of independent units of work with all-or-first-failure
/// completion.
///
/// An empty batch completes successfully at once. A unit that has already
/// failed produces failure without waiting on its siblings.
pub struct FailFastSet<T> {
    tasks: JoinSet<EvaluationResult<T>>,
    cancel: CancellationFlag,
}

impl<T: Send + 'static> FailFastSet<T> {
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
            cancel: CancellationFlag::new(),
        }
    }

    /// The cancellation signal units of this batch should observe between
    /// stages
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Submit one unit of work through the pool's admission control
    pub fn spawn<F>(&mut self, pool: &WorkerPool, work: F) -> EvaluationResult<()>
    where
        F: Future<Output = EvaluationResult<T>> + Send + 'static,
    {
        let admitted = pool.admit(work)?;
        let handle = self.tasks.spawn(admitted);
        pool.track(handle);
        Ok(())
    }

    /// Wait until every unit has succeeded, or until the first failure.
    ///
    /// On failure, cancels the rest best-effort and returns the first error
    /// observed (ties broken by completion order). Successful results
    /// arrive in completion order, which is unspecified.
    pub async fn join_all(mut self) -> EvaluationResult<Vec<T>> {
        let mut values = Vec::with_capacity(self.tasks.len());
        let mut first_error: Option<EvaluationError> = None;

        while let Some(joined) = self.tasks.join_next().await {
            match joined {
                Ok(Ok(value)) => {
                    // Results arriving after a failure belong to work that
                    // was already past its cancellation point; discard them
                    if first_error.is_none() {
                        values.push(value);
                    }
                }
                Ok(Err(error)) => {
                    if first_error.is_none() {
                        debug!("First failure in batch; cancelling {} siblings.", self.tasks.len());
                        self.cancel.cancel();
                        self.tasks.abort_all();
                        first_error = Some(error);
                    }
                }
                Err(join_error) => {
                    if join_error.is_cancelled() && self.cancel.is_cancelled() {
                        // Abort we requested ourselves; nothing to report
                        continue;
                    }
                    if first_error.is_none() {
                        self.cancel.cancel();
                        self.tasks.abort_all();
                        first_error = Some(if join_error.is_cancelled() {
                            EvaluationError::interrupted(
                                "evaluation task was cancelled during shutdown",
                            )
                        } else {
                            EvaluationError::internal(format!(
                                "evaluation task panicked: {}",
                                join_error
                            ))
                        });
                    }
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(values),
        }
    }
}

impl<T: Send + 'static> Default for FailFastSet<T> {
    fn default() -> Self {
        Self::new()
    }
}
