/*!
# Worker Pool

Bounded admission control for evaluation tasks, plus the two-phase shutdown
discipline.

Tasks run on the tokio multi-threaded scheduler, which is work-stealing: a
chain that submits follow-on work cannot deadlock the pool even when every
permit is held by a blocked retrieval. The pool bounds how many chains hold
a permit concurrently and tracks every spawned task so a forced shutdown can
abandon the stragglers.

## Shutdown

Two phases, both idempotent and both no-ops on an already-terminated pool:

1. **Graceful** — stop admissions, then poll the outstanding-task count on a
   fixed interval for a bounded number of checks, logging progress.
2. **Forced** — when the grace period elapses with tasks still outstanding,
   abort them and log the abandoned count.
*/

use crate::skillcast::error::{EvaluationError, EvaluationResult};
use log::{debug, info};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::AbortHandle;

/// The smallest pool that cannot starve itself.
///
/// With fewer than three workers, a batch where every permit is held by a
/// blocked retrieval leaves no headroom for the continuations those
/// retrievals unblock.
pub const MIN_WORKERS: usize = 3;

/// Configuration for the worker pool
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Maximum number of evaluation tasks admitted concurrently
    pub workers: usize,

    /// Interval between shutdown progress checks
    pub grace_interval: Duration,

    /// Number of progress checks before a graceful shutdown gives up
    pub grace_attempts: u32,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            grace_interval: Duration::from_millis(500),
            grace_attempts: 10,
        }
    }
}

impl WorkerPoolConfig {
    /// Create a configuration with specific parallelism
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Default::default()
        }
    }

    /// Create a fast configuration for testing
    pub fn for_tests() -> Self {
        Self {
            workers: MIN_WORKERS,
            grace_interval: Duration::from_millis(10),
            grace_attempts: 5,
        }
    }

    /// Validate the configuration.
    ///
    /// An undersized pool is a configuration error, never a silent clamp.
    pub fn validate(&self) -> EvaluationResult<()> {
        if self.workers < MIN_WORKERS {
            return Err(EvaluationError::configuration(format!(
                "worker pool requires at least {} workers to keep continuations runnable, got {}",
                MIN_WORKERS, self.workers
            )));
        }
        if self.grace_interval.is_zero() {
            return Err(EvaluationError::configuration(
                "worker pool grace interval must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Result of a shutdown attempt
#[derive(Debug, Clone)]
pub struct ShutdownReport {
    /// Number of tasks aborted because the grace period elapsed
    pub abandoned_tasks: usize,
    /// Whether every task finished within the grace period
    pub completed_gracefully: bool,
    /// Total time taken by the shutdown
    pub elapsed: Duration,
}

impl fmt::Display for ShutdownReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.completed_gracefully {
            write!(f, "Graceful shutdown complete in {:?}", self.elapsed)
        } else {
            write!(
                f,
                "Shutdown complete: {} tasks abandoned in {:?}",
                self.abandoned_tasks, self.elapsed
            )
        }
    }
}

/// Bounded execution resource shared by all evaluation chains.
#[derive(Debug)]
pub struct WorkerPool {
    semaphore: Arc<Semaphore>,
    active: Arc<AtomicUsize>,
    accepting: AtomicBool,
    terminated: AtomicBool,
    tracked: Mutex<Vec<AbortHandle>>,
    config: WorkerPoolConfig,
}

impl WorkerPool {
    /// Create a pool, validating the configuration
    pub fn new(config: WorkerPoolConfig) -> EvaluationResult<Self> {
        config.validate()?;

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(config.workers)),
            active: Arc::new(AtomicUsize::new(0)),
            accepting: AtomicBool::new(true),
            terminated: AtomicBool::new(false),
            tracked: Mutex::new(Vec::new()),
            config,
        })
    }

    /// Create a pool with the default configuration
    pub fn with_default_config() -> Self {
        // The default configuration always validates
        Self::new(WorkerPoolConfig::default()).expect("default worker pool configuration is valid")
    }

    pub fn workers(&self) -> usize {
        self.config.workers
    }

    /// Number of tasks currently holding a permit
    pub fn active_tasks(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Number of spawned tasks that have not yet finished, including tasks
    /// still waiting for admission
    pub fn outstanding_tasks(&self) -> usize {
        self.tracked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    /// Wrap a unit of work with the pool's admission control.
    ///
    /// The permit is acquired inside the returned future, so spawning is
    /// never blocked by a full pool; the work itself waits its turn.
    pub(crate) fn admit<T, F>(
        &self,
        work: F,
    ) -> EvaluationResult<impl Future<Output = EvaluationResult<T>> + Send + 'static>
    where
        T: Send + 'static,
        F: Future<Output = EvaluationResult<T>> + Send + 'static,
    {
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(EvaluationError::internal(
                "worker pool is shut down and not accepting new tasks",
            ));
        }

        let semaphore = self.semaphore.clone();
        let active = self.active.clone();

        Ok(async move {
            let _permit = match semaphore.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    return Err(EvaluationError::interrupted(
                        "worker pool closed while waiting for admission",
                    ))
                }
            };

            let _guard = ActiveGuard::new(active);
            work.await
        })
    }

    /// Register a spawned task for forced shutdown
    pub(crate) fn track(&self, handle: AbortHandle) {
        let mut tracked = self.tracked.lock().unwrap_or_else(PoisonError::into_inner);
        tracked.retain(|existing| !existing.is_finished());
        tracked.push(handle);
    }

    /// Graceful shutdown: wait for outstanding tasks within the configured
    /// grace period, then abandon whatever remains
    pub async fn shutdown(&self) -> ShutdownReport {
        self.close(self.config.grace_attempts).await
    }

    /// Bounded-wait shutdown: like [`shutdown`](Self::shutdown) but with an
    /// explicit overall timeout instead of the configured grace period
    pub async fn force_shutdown(&self, timeout: Duration) -> ShutdownReport {
        let interval = self.config.grace_interval.as_millis().max(1);
        let attempts = (timeout.as_millis().div_ceil(interval)).max(1) as u32;
        self.close(attempts).await
    }

    async fn close(&self, attempts: u32) -> ShutdownReport {
        let start = Instant::now();

        if self.terminated.swap(true, Ordering::SeqCst) {
            debug!("Worker pool already shut down; ignoring repeat request.");
            return ShutdownReport {
                abandoned_tasks: 0,
                completed_gracefully: true,
                elapsed: start.elapsed(),
            };
        }

        self.accepting.store(false, Ordering::SeqCst);

        let mut reported = false;
        for attempt in 0..attempts {
            let outstanding = self.outstanding_tasks();
            if outstanding == 0 {
                break;
            }

            if !reported {
                info!("Some processing is finishing up before exit.");
                reported = true;
            }
            info!(
                "Waiting on {} evaluation tasks ({}/{} checks).",
                outstanding,
                attempt + 1,
                attempts
            );

            tokio::time::sleep(self.config.grace_interval).await;
        }

        let abandoned = if self.outstanding_tasks() == 0 {
            0
        } else {
            info!("Forcing shutdown.");
            let tracked = self.tracked.lock().unwrap_or_else(PoisonError::into_inner);
            let mut aborted = 0;
            for handle in tracked.iter() {
                if !handle.is_finished() {
                    handle.abort();
                    aborted += 1;
                }
            }
            aborted
        };

        // Fail any admission still pending so abandoned work cannot start
        self.semaphore.close();

        if abandoned > 0 {
            info!("Abandoned {} processing tasks.", abandoned);
        } else {
            info!("Worker pool shut down cleanly.");
        }

        ShutdownReport {
            abandoned_tasks: abandoned,
            completed_gracefully: abandoned == 0,
            elapsed: start.elapsed(),
        }
    }
}

/// Keeps the active-task count honest even when a task is aborted
struct ActiveGuard {
    active: Arc<AtomicUsize>,
}

impl ActiveGuard {
    fn new(active: Arc<AtomicUsize>) -> Self {
        active.fetch_add(1, Ordering::SeqCst);
        Self { active }
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = WorkerPoolConfig::default();
        assert_eq!(config.workers, 8);
        assert_eq!(config.grace_interval, Duration::from_millis(500));
        assert_eq!(config.grace_attempts, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_undersized_pool_rejected() {
        let err = WorkerPoolConfig::with_workers(2).validate().unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("at least 3"));
    }

    #[test]
    fn test_minimum_pool_accepted() {
        assert!(WorkerPoolConfig::with_workers(MIN_WORKERS).validate().is_ok());
    }

    #[tokio::test]
    async fn test_shutdown_of_idle_pool_is_clean_and_idempotent() {
        let pool = WorkerPool::new(WorkerPoolConfig::for_tests()).unwrap();

        let first = pool.shutdown().await;
        assert!(first.completed_gracefully);
        assert_eq!(first.abandoned_tasks, 0);

        let second = pool.shutdown().await;
        assert!(second.completed_gracefully);

        let third = pool.force_shutdown(Duration::from_millis(50)).await;
        assert!(third.completed_gracefully);
    }
}
