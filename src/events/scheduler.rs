//! Deferred job queue for reactions.
//!
//! Reactions never run inside the native event dispatch that triggered them.
//! The dispatcher and the reaction processor submit them here; they run
//! later, either drained explicitly with [`Scheduler::run_pending`] or by a
//! worker task started with [`Scheduler::spawn`].
//!
//! Jobs start in submission order. A failing job is logged and does not
//! affect any other job.

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::logging::{LogLevel, LogOptions, Logger};

// ============================================================================
// Types
// ============================================================================

/// A deferred unit of work.
pub type Job = BoxFuture<'static, Result<()>>;

/// Poll interval of [`Scheduler::wait_idle`].
const IDLE_POLL: Duration = Duration::from_millis(1);

/// A job with the label it is logged under.
struct Queued {
    label: String,
    job: Job,
}

// ============================================================================
// Scheduler
// ============================================================================

/// FIFO queue of deferred jobs.
pub struct Scheduler {
    queue: Mutex<VecDeque<Queued>>,
    notify: Notify,
    shutdown: AtomicBool,
    logger: Arc<dyn Logger>,
    submitted: AtomicUsize,
    completed: AtomicUsize,
    failed: AtomicUsize,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("pending", &self.pending())
            .field("completed", &self.completed())
            .field("failed", &self.failed())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Scheduler - Submission
// ============================================================================

impl Scheduler {
    /// Creates an empty scheduler reporting failures to `logger`.
    #[must_use]
    pub fn new(logger: Arc<dyn Logger>) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            shutdown: AtomicBool::new(false),
            logger,
            submitted: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        })
    }

    /// Queues an async job. Never runs it inline.
    pub fn submit(&self, label: impl Into<String>, job: Job) {
        let label = label.into();
        trace!(job = %label, "Job queued");
        self.submitted.fetch_add(1, Ordering::SeqCst);
        self.queue.lock().push_back(Queued { label, job });
        self.notify.notify_one();
    }

    /// Queues a synchronous job.
    pub fn submit_fn<F>(&self, label: impl Into<String>, f: F)
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.submit(label, async move { f() }.boxed());
    }

    /// Returns the number of queued jobs.
    #[inline]
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    /// Returns the number of jobs that finished successfully.
    #[inline]
    #[must_use]
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    /// Returns the number of jobs that failed.
    #[inline]
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Scheduler - Execution
// ============================================================================

impl Scheduler {
    /// Runs queued jobs one after another until the queue is empty.
    ///
    /// Jobs submitted by running jobs are run too. Returns the number of
    /// jobs run.
    pub async fn run_pending(&self) -> usize {
        let mut ran = 0;
        while let Some(Queued { label, job }) = self.pop() {
            let result = job.await;
            self.report(&label, result);
            ran += 1;
        }
        ran
    }

    /// Starts a worker task that spawns every queued job as soon as it is
    /// submitted.
    ///
    /// Spawned jobs start in submission order and may interleave at await
    /// points. The worker exits after [`shutdown`](Self::shutdown).
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move { scheduler.run().await })
    }

    /// Waits until every submitted job has finished.
    ///
    /// Only useful while a worker runs or another task drains the queue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if jobs are still unfinished after
    /// `timeout`.
    pub async fn wait_idle(&self, timeout: Duration) -> Result<()> {
        let idle = async {
            while self.finished() < self.submitted.load(Ordering::SeqCst) {
                tokio::time::sleep(IDLE_POLL).await;
            }
        };
        tokio::time::timeout(timeout, idle)
            .await
            .map_err(|_| Error::timeout("scheduler idle", duration_ms(timeout)))
    }

    /// Stops the worker started by [`spawn`](Self::spawn).
    ///
    /// Jobs still queued stay queued.
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    async fn run(self: Arc<Self>) {
        debug!("Scheduler worker started");
        loop {
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }
            while let Some(Queued { label, job }) = self.pop() {
                let scheduler = Arc::clone(&self);
                tokio::spawn(async move {
                    let result = job.await;
                    scheduler.report(&label, result);
                });
            }
            self.notify.notified().await;
        }
        debug!("Scheduler worker stopped");
    }

    fn finished(&self) -> usize {
        self.completed.load(Ordering::SeqCst) + self.failed.load(Ordering::SeqCst)
    }

    fn pop(&self) -> Option<Queued> {
        self.queue.lock().pop_front()
    }

    fn report(&self, label: &str, result: Result<()>) {
        match result {
            Ok(()) => {
                self.completed.fetch_add(1, Ordering::SeqCst);
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::SeqCst);
                warn!(job = %label, error = %e, "Reaction failed");
                self.logger.log(
                    LogLevel::Warn,
                    &format!("{label} failed: {e}"),
                    LogOptions::saved(),
                );
            }
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// ============================================================================
// Tests
// ============================================================================
