//! # Serial delayed execution for grace-period rechecks.
//!
//! [`Schedule`] is the seam; [`SerialScheduler`] is the default: a single
//! worker task owning a [`DelayQueue`], so jobs never overlap and run in
//! deadline order.
//!
//! ## Architecture
//! ```text
//! schedule_once(delay, job) ──► [mpsc] ──► worker ──► DelayQueue.insert(job, delay)
//!                                            │
//!                                            └──► on expiry: job.await (one at a time)
//!                                                   └──► panic → logged, worker continues
//! ```
//!
//! ## Rules
//! - **No cancel API**: a scheduled job always runs unless the worker is stopped.
//! - **No coalescing**: two schedules of the same work run twice.
//! - **Serial**: the worker awaits each job before looking at the next one.

use std::future::poll_fn;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::time::DelayQueue;
use tokio_util::time::delay_queue::Expired;
use tracing::{debug, warn};

/// Deferred unit of work.
pub type Job = BoxFuture<'static, ()>;

/// Delayed-execution facility.
pub trait Schedule: Send + Sync + 'static {
    /// Runs `job` once, no earlier than `delay` from now.
    fn schedule_once(&self, delay: Duration, job: Job);
}

/// Single-worker scheduler backed by [`DelayQueue`].
pub struct SerialScheduler {
    tx: mpsc::UnboundedSender<(Duration, Job)>,
}

enum Step {
    Stop,
    Received(Option<(Duration, Job)>),
    Expired(Option<Expired<Job>>),
}

impl SerialScheduler {
    /// Spawns the worker on the current tokio runtime.
    ///
    /// The worker exits when `token` is cancelled (pending jobs are dropped)
    /// or when the scheduler is dropped and every pending job has run.
    pub fn spawn(token: CancellationToken) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(worker(rx, token));
        Self { tx }
    }
}

impl Schedule for SerialScheduler {
    fn schedule_once(&self, delay: Duration, job: Job) {
        if self.tx.send((delay, job)).is_err() {
            warn!(?delay, "scheduler worker stopped; job dropped");
        }
    }
}

async fn worker(mut rx: mpsc::UnboundedReceiver<(Duration, Job)>, token: CancellationToken) {
    let mut queue: DelayQueue<Job> = DelayQueue::new();
    let mut open = true;

    loop {
        let step = tokio::select! {
            _ = token.cancelled() => Step::Stop,
            msg = rx.recv(), if open => Step::Received(msg),
            expired = poll_fn(|cx| queue.poll_expired(cx)), if !queue.is_empty() => Step::Expired(expired),
        };

        match step {
            Step::Stop => break,
            Step::Received(Some((delay, job))) => {
                queue.insert(job, delay);
            }
            Step::Received(None) => open = false,
            Step::Expired(Some(expired)) => {
                let job = expired.into_inner();
                if let Err(panic) = AssertUnwindSafe(job).catch_unwind().await {
                    let info = if let Some(msg) = panic.downcast_ref::<&'static str>() {
                        (*msg).to_string()
                    } else if let Some(msg) = panic.downcast_ref::<String>() {
                        msg.clone()
                    } else {
                        "unknown panic".to_string()
                    };
                    warn!(panic = %info, "scheduled job panicked");
                }
            }
            Step::Expired(None) => {}
        }

        if !open && queue.is_empty() {
            break;
        }
    }
    debug!(pending = queue.len(), "scheduler worker stopped");
}
