//! # Kill-rescue state machine.
//!
//! Decides what happens when a kill-request addressed to **this** process arrives.
//!
//! ## States
//! ```text
//!          kill-request (target == self)
//! Idle ──────────────────────────────► RescueCheck
//!                                        │
//!            rescued == false and        │        rescued == true, or
//!            any dying listener → true   │        no listener asked for rescue
//!                  ┌─────────────────────┴─────────────────┐
//!                  ▼                                       ▼
//!               Rescued                                GraceWait ── schedule_once(grace_period)
//!   (flag set forever, proxy notified, stop)               │
//!                                                          ▼
//!                                                       Recheck
//!                              any liveness condition ┌────┴────┐ all conditions false
//!                                                     ▼         ▼
//!                                              KillCanceled  Terminated
//!                                           (back to Idle)  (proxy notified, tasks removed, exit)
//! ```
//!
//! ## Rules
//! - A process is rescued **at most once**; afterwards dying listeners are not consulted.
//! - A request vetoed while another rescue is in flight is also `Rescued`; the
//!   proxy hears about the rescue once and nothing is scheduled.
//! - Every non-rescued request schedules its own recheck unless
//!   [`AgentConfig::coalesce_rechecks`](crate::AgentConfig) is set.
//! - There is no cancel API for a pending recheck: a later liveness check decides.
//! - Termination is committed at most once, so duplicate rechecks stay harmless.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::context::ProcessContext;
use super::scheduler::Schedule;
use crate::process::{LivenessOracle, SupervisorProxy, Terminate};

/// Outcome of handling one kill-request addressed to this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KillDecision {
    /// A dying listener vetoed the kill; the process is now permanently rescued.
    Rescued,
    /// A recheck was scheduled after the grace period.
    GraceWait,
    /// A recheck was already pending and coalescing is enabled.
    Coalesced,
}

/// Outcome of a grace-period recheck.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecheckOutcome {
    /// The process was found busy; the kill is dropped.
    KillCanceled,
    /// The kill was committed and the terminator invoked.
    Terminated,
    /// A previous recheck already committed the kill.
    AlreadyTerminated,
}

/// Per-process kill-rescue logic.
pub struct KillRescue {
    ctx: Arc<ProcessContext>,
    proxy: Arc<dyn SupervisorProxy>,
    oracle: Arc<dyn LivenessOracle>,
    terminator: Arc<dyn Terminate>,
    scheduler: Arc<dyn Schedule>,
    grace_period: Duration,
    coalesce: bool,
    recheck_pending: AtomicBool,
    terminated: AtomicBool,
}

/// Collaborators of a [`KillRescue`] machine.
pub(crate) struct KillRescueParts {
    pub proxy: Arc<dyn SupervisorProxy>,
    pub oracle: Arc<dyn LivenessOracle>,
    pub terminator: Arc<dyn Terminate>,
    pub scheduler: Arc<dyn Schedule>,
    pub grace_period: Duration,
    pub coalesce: bool,
}

impl KillRescue {
    pub(crate) fn new(ctx: Arc<ProcessContext>, parts: KillRescueParts) -> Self {
        Self {
            ctx,
            proxy: parts.proxy,
            oracle: parts.oracle,
            terminator: parts.terminator,
            scheduler: parts.scheduler,
            grace_period: parts.grace_period,
            coalesce: parts.coalesce,
            recheck_pending: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
        }
    }

    /// Runs `RescueCheck` for a kill-request targeting this process.
    ///
    /// The caller is responsible for checking that the request is addressed
    /// to this process.
    pub async fn on_kill_request(self: &Arc<Self>) -> KillDecision {
        let id = self.ctx.identity();

        if self.ctx.is_rescued() {
            debug!(process = %id, "already rescued once; dying listeners skipped");
        } else if self.ctx.dying().invoke_dying(id.process_name(), id.pid()) {
            if !self.ctx.mark_rescued() {
                // A concurrent request won the rescue and already notified the proxy.
                debug!(process = %id, "kill vetoed while another rescue was in flight");
                return KillDecision::Rescued;
            }
            info!(process = %id, token = %self.ctx.token(), "kill vetoed; process rescued");
            self.proxy
                .on_process_rescued_from_kill(self.ctx.token())
                .await;
            return KillDecision::Rescued;
        }

        self.schedule_recheck()
    }

    fn schedule_recheck(self: &Arc<Self>) -> KillDecision {
        let was_pending = self.recheck_pending.swap(true, Ordering::AcqRel);
        if self.coalesce && was_pending {
            debug!(process = %self.ctx.identity(), "recheck already pending; coalesced");
            return KillDecision::Coalesced;
        }

        let me = Arc::clone(self);
        self.scheduler.schedule_once(
            self.grace_period,
            Box::pin(async move {
                me.recheck().await;
            }),
        );
        debug!(
            process = %self.ctx.identity(),
            grace = ?self.grace_period,
            "kill pending; recheck scheduled"
        );
        KillDecision::GraceWait
    }

    /// Re-evaluates liveness after the grace period and commits or cancels the kill.
    pub async fn recheck(&self) -> RecheckOutcome {
        self.recheck_pending.store(false, Ordering::Release);
        let id = self.ctx.identity();
        let token = self.ctx.token();

        if self.terminated.load(Ordering::Acquire) {
            return RecheckOutcome::AlreadyTerminated;
        }

        let started = self.oracle.has_active_started_state();
        let foreground = self.oracle.has_foreground_service();
        let visible = self.oracle.has_visible_view();
        if started || foreground || visible {
            info!(process = %id, started, foreground, visible, "process busy; kill canceled");
            self.proxy.on_process_kill_canceled(token).await;
            return RecheckOutcome::KillCanceled;
        }

        if self.terminated.swap(true, Ordering::AcqRel) {
            return RecheckOutcome::AlreadyTerminated;
        }
        info!(process = %id, token = %token, "process idle; committing kill");
        self.proxy.on_process_killed(token).await;
        self.remove_tasks();
        self.terminator.terminate(id);
        RecheckOutcome::Terminated
    }

    /// Best-effort removal of the task entries owned by this process.
    fn remove_tasks(&self) {
        let name = self.ctx.identity().process_name();
        let tasks = match self.oracle.running_tasks(name) {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(process = name, error = %e, label = e.as_label(), "cannot list tasks before exit");
                return;
            }
        };
        for task in tasks {
            if let Err(e) = task.finish_and_remove_task() {
                warn!(process = name, error = %e, label = e.as_label(), "task removal failed");
            }
        }
    }
}
