//! # Coordinator-side interfaces.
//!
//! [`SupervisorProxy`] is the coordinator's view of a monitored process: each
//! notification carries the process token so the coordinator can key its
//! bookkeeping without trusting names or pids. It is async because a real
//! proxy crosses a process boundary.
//!
//! [`StateDispatcher`] receives `state-on`/`state-off` events; the app-state
//! machinery behind it is opaque to this crate.

use async_trait::async_trait;

use crate::process::identity::ProcessToken;

/// Receiver of kill-rescue outcomes on the coordinator side.
#[async_trait]
pub trait SupervisorProxy: Send + Sync + 'static {
    /// A dying listener vetoed the kill; the process stays alive for good.
    async fn on_process_rescued_from_kill(&self, token: ProcessToken);

    /// The process committed to terminate itself.
    async fn on_process_killed(&self, token: ProcessToken);

    /// The recheck found the process busy; the kill was dropped.
    async fn on_process_kill_canceled(&self, token: ProcessToken);
}

/// Receiver of app-state events keyed by stateful entity name.
pub trait StateDispatcher: Send + Sync + 'static {
    /// The entity `stateful_name` turned on.
    fn on_state_on(&self, stateful_name: &str);

    /// The entity `stateful_name` turned off.
    fn on_state_off(&self, stateful_name: &str);
}

/// State dispatcher that only logs.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopStateDispatcher;

impl StateDispatcher for NoopStateDispatcher {
    fn on_state_on(&self, stateful_name: &str) {
        tracing::debug!(stateful = stateful_name, "state on (no dispatcher)");
    }

    fn on_state_off(&self, stateful_name: &str) {
        tracing::debug!(stateful = stateful_name, "state off (no dispatcher)");
    }
}
