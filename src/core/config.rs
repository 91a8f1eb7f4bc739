//! # Agent configuration.
//!
//! Provides [`AgentConfig`], centralized settings for one dispatch agent.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`Bus`](crate::Bus)
//! - `grace_period = 0s` → recheck runs on the next scheduler turn

use std::time::Duration;

/// Role of the process the agent is installed in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProcessRole {
    /// Ordinary process: acts on kill-requests addressed to it.
    #[default]
    Monitored,
    /// The coordinator: observes every event but never kills itself on request.
    Supervisor,
}

/// Configuration for a dispatch agent.
///
/// ## Field semantics
/// - `grace_period`: delay between a non-rescued kill-request and its liveness recheck
/// - `bus_capacity`: ring size used by [`Bus::from_config`](crate::Bus::from_config)
/// - `coalesce_rechecks`: at most one pending recheck per process (`false` = one per request)
/// - `exit_code`: code passed to the default [`ExitTerminator`](crate::ExitTerminator)
/// - `role`: [`ProcessRole`] of this process
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// Delay before the kill is re-evaluated against the liveness oracle.
    pub grace_period: Duration,

    /// Capacity of the broadcast ring buffer.
    ///
    /// Receivers lagging behind more than `bus_capacity` envelopes skip older items.
    pub bus_capacity: usize,

    /// Skip scheduling a recheck while another one is pending.
    ///
    /// Off by default: every kill-request schedules its own recheck, and
    /// termination stays idempotent.
    pub coalesce_rechecks: bool,

    /// Exit code used by the default terminator.
    pub exit_code: i32,

    /// Role of the hosting process.
    pub role: ProcessRole,
}

impl AgentConfig {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// True if this agent may commit to terminating its own process.
    #[inline]
    pub fn accepts_kill(&self) -> bool {
        self.role == ProcessRole::Monitored
    }
}

impl Default for AgentConfig {
    /// Default configuration:
    ///
    /// - `grace_period = 10s`
    /// - `bus_capacity = 1024`
    /// - `coalesce_rechecks = false`
    /// - `exit_code = 0`
    /// - `role = ProcessRole::Monitored`
    fn default() -> Self {
        Self {
            grace_period: Duration::from_secs(10),
            bus_capacity: 1024,
            coalesce_rechecks: false,
            exit_code: 0,
            role: ProcessRole::default(),
        }
    }
}
