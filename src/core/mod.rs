//! Agent core: routing, kill-rescue decisions and delayed rechecks.
//!
//! This module contains the per-process implementation of the protocol.
//! The public API is [`DispatchAgent`] (built through [`AgentBuilder`]),
//! configured by [`AgentConfig`].
//!
//! Internal modules:
//! - [`agent`]: inbound routing and outbound `dispatch_*` API;
//! - [`builder`]: wires the agent with its collaborators and defaults;
//! - [`context`]: process-scoped identity, registries and rescue flag;
//! - [`kill`]: kill-rescue state machine with grace-period recheck;
//! - [`scheduler`]: serial delayed execution.
//!
//! ```text
//!                 ┌───────────────────── DispatchAgent ─────────────────────┐
//! Channel ──►     │ inbound loop ─► route ─┬─► StateDispatcher              │
//!                 │                        ├─► ProcessContext.dying (observe)│
//!                 │                        ├─► KillRescue ─► Schedule ──┐   │
//!                 │                        └─► ProcessContext.death     │   │
//!                 │                                 recheck ◄───────────┘   │
//!                 │                                   ├─► SupervisorProxy   │
//!                 │                                   └─► Terminate         │
//!                 └─────────────────────────────────────────────────────────┘
//! ```

mod agent;
mod builder;
mod config;
mod context;
mod kill;
mod scheduler;
#[cfg(test)]
pub(crate) mod testing;

pub use agent::{DispatchAgent, Routed};
pub use builder::AgentBuilder;
pub use config::{AgentConfig, ProcessRole};
pub use context::ProcessContext;
pub use kill::{KillDecision, KillRescue, RecheckOutcome};
pub use scheduler::{Job, Schedule, SerialScheduler};
