//! # procvisor
//!
//! **procvisor** coordinates kill decisions across the cooperating processes of
//! one application. A single coordinator ("supervisor") process asks monitored
//! processes to terminate; each process runs a small [`DispatchAgent`] that
//! gives in-process subsystems one chance to veto the kill, waits a grace
//! period, re-checks liveness, and reports the outcome back.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//!     │ coordinator  │    │  process A   │    │  process B   │
//!     │DispatchAgent │    │DispatchAgent │    │DispatchAgent │
//!     └──────┬───────┘    └──────┬───────┘    └──────┬───────┘
//!            │ dispatch_kill     │ dispatch_death    │
//!            ▼                   ▼                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │      Channel (Bus: permission-scoped broadcast of Envelopes)      │
//! └──────┬──────────────────────┬──────────────────────┬──────────────┘
//!        ▼                      ▼                      ▼
//!   inbound loop           inbound loop           inbound loop
//!   (every event)          (every event)          (every event)
//! ```
//!
//! ### Kill-request lifecycle (in the addressed process)
//! ```text
//! KillRequest{name, pid} == own identity
//!   ├─► rescued already?  ── yes ──────────────────────────────┐
//!   ├─► DyingRegistry::invoke_dying() (OR of all listeners)    │
//!   │       ├─ true  ─► rescued = true (forever)                │
//!   │       │           proxy.on_process_rescued_from_kill()    │
//!   │       └─ false ───────────────────────────────────────────┤
//!   │                                                           ▼
//!   └─► Schedule::schedule_once(grace_period, recheck)   (GraceWait)
//!
//! recheck:
//!   ├─ started || foreground || visible ─► proxy.on_process_kill_canceled()
//!   └─ all false ─► proxy.on_process_killed()
//!                   ─► finish_and_remove_task() for every task (best effort)
//!                   ─► Terminate::terminate()
//! ```
//!
//! ## Features
//! | Area              | Description                                               | Key types / traits                          |
//! |-------------------|-----------------------------------------------------------|---------------------------------------------|
//! | **Wire**          | Four event kinds, string-map envelopes, JSON framing.     | [`SupervisorEvent`], [`Envelope`]           |
//! | **Channel**       | Permission-scoped one-to-many broadcast.                  | [`Channel`], [`Bus`], [`Permission`]        |
//! | **Listeners**     | Veto and notify callbacks with failure isolation.         | [`VetoListener`], [`NotifyListener`]        |
//! | **Agent**         | Routing, kill-rescue state machine, grace recheck.        | [`DispatchAgent`], [`KillRescue`]           |
//! | **Boundary**      | Liveness oracle, coordinator proxy, termination.          | [`LivenessOracle`], [`SupervisorProxy`]     |
//! | **Errors**        | Typed errors for decoding, channel and builder failures.  | [`DecodeError`], [`ChannelError`]           |
//! | **Configuration** | Grace period, bus capacity, role, recheck coalescing.     | [`AgentConfig`]                             |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] listener _(demo/reference only)_.
//!
//! ## Logging
//! Everything is reported through [`tracing`]; install any subscriber in the host application.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use procvisor::{
//!     AgentConfig, Bus, DispatchAgent, LivenessOracle, NotifyFn, OracleError, Permission,
//!     ProcessIdentity, ProcessToken, SupervisorProxy, TaskHandle,
//! };
//!
//! struct Coordinator;
//!
//! #[async_trait::async_trait]
//! impl SupervisorProxy for Coordinator {
//!     async fn on_process_rescued_from_kill(&self, _token: ProcessToken) {}
//!     async fn on_process_killed(&self, _token: ProcessToken) {}
//!     async fn on_process_kill_canceled(&self, _token: ProcessToken) {}
//! }
//!
//! struct AlwaysBusy;
//!
//! impl LivenessOracle for AlwaysBusy {
//!     fn has_active_started_state(&self) -> bool { true }
//!     fn has_foreground_service(&self) -> bool { false }
//!     fn has_visible_view(&self) -> bool { false }
//!     fn running_tasks(&self, _name: &str) -> Result<Vec<Box<dyn TaskHandle>>, OracleError> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = AgentConfig::default();
//!     let permission = Permission::for_package("com.example.app");
//!     let bus = Arc::new(Bus::from_config(permission.clone(), &cfg));
//!
//!     let agent = DispatchAgent::builder(cfg, bus, permission)
//!         .with_identity(ProcessIdentity::current("com.example.app:push"))
//!         .with_proxy(Arc::new(Coordinator))
//!         .with_oracle(Arc::new(AlwaysBusy))
//!         .build()?;
//!
//!     agent.add_death_listener(NotifyFn::arc("audit", |name: &str, pid: i32, lru: bool| {
//!         println!("{name}({pid}) died, lru={lru}");
//!     }));
//!     agent.install()?;
//!
//!     agent.dispatch_death("com.example.app:sync", 4321, true)?;
//!     agent.shutdown();
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod listeners;
mod process;

// ---- Public re-exports ----

pub use core::{
    AgentBuilder, AgentConfig, DispatchAgent, Job, KillDecision, KillRescue, ProcessContext,
    ProcessRole, RecheckOutcome, Routed, Schedule, SerialScheduler,
};
pub use error::{BuildError, ChannelError, DecodeError, OracleError};
pub use events::{
    ACTION_DEATH, ACTION_KILL, ACTION_STATE_OFF, ACTION_STATE_ON, Bus, Channel, Envelope,
    EventKind, Inbox, Permission, ResolvePackage, StaticPackage, SupervisorEvent,
};
pub use listeners::{
    DeathRegistry, DyingRegistry, ListenerRegistry, NotifyFn, NotifyListener, VetoFn,
    VetoListener,
};
pub use process::{
    ExitTerminator, LivenessOracle, NoopStateDispatcher, ProcessIdentity, ProcessToken,
    StateDispatcher, SupervisorProxy, TaskHandle, Terminate,
};

// Optional: expose a simple built-in logger listener (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use listeners::LogWriter;
