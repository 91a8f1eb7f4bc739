//! # DispatchAgent: per-process entry point of the supervision protocol.
//!
//! The [`DispatchAgent`] owns the [`ProcessContext`] of its process, the
//! kill-rescue machine, and the connection to the shared [`Channel`].
//!
//! ## Key responsibilities
//! - **outbound**: encode the four event kinds and publish them (`dispatch_*`)
//! - **inbound**: decode every envelope and route it locally
//! - keep listener registration behind the process context
//!
//! ## Inbound routing
//! ```text
//! Channel ──► inbound loop ──► SupervisorEvent::from_envelope()
//!                                 ├─ Err(DecodeError)   → warn, drop
//!                                 ├─ StateOn / StateOff → StateDispatcher
//!                                 ├─ KillRequest
//!                                 │     ├─ target == self (monitored role) → KillRescue::on_kill_request()
//!                                 │     └─ otherwise                      → invoke_dying() (observation only)
//!                                 └─ Death              → invoke_death() (every process, every death)
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use procvisor::{
//!     AgentConfig, Bus, DispatchAgent, LivenessOracle, Permission, ProcessIdentity,
//!     SupervisorProxy, VetoFn,
//! };
//!
//! # async fn demo(proxy: Arc<dyn SupervisorProxy>, oracle: Arc<dyn LivenessOracle>) -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = AgentConfig::default();
//! let permission = Permission::for_package("com.example.app");
//! let bus = Bus::from_config(permission.clone(), &cfg);
//!
//! let agent = DispatchAgent::builder(cfg, Arc::new(bus), permission)
//!     .with_identity(ProcessIdentity::current("com.example.app:push"))
//!     .with_proxy(proxy)
//!     .with_oracle(oracle)
//!     .build()?;
//!
//! agent.add_dying_listener(VetoFn::arc("upload", |_: &str, _: i32| false));
//! agent.install()?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::builder::AgentBuilder;
use super::config::AgentConfig;
use super::context::ProcessContext;
use super::kill::{KillDecision, KillRescue};
use crate::error::{ChannelError, DecodeError};
use crate::events::{Channel, Envelope, Permission, SupervisorEvent};
use crate::listeners::{NotifyListener, VetoListener};
use crate::process::{ProcessIdentity, ProcessToken, StateDispatcher};

/// What the agent did with one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Routed {
    /// Forwarded to the state dispatcher.
    State,
    /// Addressed to this process; the kill-rescue machine decided.
    Kill(KillDecision),
    /// Addressed elsewhere (or to the coordinator); dying listeners observed it.
    KillObserved,
    /// Death listeners were informed.
    Death,
}

/// Per-process dispatch agent.
pub struct DispatchAgent {
    cfg: AgentConfig,
    channel: Arc<dyn Channel>,
    permission: Permission,
    ctx: Arc<ProcessContext>,
    kill: Arc<KillRescue>,
    states: Arc<dyn StateDispatcher>,
    installed: AtomicBool,
    runtime_token: CancellationToken,
}

impl DispatchAgent {
    /// Starts building an agent connected to `channel` with `permission`.
    pub fn builder(
        cfg: AgentConfig,
        channel: Arc<dyn Channel>,
        permission: Permission,
    ) -> AgentBuilder {
        AgentBuilder::new(cfg, channel, permission)
    }

    pub(crate) fn new_internal(
        cfg: AgentConfig,
        channel: Arc<dyn Channel>,
        permission: Permission,
        ctx: Arc<ProcessContext>,
        kill: Arc<KillRescue>,
        states: Arc<dyn StateDispatcher>,
        runtime_token: CancellationToken,
    ) -> Self {
        Self {
            cfg,
            channel,
            permission,
            ctx,
            kill,
            states,
            installed: AtomicBool::new(false),
            runtime_token,
        }
    }

    /// Configuration of this agent.
    pub fn config(&self) -> &AgentConfig {
        &self.cfg
    }

    /// Process-scoped state (identity, token, registries, rescue flag).
    pub fn context(&self) -> &Arc<ProcessContext> {
        &self.ctx
    }

    /// Identity of this process.
    pub fn identity(&self) -> &ProcessIdentity {
        self.ctx.identity()
    }

    /// Token of this process.
    pub fn token(&self) -> ProcessToken {
        self.ctx.token()
    }

    /// True once [`install`](Self::install) succeeded.
    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::Acquire)
    }

    // ---- listener registration ----

    /// Registers a dying (veto) listener.
    pub fn add_dying_listener(&self, listener: Arc<dyn VetoListener>) {
        self.ctx.dying().add(listener);
    }

    /// Unregisters a dying listener; returns `false` if it was not registered.
    pub fn remove_dying_listener(&self, listener: &Arc<dyn VetoListener>) -> bool {
        self.ctx.dying().remove(listener)
    }

    /// Registers a death (notify) listener.
    pub fn add_death_listener(&self, listener: Arc<dyn NotifyListener>) {
        self.ctx.death().add(listener);
    }

    /// Unregisters a death listener; returns `false` if it was not registered.
    pub fn remove_death_listener(&self, listener: &Arc<dyn NotifyListener>) -> bool {
        self.ctx.death().remove(listener)
    }

    // ---- lifecycle ----

    /// Subscribes to the channel and spawns the inbound loop.
    ///
    /// Idempotent: returns `Ok(false)` when already installed. Must be called
    /// from within a tokio runtime.
    pub fn install(self: &Arc<Self>) -> Result<bool, ChannelError> {
        if self.installed.swap(true, Ordering::AcqRel) {
            return Ok(false);
        }
        let mut inbox = match self.channel.subscribe(&self.permission) {
            Ok(inbox) => inbox,
            Err(e) => {
                self.installed.store(false, Ordering::Release);
                return Err(e);
            }
        };

        let rt = self.runtime_token.clone();
        let me = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = rt.cancelled() => break,
                    msg = inbox.recv() => match msg {
                        Ok(env) => {
                            // Malformed input is already logged by `on_receive`.
                            let _ = me.on_receive(&env).await;
                        }
                        Err(ChannelError::Lagged { skipped }) => {
                            warn!(process = %me.identity(), skipped, "inbound lagged; events lost");
                            continue;
                        }
                        Err(_) => break,
                    }
                }
            }
            debug!(process = %me.identity(), "inbound loop stopped");
        });

        debug!(process = %self.identity(), role = ?self.cfg.role, "agent installed");
        Ok(true)
    }

    /// Stops the inbound loop and the default scheduler.
    pub fn shutdown(&self) {
        self.runtime_token.cancel();
    }

    // ---- outbound ----

    /// Broadcasts `state-on` for `stateful_name`.
    pub fn dispatch_app_state_on(&self, stateful_name: &str) -> Result<(), ChannelError> {
        self.publish(&SupervisorEvent::StateOn {
            stateful_name: stateful_name.to_owned(),
        })
    }

    /// Broadcasts `state-off` for `stateful_name`.
    pub fn dispatch_app_state_off(&self, stateful_name: &str) -> Result<(), ChannelError> {
        self.publish(&SupervisorEvent::StateOff {
            stateful_name: stateful_name.to_owned(),
        })
    }

    /// Asks `process_name`/`pid` to terminate.
    pub fn dispatch_kill(&self, process_name: &str, pid: i32) -> Result<(), ChannelError> {
        self.publish(&SupervisorEvent::KillRequest {
            process_name: process_name.to_owned(),
            pid,
        })
    }

    /// Announces that `process_name`/`pid` died.
    pub fn dispatch_death(
        &self,
        process_name: &str,
        pid: i32,
        is_lru_kill: bool,
    ) -> Result<(), ChannelError> {
        self.publish(&SupervisorEvent::Death {
            process_name: process_name.to_owned(),
            pid,
            is_lru_kill,
        })
    }

    /// Encodes and publishes `event` (fire-and-forget).
    pub fn publish(&self, event: &SupervisorEvent) -> Result<(), ChannelError> {
        debug!(kind = %event.kind(), "dispatching");
        self.channel.publish(&self.permission, event.to_envelope())
    }

    // ---- inbound ----

    /// Decodes one envelope and routes it.
    ///
    /// A malformed envelope is logged and returned as `Err`; no listener runs.
    pub async fn on_receive(&self, env: &Envelope) -> Result<Routed, DecodeError> {
        match SupervisorEvent::from_envelope(env) {
            Ok(event) => Ok(self.handle_event(event).await),
            Err(e) => {
                warn!(
                    process = %self.identity(),
                    action = %env.action,
                    error = %e,
                    label = e.as_label(),
                    "malformed envelope dropped"
                );
                Err(e)
            }
        }
    }

    /// Routes one decoded event.
    pub async fn handle_event(&self, event: SupervisorEvent) -> Routed {
        match event {
            SupervisorEvent::StateOn { stateful_name } => {
                self.states.on_state_on(&stateful_name);
                Routed::State
            }
            SupervisorEvent::StateOff { stateful_name } => {
                self.states.on_state_off(&stateful_name);
                Routed::State
            }
            SupervisorEvent::KillRequest { process_name, pid } => {
                let addressed = self.identity().matches(&process_name, pid);
                if addressed && self.cfg.accepts_kill() {
                    Routed::Kill(self.kill.on_kill_request().await)
                } else {
                    let vote = self.ctx.dying().invoke_dying(&process_name, pid);
                    debug!(
                        process = %self.identity(),
                        target = %process_name,
                        pid,
                        vote,
                        "kill-request observed"
                    );
                    Routed::KillObserved
                }
            }
            SupervisorEvent::Death {
                process_name,
                pid,
                is_lru_kill,
            } => {
                self.ctx.death().invoke_death(&process_name, pid, is_lru_kill);
                Routed::Death
            }
        }
    }
}
