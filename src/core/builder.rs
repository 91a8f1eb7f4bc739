use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::agent::DispatchAgent;
use super::config::AgentConfig;
use super::context::ProcessContext;
use super::kill::{KillRescue, KillRescueParts};
use super::scheduler::{Schedule, SerialScheduler};
use crate::error::BuildError;
use crate::events::{Channel, Permission};
use crate::process::{
    ExitTerminator, LivenessOracle, NoopStateDispatcher, ProcessIdentity, ProcessToken,
    StateDispatcher, SupervisorProxy, Terminate,
};

/// Builder for constructing a [`DispatchAgent`] with its collaborators.
pub struct AgentBuilder {
    cfg: AgentConfig,
    channel: Arc<dyn Channel>,
    permission: Permission,
    identity: Option<ProcessIdentity>,
    token: Option<ProcessToken>,
    proxy: Option<Arc<dyn SupervisorProxy>>,
    oracle: Option<Arc<dyn LivenessOracle>>,
    terminator: Option<Arc<dyn Terminate>>,
    scheduler: Option<Arc<dyn Schedule>>,
    states: Option<Arc<dyn StateDispatcher>>,
}

impl AgentBuilder {
    /// Creates a new builder with the given configuration and channel.
    pub fn new(cfg: AgentConfig, channel: Arc<dyn Channel>, permission: Permission) -> Self {
        Self {
            cfg,
            channel,
            permission,
            identity: None,
            token: None,
            proxy: None,
            oracle: None,
            terminator: None,
            scheduler: None,
            states: None,
        }
    }

    /// Sets the identity of this process.
    ///
    /// Defaults to the executable name and the OS pid.
    pub fn with_identity(mut self, identity: ProcessIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Sets an explicit process token instead of a random one.
    pub fn with_token(mut self, token: ProcessToken) -> Self {
        self.token = Some(token);
        self
    }

    /// Sets the coordinator proxy (required).
    pub fn with_proxy(mut self, proxy: Arc<dyn SupervisorProxy>) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Sets the liveness oracle (required).
    pub fn with_oracle(mut self, oracle: Arc<dyn LivenessOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Sets how the process ends. Defaults to [`ExitTerminator`] with `cfg.exit_code`.
    pub fn with_terminator(mut self, terminator: Arc<dyn Terminate>) -> Self {
        self.terminator = Some(terminator);
        self
    }

    /// Sets the delayed-execution facility. Defaults to a [`SerialScheduler`].
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Schedule>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Sets the receiver of state-on/off events. Defaults to [`NoopStateDispatcher`].
    pub fn with_state_dispatcher(mut self, states: Arc<dyn StateDispatcher>) -> Self {
        self.states = Some(states);
        self
    }

    /// Builds and returns the agent.
    ///
    /// This consumes the builder and initializes:
    /// - the process context (identity, token, empty registries)
    /// - the kill-rescue machine
    /// - the default serial scheduler, if none was given (needs a tokio runtime)
    ///
    /// The agent does not receive anything until [`DispatchAgent::install`] is called.
    pub fn build(self) -> Result<Arc<DispatchAgent>, BuildError> {
        let proxy = self.proxy.ok_or(BuildError::Missing { component: "proxy" })?;
        let oracle = self.oracle.ok_or(BuildError::Missing { component: "oracle" })?;
        let runtime_token = CancellationToken::new();

        let identity = self.identity.unwrap_or_else(default_identity);
        let ctx = Arc::new(match self.token {
            Some(token) => ProcessContext::with_token(identity, token),
            None => ProcessContext::new(identity),
        });

        let exit_code = self.cfg.exit_code;
        let terminator = self
            .terminator
            .unwrap_or_else(|| Arc::new(ExitTerminator::new(exit_code)) as Arc<dyn Terminate>);
        let scheduler = self.scheduler.unwrap_or_else(|| {
            Arc::new(SerialScheduler::spawn(runtime_token.child_token())) as Arc<dyn Schedule>
        });
        let states = self
            .states
            .unwrap_or_else(|| Arc::new(NoopStateDispatcher) as Arc<dyn StateDispatcher>);

        let kill = Arc::new(KillRescue::new(
            Arc::clone(&ctx),
            KillRescueParts {
                proxy,
                oracle,
                terminator,
                scheduler,
                grace_period: self.cfg.grace_period,
                coalesce: self.cfg.coalesce_rechecks,
            },
        ));

        Ok(Arc::new(DispatchAgent::new_internal(
            self.cfg,
            self.channel,
            self.permission,
            ctx,
            kill,
            states,
            runtime_token,
        )))
    }
}

fn default_identity() -> ProcessIdentity {
    let name = std::env::current_exe()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "main".to_owned());
    ProcessIdentity::current(name)
}
