//! # Process-scoped agent state.
//!
//! [`ProcessContext`] owns everything that lives exactly as long as the
//! process: its identity and token, both listener registries, and the
//! permanent rescue flag. It is created once and injected into the agent
//! instead of being reachable as global state.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::listeners::{DeathRegistry, DyingRegistry};
use crate::process::{ProcessIdentity, ProcessToken};

/// State owned by one process for its whole lifetime.
pub struct ProcessContext {
    identity: ProcessIdentity,
    token: ProcessToken,
    dying: DyingRegistry,
    death: DeathRegistry,
    rescued: AtomicBool,
}

impl ProcessContext {
    /// Creates a context with a freshly generated token.
    pub fn new(identity: ProcessIdentity) -> Self {
        Self::with_token(identity, ProcessToken::generate())
    }

    /// Creates a context with an explicit token.
    pub fn with_token(identity: ProcessIdentity, token: ProcessToken) -> Self {
        Self {
            identity,
            token,
            dying: DyingRegistry::new(),
            death: DeathRegistry::new(),
            rescued: AtomicBool::new(false),
        }
    }

    /// Identity of this process.
    pub fn identity(&self) -> &ProcessIdentity {
        &self.identity
    }

    /// Token of this process.
    pub fn token(&self) -> ProcessToken {
        self.token
    }

    /// Dying (veto) listeners.
    pub fn dying(&self) -> &DyingRegistry {
        &self.dying
    }

    /// Death (notify) listeners.
    pub fn death(&self) -> &DeathRegistry {
        &self.death
    }

    /// True once a rescue succeeded.
    pub fn is_rescued(&self) -> bool {
        self.rescued.load(Ordering::Acquire)
    }

    /// Flips the rescue flag; returns `false` if it was already set.
    pub(crate) fn mark_rescued(&self) -> bool {
        self.rescued
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
