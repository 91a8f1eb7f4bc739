//! # Consumed platform interfaces.
//!
//! The kill-rescue machine does not know how the platform tracks foreground
//! work, task entries, or how a process ends. It consumes these seams:
//! - [`LivenessOracle`] answers the three liveness questions at recheck time and
//!   lists the task entries to remove before terminating;
//! - [`TaskHandle`] removes one task entry;
//! - [`Terminate`] ends the current process.

use crate::error::OracleError;
use crate::process::identity::ProcessIdentity;

/// One OS-level task entry owned by a process.
pub trait TaskHandle: Send {
    /// Finishes the task and removes its entry.
    fn finish_and_remove_task(&self) -> Result<(), OracleError>;
}

/// Process-liveness oracle queried by the grace-period recheck.
pub trait LivenessOracle: Send + Sync + 'static {
    /// The process has an active started state.
    fn has_active_started_state(&self) -> bool;

    /// The process runs a foreground service.
    fn has_foreground_service(&self) -> bool;

    /// The process has a visible view/window.
    fn has_visible_view(&self) -> bool;

    /// Task entries currently associated with `process_name`.
    fn running_tasks(&self, process_name: &str) -> Result<Vec<Box<dyn TaskHandle>>, OracleError>;
}

/// Ends the current process.
pub trait Terminate: Send + Sync + 'static {
    /// Terminates `identity` (the current process). Production implementations do not return.
    fn terminate(&self, identity: &ProcessIdentity);
}

/// Terminates through [`std::process::exit`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ExitTerminator {
    code: i32,
}

impl ExitTerminator {
    /// Exits with `code`.
    pub fn new(code: i32) -> Self {
        Self { code }
    }
}

impl Terminate for ExitTerminator {
    fn terminate(&self, identity: &ProcessIdentity) {
        tracing::info!(process = %identity, code = self.code, "terminating current process");
        std::process::exit(self.code);
    }
}
