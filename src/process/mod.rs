//! Process identity and the interfaces the agent consumes at its boundary.
//!
//! - [`identity`]: [`ProcessIdentity`], [`ProcessToken`];
//! - [`oracle`]: [`LivenessOracle`], [`TaskHandle`], [`Terminate`];
//! - [`proxy`]: [`SupervisorProxy`], [`StateDispatcher`].

mod identity;
mod oracle;
mod proxy;

pub use identity::{ProcessIdentity, ProcessToken};
pub use oracle::{ExitTerminator, LivenessOracle, TaskHandle, Terminate};
pub use proxy::{NoopStateDispatcher, StateDispatcher, SupervisorProxy};
