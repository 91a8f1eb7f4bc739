//! # Dying and death listeners.
//!
//! This module provides the two listener capabilities and the registries that
//! hold them for one process.
//!
//! ## Architecture
//! ```text
//! kill-request ──► DispatchAgent ──► DyingRegistry::invoke_dying()
//!                                        ├──► VetoListener::on_dying()  ─┐
//!                                        ├──► VetoListener::on_dying()  ─┼─► OR ─► rescue?
//!                                        └──► VetoListener::on_dying()  ─┘
//!
//! death ──────────► DispatchAgent ──► DeathRegistry::invoke_death()
//!                                        ├──► NotifyListener::on_death()
//!                                        └──► NotifyListener::on_death()
//! ```
//!
//! ## Implementing custom listeners
//! ```no_run
//! use procvisor::VetoListener;
//!
//! struct KeepWhilePlaying;
//!
//! impl VetoListener for KeepWhilePlaying {
//!     fn on_dying(&self, process_name: &str, _pid: i32) -> bool {
//!         process_name.ends_with(":player")
//!     }
//! }
//! ```

mod listener;
#[cfg(feature = "logging")]
mod log;
mod registry;

pub use listener::{NotifyFn, NotifyListener, VetoFn, VetoListener};
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use registry::{DeathRegistry, DyingRegistry, ListenerRegistry};
