//! Supervisor events: data model, wire envelope and broadcast channel.
//!
//! ## Contents
//! - [`SupervisorEvent`], [`EventKind`] the four event kinds and their payloads
//! - [`Envelope`] action identifier plus flat string map (wire form)
//! - [`Permission`] permission string scoping the channel
//! - [`Channel`], [`Bus`] transport seam and its `tokio::sync::broadcast` implementation
//!
//! ## Quick reference
//! - **Publishers**: `DispatchAgent::dispatch_*` in any process.
//! - **Consumers**: every installed agent's inbound loop.

mod bus;
mod envelope;
mod event;
mod permission;

pub use bus::{Bus, Channel, Inbox};
pub use envelope::Envelope;
pub use event::{
    ACTION_DEATH, ACTION_KILL, ACTION_STATE_OFF, ACTION_STATE_ON, EventKind, SupervisorEvent,
};
pub use permission::{Permission, ResolvePackage, StaticPackage};
