//! # Permission-scoped broadcast channel for supervisor envelopes.
//!
//! [`Channel`] is the transport seam: the agent only needs `publish` and
//! `subscribe`. [`Bus`] is the in-crate implementation, a thin wrapper around
//! [`tokio::sync::broadcast`] shared by every agent that holds a clone.
//!
//! ## Architecture
//! ```text
//! Publishers (any process):          Receivers (every process):
//!   coordinator ──┐
//!   process A   ──┼──► Bus ──┬──► agent inbound loop (coordinator)
//!   process B   ──┘          ├──► agent inbound loop (process A)
//!                            └──► agent inbound loop (process B)
//! ```
//!
//! ## Rules
//! - **Permission**: publish and subscribe require the channel's [`Permission`].
//! - **Non-blocking publish**: `publish()` never waits for receivers.
//! - **Fire-and-forget**: no acknowledgement; events are lost if nobody listens.
//! - **Lag handling**: slow receivers get `ChannelError::Lagged { skipped }` and keep going.

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use super::envelope::Envelope;
use super::permission::Permission;
use crate::error::ChannelError;

/// Receiving end handed out by a [`Channel`].
#[async_trait]
pub trait Inbox: Send + 'static {
    /// Waits for the next envelope.
    ///
    /// `ChannelError::Lagged` reports lost envelopes and leaves the inbox usable;
    /// `ChannelError::Closed` is final.
    async fn recv(&mut self) -> Result<Envelope, ChannelError>;
}

#[async_trait]
impl Inbox for broadcast::Receiver<Envelope> {
    async fn recv(&mut self) -> Result<Envelope, ChannelError> {
        broadcast::Receiver::recv(self).await.map_err(|e| match e {
            RecvError::Closed => ChannelError::Closed,
            RecvError::Lagged(skipped) => ChannelError::Lagged { skipped },
        })
    }
}

/// One-to-many transport for supervisor envelopes.
///
/// Implementations choose the mechanism (in-process broadcast, local sockets,
/// shared memory); the protocol logic only relies on this contract.
pub trait Channel: Send + Sync + 'static {
    /// Delivers `envelope` to every current subscriber.
    ///
    /// Returns immediately; delivery is best-effort.
    fn publish(&self, holder: &Permission, envelope: Envelope) -> Result<(), ChannelError>;

    /// Opens a receiver observing envelopes published after this call.
    fn subscribe(&self, holder: &Permission) -> Result<Box<dyn Inbox>, ChannelError>;
}

/// Broadcast channel restricted to one permission.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately (send clones internally).
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Envelope>,
    permission: Permission,
}

impl Bus {
    /// Creates a new bus scoped to `permission` with the given ring capacity.
    ///
    /// ### Notes
    /// - Capacity is **shared** across all receivers (not per-subscriber).
    /// - The minimum capacity is 1 (clamped).
    pub fn new(permission: Permission, capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Envelope>(capacity.max(1));
        Self { tx, permission }
    }

    /// Creates a bus sized by [`AgentConfig::bus_capacity`](crate::AgentConfig).
    pub fn from_config(permission: Permission, cfg: &crate::AgentConfig) -> Self {
        Self::new(permission, cfg.bus_capacity_clamped())
    }

    /// Permission this bus is restricted to.
    pub fn permission(&self) -> &Permission {
        &self.permission
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn check(&self, holder: &Permission) -> Result<(), ChannelError> {
        if *holder == self.permission {
            Ok(())
        } else {
            Err(ChannelError::PermissionDenied {
                required: self.permission.to_string(),
                presented: holder.to_string(),
            })
        }
    }
}

impl Channel for Bus {
    fn publish(&self, holder: &Permission, envelope: Envelope) -> Result<(), ChannelError> {
        self.check(holder)?;
        // No receivers is not an error: the event is simply lost.
        let _ = self.tx.send(envelope);
        Ok(())
    }

    fn subscribe(&self, holder: &Permission) -> Result<Box<dyn Inbox>, ChannelError> {
        self.check(holder)?;
        Ok(Box::new(self.tx.subscribe()))
    }
}
