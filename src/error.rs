//! Error types used by the procvisor runtime.
//!
//! This module defines the error enums raised at the component boundaries:
//!
//! - [`DecodeError`]: an inbound [`Envelope`](crate::Envelope) could not be turned into an event.
//! - [`ChannelError`]: the broadcast channel refused or lost a publish/subscribe.
//! - [`OracleError`]: the liveness oracle failed to enumerate or remove tasks.
//! - [`BuildError`]: the agent builder is missing a required component.
//!
//! All types provide `as_label` for logs. None of them are fatal to the process:
//! malformed messages are dropped, oracle failures are best-effort.

use thiserror::Error;

/// # Errors produced while decoding an inbound envelope.
///
/// A receiver that hits any of these drops the message silently (after logging);
/// no listener is invoked for it.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The action identifier is not one of the four known kinds.
    #[error("unknown action {action:?}")]
    UnknownAction {
        /// The action string found on the wire.
        action: String,
    },

    /// A field required by the action is absent.
    #[error("action {action:?} is missing field {field:?}")]
    MissingField {
        /// The action being decoded.
        action: &'static str,
        /// The required payload key.
        field: &'static str,
    },

    /// A field is present but cannot be parsed into its semantic type.
    #[error("action {action:?} has invalid {field:?}={value:?}")]
    InvalidField {
        /// The action being decoded.
        action: &'static str,
        /// The payload key.
        field: &'static str,
        /// The raw string value.
        value: String,
    },

    /// The byte frame is not a valid JSON envelope, or the envelope could not be framed.
    #[error("invalid envelope frame: {reason}")]
    Frame {
        /// Parser message.
        reason: String,
    },
}

impl DecodeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use procvisor::DecodeError;
    ///
    /// let err = DecodeError::MissingField { action: "procvisor.action.KILL", field: "pid" };
    /// assert_eq!(err.as_label(), "decode_missing_field");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DecodeError::UnknownAction { .. } => "decode_unknown_action",
            DecodeError::MissingField { .. } => "decode_missing_field",
            DecodeError::InvalidField { .. } => "decode_invalid_field",
            DecodeError::Frame { .. } => "decode_frame",
        }
    }
}

/// # Errors produced by a broadcast channel.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// The caller does not hold the permission the channel is scoped to.
    #[error("permission denied: channel requires {required:?}, caller holds {presented:?}")]
    PermissionDenied {
        /// Permission the channel is restricted to.
        required: String,
        /// Permission presented by the caller.
        presented: String,
    },

    /// The channel was shut down.
    #[error("channel closed")]
    Closed,

    /// The receiver fell behind and `skipped` envelopes were dropped for it.
    #[error("receiver lagged, {skipped} envelopes skipped")]
    Lagged {
        /// Number of envelopes lost.
        skipped: u64,
    },
}

impl ChannelError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ChannelError::PermissionDenied { .. } => "channel_permission_denied",
            ChannelError::Closed => "channel_closed",
            ChannelError::Lagged { .. } => "channel_lagged",
        }
    }
}

/// # Errors reported by a [`LivenessOracle`](crate::LivenessOracle) or its task handles.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OracleError {
    /// Running tasks of a process could not be listed.
    #[error("cannot enumerate tasks of {process:?}: {reason}")]
    Enumerate {
        /// Process whose tasks were requested.
        process: String,
        /// Underlying failure.
        reason: String,
    },

    /// A task entry could not be finished/removed.
    #[error("cannot remove task: {reason}")]
    Remove {
        /// Underlying failure.
        reason: String,
    },
}

impl OracleError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            OracleError::Enumerate { .. } => "oracle_enumerate",
            OracleError::Remove { .. } => "oracle_remove",
        }
    }
}

/// # Errors produced by [`AgentBuilder::build`](crate::AgentBuilder::build).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// A component without a sensible default was not provided.
    #[error("agent builder is missing {component}")]
    Missing {
        /// Name of the missing component.
        component: &'static str,
    },
}

impl BuildError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            BuildError::Missing { .. } => "build_missing_component",
        }
    }
}
