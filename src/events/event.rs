//! # Supervisor events exchanged between cooperating processes.
//!
//! The [`SupervisorEvent`] enum is the closed set of four kinds that travel on
//! the channel:
//! - **State events**: `StateOn` / `StateOff` for a named stateful entity
//! - **Kill request**: coordinator asks a target process (name + pid) to die
//! - **Death**: a process actually died, with the LRU-kill flag
//!
//! Each kind has a fixed payload schema. Encoding never fails; decoding checks
//! every required field and rejects the whole message on the first bad one, so
//! a receiver never dispatches half an event.
//!
//! ## Example
//! ```rust
//! use procvisor::SupervisorEvent;
//!
//! let ev = SupervisorEvent::Death { process_name: "worker".into(), pid: 1234, is_lru_kill: true };
//! let env = ev.to_envelope();
//! assert_eq!(env.extra("pid"), Some("1234"));
//! assert_eq!(SupervisorEvent::from_envelope(&env).unwrap(), ev);
//! ```

use std::fmt;

use super::envelope::Envelope;
use crate::error::DecodeError;

/// Action identifier for [`SupervisorEvent::StateOn`].
pub const ACTION_STATE_ON: &str = "procvisor.action.STATE_ON";
/// Action identifier for [`SupervisorEvent::StateOff`].
pub const ACTION_STATE_OFF: &str = "procvisor.action.STATE_OFF";
/// Action identifier for [`SupervisorEvent::KillRequest`].
pub const ACTION_KILL: &str = "procvisor.action.KILL";
/// Action identifier for [`SupervisorEvent::Death`].
pub const ACTION_DEATH: &str = "procvisor.action.DEATH";

const KEY_STATEFUL_NAME: &str = "stateful_name";
const KEY_PROCESS_NAME: &str = "process_name";
const KEY_PID: &str = "pid";
const KEY_IS_LRU_KILL: &str = "is_lru_kill";

/// Classification of supervisor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A stateful entity turned on.
    StateOn,
    /// A stateful entity turned off.
    StateOff,
    /// Coordinator asks a process to terminate.
    KillRequest,
    /// A process died.
    Death,
}

impl EventKind {
    /// Wire action identifier of this kind.
    pub fn action(self) -> &'static str {
        match self {
            EventKind::StateOn => ACTION_STATE_ON,
            EventKind::StateOff => ACTION_STATE_OFF,
            EventKind::KillRequest => ACTION_KILL,
            EventKind::Death => ACTION_DEATH,
        }
    }

    /// Looks up a kind by its wire action identifier.
    pub fn from_action(action: &str) -> Option<Self> {
        match action {
            ACTION_STATE_ON => Some(EventKind::StateOn),
            ACTION_STATE_OFF => Some(EventKind::StateOff),
            ACTION_KILL => Some(EventKind::KillRequest),
            ACTION_DEATH => Some(EventKind::Death),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::StateOn => "state-on",
            EventKind::StateOff => "state-off",
            EventKind::KillRequest => "kill-request",
            EventKind::Death => "death",
        };
        f.write_str(s)
    }
}

/// A decoded supervisor event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupervisorEvent {
    /// Sets:
    /// - `stateful_name`: name of the entity that turned on
    StateOn { stateful_name: String },

    /// Sets:
    /// - `stateful_name`: name of the entity that turned off
    StateOff { stateful_name: String },

    /// Sets:
    /// - `process_name`: name of the process asked to die
    /// - `pid`: pid of that process instance
    KillRequest { process_name: String, pid: i32 },

    /// Sets:
    /// - `process_name`: name of the process that died
    /// - `pid`: pid of that process instance
    /// - `is_lru_kill`: true when reclaimed under memory pressure
    Death {
        process_name: String,
        pid: i32,
        is_lru_kill: bool,
    },
}

impl SupervisorEvent {
    /// Returns the kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            SupervisorEvent::StateOn { .. } => EventKind::StateOn,
            SupervisorEvent::StateOff { .. } => EventKind::StateOff,
            SupervisorEvent::KillRequest { .. } => EventKind::KillRequest,
            SupervisorEvent::Death { .. } => EventKind::Death,
        }
    }

    /// Encodes the event into its wire envelope.
    pub fn to_envelope(&self) -> Envelope {
        let env = Envelope::new(self.kind().action());
        match self {
            SupervisorEvent::StateOn { stateful_name }
            | SupervisorEvent::StateOff { stateful_name } => {
                env.with_extra(KEY_STATEFUL_NAME, stateful_name)
            }
            SupervisorEvent::KillRequest { process_name, pid } => env
                .with_extra(KEY_PROCESS_NAME, process_name)
                .with_extra(KEY_PID, pid),
            SupervisorEvent::Death {
                process_name,
                pid,
                is_lru_kill,
            } => env
                .with_extra(KEY_PROCESS_NAME, process_name)
                .with_extra(KEY_PID, pid)
                .with_extra(KEY_IS_LRU_KILL, is_lru_kill),
        }
    }

    /// Decodes an envelope, validating every field required by its action.
    pub fn from_envelope(env: &Envelope) -> Result<Self, DecodeError> {
        let kind =
            EventKind::from_action(&env.action).ok_or_else(|| DecodeError::UnknownAction {
                action: env.action.clone(),
            })?;
        let fields = Fields {
            env,
            action: kind.action(),
        };

        let ev = match kind {
            EventKind::StateOn => SupervisorEvent::StateOn {
                stateful_name: fields.string(KEY_STATEFUL_NAME)?,
            },
            EventKind::StateOff => SupervisorEvent::StateOff {
                stateful_name: fields.string(KEY_STATEFUL_NAME)?,
            },
            EventKind::KillRequest => SupervisorEvent::KillRequest {
                process_name: fields.string(KEY_PROCESS_NAME)?,
                pid: fields.parse(KEY_PID)?,
            },
            EventKind::Death => SupervisorEvent::Death {
                process_name: fields.string(KEY_PROCESS_NAME)?,
                pid: fields.parse(KEY_PID)?,
                is_lru_kill: fields.parse(KEY_IS_LRU_KILL)?,
            },
        };
        Ok(ev)
    }
}

/// Field accessor bound to one envelope/action pair.
struct Fields<'a> {
    env: &'a Envelope,
    action: &'static str,
}

impl Fields<'_> {
    fn raw(&self, field: &'static str) -> Result<&str, DecodeError> {
        self.env.extra(field).ok_or(DecodeError::MissingField {
            action: self.action,
            field,
        })
    }

    fn string(&self, field: &'static str) -> Result<String, DecodeError> {
        self.raw(field).map(str::to_owned)
    }

    fn parse<T: std::str::FromStr>(&self, field: &'static str) -> Result<T, DecodeError> {
        let raw = self.raw(field)?;
        raw.trim().parse().map_err(|_| DecodeError::InvalidField {
            action: self.action,
            field,
            value: raw.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_decodes_from_its_encoding() {
        let events = [
            SupervisorEvent::StateOn {
                stateful_name: "player".into(),
            },
            SupervisorEvent::StateOff {
                stateful_name: "player".into(),
            },
            SupervisorEvent::KillRequest {
                process_name: "app:push".into(),
                pid: 321,
            },
            SupervisorEvent::Death {
                process_name: "worker".into(),
                pid: 1234,
                is_lru_kill: false,
            },
        ];
        for ev in events {
            assert_eq!(SupervisorEvent::from_envelope(&ev.to_envelope()), Ok(ev));
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        let env = Envelope::new("something.else");
        assert_eq!(
            SupervisorEvent::from_envelope(&env),
            Err(DecodeError::UnknownAction {
                action: "something.else".into()
            })
        );
    }

    #[test]
    fn missing_pid_is_rejected() {
        let env = Envelope::new(ACTION_KILL).with_extra("process_name", "svc");
        assert_eq!(
            SupervisorEvent::from_envelope(&env),
            Err(DecodeError::MissingField {
                action: ACTION_KILL,
                field: "pid"
            })
        );
    }

    #[test]
    fn non_numeric_pid_is_rejected() {
        let env = Envelope::new(ACTION_DEATH)
            .with_extra("process_name", "svc")
            .with_extra("pid", "12a")
            .with_extra("is_lru_kill", "false");
        let err = SupervisorEvent::from_envelope(&env).unwrap_err();
        assert_eq!(err.as_label(), "decode_invalid_field");
    }

    #[test]
    fn lru_flag_must_be_a_bool() {
        let env = Envelope::new(ACTION_DEATH)
            .with_extra("process_name", "svc")
            .with_extra("pid", "1")
            .with_extra("is_lru_kill", "yes");
        assert_eq!(
            SupervisorEvent::from_envelope(&env),
            Err(DecodeError::InvalidField {
                action: ACTION_DEATH,
                field: "is_lru_kill",
                value: "yes".into()
            })
        );
    }

    #[test]
    fn kind_action_lookup_is_symmetric() {
        for kind in [
            EventKind::StateOn,
            EventKind::StateOff,
            EventKind::KillRequest,
            EventKind::Death,
        ] {
            assert_eq!(EventKind::from_action(kind.action()), Some(kind));
        }
        assert_eq!(EventKind::KillRequest.to_string(), "kill-request");
    }
}
