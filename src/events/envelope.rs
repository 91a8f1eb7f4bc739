//! # Wire envelope: action identifier plus a flat string map.
//!
//! Every event crosses the channel as one [`Envelope`]. Integers and booleans
//! travel as strings and are parsed back by
//! [`SupervisorEvent::from_envelope`](crate::SupervisorEvent::from_envelope).
//!
//! ```text
//! Envelope {
//!     action: "procvisor.action.DEATH",
//!     extras: { "process_name": "worker", "pid": "1234", "is_lru_kill": "true" },
//! }
//! ```
//!
//! Transports that move bytes between processes frame envelopes as JSON via
//! [`Envelope::to_json`] / [`Envelope::from_json`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

/// One message on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Action identifier (event kind).
    pub action: String,
    /// String-keyed payload; every value is a string.
    #[serde(default)]
    pub extras: BTreeMap<String, String>,
}

impl Envelope {
    /// Creates an envelope with an empty payload.
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            extras: BTreeMap::new(),
        }
    }

    /// Attaches one payload entry.
    #[inline]
    pub fn with_extra(mut self, key: &str, value: impl ToString) -> Self {
        self.extras.insert(key.to_owned(), value.to_string());
        self
    }

    /// Returns the raw value for `key`.
    #[inline]
    pub fn extra(&self, key: &str) -> Option<&str> {
        self.extras.get(key).map(String::as_str)
    }

    /// Serializes the envelope into a JSON byte frame.
    pub fn to_json(&self) -> Result<Vec<u8>, DecodeError> {
        serde_json::to_vec(self).map_err(|e| DecodeError::Frame {
            reason: e.to_string(),
        })
    }

    /// Parses a JSON byte frame.
    pub fn from_json(bytes: &[u8]) -> Result<Self, DecodeError> {
        serde_json::from_slice(bytes).map_err(|e| DecodeError::Frame {
            reason: e.to_string(),
        })
    }
}
