//! # Process identity and token.
//!
//! - [`ProcessIdentity`] names a process instance (`name` + `pid`); a reused
//!   pid after death is a different instance, so both fields take part in equality.
//! - [`ProcessToken`] is an opaque value generated once per process and handed
//!   unchanged to the coordinator with every rescue/kill/cancel notification.

use std::fmt;
use std::sync::Arc;

/// Name and pid of a process instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProcessIdentity {
    process_name: Arc<str>,
    pid: i32,
}

impl ProcessIdentity {
    /// Creates an identity from its parts.
    pub fn new(process_name: impl Into<Arc<str>>, pid: i32) -> Self {
        Self {
            process_name: process_name.into(),
            pid,
        }
    }

    /// Identity of the running process under `process_name`.
    pub fn current(process_name: impl Into<Arc<str>>) -> Self {
        let pid = i32::try_from(std::process::id()).unwrap_or(i32::MAX);
        Self::new(process_name, pid)
    }

    /// Process name.
    pub fn process_name(&self) -> &str {
        &self.process_name
    }

    /// Process id.
    pub fn pid(&self) -> i32 {
        self.pid
    }

    /// True if `process_name`/`pid` designate this instance.
    #[inline]
    pub fn matches(&self, process_name: &str, pid: i32) -> bool {
        self.pid == pid && &*self.process_name == process_name
    }
}

impl fmt::Display for ProcessIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.process_name, self.pid)
    }
}

/// Opaque identity of the current process, stable for its lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProcessToken(u64);

impl ProcessToken {
    /// Generates a fresh random token.
    pub fn generate() -> Self {
        Self(rand::random())
    }

    /// Rebuilds a token from its raw value (e.g. received over IPC).
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value.
    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProcessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
