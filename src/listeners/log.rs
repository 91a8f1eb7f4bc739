//! # LogWriter: simple observation listener
//!
//! A minimal listener that records every kill consultation and death through
//! `tracing`. It never vetoes. Use it for tests or demos.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! INFO procvisor: [dying] process="app:push" pid=4242
//! INFO procvisor: [death] process="app:push" pid=4242 lru=true
//! ```

use tracing::info;

use super::listener::{NotifyListener, VetoListener};

/// Event writer listener.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl VetoListener for LogWriter {
    fn on_dying(&self, process_name: &str, pid: i32) -> bool {
        info!(target: "procvisor", "[dying] process={process_name:?} pid={pid}");
        false
    }

    fn name(&self) -> &str {
        "LogWriter"
    }
}

impl NotifyListener for LogWriter {
    fn on_death(&self, process_name: &str, pid: i32, is_lru_kill: bool) {
        info!(target: "procvisor", "[death] process={process_name:?} pid={pid} lru={is_lru_kill}");
    }

    fn name(&self) -> &str {
        "LogWriter"
    }
}
