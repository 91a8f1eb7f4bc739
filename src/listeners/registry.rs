//! # Ordered listener registries with failure isolation.
//!
//! [`ListenerRegistry`] keeps listeners in registration order behind a
//! [`parking_lot::RwLock`]. Invocation takes a snapshot under the read lock and
//! calls listeners **outside** it, so `add`/`remove` may race with invocation
//! from any thread (a listener may even unregister itself while being called).
//!
//! ## Rules
//! - **All listeners run**: a result or a panic never short-circuits the rest.
//! - **Isolation**: panics are caught (`catch_unwind`) and logged; a panicking
//!   dying listener counts as "declined".
//! - **Aggregate veto**: [`DyingRegistry::invoke_dying`] is the logical OR.
//! - **Identity**: `remove` matches by `Arc` pointer, not by name.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a listener panics while holding a lock of its own.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use super::listener::{NotifyListener, VetoListener};

/// Registry of dying (veto) listeners.
pub type DyingRegistry = ListenerRegistry<dyn VetoListener>;
/// Registry of death (notify) listeners.
pub type DeathRegistry = ListenerRegistry<dyn NotifyListener>;

/// Ordered, thread-safe collection of listeners.
pub struct ListenerRegistry<L: ?Sized> {
    listeners: RwLock<Vec<Arc<L>>>,
}

impl<L: ?Sized> Default for ListenerRegistry<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: ?Sized> ListenerRegistry<L> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Appends `listener`; the same handle may be registered more than once.
    pub fn add(&self, listener: Arc<L>) {
        self.listeners.write().push(listener);
    }

    /// Removes the first registration of `listener` (by pointer identity).
    ///
    /// Returns `false` if it was not registered.
    pub fn remove(&self, listener: &Arc<L>) -> bool {
        let mut listeners = self.listeners.write();
        match listeners.iter().position(|l| Arc::ptr_eq(l, listener)) {
            Some(idx) => {
                listeners.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.read().len()
    }

    /// True if no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.read().is_empty()
    }

    /// Copies the current registrations; callers iterate without holding the lock.
    fn snapshot(&self) -> Vec<Arc<L>> {
        self.listeners.read().clone()
    }
}

impl ListenerRegistry<dyn VetoListener> {
    /// Asks every dying listener whether `process_name`/`pid` should be rescued.
    ///
    /// Returns `true` if **any** listener returned `true`. Panicking listeners
    /// are logged and treated as `false`.
    pub fn invoke_dying(&self, process_name: &str, pid: i32) -> bool {
        let mut rescue = false;
        for listener in self.snapshot() {
            match catch_unwind(AssertUnwindSafe(|| listener.on_dying(process_name, pid))) {
                Ok(vote) => {
                    debug!(
                        listener = listener.name(),
                        process = process_name,
                        pid,
                        vote,
                        "dying listener answered"
                    );
                    rescue |= vote;
                }
                Err(panic) => {
                    warn!(
                        listener = listener.name(),
                        process = process_name,
                        pid,
                        panic = %panic_message(panic.as_ref()),
                        "dying listener panicked"
                    );
                }
            }
        }
        rescue
    }
}

impl ListenerRegistry<dyn NotifyListener> {
    /// Informs every death listener that `process_name`/`pid` died.
    pub fn invoke_death(&self, process_name: &str, pid: i32, is_lru_kill: bool) {
        for listener in self.snapshot() {
            let res = catch_unwind(AssertUnwindSafe(|| {
                listener.on_death(process_name, pid, is_lru_kill)
            }));
            if let Err(panic) = res {
                warn!(
                    listener = listener.name(),
                    process = process_name,
                    pid,
                    is_lru_kill,
                    panic = %panic_message(panic.as_ref()),
                    "death listener panicked"
                );
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
