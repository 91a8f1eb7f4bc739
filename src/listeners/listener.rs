//! # Listener traits
//!
//! Two capabilities, two traits:
//! - [`VetoListener`] is consulted before the current process is killed and may
//!   request a rescue by returning `true`.
//! - [`NotifyListener`] is informed after any process died.
//!
//! Both are synchronous: the veto must be answered immediately, before any
//! grace period starts. Closures can be registered through [`VetoFn`] and
//! [`NotifyFn`].
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use procvisor::{NotifyFn, NotifyListener, VetoFn, VetoListener};
//!
//! let keep_player: Arc<dyn VetoListener> =
//!     VetoFn::arc("player", |name: &str, _pid: i32| name.ends_with(":player"));
//! assert!(keep_player.on_dying("app:player", 10));
//!
//! let audit: Arc<dyn NotifyListener> = NotifyFn::arc("audit", |_name: &str, _pid: i32, _lru: bool| {});
//! audit.on_death("app:push", 11, true);
//! ```

use std::borrow::Cow;
use std::sync::Arc;

/// Veto callback consulted before a kill is committed.
pub trait VetoListener: Send + Sync + 'static {
    /// Returns `true` to request that `process_name`/`pid` be rescued.
    fn on_dying(&self, process_name: &str, pid: i32) -> bool;

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Notification callback informed of every process death.
pub trait NotifyListener: Send + Sync + 'static {
    /// Called once per observed death.
    fn on_death(&self, process_name: &str, pid: i32, is_lru_kill: bool);

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Closure-backed [`VetoListener`].
#[derive(Debug)]
pub struct VetoFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> VetoFn<F>
where
    F: Fn(&str, i32) -> bool + Send + Sync + 'static,
{
    /// Wraps `f` under `name`.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Wraps `f` and returns it as a shared handle, ready for registration.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> VetoListener for VetoFn<F>
where
    F: Fn(&str, i32) -> bool + Send + Sync + 'static,
{
    fn on_dying(&self, process_name: &str, pid: i32) -> bool {
        (self.f)(process_name, pid)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Closure-backed [`NotifyListener`].
#[derive(Debug)]
pub struct NotifyFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> NotifyFn<F>
where
    F: Fn(&str, i32, bool) + Send + Sync + 'static,
{
    /// Wraps `f` under `name`.
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Wraps `f` and returns it as a shared handle, ready for registration.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F> NotifyListener for NotifyFn<F>
where
    F: Fn(&str, i32, bool) + Send + Sync + 'static,
{
    fn on_death(&self, process_name: &str, pid: i32, is_lru_kill: bool) {
        (self.f)(process_name, pid, is_lru_kill)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
