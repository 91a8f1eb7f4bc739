//! # Channel permission derived from the application package.
//!
//! Cooperating processes share one permission string; the channel refuses any
//! publisher or subscriber presenting a different one.
//!
//! ```rust
//! use procvisor::{Permission, StaticPackage};
//!
//! let p = Permission::for_package("com.example.app");
//! assert_eq!(p.as_str(), "com.example.app.matrix.permission.PROCESS_SUPERVISOR");
//! assert_eq!(Permission::resolve(&StaticPackage::new("com.example.app")), p);
//! ```

use std::fmt;
use std::sync::Arc;

const PERMISSION_SUFFIX: &str = ".matrix.permission.PROCESS_SUPERVISOR";

/// Resolves the application package identifier.
pub trait ResolvePackage: Send + Sync {
    /// Package identifier of the running application.
    fn package_name(&self) -> String;
}

/// Package resolver returning a fixed identifier.
#[derive(Clone, Debug)]
pub struct StaticPackage(String);

impl StaticPackage {
    /// Creates a resolver for `package`.
    pub fn new(package: impl Into<String>) -> Self {
        Self(package.into())
    }
}

impl ResolvePackage for StaticPackage {
    fn package_name(&self) -> String {
        self.0.clone()
    }
}

/// Permission string scoping a broadcast channel.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Permission(Arc<str>);

impl Permission {
    /// `<package>.matrix.permission.PROCESS_SUPERVISOR`
    pub fn for_package(package: &str) -> Self {
        Self(format!("{package}{PERMISSION_SUFFIX}").into())
    }

    /// Builds the permission from a package resolver.
    pub fn resolve(resolver: &dyn ResolvePackage) -> Self {
        Self::for_package(&resolver.package_name())
    }

    /// The raw permission string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
