//! Installed-version resolution for third-party dependencies

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::registry::PackageRegistry;

/// A third-party dependency and, when the registry knows it, its installed
/// version.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Dependency {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl Dependency {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// Look up the installed version of `name`. A miss, common when the
    /// import name differs from the distribution name, leaves the version
    /// unset.
    pub fn resolve(name: &str, registry: &PackageRegistry) -> Self {
        Self::new(name, registry.version(name).map(str::to_string))
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}=={}", self.name, version),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Resolve installed versions for a collection of module names.
pub fn resolve_versions<I, S>(names: I, registry: &PackageRegistry) -> BTreeSet<Dependency>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| Dependency::resolve(name.as_ref(), registry))
        .collect()
}
