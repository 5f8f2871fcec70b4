//! Configuration types for scans and environment discovery

use std::path::PathBuf;

use crate::environment::PythonVersion;

/// Configuration for source tree discovery.
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Skip hidden entries and paths excluded by `.gitignore`/`.ignore` files.
    /// Off by default so a directory scan sees every `*.py` file.
    pub respect_gitignore: bool,
    /// File or directory names to skip (exact names or glob patterns).
    pub ignore_patterns: Vec<String>,
}

/// Configuration for locating the installed Python environment.
///
/// Every field is optional; discovery falls back to `$VIRTUAL_ENV` and the
/// interpreter on `$PATH` for whatever is left unset.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentConfig {
    /// Interpreter to probe for paths and version.
    pub python: Option<PathBuf>,
    /// Site-packages directories to search, in order.
    pub site_packages: Vec<PathBuf>,
    /// Standard library directory of the target runtime.
    pub stdlib: Option<PathBuf>,
    /// Runtime version used to select the standard-library manifest.
    pub python_version: Option<PythonVersion>,
    /// Skip `$VIRTUAL_ENV` and `$PATH` lookups entirely.
    pub isolated: bool,
}

impl EnvironmentConfig {
    /// A configuration that only uses explicitly given directories.
    pub fn isolated() -> Self {
        Self {
            isolated: true,
            ..Default::default()
        }
    }

    pub fn with_site_packages(mut self, dir: impl Into<PathBuf>) -> Self {
        self.site_packages.push(dir.into());
        self
    }

    pub fn with_stdlib(mut self, dir: impl Into<PathBuf>) -> Self {
        self.stdlib = Some(dir.into());
        self
    }

    pub fn with_python_version(mut self, version: PythonVersion) -> Self {
        self.python_version = Some(version);
        self
    }

    /// True when the caller pinned the search directories.
    pub fn has_explicit_dirs(&self) -> bool {
        !self.site_packages.is_empty() || self.stdlib.is_some()
    }
}
