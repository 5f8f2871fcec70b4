//! Scan pipeline: extract, classify, resolve
//!
//! ```text
//! path ─▶ discover_source_files ─▶ extract_imports (union)
//!      ─▶ drop standard library + self-references ─▶ resolve_versions
//! ```

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, info};

use crate::classify::Classifier;
use crate::config::ScanConfig;
use crate::environment::PythonEnvironment;
use crate::error::ScanResult;
use crate::extractors::extract_imports_from_file;
use crate::registry::PackageRegistry;
use crate::resolve::{Dependency, resolve_versions};
use crate::walker::discover_source_files;

/// Runs scans against one installed environment.
#[derive(Debug, Clone)]
pub struct Scanner {
    config: ScanConfig,
    env: PythonEnvironment,
    registry: PackageRegistry,
}

impl Scanner {
    /// Create a scanner, indexing the environment's installed distributions.
    pub fn new(config: ScanConfig, env: PythonEnvironment) -> Self {
        let registry = PackageRegistry::from_environment(&env);
        Self {
            config,
            env,
            registry,
        }
    }

    pub fn classifier(&self) -> Classifier<'_> {
        Classifier::new(&self.env, &self.registry)
    }

    /// Every top-level module name imported under `path`, unfiltered.
    pub fn extract(&self, path: &Path) -> ScanResult<BTreeSet<String>> {
        let files = discover_source_files(path, &self.config)?;

        let mut names = BTreeSet::new();
        for file in &files {
            let imports = extract_imports_from_file(file)?;
            debug!(file = %file.display(), count = imports.len(), "extracted imports");
            names.extend(imports);
        }
        Ok(names)
    }

    /// Third-party module names imported under `path`.
    ///
    /// Standard-library names and the scanned module's own name are dropped.
    pub fn find_imports(&self, path: &Path) -> ScanResult<BTreeSet<String>> {
        let names = self.extract(path)?;
        let own_name = own_module_name(path);
        let classifier = self.classifier();

        let found: BTreeSet<String> = names
            .into_iter()
            .filter(|name| own_name.as_deref() != Some(name.as_str()))
            .filter(|name| !classifier.is_std_lib(name))
            .collect();

        info!(path = %path.display(), count = found.len(), "found third-party imports");
        Ok(found)
    }

    /// Third-party dependencies imported under `path`, with installed
    /// versions where the registry knows them.
    pub fn find_imports_and_installed_versions(
        &self,
        path: &Path,
    ) -> ScanResult<BTreeSet<Dependency>> {
        let names = self.find_imports(path)?;
        Ok(resolve_versions(&names, &self.registry))
    }
}

/// Third-party module names imported under `path`.
pub fn find_imports(
    path: impl AsRef<Path>,
    env: &PythonEnvironment,
) -> ScanResult<BTreeSet<String>> {
    Scanner::new(ScanConfig::default(), env.clone()).find_imports(path.as_ref())
}

/// Third-party dependencies imported under `path`, with installed versions.
pub fn find_imports_and_installed_versions(
    path: impl AsRef<Path>,
    env: &PythonEnvironment,
) -> ScanResult<BTreeSet<Dependency>> {
    Scanner::new(ScanConfig::default(), env.clone())
        .find_imports_and_installed_versions(path.as_ref())
}

/// Name the scanned code is imported under: the directory name of a
/// package, or the file stem of a single module.
///
/// `.` and `..` are resolved lexically; symlinks keep the name they were
/// given on the command line.
fn own_module_name(path: &Path) -> Option<String> {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut resolved = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
    }

    let name = if resolved.is_dir() {
        resolved.file_name()?
    } else {
        resolved.file_stem()?
    };
    Some(name.to_string_lossy().into_owned())
}
