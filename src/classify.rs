//! Standard-library versus third-party classification
//!
//! A best-effort heuristic over the module's resolved location. Layouts it
//! does not recognise (editable installs, unusual virtualenv trees) fall
//! through to third-party.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::environment::PythonEnvironment;
use crate::registry::PackageRegistry;

/// Directory segment of a versioned CPython runtime library.
static RUNTIME_LIB_DIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"lib/python3\.\d+/").expect("RUNTIME_LIB_DIR regex is invalid")
});

/// Directory that holds installed third-party distributions.
const INSTALLED_PACKAGES_DIR: &str = "site-packages";

/// Which side of the standard-library boundary a module falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    StandardLibrary,
    ThirdParty,
}

/// Classifies module names against an installed environment.
///
/// Nothing is cached: every call looks at the environment afresh.
#[derive(Debug, Clone, Copy)]
pub struct Classifier<'a> {
    env: &'a PythonEnvironment,
    registry: &'a PackageRegistry,
}

impl<'a> Classifier<'a> {
    pub fn new(env: &'a PythonEnvironment, registry: &'a PackageRegistry) -> Self {
        Self { env, registry }
    }

    /// Classify a top-level module name. Never fails.
    pub fn classify(&self, name: &str) -> Classification {
        let classification = self.classify_inner(name);
        debug!(module = name, ?classification, "classified module");
        classification
    }

    /// Whether `name` belongs to the standard library.
    pub fn is_std_lib(&self, name: &str) -> bool {
        self.classify(name) == Classification::StandardLibrary
    }

    fn classify_inner(&self, name: &str) -> Classification {
        // Unresolvable names are external dependency candidates
        let Some(location) = self.env.locate(name) else {
            return Classification::ThirdParty;
        };

        match location.origin.as_deref() {
            Some(origin) if !origin.as_os_str().is_empty() => classify_origin(name, origin),
            _ => self.classify_without_origin(name),
        }
    }

    /// A module that resolved without a file is built in unless an
    /// installed distribution claims its name.
    fn classify_without_origin(&self, name: &str) -> Classification {
        if self.registry.metadata(name).is_some() {
            Classification::ThirdParty
        } else {
            Classification::StandardLibrary
        }
    }
}

/// Classify a module by the path of the file that provides it.
fn classify_origin(name: &str, origin: &Path) -> Classification {
    let origin = origin.to_string_lossy().replace('\\', "/");

    if origin.contains(&format!("{}/{}", INSTALLED_PACKAGES_DIR, name)) {
        Classification::ThirdParty
    } else if RUNTIME_LIB_DIR.is_match(&origin) {
        Classification::StandardLibrary
    } else {
        Classification::ThirdParty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::PythonVersion;
    use crate::registry::InstalledDistribution;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn dist(name: &str, version: &str) -> InstalledDistribution {
        InstalledDistribution {
            name: name.to_string(),
            version: version.to_string(),
        }
    }

    #[test]
    fn test_manifest_only_environment() {
        let env = PythonEnvironment::empty(PythonVersion::new(3, 12, 0));
        let registry = PackageRegistry::new();
        let classifier = Classifier::new(&env, &registry);

        assert!(classifier.is_std_lib("os"));
        assert!(classifier.is_std_lib("sys"));
        assert!(!classifier.is_std_lib("numpy"));
        assert!(!classifier.is_std_lib("pandas"));
        assert!(!classifier.is_std_lib("aitoolz"));
    }

    #[test]
    fn test_site_packages_origin_is_third_party() {
        assert_eq!(
            classify_origin(
                "numpy",
                Path::new("/venv/lib/python3.11/site-packages/numpy/__init__.py")
            ),
            Classification::ThirdParty
        );
    }

    #[test]
    fn test_runtime_layout_origin_is_stdlib() {
        assert_eq!(
            classify_origin("os", Path::new("/usr/lib/python3.11/os.py")),
            Classification::StandardLibrary
        );
        assert_eq!(
            classify_origin(
                "_json",
                Path::new("/usr/lib/python3.12/lib-dynload/_json.cpython-312-x86_64-linux-gnu.so")
            ),
            Classification::StandardLibrary
        );
    }

    #[test]
    fn test_windows_separators_normalized() {
        assert_eq!(
            classify_origin(
                "requests",
                Path::new(r"C:\venv\Lib\site-packages\requests\__init__.py")
            ),
            Classification::ThirdParty
        );
    }

    #[test]
    fn test_unknown_layout_is_third_party() {
        assert_eq!(
            classify_origin("mypkg", Path::new("/home/dev/src/mypkg/__init__.py")),
            Classification::ThirdParty
        );
        // Debian-style dist-packages is not recognised either way
        assert_eq!(
            classify_origin("apt", Path::new("/usr/lib/python3/dist-packages/apt/__init__.py")),
            Classification::ThirdParty
        );
    }

    #[test]
    fn test_no_origin_uses_registry() {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("site-packages");
        fs::create_dir_all(site.join("google")).unwrap();
        fs::create_dir_all(site.join("ns_only")).unwrap();

        let env = PythonEnvironment::from_dirs(PythonVersion::new(3, 11, 0), vec![], vec![site]);
        let mut registry = PackageRegistry::new();
        registry.insert(dist("google", "3.0.0"));
        let classifier = Classifier::new(&env, &registry);

        // Namespace package backed by an installed distribution
        assert_eq!(classifier.classify("google"), Classification::ThirdParty);
        // Namespace package nothing claims
        assert_eq!(classifier.classify("ns_only"), Classification::StandardLibrary);
    }

    #[test]
    fn test_on_disk_environment() {
        let dir = TempDir::new().unwrap();
        let stdlib_dir = dir.path().join("lib/python3.11");
        let site = stdlib_dir.join("site-packages");
        write(&stdlib_dir.join("os.py"));
        write(&stdlib_dir.join("pathlib.py"));
        write(&site.join("pytest/__init__.py"));
        write(&site.join("nox/__init__.py"));

        let env = PythonEnvironment::from_dirs(
            PythonVersion::new(3, 11, 0),
            vec![stdlib_dir],
            vec![site],
        );
        let registry = PackageRegistry::from_environment(&env);
        let classifier = Classifier::new(&env, &registry);

        assert!(classifier.is_std_lib("os"));
        assert!(classifier.is_std_lib("pathlib"));
        assert!(classifier.is_std_lib("sys"));
        assert!(!classifier.is_std_lib("pytest"));
        assert!(!classifier.is_std_lib("nox"));
        assert!(!classifier.is_std_lib("icecream"));
    }

    #[test]
    fn test_shadowing_distribution_reclassifies_builtin_name() {
        let env = PythonEnvironment::empty(PythonVersion::new(3, 12, 0));
        let mut registry = PackageRegistry::new();
        registry.insert(dist("marshal", "0.1"));
        let classifier = Classifier::new(&env, &registry);

        assert_eq!(classifier.classify("marshal"), Classification::ThirdParty);
    }
}
