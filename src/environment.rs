//! Installed Python environment discovery and module resolution.
//!
//! ## Discovery order
//!
//! 1. Explicit `--site-packages` / `--stdlib` directories
//! 2. Explicit `--python` interpreter, else `$VIRTUAL_ENV/bin/python`, else
//!    `python3` / `python` from `$PATH` (only when no directories were given)
//! 3. `$VIRTUAL_ENV/lib/python3.*/site-packages` when no interpreter answered
//!
//! The interpreter is only ever run once, to print its version and paths.
//! Discovery never fails: an environment with no directories is valid and
//! leaves classification to the standard-library manifest.

use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::EnvironmentConfig;
use crate::stdlib;

/// Interpreter names tried on `$PATH`, in order.
const PYTHON_NAMES: &[&str] = &["python3", "python"];

#[cfg(windows)]
const VENV_BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
const VENV_BIN_DIR: &str = "bin";

/// Prints the interpreter's version and search paths as one JSON document.
const PROBE_SCRIPT: &str = r#"
import json, site, sys, sysconfig
paths = sysconfig.get_paths()
try:
    site_packages = site.getsitepackages()
except AttributeError:
    site_packages = []
print(json.dumps({
    "version": "%d.%d.%d" % sys.version_info[:3],
    "stdlib": [paths.get("stdlib"), paths.get("platstdlib")],
    "site_packages": site_packages + [paths.get("purelib"), paths.get("platlib")],
    "user_site": site.getusersitepackages() if site.ENABLE_USER_SITE else None,
}))
"#;

static PATH_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"python(\d)\.(\d+)").expect("PATH_VERSION regex is invalid")
});

// ============================================================================
// Error Types
// ============================================================================

/// Invalid Python version string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid Python version string: {version}")]
pub struct VersionParseError {
    pub version: String,
}

/// Errors raised while probing an interpreter. Discovery logs these and
/// carries on without the interpreter.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Failed to run the interpreter.
    #[error("failed to execute Python at {}: {source}", .path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The interpreter ran but exited unsuccessfully.
    #[error("Python at {} exited unsuccessfully: {stderr}", .path.display())]
    ProbeFailed { path: PathBuf, stderr: String },

    /// The probe output could not be decoded.
    #[error("unexpected output from Python at {}: {source}", .path.display())]
    MalformedProbe {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Version(#[from] VersionParseError),
}

// ============================================================================
// Python Version
// ============================================================================

/// A Python runtime version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PythonVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl PythonVersion {
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        PythonVersion {
            major,
            minor,
            patch,
        }
    }

    /// The newest runtime the standard-library manifest knows about.
    pub fn newest_known() -> Self {
        PythonVersion::new(3, stdlib::NEWEST_KNOWN_MINOR, 0)
    }

    /// Parse a version string like "3.11", "3.11.4" or "Python 3.11.4".
    pub fn parse(version_str: &str) -> Result<Self, VersionParseError> {
        let version_str = version_str.trim();
        let version_str = version_str
            .strip_prefix("Python ")
            .unwrap_or(version_str)
            .trim();
        let invalid = || VersionParseError {
            version: version_str.to_string(),
        };

        let mut parts = version_str.split('.');
        let major = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(invalid)?;
        let minor = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(invalid)?;

        // Patch might carry a suffix like "4rc1" or "4+"
        let patch = parts
            .next()
            .map(|p| {
                p.chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect::<String>()
            })
            .and_then(|digits| digits.parse::<u32>().ok())
            .unwrap_or(0);

        Ok(PythonVersion::new(major, minor, patch))
    }
}

impl FromStr for PythonVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PythonVersion::parse(s)
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

// ============================================================================
// Module Location
// ============================================================================

/// Where a module name resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLocation {
    pub name: String,
    /// Source or extension file backing the module. `None` for built-in
    /// modules, namespace packages and manifest-only standard modules.
    pub origin: Option<PathBuf>,
}

impl ModuleLocation {
    fn without_origin(name: &str) -> Self {
        ModuleLocation {
            name: name.to_string(),
            origin: None,
        }
    }

    fn at(name: &str, origin: PathBuf) -> Self {
        ModuleLocation {
            name: name.to_string(),
            origin: Some(origin),
        }
    }
}

/// Result of looking for a module inside one search directory.
enum DirMatch {
    Module(PathBuf),
    Namespace,
}

// ============================================================================
// Environment
// ============================================================================

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    version: String,
    #[serde(default)]
    stdlib: Vec<Option<PathBuf>>,
    #[serde(default)]
    site_packages: Vec<Option<PathBuf>>,
    #[serde(default)]
    user_site: Option<PathBuf>,
}

/// The installed Python environment a scan classifies names against.
#[derive(Debug, Clone)]
pub struct PythonEnvironment {
    version: PythonVersion,
    interpreter: Option<PathBuf>,
    stdlib_dirs: Vec<PathBuf>,
    site_packages: Vec<PathBuf>,
}

impl PythonEnvironment {
    /// An environment with no directories, classified by manifest only.
    pub fn empty(version: PythonVersion) -> Self {
        PythonEnvironment {
            version,
            interpreter: None,
            stdlib_dirs: Vec::new(),
            site_packages: Vec::new(),
        }
    }

    /// Build an environment from explicit directories.
    pub fn from_dirs(
        version: PythonVersion,
        stdlib_dirs: Vec<PathBuf>,
        site_packages: Vec<PathBuf>,
    ) -> Self {
        PythonEnvironment {
            version,
            interpreter: None,
            stdlib_dirs: dedup_existing(stdlib_dirs),
            site_packages: dedup_existing(site_packages),
        }
    }

    /// Discover the environment described by `config`.
    pub fn discover(config: &EnvironmentConfig) -> Self {
        let explicit = config.has_explicit_dirs();
        let mut stdlib_dirs: Vec<PathBuf> = config.stdlib.iter().cloned().collect();
        let mut site_packages = config.site_packages.clone();
        let mut probed_version = None;
        let mut interpreter = None;

        let candidate = match &config.python {
            Some(python) => Some(python.clone()),
            None if config.isolated || explicit => None,
            None => find_interpreter(),
        };

        if let Some(python) = candidate {
            match probe_interpreter(&python) {
                Ok(probe) => {
                    debug!(
                        python = %python.display(),
                        version = %probe.version,
                        "probed interpreter"
                    );
                    probed_version = Some(PythonVersion::parse(&probe.version));
                    if config.stdlib.is_none() {
                        stdlib_dirs.extend(probe.stdlib.into_iter().flatten());
                    }
                    if config.site_packages.is_empty() {
                        site_packages.extend(probe.site_packages.into_iter().flatten());
                        site_packages.extend(probe.user_site);
                    }
                    interpreter = Some(python);
                }
                Err(e) => warn!("ignoring Python interpreter: {}", e),
            }
        }

        if site_packages.is_empty()
            && interpreter.is_none()
            && !config.isolated
            && !explicit
        {
            if let Some(venv) = std::env::var_os("VIRTUAL_ENV") {
                let found = venv_site_packages(Path::new(&venv));
                debug!(venv = ?venv, count = found.len(), "using $VIRTUAL_ENV site-packages");
                site_packages.extend(found);
            }
        }

        let probed_version = match probed_version {
            Some(Ok(version)) => Some(version),
            Some(Err(e)) => {
                warn!("{}", e);
                None
            }
            None => None,
        };

        let version = config
            .python_version
            .or(probed_version)
            .or_else(|| version_from_paths(stdlib_dirs.iter().chain(site_packages.iter())))
            .unwrap_or_else(PythonVersion::newest_known);

        let env = PythonEnvironment {
            version,
            interpreter,
            stdlib_dirs: dedup_existing(stdlib_dirs),
            site_packages: dedup_existing(site_packages),
        };
        debug!(
            version = %env.version,
            stdlib = ?env.stdlib_dirs,
            site_packages = ?env.site_packages,
            "discovered Python environment"
        );
        env
    }

    pub fn version(&self) -> PythonVersion {
        self.version
    }

    pub fn interpreter(&self) -> Option<&Path> {
        self.interpreter.as_deref()
    }

    pub fn stdlib_dirs(&self) -> &[PathBuf] {
        &self.stdlib_dirs
    }

    pub fn site_packages(&self) -> &[PathBuf] {
        &self.site_packages
    }

    /// Directories searched for modules, in import order: the standard
    /// library, its extension-module directory, then site-packages.
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        for dir in &self.stdlib_dirs {
            dirs.push(dir.clone());
            let dynload = dir.join("lib-dynload");
            if dynload.is_dir() {
                dirs.push(dynload);
            }
        }
        dirs.extend(self.site_packages.iter().cloned());
        dedup_existing(dirs)
    }

    /// Resolve a top-level module name the way the interpreter's finders
    /// would, without importing it.
    ///
    /// Returns `None` when nothing in this environment provides the name.
    pub fn locate(&self, name: &str) -> Option<ModuleLocation> {
        if stdlib::is_builtin_module(name) {
            return Some(ModuleLocation::without_origin(name));
        }

        let mut namespace = false;
        for dir in self.search_dirs() {
            match find_in_dir(&dir, name) {
                Some(DirMatch::Module(origin)) => return Some(ModuleLocation::at(name, origin)),
                Some(DirMatch::Namespace) => namespace = true,
                None => {}
            }
        }
        if namespace {
            return Some(ModuleLocation::without_origin(name));
        }

        if stdlib::is_stdlib_module(name, self.version) {
            return Some(ModuleLocation::without_origin(name));
        }

        None
    }
}

/// Look for `name` as a package, extension module or source module in `dir`.
fn find_in_dir(dir: &Path, name: &str) -> Option<DirMatch> {
    let package = dir.join(name);
    if package.is_dir() {
        let init = package.join("__init__.py");
        if init.is_file() {
            return Some(DirMatch::Module(init));
        }
    }

    if let Some(extension) = find_extension_module(dir, name) {
        return Some(DirMatch::Module(extension));
    }

    let source = dir.join(format!("{}.py", name));
    if source.is_file() {
        return Some(DirMatch::Module(source));
    }

    if package.is_dir() {
        return Some(DirMatch::Namespace);
    }

    None
}

/// Find `name.so`, `name.<tag>.so` or `name.<tag>.pyd` in `dir`.
fn find_extension_module(dir: &Path, name: &str) -> Option<PathBuf> {
    let prefix = format!("{}.", name);
    let entries = std::fs::read_dir(dir).ok()?;

    entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|path| {
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                return false;
            };
            file_name.starts_with(&prefix)
                && (file_name.ends_with(".so") || file_name.ends_with(".pyd"))
                && path.is_file()
        })
}

/// Locate an interpreter: the active virtualenv first, then `$PATH`.
fn find_interpreter() -> Option<PathBuf> {
    if let Some(venv) = std::env::var_os("VIRTUAL_ENV") {
        for name in PYTHON_NAMES {
            let candidate = Path::new(&venv).join(VENV_BIN_DIR).join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }

    PYTHON_NAMES.iter().find_map(|name| which::which(name).ok())
}

/// Run the interpreter once and collect its version and search paths.
fn probe_interpreter(python: &Path) -> Result<ProbeOutput, EnvError> {
    let output = Command::new(python)
        .args(["-c", PROBE_SCRIPT])
        .output()
        .map_err(|source| EnvError::Spawn {
            path: python.to_path_buf(),
            source,
        })?;

    if !output.status.success() {
        return Err(EnvError::ProbeFailed {
            path: python.to_path_buf(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    serde_json::from_slice(&output.stdout).map_err(|source| EnvError::MalformedProbe {
        path: python.to_path_buf(),
        source,
    })
}

/// Site-packages directories of a virtualenv, for both POSIX and Windows
/// layouts.
pub fn venv_site_packages(venv: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    let pattern = venv.join("lib").join("python3.*").join("site-packages");
    if let Ok(paths) = glob::glob(&pattern.to_string_lossy()) {
        dirs.extend(paths.flatten());
    }

    let windows = venv.join("Lib").join("site-packages");
    if windows.is_dir() {
        dirs.push(windows);
    }

    dirs.sort();
    dirs
}

/// Read a runtime version out of a `lib/pythonX.Y` path segment.
fn version_from_paths<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) -> Option<PythonVersion> {
    paths.into_iter().find_map(|path| {
        let text = path.to_string_lossy();
        let caps = PATH_VERSION.captures(&text)?;
        let major = caps.get(1)?.as_str().parse().ok()?;
        let minor = caps.get(2)?.as_str().parse().ok()?;
        Some(PythonVersion::new(major, minor, 0))
    })
}

/// Drop directories that do not exist and repeated entries, keeping order.
fn dedup_existing(dirs: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    dirs.into_iter()
        .filter(|dir| dir.is_dir())
        .filter(|dir| seen.insert(dir.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_version_parse() {
        assert_eq!(PythonVersion::parse("3.11.4").unwrap(), PythonVersion::new(3, 11, 4));
        assert_eq!(PythonVersion::parse("3.12").unwrap(), PythonVersion::new(3, 12, 0));
        assert_eq!(
            PythonVersion::parse("Python 3.9.18").unwrap(),
            PythonVersion::new(3, 9, 18)
        );
        assert_eq!(
            PythonVersion::parse("3.13.0rc2").unwrap(),
            PythonVersion::new(3, 13, 0)
        );
        assert_eq!("3.10".parse::<PythonVersion>().unwrap(), PythonVersion::new(3, 10, 0));
    }

    #[test]
    fn test_invalid_version_parse() {
        assert!(PythonVersion::parse("").is_err());
        assert!(PythonVersion::parse("3").is_err());
        assert!(PythonVersion::parse("three.eleven").is_err());
        let err = PythonVersion::parse("x.y").unwrap_err();
        assert!(err.to_string().contains("x.y"));
    }

    #[test]
    fn test_version_ordering_and_display() {
        assert!(PythonVersion::new(3, 12, 0) > PythonVersion::new(3, 9, 7));
        assert_eq!(PythonVersion::new(3, 11, 4).to_string(), "3.11.4");
    }

    #[test]
    fn test_locate_in_site_packages() {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("lib/python3.11/site-packages");
        write(&site.join("requests/__init__.py"), "");
        write(&site.join("six.py"), "");
        write(&site.join("_cffi_backend.cpython-311-x86_64-linux-gnu.so"), "");
        fs::create_dir_all(site.join("google")).unwrap();

        let env = PythonEnvironment::from_dirs(
            PythonVersion::new(3, 11, 0),
            vec![],
            vec![site.clone()],
        );

        let loc = env.locate("requests").unwrap();
        assert_eq!(loc.origin, Some(site.join("requests/__init__.py")));

        let loc = env.locate("six").unwrap();
        assert_eq!(loc.origin, Some(site.join("six.py")));

        let loc = env.locate("_cffi_backend").unwrap();
        assert!(loc.origin.unwrap().to_string_lossy().ends_with(".so"));

        // Namespace package: resolves, but has no file
        let loc = env.locate("google").unwrap();
        assert_eq!(loc.origin, None);

        assert!(env.locate("numpy").is_none());
    }

    #[test]
    fn test_locate_stdlib_dir_precedes_site_packages() {
        let dir = TempDir::new().unwrap();
        let stdlib_dir = dir.path().join("lib/python3.12");
        let site = stdlib_dir.join("site-packages");
        write(&stdlib_dir.join("os.py"), "");
        write(&stdlib_dir.join("lib-dynload/_json.cpython-312-darwin.so"), "");
        write(&site.join("os.py"), "");

        let env = PythonEnvironment::from_dirs(
            PythonVersion::new(3, 12, 0),
            vec![stdlib_dir.clone()],
            vec![site],
        );

        assert_eq!(env.locate("os").unwrap().origin, Some(stdlib_dir.join("os.py")));
        let json = env.locate("_json").unwrap().origin.unwrap();
        assert!(json.starts_with(stdlib_dir.join("lib-dynload")));
    }

    #[test]
    fn test_locate_builtin_and_manifest() {
        let env = PythonEnvironment::empty(PythonVersion::new(3, 10, 0));
        assert_eq!(env.locate("sys").unwrap().origin, None);
        assert_eq!(env.locate("os").unwrap().origin, None);
        assert!(env.locate("tomllib").is_none());
        assert!(env.locate("numpy").is_none());
    }

    #[test]
    fn test_from_dirs_drops_missing() {
        let dir = TempDir::new().unwrap();
        let env = PythonEnvironment::from_dirs(
            PythonVersion::newest_known(),
            vec![dir.path().join("missing")],
            vec![dir.path().to_path_buf(), dir.path().to_path_buf()],
        );
        assert!(env.stdlib_dirs().is_empty());
        assert_eq!(env.site_packages(), &[dir.path().to_path_buf()]);
    }

    #[test]
    fn test_venv_site_packages() {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("lib/python3.11/site-packages");
        fs::create_dir_all(&site).unwrap();
        fs::create_dir_all(dir.path().join("lib/python3.11/other")).unwrap();

        assert_eq!(venv_site_packages(dir.path()), vec![site]);
    }

    #[test]
    fn test_version_from_paths() {
        let paths = vec![
            PathBuf::from("/opt/custom"),
            PathBuf::from("/venv/lib/python3.10/site-packages"),
        ];
        assert_eq!(version_from_paths(&paths), Some(PythonVersion::new(3, 10, 0)));
        assert_eq!(version_from_paths(&[PathBuf::from("/opt")]), None);
    }

    #[test]
    fn test_discover_isolated_uses_explicit_dirs() {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("site-packages");
        fs::create_dir_all(&site).unwrap();

        let config = EnvironmentConfig::isolated()
            .with_site_packages(&site)
            .with_python_version(PythonVersion::new(3, 11, 0));
        let env = PythonEnvironment::discover(&config);

        assert_eq!(env.version(), PythonVersion::new(3, 11, 0));
        assert_eq!(env.site_packages(), &[site]);
        assert!(env.interpreter().is_none());
    }

    #[test]
    fn test_discover_isolated_defaults_to_newest_version() {
        let env = PythonEnvironment::discover(&EnvironmentConfig::isolated());
        assert_eq!(env.version(), PythonVersion::newest_known());
        assert!(env.search_dirs().is_empty());
    }

    #[test]
    fn test_probe_missing_interpreter() {
        let err = probe_interpreter(Path::new("/nonexistent/bin/python3")).unwrap_err();
        assert!(matches!(err, EnvError::Spawn { .. }));
    }
}
