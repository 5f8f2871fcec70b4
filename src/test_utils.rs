//! Test utilities for building throwaway Python projects and environments.
//!
//! This module is only compiled for tests and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::environment::{PythonEnvironment, PythonVersion};

/// A temporary directory holding a source tree and a fake runtime layout.
///
/// The runtime lives under `runtime/lib/python3.<minor>/` with its own
/// `site-packages`, mirroring a virtualenv. Everything is removed on drop.
pub struct TestProject {
    dir: TempDir,
    version: PythonVersion,
}

impl TestProject {
    /// Create an empty project targeting Python 3.12.
    pub fn new() -> Self {
        Self::with_version(PythonVersion::new(3, 12, 0))
    }

    pub fn with_version(version: PythonVersion) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let project = Self { dir, version };
        fs::create_dir_all(project.site_packages()).expect("Failed to create site-packages");
        project
    }

    /// Root of the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Standard library directory of the fake runtime.
    pub fn stdlib_dir(&self) -> PathBuf {
        self.dir
            .path()
            .join("runtime")
            .join("lib")
            .join(format!("python{}.{}", self.version.major, self.version.minor))
    }

    /// Site-packages directory of the fake runtime.
    pub fn site_packages(&self) -> PathBuf {
        self.stdlib_dir().join("site-packages")
    }

    /// Write a file relative to the project root, creating parent
    /// directories as needed.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        write_file(&self.dir.path().join(path), content)
    }

    /// Add a standard-library module source file to the fake runtime.
    pub fn add_stdlib_module(&self, name: &str) -> PathBuf {
        write_file(&self.stdlib_dir().join(format!("{}.py", name)), "")
    }

    /// Install a package and its `dist-info` record into site-packages.
    pub fn install(&self, name: &str, version: &str) -> PathBuf {
        let site = self.site_packages();
        let init = write_file(&site.join(name).join("__init__.py"), "");
        self.add_dist_info(name, version);
        init
    }

    /// Install a package whose distribution name differs from its import
    /// name (e.g. `yaml` provided by `PyYAML`).
    pub fn install_as(&self, import_name: &str, dist_name: &str, version: &str) -> PathBuf {
        let site = self.site_packages();
        let init = write_file(&site.join(import_name).join("__init__.py"), "");
        self.add_dist_info(dist_name, version);
        init
    }

    fn add_dist_info(&self, dist_name: &str, version: &str) {
        let record = self
            .site_packages()
            .join(format!("{}-{}.dist-info", dist_name, version));
        write_file(
            &record.join("METADATA"),
            &format!(
                "Metadata-Version: 2.1\nName: {}\nVersion: {}\n",
                dist_name, version
            ),
        );
    }

    /// The fake runtime as a [`PythonEnvironment`].
    pub fn environment(&self) -> PythonEnvironment {
        PythonEnvironment::from_dirs(
            self.version,
            vec![self.stdlib_dir()],
            vec![self.site_packages()],
        )
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, content: &str) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dirs");
    }
    fs::write(path, content).expect("Failed to write file");
    path.to_path_buf()
}
