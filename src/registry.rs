//! Installed distribution metadata.
//!
//! Indexes the `*.dist-info` and `*.egg-info` records found in site-packages
//! directories so names can be checked against what is installed and
//! installed versions can be read back.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::environment::PythonEnvironment;

/// One installed distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledDistribution {
    pub name: String,
    pub version: String,
}

/// Lookup table of installed distributions keyed by normalized name.
#[derive(Debug, Clone, Default)]
pub struct PackageRegistry {
    distributions: HashMap<String, InstalledDistribution>,
}

impl PackageRegistry {
    /// An empty registry: every lookup misses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every distribution installed in the environment's
    /// site-packages directories.
    pub fn from_environment(env: &PythonEnvironment) -> Self {
        Self::from_dirs(env.site_packages())
    }

    /// Index distributions in the given directories. When a name is
    /// installed more than once the first directory wins.
    pub fn from_dirs<P: AsRef<Path>>(dirs: &[P]) -> Self {
        let mut registry = Self::new();
        for dir in dirs {
            registry.index_dir(dir.as_ref());
        }
        debug!(count = registry.len(), "indexed installed distributions");
        registry
    }

    fn index_dir(&mut self, dir: &Path) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };

        let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
        paths.sort();

        for path in paths {
            if let Some(dist) = read_distribution(&path) {
                self.insert(dist);
            }
        }
    }

    /// Add a distribution unless one with the same normalized name exists.
    pub fn insert(&mut self, dist: InstalledDistribution) {
        self.distributions
            .entry(normalize_name(&dist.name))
            .or_insert(dist);
    }

    /// Metadata for the distribution installed under `name`, if any.
    pub fn metadata(&self, name: &str) -> Option<&InstalledDistribution> {
        self.distributions.get(&normalize_name(name))
    }

    /// Installed version of the distribution named `name`.
    pub fn version(&self, name: &str) -> Option<&str> {
        self.metadata(name).map(|dist| dist.version.as_str())
    }

    pub fn len(&self) -> usize {
        self.distributions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }
}

/// Normalize a distribution name: lowercase, with runs of `-`, `_` and `.`
/// collapsed to a single `-`.
pub fn normalize_name(name: &str) -> String {
    let mut normalized = String::with_capacity(name.len());
    let mut in_separator = false;

    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                normalized.push('-');
                in_separator = true;
            }
        } else {
            normalized.extend(c.to_lowercase());
            in_separator = false;
        }
    }

    normalized
}

/// Read a distribution record from a `.dist-info` directory or an
/// `.egg-info` directory/file. Returns `None` for anything else.
fn read_distribution(path: &Path) -> Option<InstalledDistribution> {
    let file_name = path.file_name()?.to_str()?;

    let (stem, metadata_file) = if let Some(stem) = file_name.strip_suffix(".dist-info") {
        (stem, path.join("METADATA"))
    } else if let Some(stem) = file_name.strip_suffix(".egg-info") {
        let metadata_file = if path.is_dir() {
            path.join("PKG-INFO")
        } else {
            path.to_path_buf()
        };
        (stem, metadata_file)
    } else {
        return None;
    };

    let headers = std::fs::read_to_string(&metadata_file)
        .ok()
        .map(|content| parse_metadata_headers(&content))
        .unwrap_or_default();
    let (dir_name, dir_version) = split_record_name(stem);

    let name = headers.name.or(dir_name)?;
    let version = headers.version.or(dir_version)?;

    Some(InstalledDistribution {
        name,
        version,
    })
}

#[derive(Debug, Default)]
struct MetadataHeaders {
    name: Option<String>,
    version: Option<String>,
}

/// Read `Name:` and `Version:` from the header block of a core metadata
/// file. The header block ends at the first blank line.
fn parse_metadata_headers(content: &str) -> MetadataHeaders {
    let mut headers = MetadataHeaders::default();

    for line in content.lines() {
        if line.trim().is_empty() {
            break;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim().to_ascii_lowercase().as_str() {
            "name" if headers.name.is_none() => headers.name = Some(value.to_string()),
            "version" if headers.version.is_none() => headers.version = Some(value.to_string()),
            _ => {}
        }
    }

    headers
}

/// Split `name-version` (the stem of a metadata directory) into its parts.
/// Egg-info stems may carry a trailing `-pyX.Y` tag, which is dropped.
fn split_record_name(stem: &str) -> (Option<String>, Option<String>) {
    let mut parts = stem.splitn(3, '-');
    let name = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
    let version = parts.next().filter(|s| !s.is_empty()).map(str::to_string);
    (name, version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn dist_info(site: &Path, dir_name: &str, metadata: Option<&str>) {
        let dir = site.join(dir_name);
        fs::create_dir_all(&dir).unwrap();
        if let Some(content) = metadata {
            fs::write(dir.join("METADATA"), content).unwrap();
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("PyYAML"), "pyyaml");
        assert_eq!(normalize_name("typing_extensions"), "typing-extensions");
        assert_eq!(normalize_name("zope.interface"), "zope-interface");
        assert_eq!(normalize_name("a__-.b"), "a-b");
    }

    #[test]
    fn test_reads_dist_info_metadata() {
        let dir = TempDir::new().unwrap();
        dist_info(
            dir.path(),
            "pytest-8.3.2.dist-info",
            Some("Metadata-Version: 2.1\nName: pytest\nVersion: 8.3.2\n\nName: not-a-header\n"),
        );

        let registry = PackageRegistry::from_dirs(&[dir.path()]);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.version("pytest"), Some("8.3.2"));
        assert_eq!(registry.metadata("pytest").unwrap().name, "pytest");
    }

    #[test]
    fn test_falls_back_to_directory_name() {
        let dir = TempDir::new().unwrap();
        dist_info(dir.path(), "icecream-2.1.3.dist-info", None);
        dist_info(dir.path(), "nox-2024.4.15.dist-info", Some("Metadata-Version: 2.1\n"));

        let registry = PackageRegistry::from_dirs(&[dir.path()]);
        assert_eq!(registry.version("icecream"), Some("2.1.3"));
        assert_eq!(registry.version("nox"), Some("2024.4.15"));
    }

    #[test]
    fn test_reads_egg_info() {
        let dir = TempDir::new().unwrap();
        let egg_dir = dir.path().join("six-1.16.0-py3.11.egg-info");
        fs::create_dir_all(&egg_dir).unwrap();
        fs::write(egg_dir.join("PKG-INFO"), "Name: six\nVersion: 1.16.0\n").unwrap();
        fs::write(
            dir.path().join("legacy-0.1.egg-info"),
            "Metadata-Version: 1.0\nName: legacy\nVersion: 0.1\n",
        )
        .unwrap();

        let registry = PackageRegistry::from_dirs(&[dir.path()]);
        assert_eq!(registry.version("six"), Some("1.16.0"));
        assert_eq!(registry.version("legacy"), Some("0.1"));
    }

    #[test]
    fn test_lookup_is_normalized_but_not_aliased() {
        let dir = TempDir::new().unwrap();
        dist_info(
            dir.path(),
            "PyYAML-6.0.1.dist-info",
            Some("Name: PyYAML\nVersion: 6.0.1\n"),
        );

        let registry = PackageRegistry::from_dirs(&[dir.path()]);
        assert_eq!(registry.version("pyyaml"), Some("6.0.1"));
        assert_eq!(registry.version("PyYaml"), Some("6.0.1"));
        // The import name differs from the distribution name
        assert_eq!(registry.version("yaml"), None);
    }

    #[test]
    fn test_first_directory_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        dist_info(first.path(), "attrs-23.2.0.dist-info", None);
        dist_info(second.path(), "attrs-21.4.0.dist-info", None);

        let registry = PackageRegistry::from_dirs(&[first.path(), second.path()]);
        assert_eq!(registry.version("attrs"), Some("23.2.0"));
    }

    #[test]
    fn test_ignores_other_entries() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("requests")).unwrap();
        fs::write(dir.path().join("six.py"), "").unwrap();
        fs::write(dir.path().join("distutils-precedence.pth"), "").unwrap();

        let registry = PackageRegistry::from_dirs(&[dir.path()]);
        assert!(registry.is_empty());
        assert!(registry.metadata("requests").is_none());
    }

    #[test]
    fn test_missing_directory() {
        let registry = PackageRegistry::from_dirs(&[Path::new("/nonexistent/site-packages")]);
        assert!(registry.is_empty());
    }
}
