//! Source file discovery for directory scans

use std::path::{Path, PathBuf};

use glob::Pattern;
use ignore::WalkBuilder;
use tracing::debug;

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::file_utils::is_python_source;

/// Collect the source files a scan of `root` covers.
///
/// A file root is returned as-is regardless of its extension. A directory
/// root is walked recursively for `*.py` files; symlinks are not followed.
/// The result is sorted so repeated scans visit files in the same order.
pub fn discover_source_files(root: &Path, config: &ScanConfig) -> ScanResult<Vec<PathBuf>> {
    if !root.exists() {
        return Err(ScanError::NotFound {
            path: root.to_path_buf(),
        });
    }

    if !root.is_dir() {
        return Ok(vec![root.to_path_buf()]);
    }

    let filter_on = config.respect_gitignore;
    let ignore_patterns = config.ignore_patterns.clone();

    let walker = WalkBuilder::new(root)
        .hidden(filter_on)
        .ignore(filter_on)
        .parents(filter_on)
        .git_ignore(filter_on)
        .git_global(filter_on)
        .git_exclude(filter_on)
        .require_git(false)
        .follow_links(false)
        .filter_entry(move |entry| !should_ignore_path(entry.path(), &ignore_patterns))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry?;
        let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
        if is_file && is_python_source(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();

    debug!(root = %root.display(), count = files.len(), "discovered source files");
    Ok(files)
}

/// Check if a path should be skipped based on its name and ignore patterns.
pub fn should_ignore_path(path: &Path, ignore_patterns: &[String]) -> bool {
    let Some(name) = path.file_name().map(|s| s.to_string_lossy()) else {
        return false;
    };

    ignore_patterns
        .iter()
        .any(|pattern| *pattern == name || glob_match(pattern, &name))
}

/// Match a glob pattern against a name.
fn glob_match(pattern: &str, name: &str) -> bool {
    Pattern::new(pattern)
        .map(|p| p.matches(name))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "import os\n").unwrap();
    }

    fn relative(root: &Path, files: &[PathBuf]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_missing_root() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        let err = discover_source_files(&missing, &ScanConfig::default()).unwrap_err();
        assert!(matches!(err, ScanError::NotFound { .. }));
    }

    #[test]
    fn test_single_file_root_any_extension() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "script");
        let root = dir.path().join("script");
        let files = discover_source_files(&root, &ScanConfig::default()).unwrap();
        assert_eq!(files, vec![root]);
    }

    #[test]
    fn test_recursive_python_only() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.py");
        touch(dir.path(), "pkg/b.py");
        touch(dir.path(), "pkg/deep/c.py");
        touch(dir.path(), "pkg/notes.txt");
        touch(dir.path(), "pkg/cached.pyc");

        let files = discover_source_files(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(
            relative(dir.path(), &files),
            vec!["a.py", "pkg/b.py", "pkg/deep/c.py"]
        );
    }

    #[test]
    fn test_hidden_and_ignored_included_by_default() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), ".hidden/a.py");
        touch(dir.path(), "build/b.py");
        fs::write(dir.path().join(".gitignore"), "build/\n").unwrap();

        let files = discover_source_files(dir.path(), &ScanConfig::default()).unwrap();
        assert_eq!(relative(dir.path(), &files), vec![".hidden/a.py", "build/b.py"]);
    }

    #[test]
    fn test_respect_gitignore() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), ".hidden/a.py");
        touch(dir.path(), "build/b.py");
        touch(dir.path(), "src/c.py");
        fs::write(dir.path().join(".gitignore"), "build/\n").unwrap();

        let config = ScanConfig {
            respect_gitignore: true,
            ..Default::default()
        };
        let files = discover_source_files(dir.path(), &config).unwrap();
        assert_eq!(relative(dir.path(), &files), vec!["src/c.py"]);
    }

    #[test]
    fn test_ignore_patterns() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "src/app.py");
        touch(dir.path(), "tests/test_app.py");
        touch(dir.path(), "src/test_util.py");

        let config = ScanConfig {
            ignore_patterns: vec!["tests".to_string(), "test_*.py".to_string()],
            ..Default::default()
        };
        let files = discover_source_files(dir.path(), &config).unwrap();
        assert_eq!(relative(dir.path(), &files), vec!["src/app.py"]);
    }

    #[test]
    fn test_should_ignore_path() {
        let patterns = vec!["venv".to_string(), "*_pb2.py".to_string()];
        assert!(should_ignore_path(Path::new("proj/venv"), &patterns));
        assert!(should_ignore_path(Path::new("proj/api_pb2.py"), &patterns));
        assert!(!should_ignore_path(Path::new("proj/api.py"), &patterns));
        assert!(!should_ignore_path(Path::new("proj/api.py"), &[]));
    }
}
