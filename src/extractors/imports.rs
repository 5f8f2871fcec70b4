//! Import statement extraction from Python source files
//!
//! Two line forms are recognised once a line has been trimmed:
//!
//! - `import X` / `import X.y as z` captures `X`
//! - `from X import y` / `from X.y import z` captures `X`
//!
//! `from . import y` and `from .pkg import y` never match because the
//! `from` pattern needs a word character right after the keyword.

use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;

use super::SourceModule;
use crate::error::ScanResult;
use crate::file_utils::read_source_file;

static PY_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^import\s(\w+)[\s.]*.*$").expect("PY_IMPORT regex is invalid")
});

static PY_FROM_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^from\s(\w+)[\s.].*import").expect("PY_FROM_IMPORT regex is invalid")
});

/// A recognised import line and the top-level module it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportDeclaration {
    /// `import X...`
    Direct(String),
    /// `from X... import ...`
    From(String),
}

impl ImportDeclaration {
    /// Classify a single line. Surrounding whitespace is ignored, so imports
    /// nested inside function bodies are found too.
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();

        if trimmed.starts_with("import") {
            let caps = PY_IMPORT.captures(trimmed)?;
            return Some(ImportDeclaration::Direct(caps.get(1)?.as_str().to_string()));
        }

        if trimmed.starts_with("from") {
            let caps = PY_FROM_IMPORT.captures(trimmed)?;
            return Some(ImportDeclaration::From(caps.get(1)?.as_str().to_string()));
        }

        None
    }

    /// The captured top-level module name.
    pub fn module(&self) -> &str {
        match self {
            ImportDeclaration::Direct(name) | ImportDeclaration::From(name) => name,
        }
    }

    pub fn into_module(self) -> String {
        match self {
            ImportDeclaration::Direct(name) | ImportDeclaration::From(name) => name,
        }
    }
}

/// Extract the distinct top-level module names imported by a module.
pub fn extract_imports(module: &SourceModule) -> BTreeSet<String> {
    module
        .lines()
        .filter_map(ImportDeclaration::parse)
        .map(ImportDeclaration::into_module)
        .collect()
}

/// Read a file and extract the distinct module names it imports.
pub fn extract_imports_from_file(path: &Path) -> ScanResult<BTreeSet<String>> {
    let module = read_source_file(path)?;
    Ok(extract_imports(&module))
}
