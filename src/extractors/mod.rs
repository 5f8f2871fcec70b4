//! Source-level import extraction
//!
//! Extraction is line based: each source line is trimmed and matched against
//! the two statement forms Python uses to reference another module. There is
//! no grammar parsing, so imports inside strings are picked up and relative
//! imports are skipped.

pub mod imports;

use std::path::{Path, PathBuf};

pub use imports::{ImportDeclaration, extract_imports, extract_imports_from_file};

/// A single source file's path plus its text.
#[derive(Debug, Clone)]
pub struct SourceModule {
    path: PathBuf,
    text: String,
}

impl SourceModule {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines of the module in file order, without line terminators.
    ///
    /// `\n`, `\r\n` and a bare `\r` all end a line.
    pub fn lines(&self) -> SourceLines<'_> {
        SourceLines { rest: &self.text }
    }
}

/// Iterator over the lines of a [`SourceModule`].
#[derive(Debug, Clone)]
pub struct SourceLines<'a> {
    rest: &'a str,
}

impl<'a> Iterator for SourceLines<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        let Some(end) = self.rest.find(['\r', '\n']) else {
            let line = self.rest;
            self.rest = "";
            return Some(line);
        };

        let line = &self.rest[..end];
        let terminator = if self.rest[end..].starts_with("\r\n") { 2 } else { 1 };
        self.rest = &self.rest[end + terminator..];
        Some(line)
    }
}
