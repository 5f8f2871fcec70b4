//! Shared file reading utilities for the extractor
//!
//! Each source file is read in one go and the handle is dropped before any
//! of its lines are examined.

use std::path::Path;

use tracing::warn;

use crate::error::{ScanError, ScanResult};
use crate::extractors::SourceModule;

/// File extension of Python source files discovered during a directory scan.
pub const PYTHON_EXTENSION: &str = "py";

/// Check whether a path names a Python source file.
///
/// Matching is exact (`module.PY` is not a source file), like a `**/*.py`
/// glob on a case-sensitive filesystem.
pub fn is_python_source(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext == PYTHON_EXTENSION)
}

/// Read a source file into a [`SourceModule`].
///
/// Content that is not valid UTF-8 is decoded lossily so a single stray byte
/// does not abort the whole scan.
pub fn read_source_file(path: &Path) -> ScanResult<SourceModule> {
    let bytes = std::fs::read(path).map_err(|e| ScanError::io(path, e))?;

    let text = match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %path.display(), "source file is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };

    Ok(SourceModule::new(path, text))
}
