//! Error types for scanning a source tree

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a scan.
///
/// Classification and version lookups never produce errors; they fall back
/// to conservative answers instead.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The scan target does not exist.
    #[error("can't find {}", .path.display())]
    NotFound { path: PathBuf },

    /// A source file or directory entry could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Directory traversal failed.
    #[error("failed to walk source tree: {0}")]
    Walk(#[from] ignore::Error),
}

impl ScanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ScanError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;
