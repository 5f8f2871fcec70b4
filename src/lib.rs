//! find-imports - list the third-party packages a Python source tree imports

pub mod classify;
pub mod config;
pub mod environment;
pub mod error;
pub mod extractors;
pub mod file_utils;
pub mod output;
pub mod registry;
pub mod resolve;
pub mod scan;
pub mod stdlib;
pub mod walker;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use classify::{Classification, Classifier};
pub use config::{EnvironmentConfig, ScanConfig};
pub use environment::{ModuleLocation, PythonEnvironment, PythonVersion};
pub use error::{ScanError, ScanResult};
pub use extractors::{ImportDeclaration, SourceModule, extract_imports};
pub use output::{OutputFormat, print_items, write_items};
pub use registry::{InstalledDistribution, PackageRegistry};
pub use resolve::{Dependency, resolve_versions};
pub use scan::{Scanner, find_imports, find_imports_and_installed_versions};
