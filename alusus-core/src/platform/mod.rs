//! Platform layer: the boundary that makes the compiler behave the same on
//! POSIX and Windows with respect to paths, the process environment,
//! console encoding, and dynamic loading.
//!
//! Everything above this module works exclusively in UTF-8. The submodules
//! are safe to call from auxiliary threads ([`dl`] keeps its error state
//! thread-local, [`env::module_directory`] is computed once per process),
//! but they do not make the higher layers thread-safe.

pub mod console;
pub mod dl;
pub mod env;
pub mod path;
pub mod shlib;

pub use path::Utf8Path;

use std::fs::File;
use thiserror::Error;

/// Open a file for reading by its UTF-8 path.
pub fn open_input_stream(path: &Utf8Path) -> Result<File, PlatformError> {
    File::open(path.as_std_path()).map_err(|e| PlatformError::io(path.as_str(), e))
}

/// Create (or truncate) a file for writing by its UTF-8 path.
pub fn open_output_stream(path: &Utf8Path) -> Result<File, PlatformError> {
    File::create(path.as_std_path()).map_err(|e| PlatformError::io(path.as_str(), e))
}

/// Errors surfaced by the platform layer, carrying the OS-level cause.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("I/O error on `{path}`: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(String),

    #[error("cannot determine the running executable's directory: {0}")]
    NoModuleDirectory(String),
}

impl PlatformError {
    pub(crate) fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        PlatformError::Io {
            path: path.into(),
            source,
        }
    }
}
