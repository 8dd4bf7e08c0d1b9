//! Station index error types.

use std::path::PathBuf;

/// Errors that can occur when loading the station index.
#[derive(Debug, thiserror::Error)]
pub enum StationError {
    /// The source file could not be read
    #[error("failed to read station list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The source file held no usable names
    #[error("station list {path} contains no station names")]
    Empty { path: PathBuf },
}
