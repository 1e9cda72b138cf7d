/// Error types for the cleanup pipeline
use port_client::PortClientError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using `CleanupError`
pub type Result<T> = std::result::Result<T, CleanupError>;

#[derive(Error, Debug)]
pub enum CleanupError {
    /// The user catalog could not be fetched
    #[error("Failed to fetch users: {0}")]
    Fetch(#[from] PortClientError),

    /// Filesystem error, with the path involved
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A backup file for this record already exists
    #[error("Backup file already exists: {}", .0.display())]
    BackupExists(PathBuf),

    /// Record could not be serialized
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// Archive could not be written
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl CleanupError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
