//! Error types for the archive crate.

use pngtrim_core::Error;
use thiserror::Error;

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Errors that can occur while building or reading a bundle.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Two entries share a path
    #[error("Duplicate archive entry: {0}")]
    DuplicateEntry(String),

    /// Entry path is empty or escapes the archive root
    #[error("Invalid archive entry name: {0:?}")]
    InvalidEntryName(String),

    /// Requested entry is not in the archive
    #[error("Archive entry not found: {0}")]
    EntryNotFound(String),

    /// Zip writer or reader failed
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<ArchiveError> for Error {
    fn from(err: ArchiveError) -> Self {
        Error::archive(err.to_string()).with_source(err)
    }
}
