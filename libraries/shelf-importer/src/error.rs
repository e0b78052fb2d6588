//! Error types for the importer

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to scan {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Store error: {0}")]
    Store(#[from] shelf_core::ShelfError),

    #[error("Duplicate finder error: {0}")]
    DuplicateFinder(String),

    #[error("Malformed duplicate report: {0}")]
    Report(#[from] serde_json::Error),

    #[error("Invalid folder path: {0}")]
    InvalidPath(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("No file extensions selected")]
    NoExtensionsSelected,

    #[error("A collection must be selected to import into")]
    NoCollectionSelected,

    #[error("The selected library is read-only")]
    ReadOnlyLibrary,

    #[error("Files in the selected library cannot be edited")]
    FilesNotEditable,

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Import cancelled")]
    Cancelled,
}

impl ImportError {
    /// Whether the error is the user backing out rather than a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
