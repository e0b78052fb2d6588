//! Interactive collaborators of the folder import
//!
//! The workflow never talks to a terminal or window directly. Hosts provide
//! these traits; the CLI implements them with terminal prompts and tests
//! implement them with scripted answers.

use crate::adjudicator::{BulkChoice, ReviewOutcome, SkipCandidate};
use crate::Result;
use async_trait::async_trait;
use shelf_core::Item;
use std::path::PathBuf;

/// Asks the user for the folder to import
#[async_trait]
pub trait FolderPicker: Send + Sync {
    /// `None` when the user backs out
    async fn pick_folder(&self) -> Result<Option<PathBuf>>;
}

/// Lets the user decide what to do with flagged duplicates
#[async_trait]
pub trait DuplicateReviewer: Send + Sync {
    /// Choose between reviewing, skipping every candidate, or aborting
    async fn bulk_choice(&self, candidates: &[SkipCandidate]) -> Result<BulkChoice>;

    /// Show every candidate pre-checked and return the files left checked
    async fn review(&self, candidates: &[SkipCandidate]) -> Result<ReviewOutcome>;
}

/// Extension list and link mode as entered by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionChoice {
    /// Comma-separated extensions
    pub extensions: String,
    /// Link files in place instead of copying them
    pub link: bool,
}

impl ExtensionChoice {
    pub fn new(extensions: impl Into<String>, link: bool) -> Self {
        Self {
            extensions: extensions.into(),
            link,
        }
    }
}

/// Asks which extensions to import and whether to link
#[async_trait]
pub trait ExtensionPrompt: Send + Sync {
    /// Prompt pre-filled with `defaults`; `None` when the user backs out
    async fn prompt(&self, defaults: &ExtensionChoice) -> Result<Option<ExtensionChoice>>;
}

/// Receives imported PDFs for metadata recognition
#[async_trait]
pub trait MetadataRecognizer: Send + Sync {
    async fn recognize(&self, items: Vec<Item>) -> Result<()>;
}
