//! Terminal implementations of the import surfaces
//!
//! `dialoguer` prompts block, so each one runs on the blocking pool.

use async_trait::async_trait;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use shelf_core::Item;
use shelf_importer::{
    BulkChoice, DuplicateReviewer, ExtensionChoice, ExtensionPrompt, FolderPicker, ImportError,
    MetadataRecognizer, ReviewOutcome, SkipCandidate,
};
use std::path::PathBuf;

type Result<T> = std::result::Result<T, ImportError>;

async fn blocking<T, F>(prompt: F) -> Result<T>
where
    F: FnOnce() -> dialoguer::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(prompt)
        .await
        .map_err(|e| ImportError::Prompt(e.to_string()))?
        .map_err(|e| ImportError::Prompt(e.to_string()))
}

/// Uses the folder given on the command line, or asks for one
pub struct TerminalPicker {
    folder: Option<PathBuf>,
}

impl TerminalPicker {
    pub fn new(folder: Option<PathBuf>) -> Self {
        Self { folder }
    }
}

#[async_trait]
impl FolderPicker for TerminalPicker {
    async fn pick_folder(&self) -> Result<Option<PathBuf>> {
        if let Some(folder) = &self.folder {
            return Ok(Some(folder.clone()));
        }

        let answer: String = blocking(|| {
            Input::new()
                .with_prompt("Folder to import (empty to cancel)")
                .allow_empty(true)
                .interact_text()
        })
        .await?;

        let answer = answer.trim();
        Ok((!answer.is_empty()).then(|| PathBuf::from(answer)))
    }
}

pub struct TerminalReviewer;

#[async_trait]
impl DuplicateReviewer for TerminalReviewer {
    async fn bulk_choice(&self, candidates: &[SkipCandidate]) -> Result<BulkChoice> {
        let records: usize = candidates.iter().map(|c| c.records.len()).sum();
        let prompt = format!(
            "{} possible duplicate{} found",
            records,
            if records == 1 { "" } else { "s" }
        );

        let choice = blocking(move || {
            Select::new()
                .with_prompt(prompt)
                .items(&["Review duplicates", "Skip all duplicates", "Cancel import"])
                .default(0)
                .interact_opt()
        })
        .await?;

        Ok(match choice {
            Some(0) => BulkChoice::Review,
            Some(1) => BulkChoice::SkipAll,
            _ => BulkChoice::Abort,
        })
    }

    async fn review(&self, candidates: &[SkipCandidate]) -> Result<ReviewOutcome> {
        let files: Vec<PathBuf> = candidates.iter().map(|c| c.file.clone()).collect();
        let labels: Vec<String> = candidates
            .iter()
            .map(|c| format!("{} ({})", c.file.display(), c.message()))
            .collect();
        let checked = vec![true; labels.len()];

        let picked = blocking(move || {
            MultiSelect::new()
                .with_prompt("Checked files will be skipped (Esc imports everything)")
                .items(&labels)
                .defaults(&checked)
                .interact_opt()
        })
        .await?;

        Ok(match picked {
            Some(indices) => ReviewOutcome::Accepted(
                indices
                    .into_iter()
                    .filter_map(|i| files.get(i).cloned())
                    .collect(),
            ),
            None => ReviewOutcome::Dismissed,
        })
    }
}

pub struct TerminalExtensionPrompt;

#[async_trait]
impl ExtensionPrompt for TerminalExtensionPrompt {
    async fn prompt(&self, defaults: &ExtensionChoice) -> Result<Option<ExtensionChoice>> {
        let initial = defaults.extensions.clone();
        let extensions: String = blocking(move || {
            Input::new()
                .with_prompt("Extensions to import (comma-separated)")
                .with_initial_text(initial)
                .allow_empty(true)
                .interact_text()
        })
        .await?;

        let link_default = defaults.link;
        let link = blocking(move || {
            Confirm::new()
                .with_prompt("Link files instead of copying them?")
                .default(link_default)
                .interact_opt()
        })
        .await?;

        Ok(link.map(|link| ExtensionChoice { extensions, link }))
    }
}

/// Logs the PDFs that would be sent for metadata recognition
pub struct LoggingRecognizer;

#[async_trait]
impl MetadataRecognizer for LoggingRecognizer {
    async fn recognize(&self, items: Vec<Item>) -> Result<()> {
        for item in &items {
            tracing::info!("Queued {} for metadata recognition", item.display_title());
        }
        Ok(())
    }
}
