//! The folder import command
//!
//! [`FolderImport::run`] picks a folder, scans it, checks it for duplicates,
//! asks which extensions to bring in, imports the tree under the selected
//! collection and finally hands imported PDFs off for metadata recognition.

use crate::adjudicator::{adjudicate, final_skip_set};
use crate::duplicates::{DuplicateDetector, DuplicateRecord};
use crate::finder::ContentDuplicateFinder;
use crate::importer::{
    ImportEngine, ImportParameters, ImportSummary, DEFAULT_SETTLE_DELAY, DEFAULT_THROTTLE,
};
use crate::progress::{ImportProgress, ProgressMeter, ShownMeter};
use crate::scanner::{FileScanner, FolderNode};
use crate::surfaces::{
    DuplicateReviewer, ExtensionChoice, ExtensionPrompt, FolderPicker, MetadataRecognizer,
};
use crate::{ImportError, Result};
use shelf_core::{Collection, LibraryId, LibraryStore};
use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;
use std::time::Duration;

/// Where a folder import lands
#[derive(Debug, Clone)]
pub struct ImportTarget {
    pub library_id: LibraryId,
    /// Collection the folder's contents go under
    pub collection: Option<Collection>,
    pub editable: bool,
    pub files_editable: bool,
    /// Pre-selected answer to "link instead of copy?"
    pub link_by_default: bool,
}

impl ImportTarget {
    /// A writable target in `collection`
    pub fn new(library_id: LibraryId, collection: Option<Collection>) -> Self {
        Self {
            library_id,
            collection,
            editable: true,
            files_editable: true,
            link_by_default: true,
        }
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    #[must_use]
    pub fn with_link_default(mut self, link: bool) -> Self {
        self.link_by_default = link;
        self
    }

    fn check(&self) -> Result<&Collection> {
        if !self.editable {
            return Err(ImportError::ReadOnlyLibrary);
        }
        if !self.files_editable {
            return Err(ImportError::FilesNotEditable);
        }
        self.collection
            .as_ref()
            .ok_or(ImportError::NoCollectionSelected)
    }
}

/// Timing knobs for a folder import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSettings {
    pub throttle: Duration,
    pub settle_delay: Duration,
    pub follow_links: bool,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            throttle: DEFAULT_THROTTLE,
            settle_delay: DEFAULT_SETTLE_DELAY,
            follow_links: true,
        }
    }
}

/// The interactive collaborators a folder import needs
#[derive(Clone, Copy)]
pub struct Surfaces<'a> {
    pub picker: &'a dyn FolderPicker,
    pub reviewer: &'a dyn DuplicateReviewer,
    pub prompt: &'a dyn ExtensionPrompt,
    pub meter: &'a dyn ProgressMeter,
    pub recognizer: &'a dyn MetadataRecognizer,
}

/// What a completed import did
#[derive(Debug, Clone)]
pub struct FolderImportReport {
    pub parameters: ImportParameters,
    pub duplicates: Vec<DuplicateRecord>,
    pub skipped: HashSet<PathBuf>,
    pub progress: ImportProgress,
    pub summary: ImportSummary,
    /// PDFs handed to the metadata recognizer
    pub recognized_pdfs: usize,
}

#[derive(Debug, Clone)]
pub struct FolderImportOutcome {
    pub root: FolderNode,
    /// `None` when there was nothing to import
    pub report: Option<FolderImportReport>,
}

impl FolderImportOutcome {
    pub fn nothing_to_import(root: FolderNode) -> Self {
        Self { root, report: None }
    }

    pub fn is_nothing_to_import(&self) -> bool {
        self.report.is_none()
    }
}

/// Folder import over a store and a set of surfaces
pub struct FolderImport<'a, S: LibraryStore + ?Sized> {
    store: &'a S,
    surfaces: Surfaces<'a>,
    finder: ContentDuplicateFinder,
    settings: ImportSettings,
}

impl<'a, S: LibraryStore + ?Sized> FolderImport<'a, S> {
    pub fn new(store: &'a S, surfaces: Surfaces<'a>) -> Self {
        Self {
            store,
            surfaces,
            finder: ContentDuplicateFinder::disabled(),
            settings: ImportSettings::default(),
        }
    }

    #[must_use]
    pub fn with_finder(mut self, finder: ContentDuplicateFinder) -> Self {
        self.finder = finder;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: ImportSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Run the whole import into `target`
    pub async fn run(&self, target: &ImportTarget) -> Result<FolderImportOutcome> {
        let collection = target.check()?;
        let meter = self.surfaces.meter;

        let folder = self
            .surfaces
            .picker
            .pick_folder()
            .await?
            .ok_or(ImportError::Cancelled)?;

        let root = {
            let _shown = ShownMeter::show(meter, "Scanning for attachments...", false);
            FileScanner::new()
                .follow_links(self.settings.follow_links)
                .scan(&folder)
                .await?
        };

        if root.extensions().is_empty() {
            tracing::info!("No importable files in {}", folder.display());
            return Ok(FolderImportOutcome::nothing_to_import(root));
        }

        let duplicates = {
            let _shown = ShownMeter::show(meter, "Checking for duplicates...", false);
            DuplicateDetector::new(self.store, &self.finder)
                .detect(target.library_id, root.path(), &root.all_files())
                .await?
        };

        let adjudicated = adjudicate(self.surfaces.reviewer, &duplicates).await?;

        let Some((selection, link_only)) = self.choose_extensions(&root, target).await? else {
            return Err(ImportError::Cancelled);
        };

        if selection.is_empty() {
            tracing::info!("No extensions selected, nothing to import");
            return Ok(FolderImportOutcome::nothing_to_import(root));
        }

        let parameters = ImportParameters::new(target.library_id, selection, link_only)?;
        let mut progress = ImportProgress::new(root.selected(&parameters.selected_extensions));
        let mut pdfs = Vec::new();

        let (skipped, summary) = {
            let _shown = ShownMeter::show(meter, "Importing attachments...", true);
            meter.update(&progress);

            let recheck = self
                .finder
                .find(self.store.storage_directory(), root.path())
                .await;
            let skipped = final_skip_set(&adjudicated, &recheck);

            let summary = ImportEngine::new(self.store, &parameters, meter)
                .with_throttle(self.settings.throttle)
                .with_settle_delay(self.settings.settle_delay)
                .import(&root, Some(collection), &mut pdfs, &skipped, &mut progress)
                .await?;
            (skipped, summary)
        };

        let recognized_pdfs = pdfs.len();
        if !pdfs.is_empty() {
            let _shown = ShownMeter::show(meter, "Fetching metadata for attachments...", false);
            if let Err(e) = self.surfaces.recognizer.recognize(pdfs).await {
                tracing::warn!("Metadata recognition failed: {}", e);
            }
        }

        Ok(FolderImportOutcome {
            root,
            report: Some(FolderImportReport {
                parameters,
                duplicates,
                skipped,
                progress,
                summary,
                recognized_pdfs,
            }),
        })
    }

    /// Prompt until the answer only names discovered extensions
    async fn choose_extensions(
        &self,
        root: &FolderNode,
        target: &ImportTarget,
    ) -> Result<Option<(BTreeSet<String>, bool)>> {
        let discovered = root.extensions();
        let mut defaults = ExtensionChoice::new(
            discovered.iter().cloned().collect::<Vec<_>>().join(", "),
            target.link_by_default,
        );

        loop {
            let Some(choice) = self.surfaces.prompt.prompt(&defaults).await? else {
                return Ok(None);
            };

            let selection = parse_extensions(&choice.extensions);
            let unknown: Vec<&String> = selection.difference(discovered).collect();
            if unknown.is_empty() {
                return Ok(Some((selection, choice.link)));
            }

            tracing::info!("Extensions not found in folder: {:?}", unknown);
            defaults = choice;
        }
    }
}

/// Parse a comma-separated extension list
///
/// Entries are trimmed and lower-cased; a leading dot is dropped and empty
/// entries are ignored.
pub fn parse_extensions(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
        .filter(|ext| !ext.is_empty())
        .collect()
}
