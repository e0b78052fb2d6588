//! Import engine
//!
//! Walks a scanned folder tree depth-first, mirrors each folder as a
//! collection under the target, and copies or links the selected files.

use crate::progress::{ImportProgress, ProgressMeter};
use crate::scanner::{extension_of, is_pdf, FolderNode, SHORTCUT_EXTENSION};
use crate::{ImportError, Result};
use futures_util::future::{BoxFuture, FutureExt};
use shelf_core::{AttachFile, Collection, CreateCollection, Item, LibraryId, LibraryStore};
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Pause after each file so the host stays responsive
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(10);

/// Pause after creating a collection before using it
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(10);

/// What to import and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportParameters {
    pub library_id: LibraryId,
    pub selected_extensions: BTreeSet<String>,
    /// Link files in place instead of copying them into storage
    pub link_only: bool,
}

impl ImportParameters {
    pub fn new(
        library_id: LibraryId,
        selected_extensions: BTreeSet<String>,
        link_only: bool,
    ) -> Result<Self> {
        if selected_extensions.is_empty() {
            return Err(ImportError::NoExtensionsSelected);
        }
        Ok(Self {
            library_id,
            selected_extensions,
            link_only,
        })
    }

    pub fn is_selected(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.selected_extensions.contains(&ext))
    }
}

/// Counts for a finished import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Files copied into storage
    pub imported: usize,
    /// Files linked in place
    pub linked: usize,
    /// Files left out because they were in the skip set
    pub skipped_duplicates: usize,
    /// Shortcuts left out of a copy import
    pub skipped_shortcuts: usize,
    /// Collections created while mirroring folders
    pub collections_created: usize,
    /// Files that could not be imported, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl ImportSummary {
    /// Files that ended up in the library
    pub fn attached(&self) -> usize {
        self.imported + self.linked
    }

    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

struct ImportState<'x> {
    skip: &'x HashSet<PathBuf>,
    pdfs: &'x mut Vec<Item>,
    progress: &'x mut ImportProgress,
    summary: ImportSummary,
}

/// Sequential importer for a scanned tree
pub struct ImportEngine<'a, S: LibraryStore + ?Sized> {
    store: &'a S,
    params: &'a ImportParameters,
    meter: &'a dyn ProgressMeter,
    throttle: Duration,
    settle_delay: Duration,
}

impl<'a, S: LibraryStore + ?Sized> ImportEngine<'a, S> {
    pub fn new(store: &'a S, params: &'a ImportParameters, meter: &'a dyn ProgressMeter) -> Self {
        Self {
            store,
            params,
            meter,
            throttle: DEFAULT_THROTTLE,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    #[must_use]
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Import `tree` under `parent`
    ///
    /// The root's own files land directly in `parent`; every subfolder is
    /// mirrored as a child collection. Imported PDFs are appended to `pdfs`.
    /// A file failing to import is logged and recorded in the summary; a
    /// collection that cannot be found or created aborts the import.
    pub async fn import(
        &self,
        tree: &FolderNode,
        parent: Option<&Collection>,
        pdfs: &mut Vec<Item>,
        skip: &HashSet<PathBuf>,
        progress: &mut ImportProgress,
    ) -> Result<ImportSummary> {
        let mut state = ImportState {
            skip,
            pdfs,
            progress,
            summary: ImportSummary::default(),
        };

        self.import_folder(tree, parent.cloned(), &mut state).await?;

        tracing::info!(
            "Import finished: {} imported, {} linked, {} skipped, {} failed",
            state.summary.imported,
            state.summary.linked,
            state.summary.skipped_duplicates + state.summary.skipped_shortcuts,
            state.summary.failed.len()
        );

        Ok(state.summary)
    }

    fn import_folder<'b, 'x: 'b>(
        &'b self,
        node: &'b FolderNode,
        parent: Option<Collection>,
        state: &'b mut ImportState<'x>,
    ) -> BoxFuture<'b, Result<()>> {
        async move {
            if node.extensions().is_disjoint(&self.params.selected_extensions) {
                tracing::debug!("Nothing selected under {}", node.path().display());
                return Ok(());
            }

            tracing::info!("Importing {}", node.path().display());

            let collection = if node.is_root() {
                parent
            } else {
                Some(
                    self.resolve_collection(node.name(), parent.as_ref(), state)
                        .await?,
                )
            };

            let mut files: Vec<&PathBuf> = node.files().iter().collect();
            files.sort();
            for file in files {
                self.import_file(file, collection.as_ref(), state).await;
            }

            for subfolder in node.subfolders() {
                self.import_folder(subfolder, collection.clone(), state)
                    .await?;
            }

            Ok(())
        }
        .boxed()
    }

    async fn resolve_collection(
        &self,
        name: &str,
        parent: Option<&Collection>,
        state: &mut ImportState<'_>,
    ) -> Result<Collection> {
        let parent_id = parent.map(|p| p.id);
        let parent_name = parent.map_or("library root", |p| p.name.as_str());

        if let Some(existing) = self
            .store
            .find_child_collection(self.params.library_id, parent_id, name)
            .await?
        {
            tracing::info!("Collection {} exists under {}", name, parent_name);
            return Ok(existing);
        }

        tracing::info!("Creating collection {} under {}", name, parent_name);
        let created = self
            .store
            .create_collection(CreateCollection {
                library_id: self.params.library_id,
                name: name.to_string(),
                parent_id,
            })
            .await?;
        state.summary.collections_created += 1;

        tokio::time::sleep(self.settle_delay).await;

        Ok(created)
    }

    async fn import_file(
        &self,
        file: &Path,
        collection: Option<&Collection>,
        state: &mut ImportState<'_>,
    ) {
        let extension = extension_of(file);
        let selected = extension
            .as_ref()
            .is_some_and(|ext| self.params.selected_extensions.contains(ext));
        if !selected {
            tracing::debug!("Not importing {} (extension not selected)", file.display());
            return;
        }

        if state.skip.contains(file) {
            tracing::debug!("Not importing duplicate {}", file.display());
            state.summary.skipped_duplicates += 1;
            self.advance(state);
            return;
        }

        let target = collection.map_or("library root", |c| c.name.as_str());
        let request =
            AttachFile::new(file, self.params.library_id).in_collection(collection.map(|c| c.id));

        let result = if self.params.link_only {
            tracing::info!("Linking {} into {}", file.display(), target);
            self.store.link_from_file(request).await.map(|item| {
                state.summary.linked += 1;
                Some(item)
            })
        } else if extension.as_deref() == Some(SHORTCUT_EXTENSION) {
            tracing::info!("Not importing shortcut {}", file.display());
            state.summary.skipped_shortcuts += 1;
            Ok(None)
        } else {
            tracing::info!("Importing {} into {}", file.display(), target);
            self.store.import_from_file(request).await.map(|item| {
                state.summary.imported += 1;
                Some(item)
            })
        };

        match result {
            Ok(Some(item)) => {
                if is_pdf(file) {
                    state.pdfs.push(item);
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Failed to import {}: {}", file.display(), e);
                state
                    .summary
                    .failed
                    .push((file.to_path_buf(), e.to_string()));
            }
        }

        tokio::time::sleep(self.throttle).await;
        self.advance(state);
    }

    fn advance(&self, state: &mut ImportState<'_>) {
        state.progress.advance();
        tracing::debug!("{}", state.progress.label());
        self.meter.update(state.progress);
    }
}
