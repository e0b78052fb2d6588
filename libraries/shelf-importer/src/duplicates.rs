//! Duplicate detection against the library and within the import folder

use crate::finder::ContentDuplicateFinder;
use crate::Result;
use shelf_core::{Item, LibraryId, LibraryStore};
use std::collections::HashMap;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Why a file was flagged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DuplicateKind {
    /// The file itself already backs an attachment in the library
    ExactMatch,
    /// Attachments with the same file name exist in the library
    NameMatch,
    /// The external finder found identical content
    ContentDuplicate,
}

impl DuplicateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactMatch => "existing",
            Self::NameMatch => "name-match",
            Self::ContentDuplicate => "duplicate-in-folder",
        }
    }
}

impl fmt::Display for DuplicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a duplicate record points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateEvidence {
    Existing(Item),
    SameName(Vec<Item>),
    /// Identical content somewhere in the folder or storage
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRecord {
    pub file: PathBuf,
    pub kind: DuplicateKind,
    pub message: String,
    pub evidence: DuplicateEvidence,
}

impl DuplicateRecord {
    pub fn exact_match(file: PathBuf, item: Item) -> Self {
        Self {
            message: format!("Already in library: {}", item.display_title()),
            file,
            kind: DuplicateKind::ExactMatch,
            evidence: DuplicateEvidence::Existing(item),
        }
    }

    pub fn name_match(file: PathBuf, items: Vec<Item>) -> Self {
        let noun = if items.len() == 1 { "item" } else { "items" };
        Self {
            message: format!(
                "File with same name already in library ({} {})",
                items.len(),
                noun
            ),
            file,
            kind: DuplicateKind::NameMatch,
            evidence: DuplicateEvidence::SameName(items),
        }
    }

    pub fn content_duplicate(file: PathBuf) -> Self {
        Self {
            file,
            kind: DuplicateKind::ContentDuplicate,
            message: "Duplicate within import folder".to_string(),
            evidence: DuplicateEvidence::Content,
        }
    }
}

/// Lookup tables over a library's file attachments
#[derive(Debug, Default)]
pub struct AttachmentIndex {
    by_path: HashMap<PathBuf, Item>,
    by_name: HashMap<OsString, Vec<Item>>,
}

impl AttachmentIndex {
    /// Build the index in one pass over the library
    ///
    /// Only attachments whose backing file resolves on disk are indexed.
    pub async fn build<S>(store: &S, library_id: LibraryId) -> Result<Self>
    where
        S: LibraryStore + ?Sized,
    {
        let mut index = Self::default();

        for item in store.get_items(library_id).await? {
            if !item.is_attachment() {
                continue;
            }
            let Some(path) = store.attachment_file(&item).await? else {
                continue;
            };
            if let Some(name) = path.file_name() {
                index
                    .by_name
                    .entry(name.to_os_string())
                    .or_default()
                    .push(item.clone());
            }
            index.by_path.insert(path, item);
        }

        tracing::debug!(
            "Indexed {} attachments in library {}",
            index.by_path.len(),
            library_id
        );

        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// The attachment backed by exactly `path`
    pub fn by_path(&self, path: &Path) -> Option<&Item> {
        self.by_path.get(path)
    }

    /// Attachments whose file shares `path`'s base name
    pub fn by_name(&self, path: &Path) -> &[Item] {
        path.file_name()
            .and_then(|name| self.by_name.get(name))
            .map_or(&[], Vec::as_slice)
    }

    /// Records for files that already back an attachment, and for files
    /// sharing a name with one (unless already matched by path)
    pub fn library_duplicates(&self, files: &[PathBuf]) -> Vec<DuplicateRecord> {
        let mut exact = Vec::new();
        let mut named = Vec::new();

        for file in files {
            if let Some(item) = self.by_path(file) {
                exact.push(DuplicateRecord::exact_match(file.clone(), item.clone()));
                continue;
            }
            let same_name = self.by_name(file);
            if !same_name.is_empty() {
                named.push(DuplicateRecord::name_match(file.clone(), same_name.to_vec()));
            }
        }

        exact.extend(named);
        exact
    }
}

/// Runs all three duplicate checks for a candidate file set
pub struct DuplicateDetector<'a, S: LibraryStore + ?Sized> {
    store: &'a S,
    finder: &'a ContentDuplicateFinder,
}

impl<'a, S: LibraryStore + ?Sized> DuplicateDetector<'a, S> {
    pub fn new(store: &'a S, finder: &'a ContentDuplicateFinder) -> Self {
        Self { store, finder }
    }

    /// Check `files` (everything found under `scan_root`) for duplicates
    ///
    /// Records come back exact matches first, then name matches, then
    /// content duplicates.
    pub async fn detect(
        &self,
        library_id: LibraryId,
        scan_root: &Path,
        files: &[PathBuf],
    ) -> Result<Vec<DuplicateRecord>> {
        let index = AttachmentIndex::build(self.store, library_id).await?;
        let mut records = index.library_duplicates(files);

        let content = self
            .finder
            .find(self.store.storage_directory(), scan_root)
            .await;
        records.extend(content.into_iter().map(DuplicateRecord::content_duplicate));

        tracing::info!(
            "Found {} possible duplicates among {} files",
            records.len(),
            files.len()
        );

        Ok(records)
    }
}
