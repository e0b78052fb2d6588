//! Store trait for libraries, items and collections

use crate::error::Result;
use crate::types::{
    AttachFile, Collection, CollectionId, CreateCollection, Item, LibraryId,
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Item and collection store the importer works against
///
/// This trait abstracts the host library so the import pipeline can run
/// against the local `SQLite` store or any other backend that can answer
/// these queries.
#[async_trait]
pub trait LibraryStore: Send + Sync {
    /// Directory holding copies of imported files
    fn storage_directory(&self) -> &Path;

    // ========================================================================
    // Items
    // ========================================================================

    /// Get all items in a library
    async fn get_items(&self, library_id: LibraryId) -> Result<Vec<Item>>;

    /// Resolve the file backing an attachment
    ///
    /// Returns `None` for regular items and for attachments whose file is
    /// missing on disk.
    async fn attachment_file(&self, item: &Item) -> Result<Option<PathBuf>>;

    /// Copy a file into managed storage and create an attachment for it
    async fn import_from_file(&self, request: AttachFile) -> Result<Item>;

    /// Create an attachment referencing a file at its current location
    async fn link_from_file(&self, request: AttachFile) -> Result<Item>;

    // ========================================================================
    // Collections
    // ========================================================================

    /// Get the collections directly under `parent` (or the library root)
    async fn child_collections(
        &self,
        library_id: LibraryId,
        parent_id: Option<CollectionId>,
    ) -> Result<Vec<Collection>>;

    /// Create and persist a new collection
    async fn create_collection(&self, collection: CreateCollection) -> Result<Collection>;

    /// Find a direct child collection by exact name
    async fn find_child_collection(
        &self,
        library_id: LibraryId,
        parent_id: Option<CollectionId>,
        name: &str,
    ) -> Result<Option<Collection>> {
        Ok(self
            .child_collections(library_id, parent_id)
            .await?
            .into_iter()
            .find(|child| child.name == name))
    }
}
