use crate::{collections, files, items};
use async_trait::async_trait;
use shelf_core::{error::Result, storage::LibraryStore, types::*, ShelfError};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};

/// Local library store using `SQLite` and a managed storage directory
pub struct LocalLibraryStore {
    pool: SqlitePool,
    storage_dir: PathBuf,
}

impl LocalLibraryStore {
    pub fn new(pool: SqlitePool, storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            pool,
            storage_dir: storage_dir.into(),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn ensure_regular_file(path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(ShelfError::invalid_input(format!(
            "{} is not a regular file",
            path.display()
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ShelfError::FileNotFound(path.display().to_string()))
        }
        Err(e) => Err(e.into()),
    }
}

fn title_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[async_trait]
impl LibraryStore for LocalLibraryStore {
    fn storage_directory(&self) -> &Path {
        &self.storage_dir
    }

    // Items
    async fn get_items(&self, library_id: LibraryId) -> Result<Vec<Item>> {
        items::get_by_library(&self.pool, library_id).await
    }

    async fn attachment_file(&self, item: &Item) -> Result<Option<PathBuf>> {
        if !item.is_attachment() {
            return Ok(None);
        }
        let Some(path) = &item.path else {
            return Ok(None);
        };
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Ok(Some(path.clone())),
            _ => Ok(None),
        }
    }

    async fn import_from_file(&self, request: AttachFile) -> Result<Item> {
        ensure_regular_file(&request.path).await?;

        let key = generate_key();
        let stored = files::copy_to_storage(&request.path, &self.storage_dir, &key).await?;

        let created = items::create_attachment(
            &self.pool,
            items::NewAttachment {
                library_id: request.library_id,
                key,
                title: title_for(&request.path),
                link_mode: LinkMode::ImportedFile,
                path: stored.clone(),
                collections: request.collections,
            },
        )
        .await;

        if created.is_err() {
            if let Err(e) = files::remove_stored(&stored).await {
                tracing::warn!("Failed to roll back stored copy {:?}: {}", stored, e);
            }
        }
        created
    }

    async fn link_from_file(&self, request: AttachFile) -> Result<Item> {
        ensure_regular_file(&request.path).await?;

        items::create_attachment(
            &self.pool,
            items::NewAttachment {
                library_id: request.library_id,
                key: generate_key(),
                title: title_for(&request.path),
                link_mode: LinkMode::LinkedFile,
                path: request.path,
                collections: request.collections,
            },
        )
        .await
    }

    // Collections
    async fn child_collections(
        &self,
        library_id: LibraryId,
        parent_id: Option<CollectionId>,
    ) -> Result<Vec<Collection>> {
        collections::get_children(&self.pool, library_id, parent_id).await
    }

    async fn create_collection(&self, collection: CreateCollection) -> Result<Collection> {
        collections::create(&self.pool, collection).await
    }
}
