//! Collection storage
//!
//! Collections form a tree per library. Root-level collections have a `NULL`
//! parent; lookups use `parent_id IS ?` so the same query serves both levels.

use shelf_core::{error::Result, types::*, ShelfError};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

fn collection_from_row(row: &SqliteRow) -> Collection {
    Collection {
        id: row.get("id"),
        library_id: row.get("library_id"),
        key: row.get("key"),
        name: row.get("name"),
        parent_id: row.get("parent_id"),
        created_at: row.get("created_at"),
    }
}

pub async fn get_by_id(pool: &SqlitePool, id: CollectionId) -> Result<Option<Collection>> {
    let row = sqlx::query(
        "SELECT id, library_id, key, name, parent_id, created_at
         FROM collections
         WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(collection_from_row))
}

/// Get all collections of a library, parents before children
pub async fn get_by_library(pool: &SqlitePool, library_id: LibraryId) -> Result<Vec<Collection>> {
    let rows = sqlx::query(
        "SELECT id, library_id, key, name, parent_id, created_at
         FROM collections
         WHERE library_id = ?
         ORDER BY id",
    )
    .bind(library_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(collection_from_row).collect())
}

/// Get the direct children of `parent_id`, or the root collections when `None`
pub async fn get_children(
    pool: &SqlitePool,
    library_id: LibraryId,
    parent_id: Option<CollectionId>,
) -> Result<Vec<Collection>> {
    let rows = sqlx::query(
        "SELECT id, library_id, key, name, parent_id, created_at
         FROM collections
         WHERE library_id = ? AND parent_id IS ?
         ORDER BY name, id",
    )
    .bind(library_id)
    .bind(parent_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(collection_from_row).collect())
}

pub async fn create(pool: &SqlitePool, collection: CreateCollection) -> Result<Collection> {
    if collection.name.is_empty() {
        return Err(ShelfError::invalid_input("collection name cannot be empty"));
    }

    if let Some(parent_id) = collection.parent_id {
        let parent = get_by_id(pool, parent_id)
            .await?
            .ok_or(ShelfError::CollectionNotFound(parent_id))?;
        if parent.library_id != collection.library_id {
            return Err(ShelfError::invalid_input(format!(
                "parent collection {} belongs to library {}, not {}",
                parent_id, parent.library_id, collection.library_id
            )));
        }
    }

    let result = sqlx::query(
        "INSERT INTO collections (library_id, key, name, parent_id)
         VALUES (?, ?, ?, ?)",
    )
    .bind(collection.library_id)
    .bind(generate_key())
    .bind(&collection.name)
    .bind(collection.parent_id)
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| ShelfError::storage("Failed to retrieve created collection"))
}

/// Add an item to a collection (no-op when already a member)
pub async fn add_item(pool: &SqlitePool, collection_id: CollectionId, item_id: ItemId) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO collection_items (collection_id, item_id) VALUES (?, ?)")
        .bind(collection_id)
        .bind(item_id)
        .execute(pool)
        .await?;

    Ok(())
}
