//! Item storage

use shelf_core::{error::Result, types::*, ShelfError};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::path::PathBuf;

/// Data for creating a new attachment item
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub library_id: LibraryId,
    pub key: String,
    pub title: String,
    pub link_mode: LinkMode,
    pub path: PathBuf,
    pub collections: Vec<CollectionId>,
}

const ITEM_COLUMNS: &str = "i.id, i.library_id, i.key, i.title, i.item_type, i.link_mode, \
     i.path, i.created_at, GROUP_CONCAT(ci.collection_id) AS collection_ids";

fn item_from_row(row: &SqliteRow) -> Result<Item> {
    let item_type: String = row.get("item_type");
    let link_mode: Option<String> = row.get("link_mode");
    let path: Option<String> = row.get("path");
    let collection_ids: Option<String> = row.get("collection_ids");

    let mut collections = collection_ids
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<CollectionId>()
                .map_err(|e| ShelfError::Database(format!("bad collection id {id:?}: {e}")))
        })
        .collect::<Result<Vec<_>>>()?;
    collections.sort_unstable();

    Ok(Item {
        id: row.get("id"),
        library_id: row.get("library_id"),
        key: row.get("key"),
        title: row.get("title"),
        item_type: ItemType::from_str(&item_type)
            .ok_or_else(|| ShelfError::Database(format!("unknown item type: {item_type}")))?,
        link_mode: link_mode.as_deref().and_then(LinkMode::from_str),
        path: path.map(PathBuf::from),
        collections,
        created_at: row.get("created_at"),
    })
}

pub async fn get_by_id(pool: &SqlitePool, id: ItemId) -> Result<Option<Item>> {
    let row = sqlx::query(&format!(
        "SELECT {ITEM_COLUMNS}
         FROM items i
         LEFT JOIN collection_items ci ON ci.item_id = i.id
         WHERE i.id = ?
         GROUP BY i.id"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(item_from_row).transpose()
}

/// Get every item of a library
pub async fn get_by_library(pool: &SqlitePool, library_id: LibraryId) -> Result<Vec<Item>> {
    let rows = sqlx::query(&format!(
        "SELECT {ITEM_COLUMNS}
         FROM items i
         LEFT JOIN collection_items ci ON ci.item_id = i.id
         WHERE i.library_id = ?
         GROUP BY i.id
         ORDER BY i.id"
    ))
    .bind(library_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(item_from_row).collect()
}

/// Get the items that belong to a collection
pub async fn get_by_collection(pool: &SqlitePool, collection_id: CollectionId) -> Result<Vec<Item>> {
    let rows = sqlx::query(&format!(
        "SELECT {ITEM_COLUMNS}
         FROM items i
         LEFT JOIN collection_items ci ON ci.item_id = i.id
         WHERE i.id IN (SELECT item_id FROM collection_items WHERE collection_id = ?)
         GROUP BY i.id
         ORDER BY i.id"
    ))
    .bind(collection_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(item_from_row).collect()
}

/// Insert an attachment and its collection memberships in one transaction
pub async fn create_attachment(pool: &SqlitePool, attachment: NewAttachment) -> Result<Item> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "INSERT INTO items (library_id, key, title, item_type, link_mode, path)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(attachment.library_id)
    .bind(&attachment.key)
    .bind(&attachment.title)
    .bind(ItemType::Attachment.as_str())
    .bind(attachment.link_mode.as_str())
    .bind(attachment.path.to_string_lossy().into_owned())
    .execute(&mut *tx)
    .await?;

    let id = result.last_insert_rowid();

    for collection_id in &attachment.collections {
        sqlx::query("INSERT OR IGNORE INTO collection_items (collection_id, item_id) VALUES (?, ?)")
            .bind(collection_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| ShelfError::storage("Failed to retrieve created item"))
}

/// Insert a regular (non-attachment) item
pub async fn create_regular(
    pool: &SqlitePool,
    library_id: LibraryId,
    title: &str,
) -> Result<Item> {
    let result = sqlx::query(
        "INSERT INTO items (library_id, key, title, item_type)
         VALUES (?, ?, ?, ?)",
    )
    .bind(library_id)
    .bind(generate_key())
    .bind(title)
    .bind(ItemType::Regular.as_str())
    .execute(pool)
    .await?;

    let id = result.last_insert_rowid();

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| ShelfError::storage("Failed to retrieve created item"))
}
