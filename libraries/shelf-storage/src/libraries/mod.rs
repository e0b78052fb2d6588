//! Library storage

use shelf_core::{error::Result, types::*, ShelfError};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

fn library_from_row(row: &SqliteRow) -> Library {
    Library {
        id: row.get("id"),
        name: row.get("name"),
        created_at: row.get("created_at"),
    }
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Library>> {
    let rows = sqlx::query("SELECT id, name, created_at FROM libraries ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(library_from_row).collect())
}

pub async fn get_by_id(pool: &SqlitePool, id: LibraryId) -> Result<Option<Library>> {
    let row = sqlx::query("SELECT id, name, created_at FROM libraries WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.as_ref().map(library_from_row))
}

pub async fn create(pool: &SqlitePool, library: CreateLibrary) -> Result<Library> {
    let name = library.name.trim();
    if name.is_empty() {
        return Err(ShelfError::invalid_input("library name cannot be empty"));
    }

    let result = sqlx::query("INSERT INTO libraries (name) VALUES (?)")
        .bind(name)
        .execute(pool)
        .await?;

    let id = result.last_insert_rowid();

    get_by_id(pool, id)
        .await?
        .ok_or_else(|| ShelfError::storage("Failed to retrieve created library"))
}
