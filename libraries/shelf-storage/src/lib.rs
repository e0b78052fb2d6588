//! Shelf Storage
//!
//! `SQLite` database layer and managed file storage for Shelf libraries.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: each entity (`libraries`, `items`, `collections`)
//!   owns its own queries
//! - **Managed Files**: imported attachments are copied under
//!   `<storage>/<item key>/` by the `files` module
//! - **Store Trait**: `LocalLibraryStore` implements
//!   `shelf_core::LibraryStore` on top of both
//!
//! # Example
//!
//! ```rust,no_run
//! use shelf_storage::{open, LocalLibraryStore};
//! use shelf_core::LibraryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = open("sqlite://shelf.db").await?;
//! let store = LocalLibraryStore::new(pool, "./storage");
//!
//! let items = store.get_items(1).await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

// Vertical slices
pub mod collections;
pub mod items;
pub mod libraries;

// Managed storage on disk
pub mod files;

pub use context::LocalLibraryStore;
pub use error::StorageError;

use sqlx::migrate::Migrator;
use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// This should be called once when the application starts to ensure
/// the database schema is up to date.
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://shelf.db>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
    use std::str::FromStr;

    tracing::debug!("Creating pool with URL: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(std::time::Duration::from_secs(30));

    SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
}

/// Create a pool and bring its schema up to date
///
/// # Errors
///
/// Returns an error if the connection or a migration fails
pub async fn open(database_url: &str) -> error::Result<SqlitePool> {
    if database_url.trim().is_empty() {
        return Err(StorageError::Connection("empty database URL".to_string()));
    }
    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;
    Ok(pool)
}
