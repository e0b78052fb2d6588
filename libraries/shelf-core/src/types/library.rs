//! Library types

use serde::{Deserialize, Serialize};

pub type LibraryId = i64;

/// A library: the top-level container of items and collections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub id: LibraryId,
    pub name: String,
    pub created_at: String,
}

/// Data for creating a new library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLibrary {
    pub name: String,
}
