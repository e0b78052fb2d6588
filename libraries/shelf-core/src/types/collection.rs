//! Collection types

use super::LibraryId;
use serde::{Deserialize, Serialize};

pub type CollectionId = i64;

/// A named, hierarchical grouping of items within a library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub library_id: LibraryId,
    pub key: String,
    pub name: String,
    /// `None` for collections at the library root
    pub parent_id: Option<CollectionId>,
    pub created_at: String,
}

/// Data for creating a new collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCollection {
    pub library_id: LibraryId,
    pub name: String,
    pub parent_id: Option<CollectionId>,
}

impl CreateCollection {
    /// Collection directly under the library root
    pub fn top_level(library_id: LibraryId, name: impl Into<String>) -> Self {
        Self {
            library_id,
            name: name.into(),
            parent_id: None,
        }
    }

    /// Collection nested under `parent`
    pub fn child_of(parent: &Collection, name: impl Into<String>) -> Self {
        Self {
            library_id: parent.library_id,
            name: name.into(),
            parent_id: Some(parent.id),
        }
    }
}
