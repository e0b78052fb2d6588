//! Item types
//!
//! Items are the entries of a library. Attachments are items backed by a file,
//! either copied into managed storage or linked in place.

use super::{CollectionId, LibraryId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub type ItemId = i64;

/// Kind of library item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    /// A regular (bibliographic) item
    #[default]
    Regular,
    /// An item representing a stored or linked file
    Attachment,
}

impl ItemType {
    /// Convert to string for database storage
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Attachment => "attachment",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "regular" => Some(Self::Regular),
            "attachment" => Some(Self::Attachment),
            _ => None,
        }
    }
}

/// How an attachment refers to its file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// File bytes were copied into managed storage
    ImportedFile,
    /// File is referenced at its original location
    LinkedFile,
}

impl LinkMode {
    /// Convert to string for database storage
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ImportedFile => "imported_file",
            Self::LinkedFile => "linked_file",
        }
    }

    /// Parse from string
    #[must_use]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "imported_file" => Some(Self::ImportedFile),
            "linked_file" => Some(Self::LinkedFile),
            _ => None,
        }
    }
}

/// A library item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub library_id: LibraryId,
    pub key: String,
    pub title: String,
    pub item_type: ItemType,
    pub link_mode: Option<LinkMode>,
    /// Backing file for attachments
    pub path: Option<PathBuf>,
    pub collections: Vec<CollectionId>,
    pub created_at: String,
}

impl Item {
    pub fn is_attachment(&self) -> bool {
        self.item_type == ItemType::Attachment
    }

    /// Title shown to users, falling back to the backing file name
    pub fn display_title(&self) -> String {
        if !self.title.is_empty() {
            return self.title.clone();
        }
        self.path
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("[{}]", self.key))
    }
}

/// Request to attach a file to a library, by copy or by link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachFile {
    pub path: PathBuf,
    pub library_id: LibraryId,
    pub collections: Vec<CollectionId>,
}

impl AttachFile {
    pub fn new(path: impl Into<PathBuf>, library_id: LibraryId) -> Self {
        Self {
            path: path.into(),
            library_id,
            collections: Vec::new(),
        }
    }

    /// Add the attachment to a collection
    pub fn in_collection(mut self, collection: Option<CollectionId>) -> Self {
        self.collections.extend(collection);
        self
    }
}
