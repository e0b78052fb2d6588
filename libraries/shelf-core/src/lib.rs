//! Shelf Core
//!
//! Domain types, the store trait, and error handling shared by the Shelf
//! crates.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Library`, `Item`, `Collection`
//! - **Store Trait**: `LibraryStore`, the item/collection store the importer
//!   talks to
//! - **Error Handling**: Unified `ShelfError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use shelf_core::types::{AttachFile, CreateCollection};
//!
//! let request = AttachFile::new("/papers/paper.pdf", 1).in_collection(Some(3));
//! assert_eq!(request.collections, vec![3]);
//!
//! let collection = CreateCollection::top_level(1, "Reading");
//! assert!(collection.parent_id.is_none());
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod storage;
pub mod types;

pub use error::{Result, ShelfError};
pub use storage::LibraryStore;

pub use types::{
    AttachFile, Collection, CollectionId, CreateCollection, CreateLibrary, Item, ItemId,
    ItemType, Library, LibraryId, LinkMode,
};
