mod collection;
mod ids;
mod item;
mod library;

pub use collection::{Collection, CollectionId, CreateCollection};
pub use ids::{generate_key, KEY_LENGTH};
pub use item::{AttachFile, Item, ItemId, ItemType, LinkMode};
pub use library::{CreateLibrary, Library, LibraryId};
