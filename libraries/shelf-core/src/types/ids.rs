/// Object keys for Shelf entities
use uuid::Uuid;

/// Length of generated item and collection keys
pub const KEY_LENGTH: usize = 8;

/// Generate a random object key
///
/// Keys are short, upper-case tokens. Imported attachments use their key as the
/// name of their subdirectory in managed storage, so keys must be safe path
/// components on every platform.
pub fn generate_key() -> String {
    Uuid::new_v4().simple().to_string()[..KEY_LENGTH].to_uppercase()
}
