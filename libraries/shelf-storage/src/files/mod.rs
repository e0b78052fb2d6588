//! Copying files into managed storage
//!
//! Every imported attachment gets its own subdirectory named after the item
//! key, so two imports of `paper.pdf` never collide. Conflicts inside one
//! key directory are still resolved by appending a counter.

use shelf_core::{error::Result, ShelfError};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Copy `source_path` into `<storage_dir>/<key>/`
///
/// # Returns
///
/// Path of the stored copy
pub async fn copy_to_storage(
    source_path: &Path,
    storage_dir: &Path,
    key: &str,
) -> Result<PathBuf> {
    let filename = storage_file_name(source_path)?;
    let item_dir = storage_dir.join(key);

    fs::create_dir_all(&item_dir).await?;

    let mut dest_path = item_dir.join(&filename);
    if fs::try_exists(&dest_path).await? {
        dest_path = resolve_filename_conflict(&item_dir, &filename).await?;
    }

    fs::copy(source_path, &dest_path).await?;

    Ok(dest_path)
}

/// Remove a stored copy and its key directory when that leaves it empty
///
/// Used to roll back a copy whose item could not be recorded.
pub async fn remove_stored(stored_path: &Path) -> Result<()> {
    fs::remove_file(stored_path).await?;
    if let Some(item_dir) = stored_path.parent() {
        // Fails when other files remain, which is fine
        let _ = fs::remove_dir(item_dir).await;
    }
    Ok(())
}

/// File name used for the stored copy of `source_path`
pub fn storage_file_name(source_path: &Path) -> Result<String> {
    let name = source_path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| {
            ShelfError::invalid_input(format!("Invalid source filename: {}", source_path.display()))
        })?;

    let clean = sanitize_filename_part(name);
    if clean.is_empty() {
        return Err(ShelfError::invalid_input(format!(
            "Source filename is empty after sanitizing: {}",
            source_path.display()
        )));
    }
    Ok(clean)
}

/// Sanitize a string for use in filenames
///
/// Removes/replaces characters that are invalid on common filesystems
pub fn sanitize_filename_part(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            // Invalid on Windows: < > : " / \ | ? *
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Resolve filename conflict by appending a counter
///
/// "paper.pdf" -> "paper-1.pdf" -> "paper-2.pdf" etc.
async fn resolve_filename_conflict(dir: &Path, original_filename: &str) -> Result<PathBuf> {
    let path = Path::new(original_filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| ShelfError::invalid_input("Invalid filename"))?;
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    for counter in 1..1000 {
        let new_filename = if extension.is_empty() {
            format!("{}-{}", stem, counter)
        } else {
            format!("{}-{}.{}", stem, counter, extension)
        };

        let new_path = dir.join(&new_filename);
        if !fs::try_exists(&new_path).await? {
            return Ok(new_path);
        }
    }

    Err(ShelfError::storage(
        "Could not resolve filename conflict after 1000 attempts",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_filename_part() {
        assert_eq!(sanitize_filename_part("Valid Name.pdf"), "Valid Name.pdf");
        assert_eq!(sanitize_filename_part("Draft/Final.pdf"), "Draft_Final.pdf");
        assert_eq!(sanitize_filename_part("Notes: Week 1"), "Notes_ Week 1");
        assert_eq!(sanitize_filename_part("A<B>C"), "A_B_C");
        assert_eq!(sanitize_filename_part("  Trimmed  "), "Trimmed");
    }

    #[tokio::test]
    async fn test_copy_to_storage_uses_key_directory() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("paper.pdf");
        fs::write(&source, b"%PDF-1.4").unwrap();
        let storage = temp.path().join("storage");

        let stored = copy_to_storage(&source, &storage, "ABCD1234")
            .await
            .unwrap();

        assert_eq!(stored, storage.join("ABCD1234").join("paper.pdf"));
        assert_eq!(fs::read(&stored).unwrap(), b"%PDF-1.4");
        assert!(source.exists(), "copy must keep the original");
    }

    #[tokio::test]
    async fn test_filename_conflict_resolution() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path();

        fs::write(dir.join("paper.pdf"), b"existing").unwrap();

        let new_path = resolve_filename_conflict(dir, "paper.pdf").await.unwrap();
        assert_eq!(new_path, dir.join("paper-1.pdf"));

        fs::write(&new_path, b"existing").unwrap();
        let newer_path = resolve_filename_conflict(dir, "paper.pdf").await.unwrap();
        assert_eq!(newer_path, dir.join("paper-2.pdf"));
    }

    #[tokio::test]
    async fn test_remove_stored_cleans_key_directory() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("notes.txt");
        fs::write(&source, b"notes").unwrap();
        let storage = temp.path().join("storage");

        let stored = copy_to_storage(&source, &storage, "KEY00001")
            .await
            .unwrap();
        remove_stored(&stored).await.unwrap();

        assert!(!stored.exists());
        assert!(!storage.join("KEY00001").exists());
    }
}
