//! Recursive folder scanning
//!
//! A scan builds a [`FolderNode`] tree. Each folder lists its entries first,
//! then scans all of its subfolders concurrently and waits for every one of
//! them before folding their extensions into its own. A node's `extensions`
//! is therefore only complete once the scan of the whole subtree has
//! resolved, which is why nodes are only ever handed out by [`FolderScanner::scan`].

use crate::{ImportError, Result};
use futures_util::future::{try_join_all, BoxFuture, FutureExt};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Windows shortcut extension
///
/// Shortcuts are discovered like any other file but never advertised as an
/// importable extension.
pub const SHORTCUT_EXTENSION: &str = "lnk";

/// One directory level of a scanned tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    path: PathBuf,
    name: String,
    files: Vec<PathBuf>,
    subfolders: Vec<FolderNode>,
    extensions: BTreeSet<String>,
}

impl FolderNode {
    /// Absolute directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Leaf directory name, empty for the scan root
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_root(&self) -> bool {
        self.name.is_empty()
    }

    /// Files directly inside this directory, sorted
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Child directories, sorted by path
    pub fn subfolders(&self) -> &[FolderNode] {
        &self.subfolders
    }

    /// Extensions found in this folder and every descendant
    pub fn extensions(&self) -> &BTreeSet<String> {
        &self.extensions
    }

    /// Count files at any depth whose extension is in `extensions`
    pub fn selected(&self, extensions: &BTreeSet<String>) -> usize {
        let own = self
            .files
            .iter()
            .filter(|file| extension_of(file).is_some_and(|ext| extensions.contains(&ext)))
            .count();
        own + self
            .subfolders
            .iter()
            .map(|folder| folder.selected(extensions))
            .sum::<usize>()
    }

    /// Every file at any depth
    pub fn all_files(&self) -> Vec<PathBuf> {
        let mut files = self.files.clone();
        for folder in &self.subfolders {
            files.extend(folder.all_files());
        }
        files
    }

    /// Number of files at any depth
    pub fn file_count(&self) -> usize {
        self.files.len()
            + self
                .subfolders
                .iter()
                .map(FolderNode::file_count)
                .sum::<usize>()
    }
}

/// Scanner for folder trees
#[derive(Debug, Clone, Copy)]
pub struct FileScanner {
    /// Whether to descend into symlinked directories
    follow_links: bool,
}

impl Default for FileScanner {
    fn default() -> Self {
        Self { follow_links: true }
    }
}

impl FileScanner {
    /// Create a new file scanner
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether to follow symbolic links to directories
    ///
    /// Enabled by default. Symlinks to files are always treated as files;
    /// with following disabled, links to directories are left out of the
    /// tree. Following can loop forever on cyclic links.
    pub fn follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Scan a folder tree
    ///
    /// The root is resolved to an absolute path first, so every path in the
    /// returned tree is absolute. Fails as a whole if any directory in the
    /// tree cannot be listed: a partial tree would silently under-import.
    pub async fn scan(&self, root: &Path) -> Result<FolderNode> {
        let metadata = match tokio::fs::metadata(root).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ImportError::FolderNotFound(root.display().to_string()));
            }
            Err(source) => {
                return Err(ImportError::Scan {
                    path: root.to_path_buf(),
                    source,
                })
            }
        };

        if !metadata.is_dir() {
            return Err(ImportError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        // Duplicate reports name files by absolute path
        let root = tokio::fs::canonicalize(root)
            .await
            .map_err(|source| scan_error(root, source))?;
        let node = self.scan_folder(root.clone(), String::new()).await?;

        tracing::info!(
            "Scanned {}: {} files, extensions {:?}",
            root.display(),
            node.file_count(),
            node.extensions
        );

        Ok(node)
    }

    fn scan_folder(&self, path: PathBuf, name: String) -> BoxFuture<'_, Result<FolderNode>> {
        async move {
            tracing::debug!("scanning {}", path.display());

            let mut files = Vec::new();
            let mut children = Vec::new();
            let mut extensions = BTreeSet::new();

            let mut entries = tokio::fs::read_dir(&path)
                .await
                .map_err(|source| scan_error(&path, source))?;

            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|source| scan_error(&path, source))?
            {
                let entry_path = entry.path();
                match self.classify(&entry_path).await? {
                    EntryKind::Folder => children.push(entry_path),
                    EntryKind::File => {
                        if let Some(ext) = extension_of(&entry_path) {
                            if ext != SHORTCUT_EXTENSION {
                                extensions.insert(ext);
                            }
                        }
                        files.push(entry_path);
                    }
                    EntryKind::Skipped => {
                        tracing::debug!("not following link {}", entry_path.display());
                    }
                }
            }

            files.sort();
            children.sort();

            let subfolders = try_join_all(children.into_iter().map(|child| {
                let child_name = child
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.scan_folder(child, child_name)
            }))
            .await?;

            for folder in &subfolders {
                extensions.extend(folder.extensions.iter().cloned());
            }

            Ok(FolderNode {
                path,
                name,
                files,
                subfolders,
                extensions,
            })
        }
        .boxed()
    }

    async fn classify(&self, path: &Path) -> Result<EntryKind> {
        let link_meta = tokio::fs::symlink_metadata(path)
            .await
            .map_err(|source| scan_error(path, source))?;

        if !link_meta.file_type().is_symlink() {
            return Ok(if link_meta.is_dir() {
                EntryKind::Folder
            } else {
                EntryKind::File
            });
        }

        let target = tokio::fs::metadata(path)
            .await
            .map_err(|source| scan_error(path, source))?;

        Ok(match (target.is_dir(), self.follow_links) {
            (true, true) => EntryKind::Folder,
            (true, false) => EntryKind::Skipped,
            (false, _) => EntryKind::File,
        })
    }
}

enum EntryKind {
    Folder,
    File,
    Skipped,
}

fn scan_error(path: &Path, source: std::io::Error) -> ImportError {
    ImportError::Scan {
        path: path.to_path_buf(),
        source,
    }
}

/// Derive a file's extension
///
/// Dot-prefixed (hidden) names and names without a dot have no extension.
/// Otherwise the extension is the final dot-separated segment, lower-cased.
pub fn extension_of(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_string_lossy();
    if name.starts_with('.') {
        return None;
    }
    let (_, ext) = name.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Whether `path` names a PDF (case-insensitive)
pub fn is_pdf(path: &Path) -> bool {
    path.to_string_lossy().to_lowercase().ends_with(".pdf")
}
