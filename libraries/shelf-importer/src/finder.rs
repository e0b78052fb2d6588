//! External content-duplicate finder
//!
//! Runs an `rmlint`-compatible tool over the library's storage directory and
//! the folder being imported, and reports the files it flags as duplicates.
//! The check is best effort: any problem with the tool degrades to an empty
//! result so the import can go ahead without it.

use crate::{ImportError, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

const DUPLICATE_FILE_TYPE: &str = "duplicate_file";

/// Content-duplicate finder backed by an external tool
#[derive(Debug, Clone, Default)]
pub struct ContentDuplicateFinder {
    tool: Option<PathBuf>,
    temp_dir: Option<PathBuf>,
}

impl ContentDuplicateFinder {
    /// Create a finder for the tool at `tool` (`None` disables the check)
    pub fn new(tool: Option<PathBuf>) -> Self {
        Self {
            tool,
            temp_dir: None,
        }
    }

    /// A finder that never reports anything
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Write the tool's report under `dir` instead of the OS temp directory
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn tool(&self) -> Option<&Path> {
        self.tool.as_deref()
    }

    /// Find files under `scan_root` whose content duplicates another file
    /// there or in `storage_dir`
    pub async fn find(&self, storage_dir: &Path, scan_root: &Path) -> Vec<PathBuf> {
        let Some(tool) = self.usable_tool().await else {
            return Vec::new();
        };

        match self.run(tool, storage_dir, scan_root).await {
            Ok(paths) => {
                tracing::debug!("{} reported {} duplicate files", tool.display(), paths.len());
                paths
            }
            Err(e) => {
                tracing::debug!("Content duplicate check skipped: {}", e);
                Vec::new()
            }
        }
    }

    async fn usable_tool(&self) -> Option<&Path> {
        let Some(tool) = self.tool.as_deref() else {
            tracing::debug!("No duplicate finder configured");
            return None;
        };

        let metadata = match tokio::fs::metadata(tool).await {
            Ok(metadata) => metadata,
            Err(e) => {
                tracing::debug!("Duplicate finder {} unavailable: {}", tool.display(), e);
                return None;
            }
        };

        if !metadata.is_file() {
            tracing::debug!("Duplicate finder {} is not a file", tool.display());
            return None;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if metadata.permissions().mode() & 0o111 == 0 {
                tracing::debug!("Duplicate finder {} is not executable", tool.display());
                return None;
            }
        }

        Some(tool)
    }

    async fn run(&self, tool: &Path, storage_dir: &Path, scan_root: &Path) -> Result<Vec<PathBuf>> {
        let builder = {
            let mut builder = tempfile::Builder::new();
            builder.prefix("shelf-dupes-").suffix(".json");
            builder
        };
        let report = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        }
        .into_temp_path();

        let result = invoke(tool, &report, storage_dir, scan_root).await;

        if let Err(e) = report.close() {
            tracing::debug!("Failed to remove duplicate report: {}", e);
        }

        result
    }
}

async fn invoke(
    tool: &Path,
    report: &Path,
    storage_dir: &Path,
    scan_root: &Path,
) -> Result<Vec<PathBuf>> {
    tracing::debug!(
        "Running {} over {} and {}",
        tool.display(),
        storage_dir.display(),
        scan_root.display()
    );

    let output = Command::new(tool)
        .arg("-o")
        .arg(format!("json:{}", report.display()))
        .arg("-T")
        .arg("df")
        .arg(storage_dir)
        .arg(scan_root)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| {
            ImportError::DuplicateFinder(format!("failed to launch {}: {}", tool.display(), e))
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ImportError::DuplicateFinder(format!(
            "{} exited with {}: {}",
            tool.display(),
            output.status,
            stderr.trim()
        )));
    }

    let contents = tokio::fs::read_to_string(report).await?;
    parse_report(&contents)
}

#[derive(Debug, Deserialize)]
struct ReportEntry {
    #[serde(rename = "type")]
    kind: Option<String>,
    path: Option<PathBuf>,
}

/// Extract duplicate file paths from an `rmlint` JSON report
///
/// Keeps entries typed `duplicate_file` that carry a path, in report order,
/// without repeats.
pub fn parse_report(json: &str) -> Result<Vec<PathBuf>> {
    let entries: Vec<ReportEntry> = serde_json::from_str(json)?;

    let mut seen = HashSet::new();
    let paths = entries
        .into_iter()
        .filter(|entry| entry.kind.as_deref() == Some(DUPLICATE_FILE_TYPE))
        .filter_map(|entry| entry.path)
        .filter(|path| seen.insert(path.clone()))
        .collect();

    Ok(paths)
}
