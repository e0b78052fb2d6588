/// CLI configuration
use serde::{Deserialize, Serialize};
use shelf_importer::{ContentDuplicateFinder, ImportSettings};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default configuration file, read from the working directory when present
pub const DEFAULT_CONFIG_FILE: &str = "shelf.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShelfConfig {
    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_import")]
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Directory imported files are copied into
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImportConfig {
    /// `rmlint`-compatible tool for content duplicate checks
    #[serde(default)]
    pub duplicate_finder: Option<PathBuf>,

    /// Where the duplicate finder writes its report
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,

    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    #[serde(default = "default_follow_links")]
    pub follow_links: bool,
}

impl ShelfConfig {
    /// Load configuration from file and environment
    ///
    /// Reads `path` if given (it must exist), else `shelf.toml` when present,
    /// then applies `SHELF_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_from(path, Self::environment())
    }

    /// Load configuration with an explicit environment source
    pub fn load_from(
        path: Option<&Path>,
        environment: config::Environment,
    ) -> Result<Self, ConfigError> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path).required(true));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        let config = settings.add_source(environment).build()?;
        Ok(config.try_deserialize()?)
    }

    /// Environment overrides, e.g. `SHELF_STORAGE__DATABASE_URL`
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix("SHELF")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "database URL is required (set SHELF_STORAGE__DATABASE_URL)".to_string(),
            ));
        }

        if let Some(finder) = &self.import.duplicate_finder {
            if finder.is_dir() {
                return Err(ConfigError::Invalid(format!(
                    "duplicate finder {:?} is a directory",
                    finder
                )));
            }
        }

        Ok(())
    }

    pub fn import_settings(&self) -> ImportSettings {
        ImportSettings {
            throttle: Duration::from_millis(self.import.throttle_ms),
            settle_delay: Duration::from_millis(self.import.settle_ms),
            follow_links: self.import.follow_links,
        }
    }

    pub fn duplicate_finder(&self) -> ContentDuplicateFinder {
        let finder = ContentDuplicateFinder::new(self.import.duplicate_finder.clone());
        match &self.import.temp_dir {
            Some(dir) => finder.with_temp_dir(dir),
            None => finder,
        }
    }

    /// Storage directory as an absolute path
    ///
    /// A relative `storage_path` is taken relative to the working directory.
    pub fn storage_dir(&self) -> Result<PathBuf, ConfigError> {
        let path = &self.storage.storage_path;
        if path.is_absolute() {
            return Ok(path.clone());
        }
        let cwd = std::env::current_dir().map_err(|e| {
            ConfigError::Invalid(format!("cannot resolve storage path {:?}: {}", path, e))
        })?;
        Ok(cwd.join(path.strip_prefix(".").unwrap_or(path)))
    }

    /// Database file behind a `sqlite://` URL, if it names one
    pub fn database_file(&self) -> Option<PathBuf> {
        let path = self
            .storage
            .database_url
            .strip_prefix("sqlite://")
            .or_else(|| self.storage.database_url.strip_prefix("sqlite:"))?;
        let path = path.split('?').next().unwrap_or_default();
        if path.is_empty() || path == ":memory:" {
            return None;
        }
        Some(PathBuf::from(path))
    }
}

// Default values
fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
        storage_path: default_storage_path(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/shelf.db".to_string()
}

fn default_storage_path() -> PathBuf {
    PathBuf::from("./data/storage")
}

fn default_import() -> ImportConfig {
    ImportConfig {
        duplicate_finder: None,
        temp_dir: None,
        throttle_ms: default_throttle_ms(),
        settle_ms: default_settle_ms(),
        follow_links: default_follow_links(),
    }
}

fn default_throttle_ms() -> u64 {
    10
}

fn default_settle_ms() -> u64 {
    10
}

fn default_follow_links() -> bool {
    true
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            storage: default_storage(),
            import: default_import(),
        }
    }
}
