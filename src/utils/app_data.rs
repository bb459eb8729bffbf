use crate::index::types::IndexMeta;
use crate::index::writer::META_FILE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "namedex";
const CONFIG_FILE: &str = "config.json";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Maximum number of query results kept by the result cache (0 disables it)
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Page size used when a request does not name one
    #[serde(default = "default_limit")]
    pub default_limit: usize,

    /// Largest page size a request may ask for
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Added to the running match count when a search stops early, so the
    /// reported total reads as "at least this many"
    #[serde(default = "default_search_total_padding")]
    pub search_total_padding: u64,
}

fn default_cache_capacity() -> usize {
    100
}

fn default_limit() -> usize {
    50
}

fn default_max_limit() -> usize {
    500
}

fn default_search_total_padding() -> u64 {
    100
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_capacity: default_cache_capacity(),
            default_limit: default_limit(),
            max_limit: default_max_limit(),
            search_total_padding: default_search_total_padding(),
        }
    }
}

impl AppConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    /// Load config from an explicit file, or return default if it does not exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path).context("Failed to read config file")?;
            let config: AppConfig =
                serde_json::from_str(&content).context("Failed to parse config file")?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(CONFIG_FILE))
}

/// Get the application data directory for storing indexes
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    let app_dir = base.join(APP_NAME);

    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

/// Get the index directory for a specific dataset file
pub fn get_index_dir(dataset: &Path) -> Result<PathBuf> {
    let app_data = get_app_data_dir()?;
    let indexes_dir = app_data.join("indexes");
    fs::create_dir_all(&indexes_dir)?;

    Ok(indexes_dir.join(hash_path(dataset)))
}

/// Folder name for a dataset: sanitized file stem + hash of the full path
fn hash_path(path: &Path) -> String {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    let path_str = canonical.to_string_lossy();

    let stem = canonical
        .file_stem()
        .and_then(|n| n.to_str())
        .unwrap_or("dataset");

    let sanitized: String = stem
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .take(16)
        .collect();

    let mut hasher = DefaultHasher::new();
    path_str.hash(&mut hasher);
    let hash = hasher.finish();

    format!("{}-{:016x}", sanitized, hash)
}

/// List all datasets with an index in the app data directory
pub fn list_indexed_datasets() -> Result<Vec<IndexLocation>> {
    let app_data = get_app_data_dir()?;
    let indexes_dir = app_data.join("indexes");

    if !indexes_dir.exists() {
        return Ok(Vec::new());
    }

    let mut datasets = Vec::new();

    for entry in fs::read_dir(&indexes_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }

        // Index directories without readable metadata are skipped
        let meta = fs::File::open(path.join(META_FILE))
            .ok()
            .and_then(|f| serde_json::from_reader::<_, IndexMeta>(f).ok());
        if let Some(meta) = meta {
            datasets.push(IndexLocation {
                dataset_path: meta.dataset_path,
                index_dir: path,
            });
        }
    }

    datasets.sort_by(|a, b| a.dataset_path.cmp(&b.dataset_path));
    Ok(datasets)
}

/// Remove the default-location index for a dataset
pub fn remove_index(dataset: &Path) -> Result<()> {
    let index_dir = get_index_dir(dataset)?;
    if index_dir.exists() {
        fs::remove_dir_all(&index_dir)?;
    }
    Ok(())
}

/// Information about an indexed dataset
#[derive(Debug, Clone)]
pub struct IndexLocation {
    pub dataset_path: PathBuf,
    pub index_dir: PathBuf,
}
