use anyhow::{Context, Result, anyhow};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Database file name under the user data directory
const DATABASE_FILE: &str = "ezhuthu.db";

/// Application configuration: the translation function, object storage for
/// uploaded images and the local database. The language of each slot is
/// fixed (English primary, Tamil secondary) and not configurable.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Translation function settings
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Image upload settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Local database settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation function endpoint
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Full URL of the translation function
    #[serde(default = "default_translation_endpoint")]
    pub endpoint: String,

    /// API key sent as bearer token
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Keep translations in memory for the lifetime of the process
    #[serde(default = "default_true")]
    pub cache_enabled: bool,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_translation_endpoint(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            cache_enabled: true,
        }
    }
}

/// Object storage for uploaded images
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    /// Base URL of the storage service
    #[serde(default = "default_storage_endpoint")]
    pub endpoint: String,

    /// Bucket images are uploaded to
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// API key sent as bearer token
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: default_storage_endpoint(),
            bucket: default_bucket(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Local SQLite database
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// Database file; the user data directory is used when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_translation_endpoint() -> String {
    "http://localhost:54321/functions/v1/translate".to_string()
}

fn default_storage_endpoint() -> String {
    "http://localhost:54321/storage/v1".to_string()
}

fn default_bucket() -> String {
    "content-images".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Config {
            translation: TranslationConfig::default(),
            storage: StorageConfig::default(),
            database: DatabaseConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load `path`, or write and return the default configuration when the
    /// file does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;
        Ok(config)
    }

    /// Check endpoint URLs, bucket and timeouts
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.translation.endpoint)
            .with_context(|| format!("Invalid translation endpoint: {}", self.translation.endpoint))?;
        Url::parse(&self.storage.endpoint)
            .with_context(|| format!("Invalid storage endpoint: {}", self.storage.endpoint))?;

        if self.storage.bucket.trim().is_empty() {
            return Err(anyhow!("Storage bucket must not be empty"));
        }
        if self.translation.timeout_secs == 0 || self.storage.timeout_secs == 0 {
            return Err(anyhow!("Timeouts must be at least one second"));
        }

        Ok(())
    }

    /// Database file to open: the configured path, or
    /// `<data dir>/ezhuthu/ezhuthu.db`.
    pub fn database_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.database.path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_local_dir()
            .or_else(dirs::data_dir)
            .ok_or_else(|| anyhow!("Could not determine the user data directory"))?;
        Ok(data_dir.join(env!("CARGO_PKG_NAME")).join(DATABASE_FILE))
    }
}
