//! Configuration file handling for ~/.placetrie/config.ini.
//!
//! The CLI reads shard-set settings from this file so that `placetrie lookup`
//! works without repeating `--shard-root` on every call. CLI arguments
//! override config file values when specified.

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::service::LookupConfig;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read or parse the config file
    #[error("failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write the config file
    #[error("failed to write config file: {0}")]
    WriteError(String),

    /// Failed to create the config directory
    #[error("failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

/// Settings stored in the `[shards]` and `[lookup]` sections.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Base URL or directory for shard files.
    pub shard_root: String,
    /// File name stem of the shard set.
    pub shard_base: String,
    /// File name suffix, extension included.
    pub shard_suffix: String,
    /// Result cap per lookup.
    pub max_results: usize,
    /// Folded characters per shard key.
    pub shard_prefix_len: usize,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let lookup = LookupConfig::default();
        ConfigFile {
            shard_root: lookup.shard_root().to_string(),
            shard_base: lookup.shard_base().to_string(),
            shard_suffix: lookup.shard_suffix().to_string(),
            max_results: lookup.max_results(),
            shard_prefix_len: lookup.shard_prefix_len(),
        }
    }
}

impl ConfigFile {
    /// Load configuration from the default path (~/.placetrie/config.ini).
    ///
    /// Returns defaults if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load configuration from a specific path.
    ///
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        let mut config = Self::default();

        if let Some(section) = ini.section(Some("shards")) {
            if let Some(root) = section.get("root") {
                config.shard_root = root.to_string();
            }
            if let Some(base) = section.get("base") {
                config.shard_base = base.to_string();
            }
            if let Some(suffix) = section.get("suffix") {
                config.shard_suffix = suffix.to_string();
            }
        }
        if let Some(section) = ini.section(Some("lookup")) {
            if let Some(value) = section.get("max_results") {
                if let Ok(parsed) = value.parse() {
                    config.max_results = parsed;
                }
            }
            if let Some(value) = section.get("prefix_len") {
                if let Ok(parsed) = value.parse() {
                    config.shard_prefix_len = parsed;
                }
            }
        }
        Ok(config)
    }

    /// Save configuration to the default path (~/.placetrie/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        let mut ini = Ini::new();
        ini.with_section(Some("shards"))
            .set("root", &self.shard_root)
            .set("base", &self.shard_base)
            .set("suffix", &self.shard_suffix);
        ini.with_section(Some("lookup"))
            .set("max_results", self.max_results.to_string())
            .set("prefix_len", self.shard_prefix_len.to_string());
        ini.write_to_file(path)
            .map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }

    /// Turn file settings into a [`LookupConfig`].
    pub fn to_lookup_config(&self) -> LookupConfig {
        LookupConfig::default()
            .with_shard_root(self.shard_root.clone())
            .with_shard_base(self.shard_base.clone())
            .with_shard_suffix(self.shard_suffix.clone())
            .with_max_results(self.max_results)
            .with_shard_prefix_len(self.shard_prefix_len)
    }
}

/// Path to the config directory (~/.placetrie).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".placetrie")
}

/// Path to the config file (~/.placetrie/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
