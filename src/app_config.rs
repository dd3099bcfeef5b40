use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::errors::ConfigError;
use crate::language_utils::LanguageTable;
use crate::subtitle_classifier::DEFAULT_FORCED_MAX_PERCENT;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Library roots to clean, processed in order
    #[serde(default)]
    pub content_dirs: Vec<PathBuf>,

    /// Recognized languages, 2-letter code -> 3-letter code
    #[serde(default = "default_languages")]
    pub languages: BTreeMap<String, String>,

    /// Largest forced track, as a percentage of the original track's size
    #[serde(default = "default_forced_max_percent")]
    pub forced_max_percent: u64,

    /// Extensions of metadata files to delete, without the dot
    #[serde(default = "default_metadata_extensions")]
    pub metadata_extensions: Vec<String>,

    /// File collecting subtitles that need a manual look
    #[serde(default)]
    pub review_log: Option<PathBuf>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
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
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_languages() -> BTreeMap<String, String> {
    BTreeMap::from([("en".to_string(), "eng".to_string())])
}

fn default_forced_max_percent() -> u64 {
    DEFAULT_FORCED_MAX_PERCENT
}

fn default_metadata_extensions() -> Vec<String> {
    vec!["nfo".to_string(), "txt".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Config {
            content_dirs: Vec::new(),
            languages: default_languages(),
            forced_max_percent: default_forced_max_percent(),
            metadata_extensions: default_metadata_extensions(),
            review_log: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Read a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Read a configuration file, writing a default one first if it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Self::from_file(path);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;

        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))
    }

    /// Validated language table built from `languages`
    pub fn language_table(&self) -> Result<LanguageTable, ConfigError> {
        LanguageTable::from_pairs(&self.languages)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.language_table()?;

        if !(1..=99).contains(&self.forced_max_percent) {
            return Err(ConfigError::InvalidThreshold(self.forced_max_percent));
        }

        if self.content_dirs.is_empty() {
            return Err(ConfigError::NoContentDirectories);
        }

        if self.metadata_extensions.iter().all(|ext| ext.trim().is_empty()) {
            return Err(ConfigError::NoMetadataExtensions);
        }

        Ok(())
    }
}
