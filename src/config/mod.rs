//! Configuration management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::translate::deepl::{
    DEFAULT_SOURCE_LANG, DEFAULT_TARGET_LANG, Formality, SplitSentences,
};
use crate::translate::{DEFAULT_BATCH_DELAY_MS, DEFAULT_BATCH_SIZE};

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "glossfill";
pub const API_KEY_ENV: &str = "DEEPL_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub deepl: DeepLConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepLConfig {
    /// DeepL API key (free or pro)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Override for the API base URL
    #[serde(default)]
    pub api_base: Option<String>,

    #[serde(default = "default_source_lang")]
    pub source_lang: String,

    #[serde(default = "default_target_lang")]
    pub target_lang: String,

    #[serde(default)]
    pub formality: Formality,

    #[serde(default)]
    pub split_sentences: SplitSentences,

    /// Texts per request
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Pause between requests, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_source_lang() -> String {
    DEFAULT_SOURCE_LANG.to_string()
}

fn default_target_lang() -> String {
    DEFAULT_TARGET_LANG.to_string()
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_delay_ms() -> u64 {
    DEFAULT_BATCH_DELAY_MS
}

impl Default for DeepLConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: None,
            source_lang: default_source_lang(),
            target_lang: default_target_lang(),
            formality: Formality::default(),
            split_sentences: SplitSentences::default(),
            batch_size: default_batch_size(),
            delay_ms: default_delay_ms(),
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(APP_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load config from `path`, or the default location when `None`.
    /// A missing file yields the defaults.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::config_path() {
                Some(p) => p,
                None => {
                    tracing::warn!("Could not determine config directory, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            tracing::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// API key from the config file, falling back to the environment.
    pub fn get_api_key(&self) -> Option<String> {
        self.deepl
            .api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()))
    }
}
