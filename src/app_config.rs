use anyhow::{Context, Result};
use log::{warn, LevelFilter};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use url::Url;

use crate::errors::AppError;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Root of the unpacked game or mod (contains `Localization/`)
    #[serde(default)]
    pub game_root: String,

    /// Directory the source-language files are staged into and extracted from
    #[serde(default = "default_input_dir")]
    pub input_dir: String,

    /// Merged translation file written at the end of each run
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// SQLite store holding every known record
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Localization folder name of the source language
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Localization folder name of the already translated reference pack
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Import translations from the reference pack before calling the API
    #[serde(default = "default_true")]
    pub seed_from_reference: bool,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation backend configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TranslationConfig {
    // @field: API key
    #[serde(default)]
    pub api_key: String,

    // @field: OpenAI-compatible base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    // @field: Model name
    #[serde(default = "default_model")]
    pub model: String,

    // @field: Max concurrent requests
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    // @field: Timeout seconds per translation call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    // @field: Instruction placed before every source string
    #[serde(default = "default_prompt_prefix")]
    pub prompt_prefix: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            max_workers: default_max_workers(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            prompt_prefix: default_prompt_prefix(),
        }
    }
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
    /// Matching `log` filter
    pub fn to_level_filter(&self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn default_input_dir() -> String {
    "input".to_string()
}

fn default_output_file() -> String {
    "translated_content.xml".to_string()
}

fn default_database_path() -> String {
    "translations.db".to_string()
}

fn default_source_language() -> String {
    "English".to_string()
}

fn default_target_language() -> String {
    "Chinese".to_string()
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "https://api.deepseek.com".to_string()
}

fn default_model() -> String {
    "deepseek-chat".to_string()
}

fn default_max_workers() -> usize {
    // Keep this low; short strings take roughly 0.3-1s each and most
    // providers throttle on requests per minute
    5
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_temperature() -> f32 {
    1.3
}

fn default_prompt_prefix() -> String {
    "请将以下内容翻译成中文：".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            game_root: String::new(),
            input_dir: default_input_dir(),
            output_file: default_output_file(),
            database_path: default_database_path(),
            source_language: default_source_language(),
            target_language: default_target_language(),
            seed_from_reference: true,
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load the configuration file, writing a default one when it is missing
    pub fn load_or_create<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        if config_path.exists() {
            let file = File::open(config_path)
                .with_context(|| format!("Failed to open config file: {:?}", config_path))?;

            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .with_context(|| format!("Failed to write default config to file: {:?}", config_path))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    ///
    /// The API key is only required when the run will call the API.
    pub fn validate(&self, needs_api: bool) -> Result<(), AppError> {
        if self.output_file.trim().is_empty() {
            return Err(AppError::Config("output_file must not be empty".to_string()));
        }

        if self.database_path.trim().is_empty() {
            return Err(AppError::Config("database_path must not be empty".to_string()));
        }

        if self.translation.max_workers == 0 {
            return Err(AppError::Config("translation.max_workers must be at least 1".to_string()));
        }

        if self.translation.timeout_secs == 0 {
            return Err(AppError::Config("translation.timeout_secs must be at least 1".to_string()));
        }

        if needs_api {
            if self.translation.api_key.trim().is_empty() {
                return Err(AppError::Config("translation.api_key is required".to_string()));
            }

            Url::parse(&self.translation.base_url).map_err(|e| {
                AppError::Config(format!(
                    "translation.base_url {:?} is not a valid URL: {}",
                    self.translation.base_url, e
                ))
            })?;
        }

        Ok(())
    }

    /// `<game_root>/Localization`
    pub fn localization_root(&self) -> PathBuf {
        Path::new(&self.game_root).join("Localization")
    }

    /// `<game_root>/Localization/<target_language>`
    pub fn reference_dir(&self) -> PathBuf {
        self.localization_root().join(&self.target_language)
    }
}
