//! Configuration module for quill.
//!
//! Handles loading and parsing the .quillrc configuration file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::editor::SessionOptions;
use crate::editor::history::{DEFAULT_MERGE_WINDOW_MS, MAX_UNDO_HISTORY};
use crate::logging::LogConfig;
use crate::syntax::Language;
use crate::syntax::debounce::{DEFAULT_DEBOUNCE_MS, MAX_DEBOUNCE_MS};

/// Default .quillrc file content with all settings documented.
const DEFAULT_QUILLRC: &str = r#"# Quill Configuration File
# ========================
# Lines starting with '#' are comments.

# Editing
# -------
# Edits closer together than this (milliseconds) share one undo step.
# undo_merge_window_ms = 300
# Undo steps kept before the oldest is dropped.
# max_undo_entries = 1000

# Highlighting
# ------------
# Debounce before re-tokenizing after an edit (milliseconds, max 2000).
# tokenize_debounce_ms = 75
# Language used when none can be inferred: javascript, typescript, css,
# html, python, markdown, json, plaintext
# language = plaintext

# Logging Configuration
# ---------------------
# Logs are stored in ~/.quill/logs/ with automatic cleanup.
#
# log_enabled = true       # Enable/disable file logging (true/false)
# log_level = info         # Log level: trace, debug, info, warn, error, off
# log_retention = 24       # Hours to keep log files (default: 24)
"#;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Undo merge window in milliseconds.
    pub undo_merge_window_ms: u64,
    /// Undo stack cap.
    pub max_undo_entries: usize,
    /// Tokenize debounce in milliseconds.
    pub tokenize_debounce_ms: u64,
    /// Fallback language.
    pub language: Language,
    /// Path to config file.
    pub config_path: PathBuf,
    /// Logging configuration.
    pub log_config: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            undo_merge_window_ms: DEFAULT_MERGE_WINDOW_MS,
            max_undo_entries: MAX_UNDO_HISTORY,
            tokenize_debounce_ms: DEFAULT_DEBOUNCE_MS,
            language: Language::PlainText,
            config_path: Self::default_config_path(),
            log_config: LogConfig::default(),
        }
    }
}

impl Config {
    /// Returns the default config file path (~/.quillrc).
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".quillrc")
    }

    /// Loads configuration from the default path, creating it if it doesn't exist.
    ///
    /// # Errors
    /// Returns error if the file cannot be created or read.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::default_config_path())
    }

    /// Loads configuration from a specific path.
    ///
    /// # Errors
    /// Returns error if the file cannot be created or read.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            Self::create_default_config(path)?;
        }

        let content = fs::read_to_string(path)?;
        let mut config = Self {
            config_path: path.to_path_buf(),
            ..Self::default()
        };
        config.parse(&content);
        Ok(config)
    }

    /// Parses config content on top of the defaults.
    #[must_use]
    pub fn from_content(content: &str) -> Self {
        let mut config = Self::default();
        config.parse(content);
        config
    }

    /// History options for new editing sessions.
    #[must_use]
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            merge_window: Duration::from_millis(self.undo_merge_window_ms),
            max_undo_entries: self.max_undo_entries,
        }
    }

    /// Debounce delay for the tokenize scheduler.
    #[must_use]
    pub fn tokenize_debounce(&self) -> Duration {
        Duration::from_millis(self.tokenize_debounce_ms)
    }

    fn create_default_config(path: &Path) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(DEFAULT_QUILLRC.as_bytes())?;
        Ok(())
    }

    fn parse(&mut self, content: &str) {
        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                let value = value.split('#').next().unwrap_or(value).trim();
                self.apply_setting(key, value);
            }
        }
    }

    fn apply_setting(&mut self, key: &str, value: &str) {
        match key {
            "undo_merge_window_ms" => {
                self.undo_merge_window_ms = value.parse().unwrap_or(DEFAULT_MERGE_WINDOW_MS);
            }
            "max_undo_entries" => {
                self.max_undo_entries = value
                    .parse()
                    .ok()
                    .filter(|&n| n > 0)
                    .unwrap_or(MAX_UNDO_HISTORY);
            }
            "tokenize_debounce_ms" => {
                self.tokenize_debounce_ms = value
                    .parse()
                    .ok()
                    .filter(|&ms| ms <= MAX_DEBOUNCE_MS)
                    .unwrap_or(DEFAULT_DEBOUNCE_MS);
            }
            "language" => {
                self.language = Language::from_id(value);
            }
            "log_level" => {
                self.log_config.level = LogConfig::parse_level(value);
            }
            "log_retention" | "log_retention_hours" => {
                self.log_config.retention_hours = LogConfig::parse_retention(value);
            }
            "log_enabled" | "logging" => {
                self.log_config.enabled =
                    matches!(value.to_lowercase().as_str(), "true" | "yes" | "1" | "on");
            }
            _ => debug!(key, "ignoring unknown config key"),
        }
    }
}
