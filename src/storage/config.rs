//! Configuration handling for logtrim
//!
//! Configuration is read from the first of:
//! - an explicit `--config` path
//! - `.logtrim.toml` in the current directory or a parent
//! - `~/.config/logtrim/config.toml` (platform equivalent)
//!
//! Every field has a default, so an empty or missing file is valid.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{PipelineSettings, Preset};

/// File name of the project-level configuration
pub const PROJECT_CONFIG_FILE: &str = ".logtrim.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Settings for finding, backing up and rewriting logs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Directory scanned by `batch` when no directory is given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Files larger than this many bytes are processed by `batch`
    pub size_threshold: u64,

    /// Extension of the backup file, replacing the log's own extension
    pub backup_suffix: String,

    /// Preset used when none is given on the command line
    pub preset: Preset,

    /// Pass tunables
    pub pipeline: PipelineSettings,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: None,
            size_threshold: 1_000_000,
            backup_suffix: "md.backup".to_string(),
            preset: Preset::Compact,
            pipeline: PipelineSettings::default(),
        }
    }
}

impl LogConfig {
    /// Rejects settings no pass can work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backup_suffix.trim_matches('.').is_empty() {
            return Err(ConfigError::Invalid("backup_suffix must not be empty".into()));
        }
        if self.pipeline.section_budget == 0 {
            return Err(ConfigError::Invalid("pipeline.section_budget must be positive".into()));
        }
        let code = &self.pipeline.code_blocks;
        if code.keep_lines > code.max_lines {
            return Err(ConfigError::Invalid(
                "pipeline.code_blocks.keep_lines must not exceed max_lines".into(),
            ));
        }
        // A block just over the threshold must still lose at least one line
        if code.head_lines + code.tail_lines > code.long_max_lines {
            return Err(ConfigError::Invalid(
                "pipeline.code_blocks.head_lines + tail_lines must not exceed long_max_lines".into(),
            ));
        }
        let responses = &self.pipeline.responses;
        if responses.head_lines + responses.tail_lines > responses.max_lines {
            return Err(ConfigError::Invalid(
                "pipeline.responses.head_lines + tail_lines must not exceed max_lines".into(),
            ));
        }
        Ok(())
    }
}

/// Loaded configuration and where it came from
#[derive(Debug, Clone)]
pub struct Config {
    pub log: LogConfig,
    pub source: Option<PathBuf>,
}

impl Config {
    /// Loads configuration from an explicit path or the default locations
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Self::from_file(path);
        }

        let candidates = [
            std::env::current_dir()
                .ok()
                .and_then(|dir| Self::find_project_file(&dir)),
            Self::global_config_path().filter(|p| p.is_file()),
        ];

        match candidates.into_iter().flatten().next() {
            Some(path) => Self::from_file(&path),
            None => Ok(Self {
                log: LogConfig::default(),
                source: None,
            }),
        }
    }

    /// Reads and validates one config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let log: LogConfig = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        log.validate()?;

        Ok(Self {
            log,
            source: Some(path.to_path_buf()),
        })
    }

    /// Returns the global config file path
    pub fn global_config_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "logtrim", "logtrim")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Finds `.logtrim.toml` in `start` or one of its parents
    pub fn find_project_file(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let candidate = current.join(PROJECT_CONFIG_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    /// Renders the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(&self.log).context("Failed to serialize config")
    }
}
