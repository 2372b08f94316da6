//! # Storage Layer
//!
//! Filesystem side of logtrim: configuration files and log/backup pairs.
//!
//! ## Files
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Log | Markdown | any `*.md` path |
//! | Backup | Markdown | sibling `<name>.md.backup` (configurable) |
//! | Config | TOML | `.logtrim.toml` or the global config dir |
//!
//! ## Safety
//!
//! - Logs are rewritten atomically (temp file + rename)
//! - An exclusive advisory lock (`fs2`) is held during the rewrite
//! - The backup is created once and never overwritten
//!
//! ## Key Types
//!
//! - [`LogFile`] - A log and its backup
//! - [`Config`] - Loaded configuration with its source path

mod config;
mod logfile;

pub use config::{Config, ConfigError, LogConfig, PROJECT_CONFIG_FILE};
pub use logfile::{discover_large_logs, LogFile, LogFileError, SourceKind};
