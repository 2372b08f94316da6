//! # Command-Line Interface
//!
//! User-facing commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `shrink <FILE>` | Shrink one log in place, keeping a backup |
//! | `batch [DIR]` | Shrink every log above the size threshold |
//! | `sections <FILE>` | List headings, lines and sizes |
//! | `config` | Print the effective configuration |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for per-pass sizes on stderr:
//! ```bash
//! logtrim --verbose shrink 2026-01-18.md
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod inspect;
mod output;
mod shrink;

pub use app::{Cli, Commands, run};
pub use output::{Output, OutputFormat};
