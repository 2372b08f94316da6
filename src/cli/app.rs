//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{inspect, shrink};
use crate::storage::Config;

#[derive(Parser)]
#[command(name = "logtrim")]
#[command(author, version, about = "Shrink oversized chat-log markdown files")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Config file (defaults to .logtrim.toml, then the global config)
    #[arg(long, global = true, env = "LOGTRIM_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Shrink one log file in place, keeping a backup of the original
    Shrink {
        /// Log file to shrink
        file: PathBuf,

        /// Pass preset (compact, aggressive, restructure)
        #[arg(long, short)]
        preset: Option<String>,

        /// Report sizes without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Fail instead of falling back to the log when no backup exists
        #[arg(long)]
        require_backup: bool,
    },

    /// Shrink every large log in a directory
    Batch {
        /// Directory to scan (defaults to log_dir from the config)
        #[arg(env = "LOGTRIM_LOG_DIR")]
        dir: Option<PathBuf>,

        /// Only files larger than this many bytes are processed
        #[arg(long)]
        threshold: Option<u64>,

        /// Pass preset (compact, aggressive, restructure)
        #[arg(long, short)]
        preset: Option<String>,

        /// Report sizes without writing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// List the sections of a log
    Sections {
        /// Log file to inspect
        file: PathBuf,

        /// Show sections after project merging
        #[arg(long)]
        merged: bool,
    },

    /// Print the effective configuration
    Config,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("logtrim starting");

    let config = Config::load(cli.config.as_deref())?;
    match &config.source {
        Some(path) => output.verbose_ctx("config", &format!("Loaded {}", path.display())),
        None => output.verbose_ctx("config", "No config file found, using defaults"),
    }

    match cli.command {
        Commands::Shrink {
            file,
            preset,
            dry_run,
            require_backup,
        } => shrink::run(&output, &config, &file, preset.as_deref(), dry_run, require_backup)?,

        Commands::Batch {
            dir,
            threshold,
            preset,
            dry_run,
        } => shrink::batch(
            &output,
            &config,
            dir.as_deref(),
            threshold,
            preset.as_deref(),
            dry_run,
        )?,

        Commands::Sections { file, merged } => inspect::sections(&output, &config, &file, merged)?,

        Commands::Config => inspect::show_config(&output, &config)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
