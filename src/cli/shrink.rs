//! Shrink and batch commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::output::{format_size, megabytes, reduction_pct, Output};
use crate::domain::{group_thousands, PassReport, Pipeline, Preset};
use crate::storage::{discover_large_logs, Config, LogConfig, LogFile};

/// Result of shrinking one file
#[derive(Debug, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    /// `backup` or `original`
    pub source: String,
    pub original_bytes: usize,
    pub new_bytes: usize,
    pub reduction_pct: f64,
    pub backup_created: bool,
    pub written: bool,
    pub passes: Vec<PassReport>,
}

/// Summary of a batch run
#[derive(Debug, Serialize)]
struct BatchSummary {
    dir: PathBuf,
    preset: Preset,
    threshold: u64,
    dry_run: bool,
    processed_at: DateTime<Utc>,
    files: Vec<FileOutcome>,
    total_original_bytes: usize,
    total_new_bytes: usize,
    total_reduction_pct: f64,
}

/// Resolves the preset from the command line or the config
fn resolve_preset(cli_preset: Option<&str>, config: &LogConfig) -> Result<Preset> {
    match cli_preset {
        Some(name) => Ok(name.parse()?),
        None => Ok(config.preset),
    }
}

/// Runs the pipeline over one log and writes the result back
pub fn process_file(
    output: &Output,
    config: &LogConfig,
    pipeline: &Pipeline,
    path: &Path,
    dry_run: bool,
    require_backup: bool,
) -> Result<FileOutcome> {
    let log = LogFile::new(path, &config.backup_suffix);
    let (document, source) = log.read_source(require_backup)?;

    output.verbose_ctx(
        "shrink",
        &format!("Reading {} ({})", log.path().display(), source.as_str()),
    );

    let run = pipeline.run(&document);
    for report in &run.passes {
        output.verbose_ctx(
            report.pass,
            &format!("{} -> {} bytes", report.bytes_before, report.bytes_after),
        );
    }

    let mut backup_created = false;
    if !dry_run {
        backup_created = log.ensure_backup()?;
        if backup_created {
            output.verbose_ctx("shrink", &format!("Backup saved: {}", log.backup_path().display()));
        }
        log.write(&run.output)
            .with_context(|| format!("Failed to save {}", log.path().display()))?;
    }

    let original_bytes = document.byte_len();
    let new_bytes = run.output.byte_len();

    Ok(FileOutcome {
        path: log.path().to_path_buf(),
        source: source.as_str().to_string(),
        original_bytes,
        new_bytes,
        reduction_pct: reduction_pct(original_bytes, new_bytes),
        backup_created,
        written: !dry_run,
        passes: run.passes,
    })
}

/// Run the shrink command
pub fn run(
    output: &Output,
    config: &Config,
    file: &Path,
    preset: Option<&str>,
    dry_run: bool,
    require_backup: bool,
) -> Result<()> {
    let preset = resolve_preset(preset, &config.log)?;
    let pipeline = Pipeline::from_preset(preset, &config.log.pipeline)?;

    output.verbose_ctx("shrink", &format!("Using preset: {}", preset));

    let outcome = process_file(output, &config.log, &pipeline, file, dry_run, require_backup)?;

    if output.is_json() {
        output.data(&outcome);
        return Ok(());
    }

    println!("Original size: {}", format_size(outcome.original_bytes));
    println!("New size: {}", format_size(outcome.new_bytes));
    println!("Reduction: {:.1}%", outcome.reduction_pct);

    if dry_run {
        println!("Dry run: nothing written");
    } else {
        if outcome.backup_created {
            let backup = LogFile::new(file, &config.log.backup_suffix);
            println!("Backup saved: {}", backup.backup_path().display());
        }
        println!("Saved: {}", file.display());
    }

    Ok(())
}

/// Run the batch command
pub fn batch(
    output: &Output,
    config: &Config,
    dir: Option<&Path>,
    threshold: Option<u64>,
    preset: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let dir = dir
        .map(Path::to_path_buf)
        .or_else(|| config.log.log_dir.clone())
        .ok_or_else(|| anyhow::anyhow!("No directory given and no log_dir configured"))?;

    if !dir.is_dir() {
        anyhow::bail!("Directory not found: {}", dir.display());
    }

    let threshold = threshold.unwrap_or(config.log.size_threshold);
    let preset = resolve_preset(preset, &config.log)?;
    let pipeline = Pipeline::from_preset(preset, &config.log.pipeline)?;

    let files = discover_large_logs(&dir, threshold, &config.log.backup_suffix)?;
    output.verbose_ctx(
        "batch",
        &format!("Scanning {} (threshold {} bytes, preset {})", dir.display(), threshold, preset),
    );
    output.line(&format!("Found {} large files to process\n", files.len()));

    let mut outcomes = Vec::with_capacity(files.len());
    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        output.line(&format!("Processing: {}", name));

        let outcome = process_file(output, &config.log, &pipeline, path, dry_run, false)?;
        output.line(&format!(
            "  {} -> {} bytes ({:.1}% reduction)\n",
            group_thousands(outcome.original_bytes),
            group_thousands(outcome.new_bytes),
            outcome.reduction_pct
        ));
        outcomes.push(outcome);
    }

    let total_original: usize = outcomes.iter().map(|o| o.original_bytes).sum();
    let total_new: usize = outcomes.iter().map(|o| o.new_bytes).sum();
    let total_reduction = reduction_pct(total_original, total_new);

    if output.is_json() {
        output.data(&BatchSummary {
            dir,
            preset,
            threshold,
            dry_run,
            processed_at: Utc::now(),
            files: outcomes,
            total_original_bytes: total_original,
            total_new_bytes: total_new,
            total_reduction_pct: total_reduction,
        });
        return Ok(());
    }

    println!("{}", "=".repeat(50));
    println!(
        "Total: {:.2}MB -> {:.2}MB ({:.1}% reduction)",
        megabytes(total_original),
        megabytes(total_new),
        total_reduction
    );

    Ok(())
}
