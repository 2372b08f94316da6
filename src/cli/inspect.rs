//! Read-only commands: section listing and effective config

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::output::Output;
use crate::domain::{merge_projects, parse_log, Document};
use crate::storage::{Config, LogFileError};

#[derive(Debug, Serialize)]
struct SectionRow<'a> {
    line: usize,
    chars: usize,
    project: Option<&'a str>,
    heading: &'a str,
}

/// List the sections of a log
pub fn sections(output: &Output, config: &Config, file: &Path, merged: bool) -> Result<()> {
    if !file.is_file() {
        return Err(LogFileError::MissingInput(file.to_path_buf()).into());
    }

    let document = fs::read_to_string(file)
        .map(Document::new)
        .with_context(|| format!("Failed to read log: {}", file.display()))?;

    let parsed = parse_log(&document);
    let sections = if merged {
        merge_projects(parsed.sections)
    } else {
        parsed.sections
    };

    output.verbose_ctx(
        "sections",
        &format!(
            "{} sections (budget {} chars)",
            sections.len(),
            config.log.pipeline.section_budget
        ),
    );

    let rows: Vec<SectionRow> = sections
        .iter()
        .map(|section| SectionRow {
            line: section.line,
            chars: section.body.chars().count(),
            project: section.project(),
            heading: &section.heading,
        })
        .collect();

    if output.is_json() {
        output.data(&rows);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No sections");
        return Ok(());
    }

    let budget = config.log.pipeline.section_budget;
    println!("{:>6}  {:>8}  {:<16}  HEADING", "LINE", "CHARS", "PROJECT");
    for row in &rows {
        let marker = if row.chars > budget { " *" } else { "" };
        let heading = if row.heading.is_empty() {
            "(no heading)"
        } else {
            row.heading
        };
        println!(
            "{:>6}  {:>8}  {:<16}  {}{}",
            row.line,
            row.chars,
            row.project.unwrap_or("-"),
            heading,
            marker
        );
    }

    Ok(())
}

/// Print the effective configuration
pub fn show_config(output: &Output, config: &Config) -> Result<()> {
    if output.is_json() {
        output.data(&serde_json::json!({
            "source": config.source,
            "config": config.log,
        }));
        return Ok(());
    }

    match &config.source {
        Some(path) => println!("# Loaded from {}", path.display()),
        None => println!("# Defaults (no config file found)"),
    }
    print!("{}", config.to_toml()?);

    Ok(())
}
