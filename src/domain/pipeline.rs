//! Pass pipeline and presets
//!
//! A [`Pipeline`] runs an ordered list of [`Pass`]es over one document and
//! records the size before and after each of them. Presets bundle the pass
//! orders that are useful in practice.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::code_block::{truncate_code_blocks, CodeBlockSettings, CodeBlockStyle};
use super::dedup::{dedup_raw_sections, dedup_sections, remove_empty_sections, DedupRules};
use super::document::Document;
use super::merge::{merge_project_headings, merge_projects};
use super::render::{render_log, DEFAULT_TITLE};
use super::section::parse_log;
use super::truncate::{
    compress_responses, truncate_sections, truncate_tables, ResponseRules, DEFAULT_SECTION_BUDGET,
    DEFAULT_TABLE_ROWS,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unknown preset: {0}. Use 'compact', 'aggressive', or 'restructure'")]
    UnknownPreset(String),

    #[error("Invalid filler pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Named pass order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// Short code blocks, streaming project merge, section budget, empty removal
    #[default]
    Compact,
    /// Head/tail code blocks, tables, responses, filler, section dedup
    Aggressive,
    /// Full parse, project merge, dedup, re-render
    Restructure,
}

impl Preset {
    pub fn as_str(&self) -> &str {
        match self {
            Preset::Compact => "compact",
            Preset::Aggressive => "aggressive",
            Preset::Restructure => "restructure",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Preset::Compact),
            "aggressive" => Ok(Preset::Aggressive),
            "restructure" => Ok(Preset::Restructure),
            other => Err(PipelineError::UnknownPreset(other.to_string())),
        }
    }
}

/// Tunables shared by all passes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineSettings {
    /// Title written when the log has none
    pub default_title: String,

    /// Character budget of one section body
    pub section_budget: usize,

    /// Rows kept from each table
    pub max_table_rows: usize,

    /// Run section dedup when restructuring
    pub restructure_dedup_sections: bool,

    /// Regular expressions whose matches are deleted by the filler pass
    pub filler_patterns: Vec<String>,

    pub code_blocks: CodeBlockSettings,

    pub dedup: DedupRules,

    pub responses: ResponseRules,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            default_title: DEFAULT_TITLE.to_string(),
            section_budget: DEFAULT_SECTION_BUDGET,
            max_table_rows: DEFAULT_TABLE_ROWS,
            restructure_dedup_sections: true,
            filler_patterns: vec![],
            code_blocks: CodeBlockSettings::default(),
            dedup: DedupRules::default(),
            responses: ResponseRules::default(),
        }
    }
}

/// Compiled filler patterns
#[derive(Debug, Clone)]
pub struct FillerFilter {
    patterns: Vec<Regex>,
}

impl FillerFilter {
    pub fn new(patterns: &[String]) -> Result<Self, PipelineError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|source| PipelineError::InvalidPattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    pub fn apply(&self, document: &Document) -> Document {
        let content = document.content();
        let output = match self {
            Pass::CodeBlocks(style) => truncate_code_blocks(content, *style),
            Pass::MergeHeadings => merge_project_headings(content),
            Pass::TruncateSections { budget } => truncate_sections(document, *budget),
            Pass::RemoveEmptySections => remove_empty_sections(content),
            Pass::TruncateTables { max_rows } => truncate_tables(content, *max_rows),
            Pass::CompressResponses(rules) => compress_responses(content, rules),
            Pass::RemoveFiller(filter) => filter.apply(content),
            Pass::DedupSections(rules) => dedup_raw_sections(document, rules),
            Pass::Restructure(options) => restructure(document, options),
        };
        Document::new(output)
    }
}

fn restructure(document: &Document, options: &RestructureOptions) -> String {
    let log = parse_log(document);
    let title = log.title.as_deref().unwrap_or(&options.default_title);

    let mut sections = merge_projects(log.sections);
    if options.dedup_sections {
        sections = dedup_sections(sections, &options.dedup);
    }

    render_log(title, &sections, options.dedup.min_paragraph_chars)
}

/// Size change caused by one pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub pass: &'static str,
    pub bytes_before: usize,
    pub bytes_after: usize,
}

/// Result of running a pipeline
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub output: Document,
    pub passes: Vec<PassReport>,
}

/// An ordered list of passes
#[derive(Debug, Clone)]
pub struct Pipeline {
    passes: Vec<Pass>,
}

impl Pipeline {
    pub fn new(passes: Vec<Pass>) -> Self {
        Self { passes }
    }

    /// Builds the pass list of a preset
    pub fn from_preset(preset: Preset, settings: &PipelineSettings) -> Result<Self, PipelineError> {
        let passes = match preset {
            Preset::Compact => vec![
                Pass::CodeBlocks(settings.code_blocks.head_style()),
                Pass::MergeHeadings,
                Pass::TruncateSections {
                    budget: settings.section_budget,
                },
                Pass::RemoveEmptySections,
            ],
            Preset::Aggressive => vec![
                Pass::CodeBlocks(settings.code_blocks.head_tail_style()),
                Pass::TruncateTables {
                    max_rows: settings.max_table_rows,
                },
                Pass::CompressResponses(settings.responses.clone()),
                Pass::RemoveFiller(FillerFilter::new(&settings.filler_patterns)?),
                Pass::DedupSections(settings.dedup.clone()),
            ],
            Preset::Restructure => vec![Pass::Restructure(RestructureOptions {
                default_title: settings.default_title.clone(),
                dedup: settings.dedup.clone(),
                dedup_sections: settings.restructure_dedup_sections,
            })],
        };

        Ok(Self::new(passes))
    }

    pub fn run(&self, input: &Document) -> PipelineRun {
        let mut document = input.clone();
        let mut reports = Vec::with_capacity(self.passes.len());

        for pass in &self.passes {
            let bytes_before = document.byte_len();
            document = pass.apply(&document);
            reports.push(PassReport {
                pass: pass.name(),
                bytes_before,
                bytes_after: document.byte_len(),
            });
        }

        PipelineRun {
            output: document,
            passes: reports,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(preset: Preset, input: &str) -> String {
        Pipeline::from_preset(preset, &PipelineSettings::default())
            .unwrap()
            .run(&Document::new(input))
            .output
            .content()
            .to_string()
    }

    #[test]
    fn preset_parsing() {
        assert_eq!("compact".parse::<Preset>().unwrap(), Preset::Compact);
        assert_eq!(" Aggressive ".parse::<Preset>().unwrap(), Preset::Aggressive);
        assert_eq!("restructure".parse::<Preset>().unwrap(), Preset::Restructure);
        assert!(matches!(
            "nope".parse::<Preset>(),
            Err(PipelineError::UnknownPreset(_))
        ));
    }

    #[test]
    fn invalid_filler_pattern_is_reported() {
        let settings = PipelineSettings {
            filler_patterns: vec!["(unclosed".to_string()],
            ..PipelineSettings::default()
        };
        let err = Pipeline::from_preset(Preset::Aggressive, &settings).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidPattern { .. }));
    }

    #[test]
    fn filler_matches_removed() {
        let filter = FillerFilter::new(&["um+,? ".to_string()]).unwrap();
        assert_eq!(filter.apply("so umm, we ship it"), "so we ship it");
    }

    #[test]
    fn compact_preset_end_to_end() {
        let code: Vec<String> = (1..=8).map(|i| format!("x = {}", i)).collect();
        let input = format!(
            "# 2026-01-18\n\n## /dev foo\n```py\n{}\n```\n## /dev foo\nmore\n## empty\n\n## Plan\nstep\n",
            code.join("\n")
        );
        let out = run(Preset::Compact, &input);

        assert_eq!(
            out,
            "# 2026-01-18\n\n## /dev foo\n```py\nx = 1\nx = 2\nx = 3\n... (8 lines total)\n```\n\n---\n\nmore\n## Plan\nstep\n"
        );
    }

    #[test]
    fn restructure_preset_end_to_end() {
        let input = "# 2026-01-18\n## /dev foo\nbodyA\n## /dev foo\nbodyB\n## /dev bar\nbodyC";
        let out = run(Preset::Restructure, input);

        assert_eq!(
            out,
            "# 2026-01-18\n\n## /dev foo\n\nbodyA\n\n---\n\nbodyB\n\n## /dev bar\n\nbodyC\n"
        );
    }

    #[test]
    fn restructure_uses_default_title() {
        let out = run(Preset::Restructure, "## a\nbody");
        assert!(out.starts_with("# Log\n\n## a\n"));
    }

    #[test]
    fn aggressive_preset_references_duplicate_sections() {
        let body = "the same long paragraph repeated again ".repeat(8);
        let input = format!("# T\n## one\n{}\n## two\n{}\n", body, body);
        let out = run(Preset::Aggressive, &input);

        assert!(out.contains("## two\n(Similar to section at line 2)\n"));
    }

    #[test]
    fn reports_sizes_per_pass() {
        let pipeline = Pipeline::from_preset(Preset::Compact, &PipelineSettings::default()).unwrap();
        let run = pipeline.run(&Document::new("## a\n## b\nbody"));

        let names: Vec<_> = run.passes.iter().map(|r| r.pass).collect();
        assert_eq!(
            names,
            ["code-blocks", "merge-headings", "truncate-sections", "remove-empty-sections"]
        );
        assert_eq!(run.passes[0].bytes_before, 14);
        assert_eq!(run.passes[3].bytes_after, run.output.byte_len());
        assert_eq!(run.output.content(), "## b\nbody");
    }
}
