//! Domain logic for logtrim
//!
//! Pure text transformations over an in-memory log, without any I/O.

mod code_block;
mod dedup;
mod document;
mod merge;
mod pipeline;
mod render;
mod section;
mod truncate;

pub use code_block::{CodeBlockSettings, CodeBlockStyle};
pub use dedup::{DedupPolicy, DedupRules};
pub use document::{Document, RawSection, RawSplit};
pub use merge::merge_projects;
pub use pipeline::{
    FillerFilter, Pass, PassReport, Pipeline, PipelineError, PipelineRun, PipelineSettings, Preset,
    RestructureOptions,
};
pub use section::{parse_log, ParsedLog, Section};
pub use truncate::{group_thousands, ResponseRules};
