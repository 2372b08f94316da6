//! logtrim - shrink oversized chat-log markdown files
//!
//! A log is a markdown document of `## ` sections. logtrim runs a
//! configurable pipeline of passes over it (code block truncation, project
//! heading merging, section truncation, deduplication) and writes the result
//! back in place, keeping the original as a backup that later runs start from.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Document, Pipeline, PipelineSettings, Preset};
