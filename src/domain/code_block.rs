//! Fenced code block truncation
//!
//! A block runs from an opening fence with an optional word-like language tag
//! to the first following fence. Oversized blocks are rewritten to a short
//! fenced block that states how much was left out.

use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

fn fence_regex() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"(?s)```(\w*)\n(.*?)```").expect("Invalid fence regex pattern"))
}

/// How oversized blocks are shortened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeBlockStyle {
    /// Keep the first `keep` lines and state the total line count
    Head { max_lines: usize, keep: usize },
    /// Keep the first `head` and last `tail` lines and state the omitted count
    HeadTail {
        max_lines: usize,
        head: usize,
        tail: usize,
    },
}

impl CodeBlockStyle {
    fn max_lines(&self) -> usize {
        match *self {
            CodeBlockStyle::Head { max_lines, .. } | CodeBlockStyle::HeadTail { max_lines, .. } => {
                max_lines
            }
        }
    }
}

/// Thresholds for both truncation styles
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CodeBlockSettings {
    /// Blocks longer than this are cut by the head style
    pub max_lines: usize,
    /// Lines kept by the head style
    pub keep_lines: usize,
    /// Blocks longer than this are cut by the head/tail style
    pub long_max_lines: usize,
    /// Leading lines kept by the head/tail style
    pub head_lines: usize,
    /// Trailing lines kept by the head/tail style
    pub tail_lines: usize,
}

impl Default for CodeBlockSettings {
    fn default() -> Self {
        Self {
            max_lines: 5,
            keep_lines: 3,
            long_max_lines: 20,
            head_lines: 10,
            tail_lines: 5,
        }
    }
}

impl CodeBlockSettings {
    pub fn head_style(&self) -> CodeBlockStyle {
        CodeBlockStyle::Head {
            max_lines: self.max_lines,
            keep: self.keep_lines,
        }
    }

    pub fn head_tail_style(&self) -> CodeBlockStyle {
        CodeBlockStyle::HeadTail {
            max_lines: self.long_max_lines,
            head: self.head_lines,
            tail: self.tail_lines,
        }
    }
}

/// A fenced block found in a document
#[derive(Debug, Clone, PartialEq, Eq)]
struct CodeBlock<'a> {
    /// Language tag, empty when the fence has none
    lang: &'a str,
    lines: Vec<&'a str>,
}

impl<'a> CodeBlock<'a> {
    fn from_captures(caps: &Captures<'a>) -> Self {
        let lang = caps.get(1).map_or("", |m| m.as_str());
        let code = caps.get(2).map_or("", |m| m.as_str()).trim_matches('\n');
        Self {
            lang,
            lines: code.split('\n').collect(),
        }
    }

    /// Renders the shortened form, or `None` when the block fits the style
    fn shorten(&self, style: CodeBlockStyle) -> Option<String> {
        let total = self.lines.len();
        if total <= style.max_lines() {
            return None;
        }

        match style {
            CodeBlockStyle::Head { keep, .. } => {
                let head = self.lines[..keep.min(total)].join("\n");
                Some(format!("```{}\n{}\n... ({} lines total)\n```", self.lang, head, total))
            }
            CodeBlockStyle::HeadTail { head, tail, .. } => {
                if head + tail >= total {
                    return None;
                }
                let omitted = total - head - tail;
                Some(format!(
                    "```{}\n{}\n\n... ({} lines omitted) ...\n\n{}\n```",
                    self.lang,
                    self.lines[..head].join("\n"),
                    omitted,
                    self.lines[total - tail..].join("\n"),
                ))
            }
        }
    }
}

/// Rewrites every block longer than the style's threshold
///
/// Blocks at or under the threshold are copied byte for byte.
pub fn truncate_code_blocks(content: &str, style: CodeBlockStyle) -> String {
    fence_regex()
        .replace_all(content, |caps: &Captures| {
            CodeBlock::from_captures(caps)
                .shorten(style)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
