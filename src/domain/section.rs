//! Section parsing
//!
//! Splits a log into `## ` sections with an explicit state machine. Text
//! before the first heading is not part of any section; the first line is
//! kept separately as the title when it starts with `# `.

use serde::Serialize;

use super::document::{is_heading, Document};

/// Heading prefix of a project section: `## /dev <name>`
pub const PROJECT_PREFIX: &str = "## /dev ";

/// Returns the project identity of a heading, if it has one
///
/// Only headings of the form `## /dev <name>` carry an identity; the name is
/// trimmed and must not be empty.
pub fn project_name(heading: &str) -> Option<&str> {
    let name = heading.strip_prefix(PROJECT_PREFIX)?.trim();
    (!name.is_empty()).then_some(name)
}

/// A heading and its body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Full heading line including the `## ` marker. Empty for the implicit
    /// section of a document without headings.
    pub heading: String,
    /// Body text, trimmed of leading and trailing blank lines
    pub body: String,
    /// 1-based line of the heading (0 for the implicit section)
    pub line: usize,
}

impl Section {
    pub fn new(heading: impl Into<String>, body: impl Into<String>, line: usize) -> Self {
        Self {
            heading: heading.into(),
            body: body.into(),
            line,
        }
    }

    /// The single section of a document that has no headings at all
    pub fn implicit(body: impl Into<String>) -> Self {
        Self::new(String::new(), body, 0)
    }

    pub fn is_implicit(&self) -> bool {
        self.heading.is_empty()
    }

    pub fn project(&self) -> Option<&str> {
        project_name(&self.heading)
    }

    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }
}

/// A parsed log: optional title plus ordered sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLog {
    pub title: Option<String>,
    pub sections: Vec<Section>,
}

enum ParseState<'a> {
    Preamble,
    InSection {
        heading: &'a str,
        line: usize,
        body: Vec<&'a str>,
    },
}

/// Parses a log into sections
///
/// A document without any heading becomes one implicit section holding
/// everything after the title line, so it degrades gracefully instead of
/// losing its content.
pub fn parse_log(document: &Document) -> ParsedLog {
    let lines: Vec<&str> = document.content().lines().collect();
    let title = document.title_line().map(str::to_string);

    let mut sections = Vec::new();
    let mut state = ParseState::Preamble;

    for (index, line) in lines.iter().copied().enumerate() {
        if is_heading(line) {
            if let ParseState::InSection {
                heading,
                line: heading_line,
                body,
            } = state
            {
                sections.push(Section::new(heading, join_trimmed(&body), heading_line));
            }
            state = ParseState::InSection {
                heading: line,
                line: index + 1,
                body: Vec::new(),
            };
        } else if let ParseState::InSection { body, .. } = &mut state {
            body.push(line);
        }
    }

    match state {
        ParseState::InSection {
            heading,
            line,
            body,
        } => sections.push(Section::new(heading, join_trimmed(&body), line)),
        ParseState::Preamble => {
            let skip = usize::from(title.is_some());
            let body = join_trimmed(lines.get(skip..).unwrap_or_default());
            if !body.is_empty() {
                sections.push(Section::implicit(body));
            }
        }
    }

    ParsedLog { title, sections }
}

/// Joins lines after dropping leading and trailing blank ones
fn join_trimmed(lines: &[&str]) -> String {
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());

    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}
