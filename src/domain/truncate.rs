//! Size-bounding passes
//!
//! Section bodies are cut at a character budget (preferring a paragraph
//! boundary), long table runs are cut to their first rows, and long
//! assistant responses keep only their head and tail.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::document::{is_heading, Document};

/// Default character budget of one section body
pub const DEFAULT_SECTION_BUDGET: usize = 3000;

/// Default number of rows kept from each table run
pub const DEFAULT_TABLE_ROWS: usize = 10;

/// Line that replaces the cut rows of a table
pub const TABLE_OMISSION: &str = "| ... (rows omitted) ... |";

/// Formats an integer with comma thousands separators
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Marker appended to a truncated body
pub fn omission_marker(omitted_chars: usize) -> String {
    format!("\n\n... ({} chars omitted) ...\n", group_thousands(omitted_chars))
}

/// Cuts a body down to `budget` characters
///
/// When the last paragraph break inside the budget lies past its midpoint the
/// cut happens there instead. The result never exceeds the budget plus the
/// omission marker.
pub fn truncate_body(body: &str, budget: usize) -> Cow<'_, str> {
    let total = body.chars().count();
    if total <= budget {
        return Cow::Borrowed(body);
    }

    let hard_cut = body
        .char_indices()
        .nth(budget)
        .map_or(body.len(), |(index, _)| index);
    let mut kept = &body[..hard_cut];

    if let Some(pos) = kept.rfind("\n\n") {
        if kept[..pos].chars().count() > budget / 2 {
            kept = &kept[..pos];
        }
    }

    let omitted = total - kept.chars().count();
    Cow::Owned(format!("{}{}", kept, omission_marker(omitted)))
}

/// Truncates every over-budget section body, keeping all other text verbatim
pub fn truncate_sections(document: &Document, budget: usize) -> String {
    let split = document.raw_sections();
    let mut out = String::with_capacity(document.byte_len());
    out.push_str(split.preamble);

    for section in &split.sections {
        out.push_str(section.heading);
        out.push_str(&truncate_body(section.body, budget));
    }

    out
}

fn is_table_row(line: &str) -> bool {
    line.strip_prefix('|').is_some_and(|rest| rest.contains('|'))
}

/// Keeps the first `max_rows` rows of every consecutive table run
pub fn truncate_tables(content: &str, max_rows: usize) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut rows = 0;

    for line in content.split('\n') {
        if is_table_row(line) {
            rows += 1;
            if rows <= max_rows {
                out.push(line);
            } else if rows == max_rows + 1 {
                out.push(TABLE_OMISSION);
            }
        } else {
            rows = 0;
            out.push(line);
        }
    }

    out.join("\n")
}

/// Where assistant responses begin and end, and how much of them survives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ResponseRules {
    /// Line prefix that opens an assistant response
    pub assistant_marker: String,
    /// Line prefixes that close a response (a `## ` heading always does)
    pub user_markers: Vec<String>,
    /// Responses longer than this many lines are compressed
    pub max_lines: usize,
    pub head_lines: usize,
    pub tail_lines: usize,
}

impl Default for ResponseRules {
    fn default() -> Self {
        Self {
            assistant_marker: "**Claude**:".to_string(),
            user_markers: vec!["**ユーザー**:".to_string(), "**User**:".to_string()],
            max_lines: 50,
            head_lines: 30,
            tail_lines: 10,
        }
    }
}

impl ResponseRules {
    fn opens(&self, line: &str) -> bool {
        !self.assistant_marker.is_empty() && line.starts_with(&self.assistant_marker)
    }

    fn closes(&self, line: &str) -> bool {
        is_heading(line)
            || self
                .user_markers
                .iter()
                .any(|m| !m.is_empty() && line.starts_with(m.as_str()))
    }

    fn compress_into(&self, block: &[&str], out: &mut Vec<String>) {
        let keep = self.head_lines + self.tail_lines;
        if block.len() <= self.max_lines || block.len() <= keep {
            out.extend(block.iter().map(|l| (*l).to_string()));
            return;
        }

        let omitted = block.len() - keep;
        out.extend(block[..self.head_lines].iter().map(|l| (*l).to_string()));
        out.push(format!("\n... ({} lines omitted) ...\n", omitted));
        out.extend(block[block.len() - self.tail_lines..].iter().map(|l| (*l).to_string()));
    }
}

/// Shortens long assistant responses to their head and tail lines
pub fn compress_responses(content: &str, rules: &ResponseRules) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut block: Vec<&str> = Vec::new();
    let mut in_response = false;

    for line in content.split('\n') {
        if rules.opens(line) {
            rules.compress_into(&block, &mut out);
            block.clear();
            block.push(line);
            in_response = true;
        } else if in_response && rules.closes(line) {
            rules.compress_into(&block, &mut out);
            block.clear();
            in_response = false;
            out.push(line.to_string());
        } else if in_response {
            block.push(line);
        } else {
            out.push(line.to_string());
        }
    }

    rules.compress_into(&block, &mut out);
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
    }

    #[test]
    fn short_body_is_borrowed() {
        let body = "short body";
        assert!(matches!(truncate_body(body, 100), Cow::Borrowed(_)));
    }

    #[test]
    fn cuts_at_paragraph_boundary_past_midpoint() {
        let body = format!("{}\n\n{}", "a".repeat(70), "b".repeat(100));
        let out = truncate_body(&body, 100);

        assert_eq!(out, format!("{}{}", "a".repeat(70), omission_marker(102)));
    }

    #[test]
    fn hard_cut_when_boundary_is_early() {
        let body = format!("{}\n\n{}", "a".repeat(10), "b".repeat(200));
        let out = truncate_body(&body, 100);

        let expected_kept = format!("{}\n\n{}", "a".repeat(10), "b".repeat(88));
        assert_eq!(out, format!("{}{}", expected_kept, omission_marker(112)));
    }

    #[test]
    fn counts_characters_not_bytes() {
        let body = "あ".repeat(50);
        assert!(matches!(truncate_body(&body, 50), Cow::Borrowed(_)));

        let out = truncate_body(&body, 20);
        assert!(out.starts_with(&"あ".repeat(20)));
        assert!(out.contains("(30 chars omitted)"));
    }

    #[test]
    fn truncate_sections_leaves_preamble_and_headings() {
        let long = "x".repeat(50);
        let content = format!("# T\npre\n## a\n{}\n## b\nshort\n", long);
        let out = truncate_sections(&Document::new(&content), 20);

        assert!(out.starts_with("# T\npre\n## a\n"));
        assert!(out.contains("chars omitted"));
        assert!(out.ends_with("## b\nshort\n"));
    }

    #[test]
    fn truncate_sections_is_identity_under_budget() {
        let content = "# T\n## a\nbody\n## b\nbody\n";
        assert_eq!(truncate_sections(&Document::new(content), 3000), content);
    }

    #[test]
    fn table_runs_cut_after_limit() {
        let rows: Vec<String> = (0..15).map(|i| format!("| {} | v |", i)).collect();
        let content = format!("intro\n{}\nafter", rows.join("\n"));
        let out = truncate_tables(&content, 10);

        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(lines.len(), 1 + 10 + 1 + 1);
        assert_eq!(lines[10], "| 9 | v |");
        assert_eq!(lines[11], TABLE_OMISSION);
        assert_eq!(lines[12], "after");
    }

    #[test]
    fn table_counter_resets_between_tables() {
        let table: Vec<&str> = vec!["| a | b |"; 3];
        let content = format!("{}\n\n{}", table.join("\n"), table.join("\n"));
        assert_eq!(truncate_tables(&content, 3), content);
    }

    #[test]
    fn lone_pipe_line_is_not_a_row() {
        assert!(!is_table_row("| just a bar"));
        assert!(is_table_row("|a|"));
    }

    #[test]
    fn long_response_keeps_head_and_tail() {
        let rules = ResponseRules {
            max_lines: 5,
            head_lines: 2,
            tail_lines: 1,
            ..ResponseRules::default()
        };
        let content = "**Claude**: start\nr1\nr2\nr3\nr4\nr5\nend\n**User**: next";
        let out = compress_responses(content, &rules);

        assert_eq!(
            out,
            "**Claude**: start\nr1\n\n... (4 lines omitted) ...\n\nend\n**User**: next"
        );
    }

    #[test]
    fn short_response_untouched() {
        let content = "**Claude**: hi\nshort\n## next\nbody";
        assert_eq!(compress_responses(content, &ResponseRules::default()), content);
    }

    #[test]
    fn response_at_end_of_document_is_compressed() {
        let rules = ResponseRules {
            max_lines: 3,
            head_lines: 1,
            tail_lines: 1,
            ..ResponseRules::default()
        };
        let content = "intro\n**Claude**: a\nb\nc\nd";
        let out = compress_responses(content, &rules);

        assert_eq!(out, "intro\n**Claude**: a\n\n... (2 lines omitted) ...\n\nd");
    }

    proptest! {
        #[test]
        fn truncation_stays_within_budget(body in "[a-z\n]{0,400}", budget in 1usize..300) {
            let out = truncate_body(&body, budget);
            let total = body.chars().count();
            let limit = budget + omission_marker(total).chars().count();
            prop_assert!(out.chars().count() <= limit);
        }
    }
}
