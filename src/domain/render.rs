//! Reassembles parsed sections into log text

use super::dedup::dedup_paragraphs;
use super::section::Section;

/// Title used when a log does not start with a `# ` line
pub const DEFAULT_TITLE: &str = "# Log";

/// Renders the title and every non-empty section
///
/// Each section is written as heading, blank line, paragraph-deduplicated
/// body, blank line. The implicit section of a headingless log is written
/// without a heading.
pub fn render_log(title: &str, sections: &[Section], min_paragraph_chars: usize) -> String {
    let mut lines: Vec<String> = vec![title.to_string(), String::new()];

    for section in sections.iter().filter(|s| s.has_body()) {
        if !section.is_implicit() {
            lines.push(section.heading.clone());
            lines.push(String::new());
        }
        lines.push(dedup_paragraphs(&section.body, min_paragraph_chars));
        lines.push(String::new());
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_sections_with_blank_lines() {
        let sections = vec![
            Section::new("## /dev foo", "bodyA\n\n---\n\nbodyB", 1),
            Section::new("## empty", "", 5),
            Section::new("## Plan", "step", 6),
        ];
        let out = render_log("# 2026-01-18", &sections, 100);

        assert_eq!(
            out,
            "# 2026-01-18\n\n## /dev foo\n\nbodyA\n\n---\n\nbodyB\n\n## Plan\n\nstep\n"
        );
    }

    #[test]
    fn implicit_section_has_no_heading_line() {
        let out = render_log(DEFAULT_TITLE, &[Section::implicit("just text")], 100);
        assert_eq!(out, "# Log\n\njust text\n");
    }

    #[test]
    fn no_sections_renders_title_only() {
        assert_eq!(render_log("# T", &[], 100), "# T\n");
    }
}
