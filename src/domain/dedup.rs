//! Duplicate and empty content removal
//!
//! Three granularities:
//! - empty sections (a heading directly followed by another heading)
//! - repeated paragraphs inside one body
//! - sections whose bodies start with the same normalized text
//!
//! Equality is always decided on the normalized text itself. The blake3
//! digest only speeds up the lookup, so a digest collision can never make two
//! different texts look identical.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::document::{is_heading, Document};
use super::merge::SEPARATOR;
use super::section::Section;

/// What happens to a section whose body repeats an earlier one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Keep the heading, replace the body with a pointer to the first copy
    #[default]
    Reference,
    /// Remove the whole section
    Drop,
}

/// Thresholds for paragraph and section deduplication
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DedupRules {
    /// Paragraphs shorter than this (in characters) are always kept
    pub min_paragraph_chars: usize,
    /// Length of the normalized prefix compared between sections
    pub compare_prefix_chars: usize,
    /// Normalized prefixes this short or shorter never count as duplicates
    pub min_section_chars: usize,
    pub policy: DedupPolicy,
}

impl Default for DedupRules {
    fn default() -> Self {
        Self {
            min_paragraph_chars: 100,
            compare_prefix_chars: 500,
            min_section_chars: 200,
            policy: DedupPolicy::Reference,
        }
    }
}

/// Collapses every whitespace run to a single space and trims the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized text keyed by its digest
#[derive(Debug, Clone)]
struct Fingerprint {
    digest: blake3::Hash,
    text: String,
}

impl Fingerprint {
    fn new(text: String) -> Self {
        Self {
            digest: blake3::hash(text.as_bytes()),
            text,
        }
    }
}

impl PartialEq for Fingerprint {
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest && self.text == other.text
    }
}

impl Eq for Fingerprint {}

impl Hash for Fingerprint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write(self.digest.as_bytes());
    }
}

/// Marker body pointing at the first copy of a duplicated section
pub fn reference_marker(line: usize) -> String {
    format!("(Similar to section at line {})", line)
}

/// Drops repeated long paragraphs from one body
///
/// Paragraphs are separated by blank lines. Short paragraphs and paragraphs
/// starting with `#` are kept even when repeated.
pub fn dedup_paragraphs(body: &str, min_chars: usize) -> String {
    let mut seen = HashSet::new();

    body.split("\n\n")
        .filter(|para| {
            if para.chars().count() < min_chars || para.starts_with('#') {
                return true;
            }
            seen.insert(Fingerprint::new(normalize_whitespace(para)))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Outcome of checking one section body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Unique,
    /// Same normalized prefix as the section at this line
    DuplicateOf(usize),
}

/// Remembers section bodies seen so far in one document
pub struct SectionDeduper<'r> {
    rules: &'r DedupRules,
    seen: HashMap<Fingerprint, usize>,
}

impl<'r> SectionDeduper<'r> {
    pub fn new(rules: &'r DedupRules) -> Self {
        Self {
            rules,
            seen: HashMap::new(),
        }
    }

    /// Records a body and reports whether an earlier one matches it
    pub fn check(&mut self, body: &str, line: usize) -> Verdict {
        let prefix: String = normalize_whitespace(body)
            .chars()
            .take(self.rules.compare_prefix_chars)
            .collect();
        let long_enough = prefix.chars().count() > self.rules.min_section_chars;

        match self.seen.entry(Fingerprint::new(prefix)) {
            Entry::Occupied(first) if long_enough => Verdict::DuplicateOf(*first.get()),
            Entry::Occupied(_) => Verdict::Unique,
            Entry::Vacant(slot) => {
                slot.insert(line);
                Verdict::Unique
            }
        }
    }
}

/// Section dedup over parsed sections
pub fn dedup_sections(sections: Vec<Section>, rules: &DedupRules) -> Vec<Section> {
    let mut deduper = SectionDeduper::new(rules);
    let mut kept = Vec::with_capacity(sections.len());

    for mut section in sections {
        match deduper.check(&section.body, section.line) {
            Verdict::Unique => kept.push(section),
            Verdict::DuplicateOf(line) => match rules.policy {
                DedupPolicy::Reference => {
                    section.body = reference_marker(line);
                    kept.push(section);
                }
                DedupPolicy::Drop => {}
            },
        }
    }

    kept
}

/// Section dedup over raw text, leaving unique sections byte-identical
pub fn dedup_raw_sections(document: &Document, rules: &DedupRules) -> String {
    let split = document.raw_sections();
    let mut deduper = SectionDeduper::new(rules);
    let mut out = String::with_capacity(document.byte_len());
    out.push_str(split.preamble);

    for section in &split.sections {
        match deduper.check(section.body, section.line) {
            Verdict::Unique => {
                out.push_str(section.heading);
                out.push_str(section.body);
            }
            Verdict::DuplicateOf(line) => {
                if rules.policy == DedupPolicy::Reference {
                    out.push_str(section.heading);
                    out.push('\n');
                    out.push_str(&reference_marker(line));
                    out.push('\n');
                }
            }
        }
    }

    out
}

/// Removes headings with no content and collapses repeated separators
///
/// A heading followed only by empty lines and then another heading is
/// removed together with those empty lines. Separator lines with nothing but
/// blank lines between them collapse to the first one. Running this twice
/// gives the same result as running it once.
pub fn remove_empty_sections(content: &str) -> String {
    let lines: Vec<&str> = content.split('\n').collect();
    let mut kept: Vec<&str> = Vec::with_capacity(lines.len());
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if is_heading(line) {
            let mut next = i + 1;
            while next < lines.len() && lines[next].is_empty() {
                next += 1;
            }
            if next < lines.len() && is_heading(lines[next]) {
                i = next;
                continue;
            }
        }

        if line == SEPARATOR {
            let last_content = kept.iter().rposition(|l| !l.trim().is_empty());
            if let Some(last) = last_content.filter(|&idx| kept[idx] == SEPARATOR) {
                kept.truncate(last + 1);
                i += 1;
                continue;
            }
        }

        kept.push(line);
        i += 1;
    }

    kept.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::section::parse_log;
    use proptest::prelude::*;

    fn long_text(seed: &str) -> String {
        format!("{} {}", seed, "lorem ipsum dolor sit amet ".repeat(10))
    }

    #[test]
    fn normalizes_whitespace_runs() {
        assert_eq!(normalize_whitespace("  a \n\n b\t c  "), "a b c");
    }

    #[test]
    fn repeated_long_paragraph_dropped() {
        let para = long_text("alpha");
        let body = format!("{}\n\nshort\n\n{}\n\nshort", para, para);
        let out = dedup_paragraphs(&body, 100);

        assert_eq!(out, format!("{}\n\nshort\n\nshort", para));
    }

    #[test]
    fn paragraphs_differing_only_in_whitespace_are_duplicates() {
        let para = long_text("beta");
        let spaced = para.replace(' ', "  ");
        let body = format!("{}\n\n{}", para, spaced);

        assert_eq!(dedup_paragraphs(&body, 100), para);
    }

    #[test]
    fn heading_paragraphs_always_kept() {
        let heading = format!("# {}", long_text("gamma"));
        let body = format!("{}\n\n{}", heading, heading);

        assert_eq!(dedup_paragraphs(&body, 100), body);
    }

    #[test]
    fn duplicate_section_becomes_reference() {
        let body = long_text("delta");
        let content = format!("## first\n{}\n## second\n{}", body, body);
        let log = parse_log(&Document::new(&content));
        let out = dedup_sections(log.sections, &DedupRules::default());

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].body, body);
        assert_eq!(out[1].heading, "## second");
        assert_eq!(out[1].body, "(Similar to section at line 1)");
    }

    #[test]
    fn duplicate_section_dropped_under_drop_policy() {
        let body = long_text("epsilon");
        let content = format!("## first\n{}\n## second\n{}\n## third\nother", body, body);
        let rules = DedupRules {
            policy: DedupPolicy::Drop,
            ..DedupRules::default()
        };
        let out = dedup_sections(parse_log(&Document::new(&content)).sections, &rules);

        let headings: Vec<_> = out.iter().map(|s| s.heading.as_str()).collect();
        assert_eq!(headings, ["## first", "## third"]);
    }

    #[test]
    fn short_duplicate_sections_kept() {
        let content = "## a\nsame text\n## b\nsame text";
        let out = dedup_sections(parse_log(&Document::new(content)).sections, &DedupRules::default());
        assert_eq!(out[1].body, "same text");
    }

    #[test]
    fn sections_sharing_a_long_prefix_collide() {
        let shared = "x ".repeat(300);
        let content = format!("## a\n{}tail one\n## b\n{}tail two", shared, shared);
        let out = dedup_sections(parse_log(&Document::new(&content)).sections, &DedupRules::default());
        assert_eq!(out[1].body, reference_marker(1));
    }

    #[test]
    fn raw_dedup_references_first_line() {
        let body = long_text("zeta");
        let content = format!("# T\n\n## one\n{}\n\n## two\n{}\n", body, body);
        let out = dedup_raw_sections(&Document::new(&content), &DedupRules::default());

        assert_eq!(
            out,
            format!("# T\n\n## one\n{}\n\n## two\n(Similar to section at line 3)\n", body)
        );
    }

    #[test]
    fn raw_dedup_keeps_unique_sections_verbatim() {
        let content = "# T\n## a\n  one  \n## b\ntwo\n";
        assert_eq!(dedup_raw_sections(&Document::new(content), &DedupRules::default()), content);
    }

    #[test]
    fn empty_headings_removed() {
        let content = "# T\n## a\n\n## b\n## c\nbody\n## d\n";
        assert_eq!(remove_empty_sections(content), "# T\n## c\nbody\n## d\n");
    }

    #[test]
    fn repeated_separators_collapse() {
        let content = "## a\nx\n\n---\n\n\n---\n\ny\n---\nz";
        assert_eq!(remove_empty_sections(content), "## a\nx\n\n---\n\ny\n---\nz");
    }

    proptest! {
        #[test]
        fn empty_section_removal_is_idempotent(
            lines in prop::collection::vec(
                prop_oneof![
                    Just(String::new()),
                    Just("---".to_string()),
                    "## [a-c]{1,3}",
                    "[a-z ]{1,10}",
                ],
                0..30,
            )
        ) {
            let content = lines.join("\n");
            let once = remove_empty_sections(&content);
            let twice = remove_empty_sections(&once);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn short_and_heading_paragraphs_survive(
            paras in prop::collection::vec(
                prop_oneof!["[a-z ]{1,40}", "#[a-z ]{100,140}", "[a-z]{100,120}"],
                1..12,
            )
        ) {
            let mut body_paras = paras.clone();
            body_paras.extend(paras.iter().cloned());
            let body = body_paras.join("\n\n");
            let out = dedup_paragraphs(&body, 100);
            let kept: Vec<&str> = out.split("\n\n").collect();

            let protected = |p: &&String| p.chars().count() < 100 || p.starts_with('#');
            let expected = body_paras.iter().filter(protected).count();
            prop_assert_eq!(kept.iter().filter(|p| p.chars().count() < 100 || p.starts_with('#')).count(), expected);
        }
    }
}
