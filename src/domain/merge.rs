//! Project merging
//!
//! Consecutive sections that belong to the same `## /dev <name>` project are
//! folded into one section. Bodies are joined with a `---` separator so the
//! original boundaries stay visible.

use super::document::is_heading;
use super::section::{project_name, Section};

/// Separator line placed between merged bodies
pub const SEPARATOR: &str = "---";

const BODY_SEPARATOR: &str = "\n\n---\n\n";

/// A project section being accumulated
struct PendingProject {
    name: String,
    heading: String,
    line: usize,
    bodies: Vec<String>,
}

impl PendingProject {
    fn start(name: String, section: Section) -> Self {
        let mut bodies = Vec::new();
        if section.has_body() {
            bodies.push(section.body);
        }
        Self {
            name,
            heading: section.heading,
            line: section.line,
            bodies,
        }
    }

    fn finish(self) -> Section {
        Section::new(self.heading, self.bodies.join(BODY_SEPARATOR), self.line)
    }
}

/// Merges runs of adjacent sections sharing a project identity
///
/// The merged section keeps the heading and line of the first section in the
/// run. Empty bodies add nothing (and no separator) but still take part in
/// identity tracking. Any section without a project identity ends the current
/// run and is passed through as is.
pub fn merge_projects(sections: Vec<Section>) -> Vec<Section> {
    let mut merged = Vec::with_capacity(sections.len());
    let mut current: Option<PendingProject> = None;

    for section in sections {
        let name = section.project().map(str::to_owned);

        match name {
            Some(name) if current.as_ref().is_some_and(|c| c.name == name) => {
                if section.has_body() {
                    if let Some(pending) = current.as_mut() {
                        pending.bodies.push(section.body);
                    }
                }
            }
            Some(name) => {
                if let Some(pending) = current.take() {
                    merged.push(pending.finish());
                }
                current = Some(PendingProject::start(name, section));
            }
            None => {
                if let Some(pending) = current.take() {
                    merged.push(pending.finish());
                }
                merged.push(section);
            }
        }
    }

    if let Some(pending) = current {
        merged.push(pending.finish());
    }

    merged
}

/// Streaming merge over raw lines
///
/// A project heading repeating the current identity is replaced by a bare
/// separator; bodies are left untouched and are not deduplicated.
pub fn merge_project_headings(content: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut current: Option<&str> = None;

    for line in content.split('\n') {
        if let Some(name) = project_name(line) {
            if current == Some(name) {
                out.push("\n---\n");
                continue;
            }
            current = Some(name);
        } else if is_heading(line) {
            current = None;
        }
        out.push(line);
    }

    out.join("\n")
}
