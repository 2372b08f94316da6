//! Raw log documents
//!
//! A [`Document`] is a whole log file held in memory. Truncation-only passes
//! never parse bodies; they work on a lossless [`RawSplit`] whose segments
//! concatenate back to the exact input.

/// Marker that opens a section heading line
pub const HEADING_PREFIX: &str = "## ";

/// Marker of the top-level title line
pub const TITLE_PREFIX: &str = "# ";

/// Returns true if the line opens a new section
pub fn is_heading(line: &str) -> bool {
    line.starts_with(HEADING_PREFIX)
}

/// A log document held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    content: String,
}

impl Document {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Size in bytes, as written to disk
    pub fn byte_len(&self) -> usize {
        self.content.len()
    }

    /// Returns the first line when it is a `# ` title
    pub fn title_line(&self) -> Option<&str> {
        let first = self.content.split('\n').next()?;
        let first = first.strip_suffix('\r').unwrap_or(first);
        first.starts_with(TITLE_PREFIX).then_some(first)
    }

    /// Splits the document into a preamble and heading/body segments
    pub fn raw_sections(&self) -> RawSplit<'_> {
        RawSplit::parse(&self.content)
    }
}

/// One heading line and the verbatim text up to the next heading
///
/// `body` starts with the newline that terminates the heading line (if any)
/// and runs up to, but not including, the next heading line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSection<'a> {
    pub heading: &'a str,
    pub body: &'a str,
    /// 1-based line number of the heading
    pub line: usize,
}

/// Lossless segmentation of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSplit<'a> {
    /// Text before the first heading
    pub preamble: &'a str,
    pub sections: Vec<RawSection<'a>>,
}

impl<'a> RawSplit<'a> {
    fn parse(content: &'a str) -> Self {
        let mut preamble_end = content.len();
        let mut sections: Vec<RawSection<'a>> = Vec::new();
        // (heading, line, body start) of the section being scanned
        let mut open: Option<(&'a str, usize, usize)> = None;
        let mut offset = 0;

        for (index, line) in content.split_inclusive('\n').enumerate() {
            let text = line.strip_suffix('\n').unwrap_or(line);

            if is_heading(text) {
                match open.take() {
                    Some((heading, line_no, body_start)) => sections.push(RawSection {
                        heading,
                        body: &content[body_start..offset],
                        line: line_no,
                    }),
                    None => preamble_end = offset,
                }

                let heading_end = offset + text.len();
                open = Some((&content[offset..heading_end], index + 1, heading_end));
            }

            offset += line.len();
        }

        if let Some((heading, line_no, body_start)) = open {
            sections.push(RawSection {
                heading,
                body: &content[body_start..],
                line: line_no,
            });
        }

        Self {
            preamble: &content[..preamble_end],
            sections,
        }
    }
}
