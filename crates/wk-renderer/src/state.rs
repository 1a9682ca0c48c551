//! State tracked while walking markdown events.

use std::collections::HashMap;

use pulldown_cmark::Alignment;

/// State for tracking code block rendering.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    /// Whether we're inside a code block.
    active: bool,
    /// Language of current code block (e.g., "rust", "python").
    language: Option<String>,
    /// Whether the block is indented rather than fenced.
    indented: bool,
    /// Buffer for code block content.
    buffer: String,
}

impl CodeBlockState {
    /// Start a fenced code block with optional language.
    pub(crate) fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.indented = false;
        self.language = language;
        self.buffer.clear();
    }

    /// Start an indented code block.
    pub(crate) fn start_indented(&mut self) {
        self.start(None);
        self.indented = true;
    }

    pub(crate) fn is_indented(&self) -> bool {
        self.indented
    }

    /// End the current code block and return (language, content).
    pub(crate) fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }
}

/// State for tracking table rendering.
#[derive(Default)]
pub(crate) struct TableState {
    /// Whether we're inside the table header row.
    in_head: bool,
    /// Column alignments for current table.
    alignments: Vec<Alignment>,
    /// Current column index in table row.
    cell_index: usize,
}

impl TableState {
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    pub(crate) fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    pub(crate) fn is_in_head(&self) -> bool {
        self.in_head
    }

    /// Alignment style attribute for the current cell.
    pub(crate) fn current_alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// State for capturing image alt text.
#[derive(Default)]
pub(crate) struct ImageState {
    active: bool,
    alt_text: String,
    /// Destination and title of the image being captured.
    pending: Option<(String, String)>,
}

impl ImageState {
    pub(crate) fn start(&mut self, src: String, title: String) {
        self.active = true;
        self.alt_text.clear();
        self.pending = Some((src, title));
    }

    /// End capture and return (src, title, alt).
    pub(crate) fn end(&mut self) -> Option<(String, String, String)> {
        self.active = false;
        let alt = std::mem::take(&mut self.alt_text);
        self.pending.take().map(|(src, title)| (src, title, alt))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.alt_text.push_str(text);
    }
}

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor ID for linking.
    pub id: String,
}

/// State for tracking headings and building the table of contents.
#[derive(Default)]
pub(crate) struct HeadingState {
    /// Current heading level being processed (None if not in a heading).
    current_level: Option<u8>,
    /// Buffer for heading plain text (for table of contents and slug).
    text: String,
    /// Buffer for heading HTML (with inline formatting).
    html: String,
    toc: Vec<TocEntry>,
    /// Counter for generating unique heading IDs.
    id_counts: HashMap<String, usize>,
}

impl HeadingState {
    pub(crate) fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    pub(crate) fn start_heading(&mut self, level: u8) {
        self.current_level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// Complete heading and record its table of contents entry.
    /// Returns (level, id, html) or None if not in a heading.
    pub(crate) fn complete_heading(&mut self) -> Option<(u8, String, String)> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);
        let id = self.generate_id(&text);

        self.toc.push(TocEntry {
            level,
            title: text.trim().to_owned(),
            id: id.clone(),
        });

        Some((level, id, html))
    }

    fn generate_id(&mut self, text: &str) -> String {
        let mut base_id = slugify(text);
        if base_id.is_empty() {
            base_id = "section".to_owned();
        }
        let count = self.id_counts.entry(base_id.clone()).or_default();
        let id = match *count {
            0 => base_id,
            n => format!("{base_id}-{n}"),
        };
        *count += 1;
        id
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn push_html(&mut self, html: &str) {
        self.html.push_str(html);
    }

    pub(crate) fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }
}

/// Convert text to URL-safe slug.
///
/// Converts to lowercase, replaces whitespace/dashes/underscores with single dashes,
/// and removes other non-alphanumeric characters.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true; // Prevents leading dash

    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }

    if result.ends_with('-') {
        result.pop();
    }

    result
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("  Spaces  "), "spaces");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("snake_case"), "snake-case");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x" & 'y')</script>"#),
            "&lt;script&gt;alert(&quot;x&quot; &amp; &#x27;y&#x27;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_heading_ids_are_unique() {
        let mut state = HeadingState::default();
        for _ in 0..3 {
            state.start_heading(2);
            state.push_text("Notes");
            state.complete_heading();
        }

        let ids: Vec<String> = state.take_toc().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["notes", "notes-1", "notes-2"]);
    }

    #[test]
    fn test_heading_without_slug_text() {
        let mut state = HeadingState::default();
        state.start_heading(1);
        state.push_text("!!!");

        let (_, id, _) = state.complete_heading().unwrap();
        assert_eq!(id, "section");
    }

    #[test]
    fn test_table_alignment_style() {
        let mut table = TableState::default();
        table.start(vec![Alignment::Left, Alignment::None, Alignment::Right]);

        assert_eq!(table.current_alignment_style(), r#" style="text-align:left""#);
        table.next_cell();
        assert_eq!(table.current_alignment_style(), "");
        table.next_cell();
        assert_eq!(table.current_alignment_style(), r#" style="text-align:right""#);
        table.next_cell();
        assert_eq!(table.current_alignment_style(), "");
    }
}
