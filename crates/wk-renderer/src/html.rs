//! HTML safety helpers.
//!
//! Raw HTML found in a page body is displayed literally, except for the page
//! reference anchors produced by [`LinkResolver`](crate::LinkResolver), which
//! are the only markup allowed through.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use crate::state::escape_html;

/// Anything shaped like a tag, comment or declaration.
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>]*>").unwrap());

/// URL schemes allowed in link and image destinations.
const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto", "tel"];

/// Tracks which raw HTML may pass through unescaped.
pub(crate) struct ReferencePolicy {
    /// `<a href="` followed by the escaped reference prefix.
    open_prefix: String,
    /// Reference anchors opened but not yet closed.
    depth: usize,
    /// Distinct page names of the anchors let through, in order.
    emitted: Vec<String>,
}

impl ReferencePolicy {
    pub(crate) fn new(prefix: &str) -> Self {
        Self {
            open_prefix: format!(r#"<a href="{}"#, escape_html(prefix)),
            depth: 0,
            emitted: Vec::new(),
        }
    }

    /// Return the page name if `tag` is exactly a reference open tag.
    fn reference_word<'t>(&self, tag: &'t str) -> Option<&'t str> {
        let word = tag.strip_prefix(&self.open_prefix)?.strip_suffix("\">")?;
        (!word.is_empty() && word.bytes().all(|b| b.is_ascii_alphabetic())).then_some(word)
    }

    /// Escape a raw HTML fragment, keeping balanced reference anchors.
    pub(crate) fn sanitize(&mut self, html: &str) -> String {
        let mut out = String::with_capacity(html.len() + 16);
        let mut last = 0;
        for tag in TAG.find_iter(html) {
            out.push_str(&escape_html(&html[last..tag.start()]));
            let raw = tag.as_str();
            if let Some(word) = self.reference_word(raw) {
                if !self.emitted.iter().any(|w| w == word) {
                    self.emitted.push(word.to_owned());
                }
                self.depth += 1;
                out.push_str(raw);
            } else if raw == "</a>" && self.depth > 0 {
                self.depth -= 1;
                out.push_str(raw);
            } else {
                out.push_str(&escape_html(raw));
            }
            last = tag.end();
        }
        out.push_str(&escape_html(&html[last..]));
        out
    }

    /// Page names of every reference anchor let through so far.
    pub(crate) fn take_emitted(&mut self) -> Vec<String> {
        std::mem::take(&mut self.emitted)
    }

    /// Closing tags for any reference anchors left open.
    pub(crate) fn close_unbalanced(&mut self) -> String {
        "</a>".repeat(std::mem::take(&mut self.depth))
    }

    /// Unwrap reference anchors back to their plain word.
    ///
    /// Used for indented code, which the resolver cannot tell apart from
    /// prose, so its markup must read as the original text again.
    pub(crate) fn strip_references<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if !text.contains(&self.open_prefix) {
            return Cow::Borrowed(text);
        }

        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(start) = rest.find(&self.open_prefix) {
            out.push_str(&rest[..start]);
            let candidate = &rest[start..];
            match self.match_reference(candidate) {
                Some((word, consumed)) => {
                    out.push_str(word);
                    rest = &candidate[consumed..];
                }
                None => {
                    out.push_str(&candidate[..self.open_prefix.len()]);
                    rest = &candidate[self.open_prefix.len()..];
                }
            }
        }
        out.push_str(rest);
        Cow::Owned(out)
    }

    /// Match `<a href="{prefix}Word">Word</a>` at the start of `text`.
    /// Returns the word and the number of bytes consumed.
    fn match_reference<'t>(&self, text: &'t str) -> Option<(&'t str, usize)> {
        let tag_end = text.find('>')? + 1;
        let word = self.reference_word(&text[..tag_end])?;
        let closing = format!("{word}</a>");
        text[tag_end..]
            .starts_with(&closing)
            .then_some((word, tag_end + closing.len()))
    }
}

/// Neutralize link destinations with scripting or local schemes.
///
/// Relative URLs and `http`, `https`, `mailto` and `tel` pass through; any
/// other scheme is replaced with `#`. Whitespace and control characters are
/// ignored while detecting the scheme, as browsers do.
pub(crate) fn safe_url(url: &str) -> &str {
    let compact: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .collect();
    match compact.find([':', '/', '?', '#']) {
        Some(i) if compact[i..].starts_with(':') => {
            let scheme = compact[..i].to_ascii_lowercase();
            if SAFE_SCHEMES.contains(&scheme.as_str()) {
                url
            } else {
                "#"
            }
        }
        _ => url,
    }
}
