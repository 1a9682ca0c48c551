//! Link-word discovery and rewriting.
//!
//! A link-word is a camel-case compound of at least two capitalized ASCII
//! words (`WikiWord`, `AliceBob`). The [`LinkResolver`] rewrites each one into
//! an anchor pointing at the page of the same name. Whether that page exists
//! is decided later, when someone follows the link.
//!
//! Text that is already markup is never rewritten: HTML tags and elements,
//! code spans, fenced code, inline links, link definitions and reference
//! links whose label is defined are copied through unchanged. Existing
//! anchors are never wrapped again, so resolving resolved text leaves its
//! references intact.

use std::borrow::Cow;
use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::state::escape_html;

/// Default path prefix of page references.
pub const DEFAULT_LINK_PREFIX: &str = "/view/";

/// Uppercase, lowercase run, uppercase, more letters; Unicode word boundaries
/// so a match touching digits, `_` or non-ASCII letters is rejected.
static LINK_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+[A-Z][A-Za-z]+\b").unwrap());

/// Regions copied through verbatim.
static PROTECTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?is)",
        r"```.*?(?:```|\z)",
        r"|~~~.*?(?:~~~|\z)",
        r"|<!--.*?(?:-->|\z)",
        r"|<a\b[^>]*>.*?</a\s*>",
        r"|<code\b[^>]*>.*?</code\s*>",
        r"|<pre\b[^>]*>.*?</pre\s*>",
        r"|</?[a-z][a-z0-9-]*(?:\s[^<>]*)?/?>",
        r"|<[a-z][a-z0-9+.-]*:[^<>\s]*>",
        r"|<[^<>\s@]+@[^<>\s]+>",
        r"|``[^\n]*?``",
        r"|`[^`\n]*`",
        r"|(?m:^ {0,3}\[[^\]\n]+\]:[^\n]*)",
        r"|!?\[[^\]\n]*\]\([^)\n]*\)",
        r"|!?\[(?P<text>[^\]\n]*)\](?:\[(?P<label>[^\]\n]*)\])?",
    ))
    .unwrap()
});

/// Labels of link reference definitions.
static DEFINITION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^ {0,3}\[([^\]\n]+)\]:").unwrap());

/// Rewrites link-words into page references.
///
/// # Example
///
/// ```
/// use wk_renderer::LinkResolver;
///
/// let resolver = LinkResolver::default();
/// assert_eq!(
///     resolver.resolve("See AliceBob"),
///     r#"See <a href="/view/AliceBob">AliceBob</a>"#
/// );
/// assert_eq!(resolver.resolve("See BOB and alice"), "See BOB and alice");
/// ```
#[derive(Clone, Debug)]
pub struct LinkResolver {
    /// Prefix as configured.
    prefix: String,
    /// HTML-escaped prefix used inside `href`.
    href_prefix: String,
}

impl LinkResolver {
    /// Create a resolver whose references point at `{prefix}{Word}`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let href_prefix = escape_html(&prefix);
        Self {
            prefix,
            href_prefix,
        }
    }

    /// Configured reference prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Anchor markup for a single word.
    #[must_use]
    pub fn reference(&self, word: &str) -> String {
        format!(r#"<a href="{}{word}">{word}</a>"#, self.href_prefix)
    }

    /// Rewrite every link-word outside protected regions.
    ///
    /// Returns the input unchanged (borrowed) when nothing matched.
    pub fn resolve<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut out = String::with_capacity(text.len() + 64);
        let mut changed = false;

        for_each_segment(text, |segment, protected| {
            if protected {
                out.push_str(segment);
            } else {
                changed |= self.rewrite_into(segment, &mut out);
            }
        });

        if changed {
            Cow::Owned(out)
        } else {
            Cow::Borrowed(text)
        }
    }

    /// Distinct link-words outside protected regions, in first-occurrence order.
    pub fn link_words(&self, text: &str) -> Vec<String> {
        let mut words: Vec<String> = Vec::new();
        for_each_segment(text, |segment, protected| {
            if protected {
                return;
            }
            for m in LINK_WORD.find_iter(segment) {
                if !words.iter().any(|w| w == m.as_str()) {
                    words.push(m.as_str().to_owned());
                }
            }
        });
        words
    }

    fn rewrite_into(&self, segment: &str, out: &mut String) -> bool {
        let mut last = 0;
        let mut changed = false;
        for m in LINK_WORD.find_iter(segment) {
            out.push_str(&segment[last..m.start()]);
            out.push_str(&self.reference(m.as_str()));
            last = m.end();
            changed = true;
        }
        out.push_str(&segment[last..]);
        changed
    }
}

impl Default for LinkResolver {
    fn default() -> Self {
        Self::new(DEFAULT_LINK_PREFIX)
    }
}

/// Split `text` into alternating unprotected and protected segments.
///
/// Protected regions start and end on non-word characters, so slicing around
/// them never manufactures a word boundary inside a token. Bracketed text is
/// only protected when it is a reference link to a defined label; otherwise
/// the brackets are literal and their content is scanned like any other text.
fn for_each_segment(text: &str, mut f: impl FnMut(&str, bool)) {
    let definitions = link_definitions(text);
    let mut last = 0;
    let mut pos = 0;
    while let Some(caps) = PROTECTED.captures_at(text, pos) {
        let Some(region) = caps.get(0) else {
            break;
        };
        if let Some(link_text) = caps.name("text") {
            let label = caps
                .name("label")
                .map(|m| m.as_str())
                .filter(|l| !l.is_empty())
                .unwrap_or(link_text.as_str());
            if !definitions.contains(&normalize_label(label)) {
                // Skip the opening `!` or `[` and keep scanning.
                pos = region.start() + 1;
                continue;
            }
        }
        if region.start() > last {
            f(&text[last..region.start()], false);
        }
        f(region.as_str(), true);
        last = region.end();
        pos = last;
    }
    if last < text.len() {
        f(&text[last..], false);
    }
}

/// Normalized labels of every link reference definition in `text`.
fn link_definitions(text: &str) -> HashSet<String> {
    DEFINITION
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| normalize_label(m.as_str()))
        .collect()
}

/// Labels match case-insensitively with whitespace runs collapsed.
fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
