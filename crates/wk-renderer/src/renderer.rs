//! Safe markdown to HTML renderer.

use std::borrow::Cow;
use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

use crate::html::{ReferencePolicy, safe_url};
use crate::link::DEFAULT_LINK_PREFIX;
use crate::state::{CodeBlockState, HeadingState, ImageState, TableState, TocEntry, escape_html};

/// Result of rendering markdown.
#[derive(Clone, Debug)]
pub struct RenderResult {
    /// Rendered HTML content.
    pub html: String,
    /// Table of contents entries.
    pub toc: Vec<TocEntry>,
    /// Distinct page names of the reference anchors in `html`, in order.
    pub links: Vec<String>,
}

/// Markdown renderer producing display-safe HTML.
///
/// All text is escaped and raw HTML in the input is shown literally. The only
/// markup passed through is page reference anchors
/// (`<a href="{prefix}Word">`) as emitted by [`LinkResolver`](crate::LinkResolver)
/// with the same prefix. Link and image destinations using scripting schemes
/// are replaced with `#`.
///
/// A renderer is consumed by rendering, so every call starts from a clean
/// state and the same input always yields the same output.
///
/// # Example
///
/// ```
/// use wk_renderer::MarkdownRenderer;
///
/// let result = MarkdownRenderer::new().render_markdown("**Bold** <b>raw</b>");
/// assert_eq!(result.html, "<p><strong>Bold</strong> &lt;b&gt;raw&lt;/b&gt;</p>");
/// ```
pub struct MarkdownRenderer {
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    heading: HeadingState,
    references: ReferencePolicy,
    gfm: bool,
}

impl MarkdownRenderer {
    /// Create a new renderer with GFM enabled and the default reference prefix.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            heading: HeadingState::default(),
            references: ReferencePolicy::new(DEFAULT_LINK_PREFIX),
            gfm: true,
        }
    }

    /// Set the page reference prefix whose anchors may pass through.
    #[must_use]
    pub fn with_reference_prefix(mut self, prefix: &str) -> Self {
        self.references = ReferencePolicy::new(prefix);
        self
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
        } else {
            Options::empty()
        }
    }

    /// Render markdown text using the configured parser options.
    pub fn render_markdown(self, markdown: &str) -> RenderResult {
        let parser = Parser::new_ext(markdown, self.parser_options());
        self.render(parser)
    }

    /// Render markdown events and return the result.
    pub fn render<'a, I>(mut self, events: I) -> RenderResult
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event);
        }

        let closing = self.references.close_unbalanced();
        self.output.push_str(&closing);

        RenderResult {
            html: self.output,
            toc: self.heading.take_toc(),
            links: self.references.take_emitted(),
        }
    }

    /// Push content to output or heading buffer based on context.
    ///
    /// Markup inside image alt text is dropped.
    fn push_inline(&mut self, content: &str) {
        if self.image.is_active() {
            return;
        }
        if self.heading.is_active() {
            self.heading.push_html(content);
        } else {
            self.output.push_str(content);
        }
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.raw_html(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.push_inline("<br>"),
            Event::Rule => self.output.push_str("<hr>"),
            Event::TaskListMarker(checked) => self.task_list_marker(checked),
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not enabled in parser options
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.output.push_str("<p>"),
            Tag::Heading { level, .. } => {
                // Opening tag is written in end_tag once the ID is known.
                self.heading.start_heading(heading_level_to_num(level));
            }
            Tag::BlockQuote(_) => self.output.push_str("<blockquote>"),
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                let lang = info
                    .split_whitespace()
                    .next()
                    .filter(|l| !l.is_empty())
                    .map(str::to_owned);
                self.code.start(lang);
            }
            Tag::CodeBlock(CodeBlockKind::Indented) => self.code.start_indented(),
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => {
                    let _ = write!(self.output, r#"<ol start="{n}">"#);
                }
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => self.output.push_str("<li>"),
            Tag::FootnoteDefinition(_) | Tag::HtmlBlock | Tag::MetadataBlock(_) => {}
            Tag::DefinitionList => self.output.push_str("<dl>"),
            Tag::DefinitionListTitle => self.output.push_str("<dt>"),
            Tag::DefinitionListDefinition => self.output.push_str("<dd>"),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align = self.table.current_alignment_style();
                let tag = if self.table.is_in_head() { "th" } else { "td" };
                let _ = write!(self.output, "<{tag}{align}>");
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Superscript => self.push_inline("<sup>"),
            Tag::Subscript => self.push_inline("<sub>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                let href = escape_html(safe_url(&dest_url));
                let link_tag = if title.is_empty() {
                    format!(r#"<a href="{href}">"#)
                } else {
                    format!(r#"<a href="{href}" title="{}">"#, escape_html(&title))
                };
                self.push_inline(&link_tag);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                // Alt text is collected until the end tag.
                self.image.start(dest_url.to_string(), title.to_string());
            }
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(_) => {
                if let Some((level, id, html)) = self.heading.complete_heading() {
                    let _ = write!(
                        self.output,
                        r#"<h{level} id="{id}">{}</h{level}>"#,
                        html.trim()
                    );
                }
            }
            TagEnd::BlockQuote(_) => self.output.push_str("</blockquote>"),
            TagEnd::CodeBlock => {
                let indented = self.code.is_indented();
                let (lang, content) = self.code.end();
                let content = if indented {
                    self.references.strip_references(&content)
                } else {
                    Cow::Borrowed(content.as_str())
                };
                match lang {
                    Some(lang) => {
                        let _ = write!(
                            self.output,
                            r#"<pre><code class="language-{}">{}</code></pre>"#,
                            escape_html(&lang),
                            escape_html(&content)
                        );
                    }
                    None => {
                        let _ = write!(
                            self.output,
                            "<pre><code>{}</code></pre>",
                            escape_html(&content)
                        );
                    }
                }
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::FootnoteDefinition | TagEnd::HtmlBlock | TagEnd::MetadataBlock(_) => {}
            TagEnd::DefinitionList => self.output.push_str("</dl>"),
            TagEnd::DefinitionListTitle => self.output.push_str("</dt>"),
            TagEnd::DefinitionListDefinition => self.output.push_str("</dd>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Superscript => self.push_inline("</sup>"),
            TagEnd::Subscript => self.push_inline("</sub>"),
            TagEnd::Link => self.push_inline("</a>"),
            TagEnd::Image => {
                if let Some((src, title, alt)) = self.image.end() {
                    let title_attr = if title.is_empty() {
                        String::new()
                    } else {
                        format!(r#" title="{}""#, escape_html(&title))
                    };
                    let img = format!(
                        r#"<img src="{}"{title_attr} alt="{}">"#,
                        escape_html(safe_url(&src)),
                        escape_html(&alt)
                    );
                    self.push_inline(&img);
                }
            }
        }
    }

    fn text(&mut self, text: &str) {
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.heading.is_active() {
            self.heading.push_text(text);
            self.heading.push_html(&escape_html(text));
        } else {
            self.output.push_str(&escape_html(text));
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        self.push_inline(&format!("<code>{}</code>", escape_html(code)));
    }

    fn raw_html(&mut self, html: &str) {
        if self.image.is_active() {
            return;
        }
        let safe = self.references.sanitize(html);
        self.push_inline(&safe);
    }

    fn soft_break(&mut self) {
        if self.code.is_active() {
            self.code.push_str("\n");
        } else if self.image.is_active() {
            self.image.push_str(" ");
        } else {
            self.push_inline("\n");
        }
    }

    fn task_list_marker(&mut self, checked: bool) {
        if checked {
            self.output
                .push_str(r#"<input type="checkbox" disabled checked> "#);
        } else {
            self.output.push_str(r#"<input type="checkbox" disabled> "#);
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convert heading level enum to number (1-6).
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
