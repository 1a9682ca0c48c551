//! Link resolution followed by markdown rendering.

use crate::link::LinkResolver;
use crate::renderer::MarkdownRenderer;
use crate::state::TocEntry;

/// Display-ready form of a page body.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderedBody {
    /// Safe HTML.
    pub html: String,
    /// Table of contents built from headings.
    pub toc: Vec<TocEntry>,
    /// Distinct page names referenced by the body, in first-occurrence order.
    pub links: Vec<String>,
}

/// Transforms raw page bodies into [`RenderedBody`] values.
///
/// Link-words are rewritten first so the renderer sees them as reference
/// anchors; the renderer then escapes everything else. Rendering never fails.
///
/// # Example
///
/// ```
/// use wk_renderer::RenderPipeline;
///
/// let body = RenderPipeline::default().render("Hello WikiWord");
/// assert_eq!(body.html, r#"<p>Hello <a href="/view/WikiWord">WikiWord</a></p>"#);
/// assert_eq!(body.links, vec!["WikiWord"]);
/// ```
#[derive(Clone, Debug)]
pub struct RenderPipeline {
    resolver: LinkResolver,
    gfm: bool,
}

impl RenderPipeline {
    /// Create a pipeline whose references point at `{prefix}{Word}`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            resolver: LinkResolver::new(prefix),
            gfm: true,
        }
    }

    /// Enable or disable GitHub Flavored Markdown features.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    #[must_use]
    pub fn resolver(&self) -> &LinkResolver {
        &self.resolver
    }

    /// Render a raw body.
    #[must_use]
    pub fn render(&self, raw: &str) -> RenderedBody {
        let resolved = self.resolver.resolve(raw);
        let result = MarkdownRenderer::new()
            .with_reference_prefix(self.resolver.prefix())
            .with_gfm(self.gfm)
            .render_markdown(&resolved);

        RenderedBody {
            html: result.html,
            toc: result.toc,
            links: result.links,
        }
    }
}

impl Default for RenderPipeline {
    fn default() -> Self {
        Self::new(crate::DEFAULT_LINK_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(raw: &str) -> RenderedBody {
        RenderPipeline::default().render(raw)
    }

    #[test]
    fn test_render_resolves_link_words() {
        let body = render("See AliceBob and CarolDave here");
        assert_eq!(
            body.html,
            r#"<p>See <a href="/view/AliceBob">AliceBob</a> and <a href="/view/CarolDave">CarolDave</a> here</p>"#
        );
        assert_eq!(body.links, vec!["AliceBob", "CarolDave"]);
    }

    #[test]
    fn test_render_without_link_words() {
        let body = render("See BOB and alice");
        assert_eq!(body.html, "<p>See BOB and alice</p>");
        assert!(body.links.is_empty());
    }

    #[test]
    fn test_render_escapes_script() {
        let body = render("Hi <script>alert(document.cookie)</script> there");
        assert_eq!(
            body.html,
            "<p>Hi &lt;script&gt;alert(document.cookie)&lt;/script&gt; there</p>"
        );
    }

    #[test]
    fn test_render_rejects_forged_reference() {
        let body = render(r#"<a href="javascript:alert(1)">FakeLink</a>"#);
        assert_eq!(
            body.html,
            "<p>&lt;a href=&quot;javascript:alert(1)&quot;&gt;FakeLink&lt;/a&gt;</p>"
        );
    }

    #[test]
    fn test_render_keeps_code_literal() {
        let body = render("Call `FooBar` then:\n\n```\nBazQux()\n```\n\n    IndentedWord\n");
        assert_eq!(
            body.html,
            "<p>Call <code>FooBar</code> then:</p><pre><code>BazQux()\n</code></pre><pre><code>IndentedWord\n</code></pre>"
        );
        assert!(body.links.is_empty());
    }

    #[test]
    fn test_render_keeps_literal_anchor_in_code_span() {
        let body = render(r#"Write `<a href="/view/FooBar">FooBar</a>` to link."#);
        assert_eq!(
            body.html,
            "<p>Write <code>&lt;a href=&quot;/view/FooBar&quot;&gt;FooBar&lt;/a&gt;</code> to link.</p>"
        );
        assert!(body.links.is_empty());
    }

    #[test]
    fn test_render_reference_links() {
        let body = render(concat!(
            "See [FooBar] and [docs][HelpPage], not [OtherPage].\n\n",
            "[FooBar]: https://example.com/foo\n",
            "[helppage]: https://example.com/help\n",
        ));
        assert_eq!(
            body.html,
            concat!(
                r#"<p>See <a href="https://example.com/foo">FooBar</a> and "#,
                r#"<a href="https://example.com/help">docs</a>, "#,
                r#"not [<a href="/view/OtherPage">OtherPage</a>].</p>"#,
            )
        );
        assert_eq!(body.links, vec!["OtherPage"]);
    }

    #[test]
    fn test_render_heading_toc() {
        let body = render("# StartPage\n\nWelcome");
        assert_eq!(
            body.html,
            r#"<h1 id="startpage"><a href="/view/StartPage">StartPage</a></h1><p>Welcome</p>"#
        );
        assert_eq!(body.toc.len(), 1);
        assert_eq!(body.toc[0].title, "StartPage");
    }

    #[test]
    fn test_render_custom_prefix() {
        let body = RenderPipeline::new("/wiki/").render("Go to HelpPage");
        assert_eq!(
            body.html,
            r#"<p>Go to <a href="/wiki/HelpPage">HelpPage</a></p>"#
        );
    }

    #[test]
    fn test_resolver_is_idempotent_over_rendered_output() {
        let pipeline = RenderPipeline::default();
        let body = pipeline.render("## HelpPage\n\nSee AliceBob, `CodeWord` and [x](/view/LinkedPage).");
        assert_eq!(pipeline.resolver().resolve(&body.html), body.html);
    }

    #[test]
    fn test_resolver_never_rewraps_references_in_escaped_html() {
        let pipeline = RenderPipeline::default();
        let body = pipeline.render(
            r#"See AliceBob. <a href="https://x.test">FakeLink</a> and <!-- NoteWord -->"#,
        );
        assert_eq!(
            body.html,
            concat!(
                r#"<p>See <a href="/view/AliceBob">AliceBob</a>. "#,
                "&lt;a href=&quot;https://x.test&quot;&gt;FakeLink&lt;/a&gt; and &lt;!-- NoteWord --&gt;</p>",
            )
        );

        // Escaped markup reads as prose on a second pass; references stay as they are.
        let again = pipeline.resolver().resolve(&body.html);
        assert_eq!(again.matches(r#"<a href="/view/AliceBob">AliceBob</a>"#).count(), 1);
        assert!(!again.contains(r#"<a href="/view/<a"#));
        assert!(!again.contains("<a href=\"/view/AliceBob\"><a"));
        assert_eq!(pipeline.resolver().resolve(&again), again);
    }

    #[test]
    fn test_render_is_deterministic() {
        let raw = "# Notes\n\n# Notes\n\n| A | B |\n|---|---|\n| WikiWord | 2 |";
        assert_eq!(render(raw), render(raw));
    }

    #[test]
    fn test_render_empty_body() {
        let body = render("");
        assert_eq!(body.html, "");
        assert!(body.toc.is_empty());
        assert!(body.links.is_empty());
    }
}
