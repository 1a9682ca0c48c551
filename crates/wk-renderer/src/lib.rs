//! Link-word resolution and safe markdown rendering for wiki page bodies.
//!
//! Rendering a body is a two step transform:
//!
//! 1. [`LinkResolver`] rewrites camel-case link-words (`WikiWord`) into
//!    references to the page of the same name.
//! 2. [`MarkdownRenderer`] turns the result into HTML. Text and raw HTML are
//!    escaped; only the reference anchors from step 1 pass through.
//!
//! [`RenderPipeline`] runs both steps and is what callers normally use.
//!
//! # Example
//!
//! ```
//! use wk_renderer::RenderPipeline;
//!
//! let pipeline = RenderPipeline::new("/view/");
//! let body = pipeline.render("See AliceBob and <b>not bold</b>");
//! assert_eq!(
//!     body.html,
//!     r#"<p>See <a href="/view/AliceBob">AliceBob</a> and &lt;b&gt;not bold&lt;/b&gt;</p>"#
//! );
//! ```

mod html;
mod link;
mod pipeline;
mod renderer;
mod state;

pub use link::{DEFAULT_LINK_PREFIX, LinkResolver};
pub use pipeline::{RenderPipeline, RenderedBody};
pub use renderer::{MarkdownRenderer, RenderResult};
pub use state::{TocEntry, escape_html, slugify};
