//! `wk show` command implementation.

use clap::Args;
use serde_json::json;
use wk_core::RevisionSummary;

use super::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the show command.
#[derive(Args)]
pub(crate) struct ShowArgs {
    /// Page title (default: the configured front page).
    title: Option<String>,

    /// Print the raw body instead of rendered HTML.
    #[arg(long)]
    raw: bool,

    /// Print page, revision and rendered body as JSON.
    #[arg(long, conflicts_with = "raw")]
    json: bool,
}

impl ShowArgs {
    /// Execute the show command.
    ///
    /// # Errors
    ///
    /// Returns an error if the page does not exist or storage fails.
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let session = global.open(&output)?;
        let wiki = &session.wiki;

        let title = self.title.as_deref().unwrap_or(wiki.front_page());
        let resolved = wiki.resolve_page(title)?;

        let Some(revision) = &resolved.latest else {
            output.warning(&format!("{title} has no revisions yet"));
            return Ok(());
        };

        if self.raw {
            output.content(&revision.body);
            return Ok(());
        }

        let body = wiki.rendered_body(revision);
        if self.json {
            let value = json!({
                "page": resolved.page,
                "revision": revision,
                "rendered": body,
            });
            output.content(&serde_json::to_string_pretty(&value)?);
            return Ok(());
        }

        output.highlight(title);
        output.detail(&RevisionSummary::from(revision).to_string());
        if !body.links.is_empty() {
            output.detail(&format!("Links: {}", body.links.join(", ")));
        }
        output.content(&body.html);
        Ok(())
    }
}
