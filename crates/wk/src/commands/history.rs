//! `wk history` command implementation.

use clap::Args;

use super::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the history command.
#[derive(Args)]
pub(crate) struct HistoryArgs {
    /// Page title.
    title: String,

    /// Show at most this many revisions.
    #[arg(short = 'n', long)]
    limit: Option<usize>,
}

impl HistoryArgs {
    /// Execute the history command.
    ///
    /// # Errors
    ///
    /// Returns an error if the page does not exist or a revision cannot be read.
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let session = global.open(&output)?;

        let history = session.wiki.page_history(&self.title)?;
        output.highlight(&self.title);

        for revision in history.take(self.limit.unwrap_or(usize::MAX)) {
            let revision = revision?;
            output.content(&format!(
                "{:>5}  {}  {} <{}>",
                revision.version,
                revision.created_at.format("%Y-%m-%d %H:%M:%S"),
                revision.author.name,
                revision.author.email
            ));
        }
        Ok(())
    }
}
