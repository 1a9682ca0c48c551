//! `wk contributions` command implementation.

use clap::Args;

use super::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the contributions command.
#[derive(Args)]
pub(crate) struct ContributionsArgs {
    /// Author id.
    author: String,
}

impl ContributionsArgs {
    /// Execute the contributions command.
    ///
    /// # Errors
    ///
    /// Returns an error if storage fails.
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let session = global.open(&output)?;

        let titles = session.wiki.contributions(&self.author)?;
        if titles.is_empty() {
            output.info(&format!("{} has not revised any pages", self.author));
            return Ok(());
        }

        for title in &titles {
            output.content(title);
        }
        Ok(())
    }
}
