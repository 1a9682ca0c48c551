//! `wk save` command implementation.

use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use wk_core::AuthorDirectory;

use super::GlobalArgs;
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the save command.
#[derive(Args)]
pub(crate) struct SaveArgs {
    /// Page title.
    title: String,

    /// Author id, as listed under `[[authors]]` in the config.
    #[arg(short, long, env = "WK_AUTHOR")]
    author: String,

    /// Read the body from this file instead of stdin.
    #[arg(short, long)]
    file: Option<PathBuf>,
}

impl SaveArgs {
    /// Execute the save command.
    ///
    /// # Errors
    ///
    /// Returns an error if the author is unknown, the body cannot be read, or
    /// the save fails.
    pub(crate) fn execute(self, global: &GlobalArgs) -> Result<(), CliError> {
        let output = Output::new();
        let session = global.open(&output)?;

        let author = session
            .authors
            .lookup_author(&self.author)
            .ok_or_else(|| CliError::Validation(format!("Unknown author: {}", self.author)))?;

        let body = match &self.file {
            Some(path) => std::fs::read_to_string(path)?,
            None => {
                let mut body = String::new();
                std::io::stdin().read_to_string(&mut body)?;
                body
            }
        };

        let revision = session.wiki.save_page(&self.title, &body, &author)?;
        output.success(&format!(
            "Saved {} version {}",
            self.title, revision.version
        ));
        Ok(())
    }
}
