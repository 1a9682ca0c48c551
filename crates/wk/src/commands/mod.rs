//! CLI command implementations.

pub(crate) mod contributions;
pub(crate) mod history;
pub(crate) mod save;
pub(crate) mod show;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, ValueEnum};
use wk_config::{CliSettings, Config, StorageBackend};
use wk_core::{AuthorRef, StaticAuthorDirectory, Wiki, WikiConfig};
use wk_store::{FsStorage, MemoryStorage, Storage};

pub(crate) use contributions::ContributionsArgs;
pub(crate) use history::HistoryArgs;
pub(crate) use save::SaveArgs;
pub(crate) use show::ShowArgs;

use crate::error::CliError;
use crate::output::Output;

/// Options shared by every command.
#[derive(Args)]
pub(crate) struct GlobalArgs {
    /// Path to configuration file (default: auto-discover wk.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data directory (overrides config).
    #[arg(short, long, global = true, env = "WK_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Storage backend (overrides config).
    #[arg(long, global = true, value_enum)]
    backend: Option<BackendArg>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Storage backends selectable on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum BackendArg {
    /// JSON documents under the data directory.
    Fs,
    /// Process-local; changes are discarded on exit.
    Memory,
}

impl From<BackendArg> for StorageBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Fs => Self::Fs,
            BackendArg::Memory => Self::Memory,
        }
    }
}

/// Wiki and author directory built from configuration.
pub(crate) struct Session {
    pub wiki: Wiki,
    pub authors: StaticAuthorDirectory,
}

impl GlobalArgs {
    /// Overrides taken from the command line.
    pub(crate) fn cli_settings(&self) -> CliSettings {
        CliSettings {
            data_dir: self.data_dir.clone(),
            backend: self.backend.map(StorageBackend::from),
        }
    }

    /// Load configuration and open the configured storage backend.
    pub(crate) fn open(&self, output: &Output) -> Result<Session, CliError> {
        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;

        let storage: Arc<dyn Storage> = match config.storage_resolved.backend {
            StorageBackend::Fs => {
                tracing::debug!(
                    data_dir = %config.storage_resolved.data_dir.display(),
                    "Opening filesystem storage"
                );
                Arc::new(FsStorage::new(config.storage_resolved.data_dir.clone()))
            }
            StorageBackend::Memory => {
                output.warning("Using memory storage: changes are discarded on exit");
                Arc::new(MemoryStorage::new())
            }
        };

        let wiki_config = WikiConfig {
            front_page: config.wiki.front_page,
            link_prefix: config.wiki.link_prefix,
            max_append_attempts: config.wiki.max_append_attempts,
        };
        let authors = config
            .authors
            .into_iter()
            .map(|a| AuthorRef::new(a.id, a.name, a.email))
            .collect();

        Ok(Session {
            wiki: Wiki::new(storage, wiki_config),
            authors,
        })
    }
}
