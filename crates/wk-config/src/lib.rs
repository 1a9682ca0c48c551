//! Configuration management for wk.
//!
//! Parses `wk.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [storage]
//! backend = "fs"
//! data_dir = "${WK_DATA:-.wk/data}"
//!
//! [wiki]
//! front_page = "StartPage"
//! link_prefix = "/view/"
//! max_append_attempts = 8
//!
//! [[authors]]
//! id = "ada"
//! name = "Ada Lovelace"
//! email = "ada@example.com"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `storage.data_dir` supports `${VAR}` (errors if unset) and
//! `${VAR:-default}`. Relative data directories are resolved against the
//! directory containing the config file.

mod expand;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "wk.toml";

/// Default data directory, relative to the config file.
const DEFAULT_DATA_DIR: &str = ".wk/data";

/// Upper bound for `wiki.max_append_attempts`.
const MAX_APPEND_ATTEMPTS_LIMIT: u32 = 64;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override data directory.
    pub data_dir: Option<PathBuf>,
    /// Override storage backend.
    pub backend: Option<StorageBackend>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration (paths are relative strings from TOML).
    storage: StorageConfigRaw,
    /// Wiki behavior.
    pub wiki: WikiSettings,
    /// Known authors.
    pub authors: Vec<AuthorConfig>,

    /// Resolved storage configuration (set after loading).
    #[serde(skip)]
    pub storage_resolved: StorageConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Persistence backend selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// JSON documents under the data directory.
    #[default]
    Fs,
    /// Process-local; contents are lost on exit.
    Memory,
}

/// Raw storage configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct StorageConfigRaw {
    backend: Option<StorageBackend>,
    data_dir: Option<String>,
}

/// Resolved storage configuration with absolute paths.
#[derive(Debug, Default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Root directory for the filesystem backend.
    pub data_dir: PathBuf,
}

/// Wiki behavior settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct WikiSettings {
    /// Title the wiki root leads to.
    pub front_page: String,
    /// Path prefix of page references in rendered bodies.
    pub link_prefix: String,
    /// Insert attempts per save before reporting a version conflict.
    pub max_append_attempts: u32,
}

impl Default for WikiSettings {
    fn default() -> Self {
        Self {
            front_page: "StartPage".to_owned(),
            link_prefix: "/view/".to_owned(),
            max_append_attempts: 8,
        }
    }
}

/// Author profile entry.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthorConfig {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`storage.data_dir`").
        field: String,
        /// Error message (e.g., "${`WK_DATA`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `wk.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(data_dir) = &settings.data_dir {
            self.storage_resolved.data_dir.clone_from(data_dir);
        }
        if let Some(backend) = settings.backend {
            self.storage_resolved.backend = backend;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            storage: StorageConfigRaw::default(),
            wiki: WikiSettings::default(),
            authors: Vec::new(),
            storage_resolved: StorageConfig {
                backend: StorageBackend::Fs,
                data_dir: base.join(DEFAULT_DATA_DIR),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_wiki()?;
        self.validate_authors()?;
        Ok(())
    }

    fn validate_wiki(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.wiki.front_page, "wiki.front_page")?;

        let prefix = &self.wiki.link_prefix;
        if !prefix.starts_with('/') || !prefix.ends_with('/') {
            return Err(ConfigError::Validation(format!(
                "wiki.link_prefix must start and end with '/', got {prefix:?}"
            )));
        }

        let attempts = self.wiki.max_append_attempts;
        if attempts == 0 || attempts > MAX_APPEND_ATTEMPTS_LIMIT {
            return Err(ConfigError::Validation(format!(
                "wiki.max_append_attempts must be between 1 and {MAX_APPEND_ATTEMPTS_LIMIT}"
            )));
        }

        Ok(())
    }

    fn validate_authors(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for author in &self.authors {
            require_non_empty(&author.id, "authors.id")?;
            require_non_empty(&author.name, "authors.name")?;
            if !seen.insert(author.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate author id: {}",
                    author.id
                )));
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref data_dir) = self.storage.data_dir {
            self.storage.data_dir = Some(expand::expand_env(data_dir, "storage.data_dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let data_dir = self.storage.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR);
        self.storage_resolved = StorageConfig {
            backend: self.storage.backend.unwrap_or_default(),
            data_dir: config_dir.join(data_dir),
        };
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.storage_resolved.backend, StorageBackend::Fs);
        assert_eq!(
            config.storage_resolved.data_dir,
            PathBuf::from("/test/.wk/data")
        );
        assert_eq!(config.wiki.front_page, "StartPage");
        assert_eq!(config.wiki.link_prefix, "/view/");
        assert_eq!(config.wiki.max_append_attempts, 8);
        assert!(config.authors.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.wiki.front_page, "StartPage");
        assert!(config.storage.backend.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[storage]
backend = "memory"
data_dir = "pages"

[wiki]
front_page = "HomePage"
link_prefix = "/wiki/"
max_append_attempts = 16

[[authors]]
id = "ada"
name = "Ada Lovelace"
email = "ada@example.com"

[[authors]]
id = "bob"
name = "Bob"
email = "bob@example.com"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.storage_resolved.backend, StorageBackend::Memory);
        assert_eq!(
            config.storage_resolved.data_dir,
            PathBuf::from("/project/pages")
        );
        assert_eq!(config.wiki.front_page, "HomePage");
        assert_eq!(config.wiki.link_prefix, "/wiki/");
        assert_eq!(config.wiki.max_append_attempts, 16);
        assert_eq!(
            config.authors,
            vec![
                AuthorConfig {
                    id: "ada".to_owned(),
                    name: "Ada Lovelace".to_owned(),
                    email: "ada@example.com".to_owned(),
                },
                AuthorConfig {
                    id: "bob".to_owned(),
                    name: "Bob".to_owned(),
                    email: "bob@example.com".to_owned(),
                },
            ]
        );
        config.validate().unwrap();
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result: Result<Config, _> = toml::from_str("[storage]\nbackend = \"s3\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_absolute_data_dir_kept() {
        let mut config: Config = toml::from_str("[storage]\ndata_dir = \"/var/lib/wk\"\n").unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.storage_resolved.data_dir, PathBuf::from("/var/lib/wk"));
    }

    #[test]
    fn test_validate_link_prefix() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.wiki.link_prefix = "view".to_owned();

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("wiki.link_prefix"));
    }

    #[test]
    fn test_validate_max_append_attempts() {
        let mut config = Config::default_with_base(Path::new("/test"));

        config.wiki.max_append_attempts = 0;
        assert!(config.validate().is_err());

        config.wiki.max_append_attempts = 65;
        assert!(config.validate().is_err());

        config.wiki.max_append_attempts = 64;
        config.validate().unwrap();
    }

    #[test]
    fn test_validate_front_page_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.wiki.front_page = String::new();

        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Configuration error: wiki.front_page cannot be empty"
        );
    }

    #[test]
    fn test_validate_duplicate_author() {
        let toml = r#"
[[authors]]
id = "ada"
name = "Ada"
email = "a@example.com"

[[authors]]
id = "ada"
name = "Ada Again"
email = "b@example.com"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate author id: ada"));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings {
            data_dir: Some(PathBuf::from("/tmp/wk")),
            backend: Some(StorageBackend::Memory),
        });

        assert_eq!(config.storage_resolved.data_dir, PathBuf::from("/tmp/wk"));
        assert_eq!(config.storage_resolved.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(
            config.storage_resolved.data_dir,
            PathBuf::from("/test/.wk/data")
        );
    }

    #[test]
    fn test_load_from_file_resolves_relative_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wk.toml");
        std::fs::write(&path, "[storage]\ndata_dir = \"store\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.storage_resolved.data_dir, dir.path().join("store"));
        assert_eq!(config.config_path, Some(path));
    }

    #[test]
    fn test_load_expands_env_vars() {
        // SAFETY: variable name is unique to this test
        unsafe {
            std::env::set_var("WK_TEST_LOAD_DATA", "/srv/wk");
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wk.toml");
        std::fs::write(&path, "[storage]\ndata_dir = \"${WK_TEST_LOAD_DATA}/data\"\n").unwrap();

        let config = Config::load(Some(&path), None).unwrap();

        assert_eq!(config.storage_resolved.data_dir, PathBuf::from("/srv/wk/data"));
        unsafe {
            std::env::remove_var("WK_TEST_LOAD_DATA");
        }
    }

    #[test]
    fn test_load_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/wk.toml")), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_invalid_file_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wk.toml");
        std::fs::write(&path, "[wiki]\nmax_append_attempts = 0\n").unwrap();

        let err = Config::load(Some(&path), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
