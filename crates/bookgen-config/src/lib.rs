//! Configuration management for bookgen.
//!
//! Parses `bookgen.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ```toml
//! [source]
//! dir = "notion_cache"
//!
//! [embed]
//! base_dir = "."
//! viewer_hosts = ["onlinetool.io", "www.onlinetool.io"]
//! widget_path = "/gitoembed/widget"
//! source_host = "github.com"
//! repo_prefix = "/essentialbooks/books/"
//! branches = ["master", "notion"]
//!
//! [[books]]
//! name = "go"
//! start_page = "${GO_START_PAGE}"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `source.dir`
//! - `embed.base_dir`
//! - `books.start_page`

mod expand;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override page snapshot directory.
    pub source_dir: Option<PathBuf>,
    /// Override base directory for embedded source files.
    pub base_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "bookgen.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Snapshot configuration (paths are relative strings from TOML).
    source: SourceConfigRaw,
    /// Embed configuration (paths are relative strings from TOML).
    embed: EmbedConfigRaw,
    /// Books to build.
    pub books: Vec<BookConfig>,

    /// Resolved snapshot configuration (set after loading).
    #[serde(skip)]
    pub source_resolved: SourceConfig,
    /// Resolved embed configuration (set after loading).
    #[serde(skip)]
    pub embed_resolved: EmbedConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Raw snapshot configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct SourceConfigRaw {
    dir: Option<String>,
}

/// Resolved snapshot configuration with absolute paths.
#[derive(Debug, Default)]
pub struct SourceConfig {
    /// Directory of JSON page snapshots.
    pub dir: PathBuf,
}

/// Raw embed configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct EmbedConfigRaw {
    base_dir: Option<String>,
    viewer_hosts: Option<Vec<String>>,
    widget_path: Option<String>,
    source_host: Option<String>,
    repo_prefix: Option<String>,
    branches: Option<Vec<String>>,
}

/// Resolved embed configuration.
///
/// URL convention fields are `None` when not configured; the book builder
/// falls back to its defaults for those.
#[derive(Debug, Default)]
pub struct EmbedConfig {
    /// Directory embedded paths are relative to (the repository checkout).
    pub base_dir: PathBuf,
    pub viewer_hosts: Option<Vec<String>>,
    pub widget_path: Option<String>,
    pub source_host: Option<String>,
    pub repo_prefix: Option<String>,
    pub branches: Option<Vec<String>>,
}

/// A book to build.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct BookConfig {
    /// Short name used on the command line.
    pub name: String,
    /// Id of the book's start page.
    pub start_page: String,
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
        /// Config field path (e.g., "`books[go].start_page`").
        field: String,
        /// Error message (e.g., "${`GO_START_PAGE`}: environment variable not found").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL path field to start with `/`.
fn require_absolute_url_path(value: &str, field: &str) -> Result<(), ConfigError> {
    if !value.starts_with('/') {
        return Err(ConfigError::Validation(format!("{field} must start with /")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `bookgen.toml` in current directory and parents.
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

    /// Find a configured book by name.
    #[must_use]
    pub fn book(&self, name: &str) -> Option<&BookConfig> {
        self.books.iter().find(|b| b.name == name)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source_dir) = &settings.source_dir {
            self.source_resolved.dir.clone_from(source_dir);
        }
        if let Some(base_dir) = &settings.base_dir {
            self.embed_resolved.base_dir.clone_from(base_dir);
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
        let mut config = Self::default();
        config.resolve_paths(base);
        config
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
        self.validate_embed()?;
        self.validate_books()?;
        Ok(())
    }

    fn validate_embed(&self) -> Result<(), ConfigError> {
        let embed = &self.embed_resolved;
        if let Some(hosts) = &embed.viewer_hosts {
            if hosts.is_empty() {
                return Err(ConfigError::Validation(
                    "embed.viewer_hosts cannot be empty".to_owned(),
                ));
            }
            for host in hosts {
                require_non_empty(host, "embed.viewer_hosts")?;
            }
        }
        if let Some(widget_path) = &embed.widget_path {
            require_absolute_url_path(widget_path, "embed.widget_path")?;
        }
        if let Some(source_host) = &embed.source_host {
            require_non_empty(source_host, "embed.source_host")?;
        }
        if let Some(repo_prefix) = &embed.repo_prefix {
            require_absolute_url_path(repo_prefix, "embed.repo_prefix")?;
            if !repo_prefix.ends_with('/') {
                return Err(ConfigError::Validation(
                    "embed.repo_prefix must end with /".to_owned(),
                ));
            }
        }
        for branch in embed.branches.iter().flatten() {
            require_non_empty(branch, "embed.branches")?;
        }
        Ok(())
    }

    fn validate_books(&self) -> Result<(), ConfigError> {
        let mut names = HashSet::new();
        for book in &self.books {
            require_non_empty(&book.name, "books.name")?;
            require_non_empty(&book.start_page, "books.start_page")?;
            if !names.insert(book.name.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate book name '{}'",
                    book.name
                )));
            }
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.source.dir {
            self.source.dir = Some(expand::expand_env(dir, "source.dir")?);
        }
        if let Some(ref base_dir) = self.embed.base_dir {
            self.embed.base_dir = Some(expand::expand_env(base_dir, "embed.base_dir")?);
        }
        for book in &mut self.books {
            let field = format!("books[{}].start_page", book.name);
            book.start_page = expand::expand_env(&book.start_page, &field)?;
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.source_resolved = SourceConfig {
            dir: resolve(self.source.dir.as_deref(), "notion_cache"),
        };

        let embed = &self.embed;
        self.embed_resolved = EmbedConfig {
            base_dir: match embed.base_dir.as_deref() {
                Some(dir) => config_dir.join(dir),
                None => config_dir.to_path_buf(),
            },
            viewer_hosts: embed.viewer_hosts.clone(),
            widget_path: embed.widget_path.clone(),
            source_host: embed.source_host.clone(),
            repo_prefix: embed.repo_prefix.clone(),
            branches: embed.branches.clone(),
        };
    }
}
