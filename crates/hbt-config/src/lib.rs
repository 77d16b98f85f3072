//! Configuration management for hatena-blog-tools.
//!
//! Parses `hbt.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `blog.hatena_id`
//! - `blog.blog_id`
//! - `blog.api_key`

mod expand;

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "hbt.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded
/// config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override Hatena account id.
    pub hatena_id: Option<String>,
    /// Override blog id.
    pub blog_id: Option<String>,
    /// Override AtomPub API key.
    pub api_key: Option<String>,
    /// Override external diff command.
    pub diff_command: Option<String>,
    /// Override external diff command arguments.
    pub diff_args: Option<Vec<String>>,
}

/// Application configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Blog credential configuration.
    pub blog: Option<BlogConfig>,
    /// Diff tool configuration.
    pub diff: DiffConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Blog credential configuration.
#[derive(Debug, Deserialize)]
pub struct BlogConfig {
    /// Hatena account id.
    pub hatena_id: String,
    /// Blog domain name (`xxx.hatenablog.com`, `xxx.hateblo.jp`, ...).
    pub blog_id: String,
    /// AtomPub API key.
    pub api_key: String,
}

impl BlogConfig {
    /// Validate that all required fields are properly set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if any field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.hatena_id, "blog.hatena_id")?;
        require_non_empty(&self.blog_id, "blog.blog_id")?;
        require_non_empty(&self.api_key, "blog.api_key")?;
        Ok(())
    }
}

/// Diff tool configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct DiffConfig {
    /// External diff command; the built-in unified diff is used when
    /// absent.
    pub command: Option<String>,
    /// Arguments for the external diff command.
    pub args: Vec<String>,
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
        /// Config field path (e.g., `blog.api_key`).
        field: String,
        /// Error message (e.g., `${HATENA_API_KEY} not set`).
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
    /// If `config_path` is provided, loads from that file. Otherwise,
    /// searches for `hbt.toml` in the current directory and parents, and
    /// falls back to defaults when none exists.
    ///
    /// CLI settings are applied after loading, so CLI arguments take
    /// precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit `config_path` doesn't exist or
    /// parsing fails.
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
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Get validated blog credential configuration.
    ///
    /// Use this instead of the `blog` field when a command requires a
    /// credential.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the section is missing or
    /// any field is empty.
    pub fn require_blog(&self) -> Result<&BlogConfig, ConfigError> {
        let blog = self.blog.as_ref().ok_or_else(|| {
            ConfigError::Validation(
                "blog credentials required: pass --hatena-id/--blog-id/--api-key \
                 or add a [blog] section to hbt.toml"
                    .to_owned(),
            )
        })?;
        blog.validate()?;
        Ok(blog)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        let overrides_blog = settings.hatena_id.is_some()
            || settings.blog_id.is_some()
            || settings.api_key.is_some();
        if overrides_blog {
            let blog = self.blog.get_or_insert_with(|| BlogConfig {
                hatena_id: String::new(),
                blog_id: String::new(),
                api_key: String::new(),
            });
            if let Some(hatena_id) = &settings.hatena_id {
                blog.hatena_id.clone_from(hatena_id);
            }
            if let Some(blog_id) = &settings.blog_id {
                blog.blog_id.clone_from(blog_id);
            }
            if let Some(api_key) = &settings.api_key {
                blog.api_key.clone_from(api_key);
            }
        }

        if let Some(command) = &settings.diff_command {
            self.diff.command = Some(command.clone());
        }
        if let Some(args) = &settings.diff_args {
            self.diff.args.clone_from(args);
        }
    }

    /// Search for a config file in the current directory and parents.
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

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref mut blog) = self.blog {
            blog.hatena_id = expand::expand_env(&blog.hatena_id, "blog.hatena_id")?;
            blog.blog_id = expand::expand_env(&blog.blog_id, "blog.blog_id")?;
            blog.api_key = expand::expand_env(&blog.api_key, "blog.api_key")?;
        }
        Ok(())
    }
}
