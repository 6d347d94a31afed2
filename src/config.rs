//! Application configuration management.
//!
//! Settings are layered with figment, lowest priority first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file: `--config PATH`, or `config.toml` in the platform config
//!    directory when it exists
//! 3. Environment variables prefixed with `LINKDUPE_` (e.g. `LINKDUPE_MIN_SIZE`)
//! 4. Command-line flags that were actually given

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::dedup::DEFAULT_BLOCK_SIZE;
use crate::scanner::DEFAULT_MIN_SIZE;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "LINKDUPE_";

/// Configuration file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Errors in configuration sources or values.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The block size is zero.
    #[error("block_size must be at least 1 byte")]
    ZeroBlockSize,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Minimum file size in bytes; smaller files are never considered.
    pub min_size: u64,
    /// Comparator block size in bytes.
    pub block_size: usize,
    /// Simulate without changing the filesystem.
    pub dry_run: bool,
    /// Only report errors.
    pub quiet: bool,
    /// Follow symbolic links during traversal.
    pub follow_symlinks: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            block_size: DEFAULT_BLOCK_SIZE,
            dry_run: false,
            quiet: false,
            follow_symlinks: false,
            skip_hidden: false,
        }
    }
}

impl Config {
    /// Build the figment for defaults, an optional file, and the environment.
    ///
    /// An explicit `path` must exist. Without one, the platform config file
    /// is used only if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if an explicit path does not exist.
    pub fn figment(path: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                log::debug!("Loading config from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(default_path) = Self::config_path().filter(|p| p.is_file()) {
                    log::debug!("Loading config from {}", default_path.display());
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Load defaults, file and environment, then apply the CLI flags on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is missing or malformed, or if the
    /// resulting block size is zero.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config: Config = Self::figment(cli.config.as_deref())?
            .extract()
            .context("invalid configuration")?;
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Override settings with flags that were given on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(min_size) = cli.min_size {
            self.min_size = min_size;
        }
        if let Some(block_size) = cli.block_size {
            self.block_size = block_size;
        }
        self.dry_run |= cli.dry_run;
        self.quiet |= cli.quiet;
        self.follow_symlinks |= cli.follow_symlinks;
        self.skip_hidden |= cli.skip_hidden;
    }

    /// Check that the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroBlockSize`] if the block size is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_size == 0 {
            return Err(ConfigError::ZeroBlockSize);
        }
        Ok(())
    }

    /// Whether each linked pair should be printed.
    ///
    /// A dry run always reports, even when quiet.
    #[must_use]
    pub fn report_pairs(&self) -> bool {
        self.dry_run || !self.quiet
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "linkdupe", "linkdupe")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}
