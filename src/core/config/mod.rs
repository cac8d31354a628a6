//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. `$CFGSTORE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/cfgstore/config.toml`
//! 3. `~/.cfgstore/config.toml` (canonical write location)
//!
//! # Example
//!
//! ```no_run
//! use cfgstore::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("Data dir: {}", config.data_dir().display());
//! println!("Trunk: {}", config.trunk());
//! ```

pub mod schema;

pub use schema::{AuthorConfig, StoreConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{BranchName, ResourcePath};

/// Default trunk branch of every project repository.
pub const DEFAULT_TRUNK: &str = "master";

/// Default location of the pipeline definition inside a project.
pub const DEFAULT_DEFINITION_FILE: &str = "shipyard.yaml";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration with defaulting accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Values read from the config file
    pub file: StoreConfig,
    /// Path the config was loaded from, if any
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Wrap an in-memory configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if validation fails.
    pub fn from_store_config(file: StoreConfig) -> Result<Self, ConfigError> {
        file.validate()?;
        Ok(Self {
            file,
            loaded_from: None,
        })
    }

    /// Load configuration from default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed.
    /// A missing config file is not an error (defaults are used).
    pub fn load() -> Result<Self, ConfigError> {
        match Self::locate() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from an explicit file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let file: StoreConfig = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;

        log::debug!("loaded config from {}", path.display());
        Ok(Self {
            file,
            loaded_from: Some(path.to_path_buf()),
        })
    }

    /// Find the first existing config file in search order.
    fn locate() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("CFGSTORE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("cfgstore/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        dirs::home_dir()
            .map(|home| home.join(".cfgstore/config.toml"))
            .filter(|path| path.exists())
    }

    /// Get the canonical path for the config file.
    ///
    /// Returns `~/.cfgstore/config.toml`.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".cfgstore/config.toml"))
    }

    /// Write a config file atomically.
    ///
    /// Creates parent directories if needed, writes to a temp file in the
    /// same directory, then renames over the target.
    pub fn write(path: &Path, config: &StoreConfig) -> Result<(), ConfigError> {
        config.validate()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

        let temp_path = path.with_extension("toml.tmp");
        let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        file.write_all(contents.as_bytes())
            .map_err(|e| ConfigError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;

        file.sync_all().map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

        fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(())
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Directory holding the project repositories.
    ///
    /// Defaults to `<data_local_dir>/cfgstore`, or `./cfgstore-data` when
    /// the platform has no data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.file.data_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|d| d.join("cfgstore"))
                .unwrap_or_else(|| PathBuf::from("cfgstore-data"))
        })
    }

    /// Override the data directory (used by the `--data-dir` flag).
    pub fn set_data_dir(&mut self, dir: PathBuf) {
        self.file.data_dir = Some(dir);
    }

    /// Trunk branch name. Defaults to `master`.
    pub fn trunk(&self) -> BranchName {
        self.file
            .trunk
            .as_deref()
            .and_then(|t| BranchName::new(t).ok())
            .unwrap_or_else(|| BranchName::new(DEFAULT_TRUNK).expect("default trunk is valid"))
    }

    /// Pipeline definition path. Defaults to `shipyard.yaml`.
    pub fn definition_file(&self) -> ResourcePath {
        self.file
            .definition_file
            .as_deref()
            .and_then(|f| ResourcePath::new(f).ok())
            .unwrap_or_else(|| {
                ResourcePath::new(DEFAULT_DEFINITION_FILE).expect("default definition path is valid")
            })
    }

    /// Commit author name. Defaults to `cfgstore`.
    pub fn author_name(&self) -> &str {
        self.file
            .author
            .as_ref()
            .and_then(|a| a.name.as_deref())
            .unwrap_or("cfgstore")
    }

    /// Commit author email. Defaults to `cfgstore@localhost`.
    pub fn author_email(&self) -> &str {
        self.file
            .author
            .as_ref()
            .and_then(|a| a.email.as_deref())
            .unwrap_or("cfgstore@localhost")
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}
