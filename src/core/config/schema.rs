//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing to ensure they conform to
//! expected formats (e.g., trunk must be a valid branch name).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::{BranchName, ResourcePath};

/// Store configuration file.
///
/// # Example
///
/// ```toml
/// data_dir = "/data/config"
/// trunk = "master"
/// definition_file = "shipyard.yaml"
///
/// [author]
/// name = "cfgstore"
/// email = "cfgstore@localhost"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// Directory holding one repository per project
    pub data_dir: Option<PathBuf>,

    /// Trunk branch created with every project
    pub trunk: Option<String>,

    /// Project-level path of the pipeline definition
    pub definition_file: Option<String>,

    /// Commit identity
    pub author: Option<AuthorConfig>,
}

impl StoreConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(trunk) = &self.trunk {
            BranchName::new(trunk.as_str()).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid trunk branch name: {}", e))
            })?;
        }

        if let Some(file) = &self.definition_file {
            ResourcePath::new(file).map_err(|e| {
                ConfigError::InvalidValue(format!("invalid definition file: {}", e))
            })?;
        }

        if let Some(dir) = &self.data_dir {
            if dir.as_os_str().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "data_dir cannot be empty".to_string(),
                ));
            }
        }

        if let Some(author) = &self.author {
            author.validate()?;
        }

        Ok(())
    }
}

/// Identity recorded on every commit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorConfig {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl AuthorConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(ConfigError::InvalidValue(
                "author name cannot be empty".to_string(),
            ));
        }
        if self.email.as_deref().is_some_and(|e| e.trim().is_empty()) {
            return Err(ConfigError::InvalidValue(
                "author email cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
