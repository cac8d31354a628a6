//! core::shipyard
//!
//! Pipeline definition ("shipyard") schema and parsing.
//!
//! # Format
//!
//! The definition is a YAML document stored as a project-level resource on
//! the trunk branch. It lists stages in pipeline order:
//!
//! ```yaml
//! stages:
//!   - name: dev
//!     deployment_strategy: direct
//!   - name: staging
//!     deployment_strategy: blue_green_service
//!   - name: production
//!     deployment_strategy: canary
//! ```
//!
//! Unknown fields are ignored so newer definitions still parse.
//!
//! # Deployment strategies
//!
//! Strategy strings collapse into two classes, see [`DeploymentStrategy`].
//! An unrecognized strategy string is never a parse error; it falls back to
//! [`DeploymentStrategy::Direct`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::StageName;

/// Errors from parsing a pipeline definition.
#[derive(Debug, Error)]
pub enum ShipyardError {
    /// The document is not valid YAML or does not match the schema.
    #[error("malformed pipeline definition: {0}")]
    Malformed(String),

    /// A stage name is not a valid stage identifier.
    #[error("invalid stage '{name}' in pipeline definition: {reason}")]
    InvalidStage { name: String, reason: String },

    /// The same stage appears twice.
    #[error("duplicate stage '{0}' in pipeline definition")]
    DuplicateStage(String),
}

/// How new content reaches a stage's runtime target.
///
/// Traffic-splitting strategies (`blue_green_service`, `blue_green`,
/// `canary`) map to [`Duplicate`](Self::Duplicate); everything else maps to
/// [`Direct`](Self::Direct).
///
/// # Example
///
/// ```
/// use cfgstore::core::shipyard::DeploymentStrategy;
///
/// assert_eq!(DeploymentStrategy::from_name("canary"), DeploymentStrategy::Duplicate);
/// assert_eq!(DeploymentStrategy::from_name("direct"), DeploymentStrategy::Direct);
/// assert_eq!(DeploymentStrategy::from_name("rolling-v9"), DeploymentStrategy::Direct);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStrategy {
    /// In-place replacement of the running deployment.
    Direct,
    /// A second deployment receives a share of traffic.
    Duplicate,
}

impl DeploymentStrategy {
    const TRAFFIC_SPLITTING: [&'static str; 3] = ["blue_green_service", "blue_green", "canary"];

    /// Classify a strategy string.
    pub fn from_name(name: &str) -> Self {
        if Self::TRAFFIC_SPLITTING.contains(&name) {
            DeploymentStrategy::Duplicate
        } else {
            DeploymentStrategy::Direct
        }
    }

    /// Lowercase name of the class.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStrategy::Direct => "direct",
            DeploymentStrategy::Duplicate => "duplicate",
        }
    }
}

impl std::fmt::Display for DeploymentStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DeploymentStrategy {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "duplicate" => DeploymentStrategy::Duplicate,
            other => DeploymentStrategy::from_name(other),
        })
    }
}

/// One stage record as written in the definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageDefinition {
    /// Stage name.
    pub name: String,

    /// Raw strategy string, kept verbatim.
    #[serde(default)]
    pub deployment_strategy: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_strategy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approval_strategy: Option<String>,
}

impl StageDefinition {
    /// Effective deployment strategy class for this stage.
    pub fn strategy(&self) -> DeploymentStrategy {
        DeploymentStrategy::from_name(&self.deployment_strategy)
    }
}

/// A parsed pipeline definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipyard {
    /// Stages in pipeline order.
    pub stages: Vec<StageDefinition>,
}

impl Shipyard {
    /// Parse a definition document.
    ///
    /// # Errors
    ///
    /// - [`ShipyardError::Malformed`] if the document is not YAML, lacks a
    ///   `stages` list, or a stage lacks a `name`
    /// - [`ShipyardError::InvalidStage`] if a stage name is not a valid
    ///   stage identifier
    /// - [`ShipyardError::DuplicateStage`] if a stage is listed twice
    ///
    /// # Example
    ///
    /// ```
    /// use cfgstore::core::shipyard::{DeploymentStrategy, Shipyard};
    ///
    /// let shipyard = Shipyard::parse(
    ///     "stages:\n  - name: dev\n    deployment_strategy: direct\n  - name: prod\n    deployment_strategy: canary\n",
    /// ).unwrap();
    ///
    /// assert_eq!(shipyard.stage_names().len(), 2);
    /// assert_eq!(shipyard.stages[1].strategy(), DeploymentStrategy::Duplicate);
    /// ```
    pub fn parse(content: &str) -> Result<Self, ShipyardError> {
        let shipyard: Shipyard =
            serde_yaml::from_str(content).map_err(|e| ShipyardError::Malformed(e.to_string()))?;

        let mut seen = HashSet::new();
        for stage in &shipyard.stages {
            StageName::new(stage.name.as_str()).map_err(|e| ShipyardError::InvalidStage {
                name: stage.name.clone(),
                reason: e.to_string(),
            })?;
            if !seen.insert(stage.name.as_str()) {
                return Err(ShipyardError::DuplicateStage(stage.name.clone()));
            }
        }

        Ok(shipyard)
    }

    /// Parse a definition from raw bytes.
    pub fn parse_bytes(content: &[u8]) -> Result<Self, ShipyardError> {
        let text = std::str::from_utf8(content)
            .map_err(|_| ShipyardError::Malformed("definition is not valid UTF-8".into()))?;
        Self::parse(text)
    }

    /// Stage names in pipeline order.
    pub fn stage_names(&self) -> Vec<StageName> {
        // Names were validated in `parse`.
        self.stages
            .iter()
            .filter_map(|s| StageName::new(s.name.as_str()).ok())
            .collect()
    }

    /// Look up a stage definition by name.
    pub fn stage(&self, name: &StageName) -> Option<&StageDefinition> {
        self.stages.iter().find(|s| s.name == name.as_str())
    }

    /// Effective strategy for every stage, in pipeline order.
    pub fn deployment_strategies(&self) -> Vec<(StageName, DeploymentStrategy)> {
        self.stages
            .iter()
            .filter_map(|s| {
                StageName::new(s.name.as_str())
                    .ok()
                    .map(|name| (name, s.strategy()))
            })
            .collect()
    }

    /// Every stage mapped to the same strategy.
    pub fn fixed_deployment_strategies(
        &self,
        strategy: DeploymentStrategy,
    ) -> Vec<(StageName, DeploymentStrategy)> {
        self.stage_names()
            .into_iter()
            .map(|name| (name, strategy))
            .collect()
    }
}
