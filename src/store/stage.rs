//! store::stage
//!
//! Stages are branches that diverge from trunk when they are created.
//!
//! Existence comes from branch state. Ordering and deployment strategies come
//! from the pipeline definition committed on trunk.

use serde::Serialize;

use crate::core::shipyard::{DeploymentStrategy, Shipyard};
use crate::core::types::{BranchName, ProjectName, StageName, Version};

use super::error::StoreError;
use super::resource::ResourceScope;
use super::session::Session;

/// A stage and the branch that backs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stage {
    pub name: StageName,
    #[serde(skip)]
    pub branch: BranchName,
}

impl Stage {
    pub fn new(name: StageName) -> Self {
        let branch = name.branch();
        Self { name, branch }
    }
}

impl Session<'_> {
    /// Create a stage branched from trunk.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ProjectNotFound`] if the project does not exist
    /// - [`StoreError::AlreadyExists`] if the stage already exists
    pub fn create_stage(&self, project: &ProjectName, stage: &StageName) -> Result<Version, StoreError> {
        let repos = &self.store.repos;
        let version = repos.create_branch(&self.guard, project, &stage.branch(), repos.trunk())?;
        log::info!("created stage {}/{} at {}", project, stage, version.short(7));
        Ok(version)
    }

    /// Look up a stage by branch state.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ProjectNotFound`] if the project does not exist
    /// - [`StoreError::StageNotFound`] if the stage does not exist
    pub fn get_stage(&self, project: &ProjectName, stage: &StageName) -> Result<Stage, StoreError> {
        let repos = &self.store.repos;
        if !repos.project_exists(project) {
            return Err(StoreError::ProjectNotFound {
                project: project.to_string(),
            });
        }
        if !repos.stage_exists(project, stage) {
            return Err(StoreError::StageNotFound {
                project: project.to_string(),
                stage: stage.to_string(),
            });
        }
        Ok(Stage::new(stage.clone()))
    }

    /// Read and parse the pipeline definition from trunk.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ResourceNotFound`] if trunk carries no definition
    /// - [`StoreError::MalformedDefinition`] if it cannot be parsed
    pub fn pipeline_definition(&mut self, project: &ProjectName) -> Result<Shipyard, StoreError> {
        let definition_file = self.store.definition_file.clone();
        let workspace = self.checkout(project, &ResourceScope::Project)?;
        let resource = workspace.get(&definition_file)?;
        Ok(Shipyard::parse_bytes(&resource.content)?)
    }

    /// Stages in pipeline order.
    pub fn list_stages(&mut self, project: &ProjectName) -> Result<Vec<Stage>, StoreError> {
        Ok(self
            .pipeline_definition(project)?
            .stage_names()
            .into_iter()
            .map(Stage::new)
            .collect())
    }

    /// Effective deployment strategy of every stage, in pipeline order.
    pub fn deployment_strategies(
        &mut self,
        project: &ProjectName,
    ) -> Result<Vec<(StageName, DeploymentStrategy)>, StoreError> {
        Ok(self.pipeline_definition(project)?.deployment_strategies())
    }

    /// Every stage of the pipeline mapped to `strategy`.
    pub fn fixed_deployment_strategies(
        &mut self,
        project: &ProjectName,
        strategy: DeploymentStrategy,
    ) -> Result<Vec<(StageName, DeploymentStrategy)>, StoreError> {
        Ok(self
            .pipeline_definition(project)?
            .fixed_deployment_strategies(strategy))
    }

    /// Stages cannot be modified after creation.
    pub fn update_stage(&self, _project: &ProjectName, _stage: &StageName) -> Result<(), StoreError> {
        Err(StoreError::Unsupported {
            operation: "updating a stage",
        })
    }

    /// Stages cannot be removed.
    pub fn delete_stage(&self, _project: &ProjectName, _stage: &StageName) -> Result<(), StoreError> {
        Err(StoreError::Unsupported {
            operation: "deleting a stage",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_is_backed_by_same_named_branch() {
        let stage = Stage::new(StageName::new("staging").unwrap());
        assert_eq!(stage.branch.as_str(), "staging");
    }

    #[test]
    fn stage_serializes_name_only() {
        let stage = Stage::new(StageName::new("dev").unwrap());
        let json = serde_json::to_value(&stage).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "dev" }));
    }
}
