//! store
//!
//! The versioned configuration store.
//!
//! # Architecture
//!
//! - [`repository`] - One git repository per project; branch plumbing
//! - [`stage`] - Stages as branches; pipeline-definition lookups
//! - [`resource`] - Resource CRUD on a checked-out branch
//! - [`session`] - Lock-holding handles
//! - [`error`] - The error taxonomy
//!
//! [`ConfigStore`] is the entry point. Each of its operations opens a
//! [`Session`], re-checks existence under the lock, checks out the target
//! branch, performs the work, and releases the lock when the session drops.
//! Callers that need several steps under one lock use [`ConfigStore::session`]
//! directly.
//!
//! # Example
//!
//! ```ignore
//! let store = ConfigStore::open(&Config::load()?)?;
//! let shop = ProjectName::new("shop")?;
//! let staging = StageName::new("staging")?;
//!
//! store.create_project(&shop)?;
//! store.create_stage(&shop, &staging)?;
//! let scope = ResourceScope::Service(staging, ServiceName::new("svc")?);
//! let v1 = store.put_resource(&shop, &scope, &ResourcePath::new("config.yaml")?, b"a: 1")?;
//! ```

pub mod error;
pub mod repository;
pub mod resource;
pub mod session;
pub mod stage;

use std::fs;

pub use error::{EntityKind, StoreError};
pub use repository::RepositoryStore;
pub use resource::{Resource, ResourceScope, VersionInfo};
pub use session::{Session, Workspace};
pub use stage::Stage;

use crate::core::config::Config;
use crate::core::ops::StoreLock;
use crate::core::paths::StorePaths;
use crate::core::shipyard::DeploymentStrategy;
use crate::core::types::{BranchName, ProjectName, ResourcePath, StageName, Version};
use crate::git::Author;

/// Handle to one data directory. `Send + Sync`; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    repos: RepositoryStore,
    lock: StoreLock,
    definition_file: ResourcePath,
}

impl ConfigStore {
    pub fn new(
        paths: StorePaths,
        trunk: BranchName,
        author: Author,
        definition_file: ResourcePath,
    ) -> Self {
        Self {
            lock: StoreLock::new(paths.clone()),
            repos: RepositoryStore::new(paths, trunk, author),
            definition_file,
        }
    }

    /// Build a store from loaded configuration, creating the data directory.
    pub fn open(config: &Config) -> Result<Self, StoreError> {
        let data_dir = config.data_dir();
        fs::create_dir_all(&data_dir).map_err(|e| {
            StoreError::StorageFailure(format!("cannot create {}: {}", data_dir.display(), e))
        })?;

        log::debug!("opening store at {}", data_dir.display());
        Ok(Self::new(
            StorePaths::new(data_dir),
            config.trunk(),
            Author::new(config.author_name(), config.author_email()),
            config.definition_file(),
        ))
    }

    pub fn repositories(&self) -> &RepositoryStore {
        &self.repos
    }

    pub fn trunk(&self) -> &BranchName {
        self.repos.trunk()
    }

    pub fn definition_file(&self) -> &ResourcePath {
        &self.definition_file
    }

    /// Acquire the store lock, blocking until it is free.
    pub fn session(&self) -> Result<Session<'_>, StoreError> {
        let guard = self.lock.acquire()?;
        Ok(Session::new(self, guard))
    }

    // =========================================================================
    // Projects
    // =========================================================================

    pub fn create_project(&self, project: &ProjectName) -> Result<Version, StoreError> {
        self.session()?.create_project(project)
    }

    pub fn delete_project(&self, project: &ProjectName) -> Result<(), StoreError> {
        self.session()?.delete_project(project)
    }

    /// Lock-free.
    pub fn project_exists(&self, project: &ProjectName) -> bool {
        self.repos.project_exists(project)
    }

    /// Lock-free.
    pub fn list_projects(&self) -> Result<Vec<ProjectName>, StoreError> {
        self.repos.list_projects()
    }

    // =========================================================================
    // Stages
    // =========================================================================

    pub fn create_stage(&self, project: &ProjectName, stage: &StageName) -> Result<Version, StoreError> {
        self.session()?.create_stage(project, stage)
    }

    /// Lock-free. False when the project is absent.
    pub fn stage_exists(&self, project: &ProjectName, stage: &StageName) -> bool {
        self.repos.stage_exists(project, stage)
    }

    pub fn get_stage(&self, project: &ProjectName, stage: &StageName) -> Result<Stage, StoreError> {
        self.session()?.get_stage(project, stage)
    }

    pub fn list_stages(&self, project: &ProjectName) -> Result<Vec<Stage>, StoreError> {
        self.session()?.list_stages(project)
    }

    pub fn deployment_strategies(
        &self,
        project: &ProjectName,
    ) -> Result<Vec<(StageName, DeploymentStrategy)>, StoreError> {
        self.session()?.deployment_strategies(project)
    }

    pub fn fixed_deployment_strategies(
        &self,
        project: &ProjectName,
        strategy: DeploymentStrategy,
    ) -> Result<Vec<(StageName, DeploymentStrategy)>, StoreError> {
        self.session()?.fixed_deployment_strategies(project, strategy)
    }

    pub fn update_stage(&self, project: &ProjectName, stage: &StageName) -> Result<(), StoreError> {
        self.session()?.update_stage(project, stage)
    }

    pub fn delete_stage(&self, project: &ProjectName, stage: &StageName) -> Result<(), StoreError> {
        self.session()?.delete_stage(project, stage)
    }

    // =========================================================================
    // Resources
    // =========================================================================

    pub fn get_resource(
        &self,
        project: &ProjectName,
        scope: &ResourceScope,
        path: &ResourcePath,
    ) -> Result<Resource, StoreError> {
        let mut session = self.session()?;
        let workspace = session.checkout(project, scope)?;
        workspace.get(path)
    }

    pub fn put_resource(
        &self,
        project: &ProjectName,
        scope: &ResourceScope,
        path: &ResourcePath,
        content: &[u8],
    ) -> Result<Version, StoreError> {
        let mut session = self.session()?;
        let workspace = session.checkout(project, scope)?;
        workspace.put(path, content)
    }

    pub fn put_resources(
        &self,
        project: &ProjectName,
        scope: &ResourceScope,
        resources: &[(ResourcePath, Vec<u8>)],
    ) -> Result<Version, StoreError> {
        let mut session = self.session()?;
        let workspace = session.checkout(project, scope)?;
        workspace.put_many(resources)
    }

    pub fn delete_resource(
        &self,
        project: &ProjectName,
        scope: &ResourceScope,
        path: &ResourcePath,
    ) -> Result<Version, StoreError> {
        let mut session = self.session()?;
        let workspace = session.checkout(project, scope)?;
        workspace.delete(path)
    }

    pub fn get_resource_at_version(
        &self,
        project: &ProjectName,
        scope: &ResourceScope,
        path: &ResourcePath,
        version: &str,
    ) -> Result<Vec<u8>, StoreError> {
        let mut session = self.session()?;
        let workspace = session.checkout(project, scope)?;
        workspace.get_at_version(path, version)
    }

    pub fn list_resources(
        &self,
        project: &ProjectName,
        scope: &ResourceScope,
    ) -> Result<Vec<ResourcePath>, StoreError> {
        let mut session = self.session()?;
        let workspace = session.checkout(project, scope)?;
        workspace.list()
    }

    pub fn resource_history(
        &self,
        project: &ProjectName,
        scope: &ResourceScope,
        path: &ResourcePath,
    ) -> Result<Vec<VersionInfo>, StoreError> {
        let mut session = self.session()?;
        let workspace = session.checkout(project, scope)?;
        workspace.history(path)
    }
}
