//! store::repository
//!
//! One git repository per project.
//!
//! Read-only predicates (`project_exists`, `stage_exists`, listings) may be
//! called without the store lock. Everything that creates, removes, or
//! checks out takes a [`LockGuard`] as proof that the caller holds the lock.

use std::fs;

use crate::core::ops::LockGuard;
use crate::core::paths::StorePaths;
use crate::core::types::{BranchName, ProjectName, StageName, Version};
use crate::git::{Author, Git, GitError};

use super::error::{EntityKind, StoreError};

/// Owns the mapping from projects to repositories.
#[derive(Debug, Clone)]
pub struct RepositoryStore {
    paths: StorePaths,
    trunk: BranchName,
    author: Author,
}

impl RepositoryStore {
    pub fn new(paths: StorePaths, trunk: BranchName, author: Author) -> Self {
        Self {
            paths,
            trunk,
            author,
        }
    }

    /// Branch every project is created with.
    pub fn trunk(&self) -> &BranchName {
        &self.trunk
    }

    // =========================================================================
    // Projects
    // =========================================================================

    /// Create a project repository with an initial commit on trunk.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AlreadyExists`] if the project already exists
    pub fn create_project(
        &self,
        _lock: &LockGuard,
        project: &ProjectName,
    ) -> Result<Version, StoreError> {
        if self.project_exists(project) {
            return Err(StoreError::AlreadyExists {
                kind: EntityKind::Project,
                name: project.to_string(),
            });
        }

        let dir = self.paths.project_dir(project);
        let git = Git::init(&dir, &self.trunk, self.author.clone())?;
        let version = git.head_version()?;

        log::info!("created project {} at {}", project, dir.display());
        Ok(version)
    }

    /// Check whether a project repository exists. Does not touch any working tree.
    pub fn project_exists(&self, project: &ProjectName) -> bool {
        self.paths.project_git_dir(project).is_dir()
    }

    /// Remove a project repository and all of its branches.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ProjectNotFound`] if the project does not exist
    pub fn delete_project(&self, _lock: &LockGuard, project: &ProjectName) -> Result<(), StoreError> {
        self.ensure_project(project)?;

        let dir = self.paths.project_dir(project);
        fs::remove_dir_all(&dir).map_err(|e| {
            StoreError::StorageFailure(format!("cannot remove {}: {}", dir.display(), e))
        })?;

        log::info!("deleted project {}", project);
        Ok(())
    }

    /// Names of all projects, sorted.
    pub fn list_projects(&self) -> Result<Vec<ProjectName>, StoreError> {
        let entries = match fs::read_dir(&self.paths.data_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::StorageFailure(format!(
                    "cannot read {}: {}",
                    self.paths.data_dir.display(),
                    e
                )))
            }
        };

        let mut projects: Vec<ProjectName> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| StorePaths::is_repository(&entry.path()))
            .filter_map(|entry| entry.file_name().to_str().map(str::to_owned))
            .filter_map(|name| ProjectName::new(name).ok())
            .collect();

        projects.sort();
        Ok(projects)
    }

    /// Open a project's repository.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ProjectNotFound`] if the project does not exist
    pub fn open(&self, project: &ProjectName) -> Result<Git, StoreError> {
        self.ensure_project(project)?;
        Ok(Git::open(
            &self.paths.project_dir(project),
            self.author.clone(),
        )?)
    }

    fn ensure_project(&self, project: &ProjectName) -> Result<(), StoreError> {
        if self.project_exists(project) {
            Ok(())
        } else {
            Err(StoreError::ProjectNotFound {
                project: project.to_string(),
            })
        }
    }

    // =========================================================================
    // Branches
    // =========================================================================

    /// Check whether `branch` exists in `project`. False if the project is absent.
    pub fn branch_exists(&self, project: &ProjectName, branch: &BranchName) -> bool {
        self.open(project)
            .map(|git| git.branch_exists(branch))
            .unwrap_or(false)
    }

    /// Check whether `stage` is backed by a branch. Trunk is never a stage.
    pub fn stage_exists(&self, project: &ProjectName, stage: &StageName) -> bool {
        let branch = stage.branch();
        branch != self.trunk && self.branch_exists(project, &branch)
    }

    /// Local branches of a project, sorted.
    pub fn list_branches(&self, project: &ProjectName) -> Result<Vec<BranchName>, StoreError> {
        Ok(self.open(project)?.list_branches()?)
    }

    /// Create `new` at the head of `from`.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ProjectNotFound`] if the project does not exist
    /// - [`StoreError::AlreadyExists`] if `new` already exists
    /// - [`StoreError::StageNotFound`] if `from` does not exist
    pub fn create_branch(
        &self,
        _lock: &LockGuard,
        project: &ProjectName,
        new: &BranchName,
        from: &BranchName,
    ) -> Result<Version, StoreError> {
        let git = self.open(project)?;
        git.create_branch(new, from).map_err(|e| match e {
            GitError::BranchExists { branch } => StoreError::AlreadyExists {
                kind: EntityKind::Stage,
                name: branch,
            },
            GitError::RefNotFound { .. } => StoreError::StageNotFound {
                project: project.to_string(),
                stage: from.to_string(),
            },
            other => other.into(),
        })
    }

    /// Make `branch` the project's working tree and return the opened repository.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ProjectNotFound`] if the project does not exist
    /// - [`StoreError::StageNotFound`] if the branch does not exist
    pub fn checkout_branch(
        &self,
        _lock: &LockGuard,
        project: &ProjectName,
        branch: &BranchName,
    ) -> Result<Git, StoreError> {
        let git = self.open(project)?;
        git.checkout_branch(branch).map_err(|e| match e {
            GitError::RefNotFound { .. } => StoreError::StageNotFound {
                project: project.to_string(),
                stage: branch.to_string(),
            },
            other => other.into(),
        })?;

        log::debug!("checked out {}/{}", project, branch);
        Ok(git)
    }
}
