//! store::session
//!
//! Lock-holding handles.
//!
//! A [`Session`] owns the store lock for its whole lifetime. Checking out a
//! branch is only possible through [`Session::checkout`], which mutably
//! borrows the session, so at most one [`Workspace`] exists per session and
//! no working tree can change underneath it.

use std::marker::PhantomData;

use crate::core::ops::LockGuard;
use crate::core::types::{BranchName, ProjectName, Version};
use crate::git::Git;

use super::error::StoreError;
use super::resource::ResourceScope;
use super::ConfigStore;

/// Exclusive access to the store. Dropping it releases the lock.
#[derive(Debug)]
pub struct Session<'s> {
    pub(super) store: &'s ConfigStore,
    pub(super) guard: LockGuard,
}

impl<'s> Session<'s> {
    pub(super) fn new(store: &'s ConfigStore, guard: LockGuard) -> Self {
        log::trace!("session opened");
        Self { store, guard }
    }

    pub fn store(&self) -> &'s ConfigStore {
        self.store
    }

    /// Create a project. See [`RepositoryStore::create_project`](super::RepositoryStore::create_project).
    pub fn create_project(&self, project: &ProjectName) -> Result<Version, StoreError> {
        self.store.repos.create_project(&self.guard, project)
    }

    /// Delete a project and every stage in it.
    pub fn delete_project(&self, project: &ProjectName) -> Result<(), StoreError> {
        self.store.repos.delete_project(&self.guard, project)
    }

    /// Check out the branch behind `scope` and return a handle to its tree.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ProjectNotFound`] if the project does not exist
    /// - [`StoreError::StageNotFound`] if the scope's stage does not exist or
    ///   names trunk
    pub fn checkout(
        &mut self,
        project: &ProjectName,
        scope: &ResourceScope,
    ) -> Result<Workspace<'_>, StoreError> {
        let repos = &self.store.repos;
        if let Some(stage) = scope.stage() {
            if repos.project_exists(project) && !repos.stage_exists(project, stage) {
                return Err(StoreError::StageNotFound {
                    project: project.to_string(),
                    stage: stage.to_string(),
                });
            }
        }

        let branch = scope.branch(repos.trunk());
        let git = repos.checkout_branch(&self.guard, project, &branch)?;

        Ok(Workspace {
            git,
            project: project.clone(),
            branch,
            scope: scope.clone(),
            _session: PhantomData,
        })
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        log::trace!("session closed");
    }
}

/// One checked-out branch inside a [`Session`].
#[derive(Debug)]
pub struct Workspace<'a> {
    pub(super) git: Git,
    pub(super) project: ProjectName,
    pub(super) branch: BranchName,
    pub(super) scope: ResourceScope,
    _session: PhantomData<&'a mut LockGuard>,
}

impl Workspace<'_> {
    pub fn project(&self) -> &ProjectName {
        &self.project
    }

    pub fn branch(&self) -> &BranchName {
        &self.branch
    }

    pub fn scope(&self) -> &ResourceScope {
        &self.scope
    }

    /// Head of the checked-out branch.
    pub fn head(&self) -> Result<Version, StoreError> {
        Ok(self.git.head_version()?)
    }
}
