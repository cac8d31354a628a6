//! store::error
//!
//! The error taxonomy every store operation reports.
//!
//! Validation and existence failures are typed so the caller can map them to
//! protocol codes. Everything that goes wrong below the store (git, disk,
//! the lock file) collapses into [`StoreError::StorageFailure`]; no retry is
//! attempted here.

use thiserror::Error;

use crate::core::ops::LockError;
use crate::core::shipyard::ShipyardError;
use crate::core::types::TypeError;
use crate::git::GitError;

/// What kind of entity an [`StoreError::AlreadyExists`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Project,
    Stage,
    Resource,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EntityKind::Project => "project",
            EntityKind::Stage => "stage",
            EntityKind::Resource => "resource",
        })
    }
}

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("project '{project}' does not exist")]
    ProjectNotFound { project: String },

    /// Also reported when a branch used as a source does not exist.
    #[error("stage '{stage}' does not exist in project '{project}'")]
    StageNotFound { project: String, stage: String },

    #[error("resource '{path}' does not exist")]
    ResourceNotFound { path: String },

    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: EntityKind, name: String },

    #[error("malformed pipeline definition: {0}")]
    MalformedDefinition(String),

    #[error("version '{version}' is unknown to project '{project}'")]
    VersionNotFound { project: String, version: String },

    #[error("storage failure: {0}")]
    StorageFailure(String),

    #[error(transparent)]
    ValidationError(#[from] TypeError),

    #[error("{operation} is not implemented")]
    Unsupported { operation: &'static str },
}

impl StoreError {
    /// True for failures caused by the request rather than the storage layer.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StoreError::StorageFailure(_))
    }
}

impl From<GitError> for StoreError {
    fn from(err: GitError) -> Self {
        StoreError::StorageFailure(err.to_string())
    }
}

impl From<LockError> for StoreError {
    fn from(err: LockError) -> Self {
        StoreError::StorageFailure(err.to_string())
    }
}

impl From<ShipyardError> for StoreError {
    fn from(err: ShipyardError) -> Self {
        StoreError::MalformedDefinition(err.to_string())
    }
}
