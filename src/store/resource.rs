//! store::resource
//!
//! Resource CRUD on a checked-out branch.
//!
//! Every mutation is exactly one commit, and the returned [`Version`] is the
//! branch head after the call. Writing content that is byte-identical to
//! what is stored creates no commit and returns the current head.

use serde::Serialize;

use crate::core::types::{BranchName, ResourcePath, ServiceName, StageName, Version};
use crate::git::{Change, CommitInfo, GitError};

use super::error::{EntityKind, StoreError};
use super::session::Workspace;

/// Where a resource lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceScope {
    /// Trunk of the project.
    Project,
    /// Root of a stage branch.
    Stage(StageName),
    /// A service directory inside a stage branch.
    Service(StageName, ServiceName),
}

impl ResourceScope {
    /// The branch backing this scope.
    pub fn branch(&self, trunk: &BranchName) -> BranchName {
        match self {
            ResourceScope::Project => trunk.clone(),
            ResourceScope::Stage(stage) | ResourceScope::Service(stage, _) => stage.branch(),
        }
    }

    pub fn stage(&self) -> Option<&StageName> {
        match self {
            ResourceScope::Project => None,
            ResourceScope::Stage(stage) | ResourceScope::Service(stage, _) => Some(stage),
        }
    }

    /// Repository path of `path` within this scope.
    pub fn locate(&self, path: &ResourcePath) -> ResourcePath {
        match self {
            ResourceScope::Service(_, service) => path.under(service),
            _ => path.clone(),
        }
    }

    /// Scope-relative path of a repository path, if it belongs to this scope.
    pub fn relative(&self, full: &str) -> Option<ResourcePath> {
        let full = ResourcePath::new(full).ok()?;
        match self {
            ResourceScope::Service(_, service) => full.strip_service(service),
            _ => Some(full),
        }
    }

    fn list_root(&self) -> Option<&str> {
        match self {
            ResourceScope::Service(_, service) => Some(service.as_str()),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceScope::Project => f.write_str("project"),
            ResourceScope::Stage(stage) => write!(f, "stage {}", stage),
            ResourceScope::Service(stage, service) => {
                write!(f, "service {} in stage {}", service, stage)
            }
        }
    }
}

/// A resource read from a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Path relative to the scope it was read from.
    pub path: ResourcePath,
    pub content: Vec<u8>,
    /// Branch head at the time of the read.
    pub version: Version,
}

/// One entry of a resource's history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: Version,
    pub message: String,
    pub author: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl From<CommitInfo> for VersionInfo {
    fn from(info: CommitInfo) -> Self {
        Self {
            version: info.version,
            message: info.summary,
            author: info.author_name,
            timestamp: info.author_time,
        }
    }
}

impl Workspace<'_> {
    /// Read a resource at the branch head.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ResourceNotFound`] if the resource is absent on the branch
    pub fn get(&self, path: &ResourcePath) -> Result<Resource, StoreError> {
        let full = self.scope.locate(path);
        let content = self
            .git
            .read_file(full.as_str())?
            .ok_or_else(|| not_found(&full))?;

        Ok(Resource {
            path: path.clone(),
            content,
            version: self.git.head_version()?,
        })
    }

    /// Create or overwrite a resource and commit.
    pub fn put(&self, path: &ResourcePath, content: &[u8]) -> Result<Version, StoreError> {
        let full = self.scope.locate(path);

        let existing = self.git.read_file(full.as_str())?;
        if existing.as_deref() == Some(content) {
            log::debug!("{}/{}: {} unchanged", self.project, self.branch, full);
            return self.head();
        }

        if existing.is_none() {
            self.ensure_writable(&full)?;
        }

        let verb = if existing.is_some() { "Updated" } else { "Added" };
        let outcome = self.git.commit_changes(
            &[Change::write(full.as_str(), content)],
            &format!("{} resource {}", verb, full),
        )?;

        log::info!(
            "{}/{}: wrote {} at {}",
            self.project,
            self.branch,
            full,
            outcome.version.short(7)
        );
        Ok(outcome.version)
    }

    /// Write several resources as a single commit.
    ///
    /// A batch that changes nothing returns the current head.
    pub fn put_many(&self, resources: &[(ResourcePath, Vec<u8>)]) -> Result<Version, StoreError> {
        if resources.is_empty() {
            return self.head();
        }

        let located: Vec<ResourcePath> = resources
            .iter()
            .map(|(path, _)| self.scope.locate(path))
            .collect();
        for full in &located {
            self.ensure_writable(full)?;
        }
        for full in &located {
            if let Some(parent) = located.iter().find(|other| full.is_inside(other)) {
                return Err(conflict(parent.as_str()));
            }
        }

        let changes: Vec<Change> = located
            .iter()
            .zip(resources)
            .map(|(full, (_, content))| Change::write(full.as_str(), content.clone()))
            .collect();

        let message = match resources {
            [(path, _)] => format!("Updated resource {}", self.scope.locate(path)),
            _ => format!("Updated {} resources", resources.len()),
        };

        let outcome = self.git.commit_changes(&changes, &message)?;
        if outcome.created {
            log::info!(
                "{}/{}: wrote {} resources at {}",
                self.project,
                self.branch,
                resources.len(),
                outcome.version.short(7)
            );
        }
        Ok(outcome.version)
    }

    /// Fails when a committed file sits where one of `full`'s parent
    /// directories would go, or a committed directory sits at `full`.
    fn ensure_writable(&self, full: &ResourcePath) -> Result<(), StoreError> {
        match self.git.blocking_entry(full.as_str())? {
            Some(existing) => Err(conflict(&existing)),
            None => Ok(()),
        }
    }

    /// Remove a resource and commit.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ResourceNotFound`] if the resource is absent on the branch
    pub fn delete(&self, path: &ResourcePath) -> Result<Version, StoreError> {
        let full = self.scope.locate(path);
        if self.git.read_file(full.as_str())?.is_none() {
            return Err(not_found(&full));
        }

        let outcome = self.git.commit_changes(
            &[Change::remove(full.as_str())],
            &format!("Deleted resource {}", full),
        )?;

        log::info!(
            "{}/{}: deleted {} at {}",
            self.project,
            self.branch,
            full,
            outcome.version.short(7)
        );
        Ok(outcome.version)
    }

    /// Read a resource as it was at `version`, without moving the branch.
    ///
    /// # Errors
    ///
    /// - [`StoreError::VersionNotFound`] if `version` is malformed or unknown
    /// - [`StoreError::ResourceNotFound`] if the resource is absent in that version
    pub fn get_at_version(&self, path: &ResourcePath, version: &str) -> Result<Vec<u8>, StoreError> {
        let version_not_found = || StoreError::VersionNotFound {
            project: self.project.to_string(),
            version: version.to_string(),
        };

        let parsed = Version::new(version).map_err(|_| version_not_found())?;
        let full = self.scope.locate(path);

        match self.git.read_file_at(&parsed, full.as_str()) {
            Ok(Some(content)) => Ok(content),
            Ok(None) => Err(not_found(&full)),
            Err(GitError::ObjectNotFound { .. }) => Err(version_not_found()),
            Err(e) => Err(e.into()),
        }
    }

    /// Every resource in the scope, relative to it, sorted.
    pub fn list(&self) -> Result<Vec<ResourcePath>, StoreError> {
        let files = self.git.list_files(self.scope.list_root())?;
        let mut paths: Vec<ResourcePath> = files
            .iter()
            .filter_map(|full| self.scope.relative(full))
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Versions in which the resource changed on this branch, newest first.
    ///
    /// # Errors
    ///
    /// - [`StoreError::ResourceNotFound`] if the resource never existed on the branch
    pub fn history(&self, path: &ResourcePath) -> Result<Vec<VersionInfo>, StoreError> {
        let full = self.scope.locate(path);
        let history = self.git.file_history(full.as_str())?;
        if history.is_empty() {
            return Err(not_found(&full));
        }
        Ok(history.into_iter().map(VersionInfo::from).collect())
    }
}

fn conflict(path: &str) -> StoreError {
    StoreError::AlreadyExists {
        kind: EntityKind::Resource,
        name: path.to_string(),
    }
}

fn not_found(path: &ResourcePath) -> StoreError {
    StoreError::ResourceNotFound {
        path: path.to_string(),
    }
}
