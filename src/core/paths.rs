//! core::paths
//!
//! Centralized path routing for store locations on disk.
//!
//! # Storage Layout
//!
//! ```text
//! <data_dir>/
//!   .cfgstore.lock      exclusive lock file
//!   <project>/          one git repository (with working tree) per project
//!     .git/
//!     shipyard.yaml     pipeline definition (trunk)
//!     <service>/...     service resources (stage branches)
//! ```
//!
//! **Hard rule:** no code outside this module joins project names onto the
//! data directory. Project names are validated [`ProjectName`]s, so the
//! mapping from name to directory is one-to-one.

use std::path::{Path, PathBuf};

use crate::core::types::ProjectName;

/// Name of the lock file under the data directory.
///
/// Starts with `.` so it can never collide with a project directory.
pub const LOCK_FILE: &str = ".cfgstore.lock";

/// Path routing for one data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePaths {
    /// Directory holding all project repositories.
    pub data_dir: PathBuf,
}

impl StorePaths {
    /// Create paths rooted at `data_dir`.
    ///
    /// # Example
    ///
    /// ```
    /// use cfgstore::core::paths::StorePaths;
    /// use cfgstore::core::types::ProjectName;
    /// use std::path::PathBuf;
    ///
    /// let paths = StorePaths::new(PathBuf::from("/data/config"));
    /// let project = ProjectName::new("sockshop").unwrap();
    /// assert_eq!(paths.project_dir(&project), PathBuf::from("/data/config/sockshop"));
    /// assert_eq!(paths.lock_path(), PathBuf::from("/data/config/.cfgstore.lock"));
    /// ```
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Working-tree root of a project's repository.
    pub fn project_dir(&self, project: &ProjectName) -> PathBuf {
        self.data_dir.join(project.as_str())
    }

    /// `.git` directory of a project's repository.
    pub fn project_git_dir(&self, project: &ProjectName) -> PathBuf {
        self.project_dir(project).join(".git")
    }

    /// The exclusive lock file.
    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join(LOCK_FILE)
    }

    /// Check whether `dir` looks like a project repository.
    pub fn is_repository(dir: &Path) -> bool {
        dir.join(".git").is_dir()
    }
}
