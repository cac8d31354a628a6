//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to all Git operations in the
//! store. All repository interactions flow through this interface, which
//! provides structured results and normalizes errors into typed failure
//! categories.
//!
//! # Working tree model
//!
//! Each project repository has exactly one working tree. [`Git::checkout_branch`]
//! replaces that tree wholesale, and [`Git::commit_changes`] writes into it and
//! commits on top of `HEAD`. Callers must hold the store lock across any
//! sequence that checks out and then reads or writes.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Path is not a repository
//! - [`GitError::RefNotFound`]: Requested branch does not exist
//! - [`GitError::BranchExists`]: Branch creation target already exists
//! - [`GitError::ObjectNotFound`]: Commit id unknown to this repository
//!
//! # Example
//!
//! ```ignore
//! use cfgstore::git::{Author, Git};
//!
//! let git = Git::open(path, Author::new("cfgstore", "cfgstore@localhost"))?;
//! git.checkout_branch(&stage.branch())?;
//! let outcome = git.commit_changes(&[Change::write("svc/values.yaml", b"replicas: 2")], "update")?;
//! println!("now at {}", outcome.version.short(7));
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::{BranchName, TypeError, Version};

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Path is not a repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was opened
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Branch to create already exists.
    #[error("branch already exists: {branch}")]
    BranchExists {
        /// The branch name
        branch: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// Invalid ref name format.
    #[error("invalid ref name: {message}")]
    InvalidRefName {
        /// Description of the problem
        message: String,
    },

    /// Filesystem error in the working tree.
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") || context == "HEAD" {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }

    fn io(path: &Path, source: std::io::Error) -> Self {
        GitError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidVersion(msg) => GitError::InvalidOid { oid: msg },
            other => GitError::InvalidRefName {
                message: other.to_string(),
            },
        }
    }
}

/// Identity recorded on commits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

impl Author {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// One working-tree change applied by [`Git::commit_changes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// Create or overwrite a file.
    Write { path: String, content: Vec<u8> },
    /// Remove a tracked file.
    Remove { path: String },
}

impl Change {
    pub fn write(path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Change::Write {
            path: path.into(),
            content: content.into(),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Change::Remove { path: path.into() }
    }
}

/// Result of [`Git::commit_changes`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    /// `HEAD` after the call.
    pub version: Version,
    /// Whether a new commit was created. `false` when the changes left the
    /// tree identical to `HEAD`.
    pub created: bool,
}

/// Information about a commit.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// The commit id
    pub version: Version,
    /// First line of the commit message
    pub summary: String,
    /// Author name
    pub author_name: String,
    /// Author timestamp
    pub author_time: chrono::DateTime<chrono::Utc>,
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. No other module
/// imports `git2`.
pub struct Git {
    repo: git2::Repository,
    author: Author,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Creation and Opening
    // =========================================================================

    /// Initialize a new repository at `path` with `trunk` as its only branch.
    ///
    /// An initial empty commit is recorded so the trunk ref exists and stage
    /// branches can be created from it immediately.
    pub fn init(path: &Path, trunk: &BranchName, author: Author) -> Result<Self, GitError> {
        let mut opts = git2::RepositoryInitOptions::new();
        opts.initial_head(trunk.as_str()).no_reinit(true).mkpath(true);

        let repo = git2::Repository::init_opts(path, &opts)
            .map_err(|e| GitError::from_git2(e, &path.display().to_string()))?;
        let git = Self { repo, author };

        {
            let mut index = git.repo.index()?;
            let tree_id = index.write_tree()?;
            let tree = git.repo.find_tree(tree_id)?;
            let sig = git.signature()?;
            git.repo
                .commit(Some("HEAD"), &sig, &sig, "Initialize project", &tree, &[])?;
        }

        Ok(git)
    }

    /// Open the repository at exactly `path`.
    ///
    /// Unlike discovery, this never walks up into a parent repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if `path` is not a repository
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path, author: Author) -> Result<Self, GitError> {
        let repo = git2::Repository::open(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }

        Ok(Self { repo, author })
    }

    /// Path to the working directory.
    pub fn work_dir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }

    fn signature(&self) -> Result<git2::Signature<'static>, GitError> {
        git2::Signature::now(&self.author.name, &self.author.email).map_err(|e| {
            GitError::Internal {
                message: format!("invalid commit identity: {}", e.message()),
            }
        })
    }

    // =========================================================================
    // Branches
    // =========================================================================

    /// Check if a local branch exists.
    pub fn branch_exists(&self, branch: &BranchName) -> bool {
        self.repo
            .find_branch(branch.as_str(), git2::BranchType::Local)
            .is_ok()
    }

    /// List all local branches.
    ///
    /// Returns validated `BranchName` instances, sorted.
    pub fn list_branches(&self) -> Result<Vec<BranchName>, GitError> {
        let branches = self.repo.branches(Some(git2::BranchType::Local))?;

        let mut names = Vec::new();
        for branch in branches {
            let (branch, _) = branch?;
            if let Some(name) = branch.name().ok().flatten() {
                // Skip invalid branch names
                if let Ok(branch_name) = BranchName::new(name) {
                    names.push(branch_name);
                }
            }
        }

        names.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(names)
    }

    /// Create `new` pointing at the head of `from`.
    ///
    /// # Errors
    ///
    /// - [`GitError::BranchExists`] if `new` already exists
    /// - [`GitError::RefNotFound`] if `from` does not exist
    pub fn create_branch(&self, new: &BranchName, from: &BranchName) -> Result<Version, GitError> {
        if self.branch_exists(new) {
            return Err(GitError::BranchExists {
                branch: new.to_string(),
            });
        }

        let source_ref = from.refname();
        let source = self
            .repo
            .find_branch(from.as_str(), git2::BranchType::Local)
            .map_err(|e| GitError::from_git2(e, &source_ref))?;
        let commit = source
            .get()
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, &source_ref))?;

        self.repo
            .branch(new.as_str(), &commit, false)
            .map_err(|e| GitError::from_git2(e, &new.refname()))?;

        Version::new(commit.id().to_string()).map_err(|e| e.into())
    }

    /// Make `branch` the working tree.
    ///
    /// Uses a forced checkout that also removes untracked files, so the
    /// working tree matches the branch head exactly afterwards.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if the branch does not exist
    pub fn checkout_branch(&self, branch: &BranchName) -> Result<(), GitError> {
        let refname = branch.refname();
        let reference = self
            .repo
            .find_reference(&refname)
            .map_err(|e| GitError::from_git2(e, &refname))?;
        let commit = reference
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, &refname))?;

        let mut opts = git2::build::CheckoutBuilder::new();
        opts.force().remove_untracked(true);
        self.repo
            .checkout_tree(commit.as_object(), Some(&mut opts))
            .map_err(|e| GitError::from_git2(e, &refname))?;
        self.repo
            .set_head(&refname)
            .map_err(|e| GitError::from_git2(e, &refname))?;

        Ok(())
    }

    /// Get the current branch name, if on a branch.
    ///
    /// Returns `None` if HEAD is detached or unborn.
    pub fn current_branch(&self) -> Result<Option<BranchName>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if head.is_branch() {
            if let Some(name) = head.shorthand() {
                return Ok(Some(BranchName::new(name)?));
            }
        }

        Ok(None)
    }

    /// Get the HEAD commit as a version.
    pub fn head_version(&self) -> Result<Version, GitError> {
        let commit = self.head_commit()?;
        Version::new(commit.id().to_string()).map_err(|e| e.into())
    }

    fn head_commit(&self) -> Result<git2::Commit<'_>, GitError> {
        self.repo
            .head()
            .map_err(|e| GitError::from_git2(e, "HEAD"))?
            .peel_to_commit()
            .map_err(|e| GitError::from_git2(e, "HEAD"))
    }

    fn find_commit(&self, version: &Version) -> Result<git2::Commit<'_>, GitError> {
        let not_found = || GitError::ObjectNotFound {
            oid: version.to_string(),
        };
        let oid = git2::Oid::from_str(version.as_str()).map_err(|_| not_found())?;
        self.repo.find_commit(oid).map_err(|_| not_found())
    }

    // =========================================================================
    // File Reads
    // =========================================================================

    /// Read a file as committed at `HEAD`.
    ///
    /// Returns `Ok(None)` if the path is not a file at `HEAD`.
    pub fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>, GitError> {
        let commit = self.head_commit()?;
        self.read_from_commit(&commit, path)
    }

    /// Read a file as it was in commit `version`.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if `version` is not a commit in this repository
    pub fn read_file_at(&self, version: &Version, path: &str) -> Result<Option<Vec<u8>>, GitError> {
        let commit = self.find_commit(version)?;
        self.read_from_commit(&commit, path)
    }

    fn read_from_commit(
        &self,
        commit: &git2::Commit<'_>,
        path: &str,
    ) -> Result<Option<Vec<u8>>, GitError> {
        let tree = commit.tree()?;
        let entry = match tree.get_path(Path::new(path)) {
            Ok(entry) => entry,
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(GitError::from_git2(e, path)),
        };

        if entry.kind() != Some(git2::ObjectType::Blob) {
            return Ok(None);
        }

        let blob = self.repo.find_blob(entry.id())?;
        Ok(Some(blob.content().to_vec()))
    }

    /// The committed entry at `HEAD` that prevents writing a file at `path`.
    ///
    /// That is a file where one of `path`'s parent directories would go, or a
    /// directory at `path` itself. Returns the blocking entry's path.
    pub fn blocking_entry(&self, path: &str) -> Result<Option<String>, GitError> {
        let tree = self.head_commit()?.tree()?;

        let mut prefix = String::new();
        let mut components = path.split('/').peekable();
        while let Some(component) = components.next() {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(component);

            let kind = match tree.get_path(Path::new(&prefix)) {
                Ok(entry) => entry.kind(),
                Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(None),
                Err(e) => return Err(GitError::from_git2(e, path)),
            };
            let is_target = components.peek().is_none();
            match kind {
                Some(git2::ObjectType::Blob) if !is_target => return Ok(Some(prefix)),
                Some(git2::ObjectType::Tree) if is_target => return Ok(Some(prefix)),
                _ => {}
            }
        }

        Ok(None)
    }

    /// List every file path committed at `HEAD`, optionally under a directory.
    ///
    /// Paths are repository-relative with `/` separators, sorted.
    pub fn list_files(&self, dir: Option<&str>) -> Result<Vec<String>, GitError> {
        let commit = self.head_commit()?;
        let root = commit.tree()?;

        let (tree, prefix) = match dir {
            None => (root, String::new()),
            Some(dir) => match root.get_path(Path::new(dir)) {
                Ok(entry) if entry.kind() == Some(git2::ObjectType::Tree) => {
                    (self.repo.find_tree(entry.id())?, format!("{}/", dir))
                }
                Ok(_) => return Ok(Vec::new()),
                Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(Vec::new()),
                Err(e) => return Err(GitError::from_git2(e, dir)),
            },
        };

        let mut files = Vec::new();
        tree.walk(git2::TreeWalkMode::PreOrder, |parent, entry| {
            if entry.kind() == Some(git2::ObjectType::Blob) {
                if let Some(name) = entry.name() {
                    files.push(format!("{}{}{}", prefix, parent, name));
                }
            }
            git2::TreeWalkResult::Ok
        })?;

        files.sort();
        Ok(files)
    }

    // =========================================================================
    // History
    // =========================================================================

    /// Commits reachable from `HEAD` that changed `path`, newest first.
    ///
    /// A commit "changes" the path when the blob at that path differs from
    /// its first parent's (including creation and removal).
    pub fn file_history(&self, path: &str) -> Result<Vec<CommitInfo>, GitError> {
        let head = self.head_commit()?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(head.id())?;
        revwalk.set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::TIME)?;
        revwalk.simplify_first_parent()?;

        let mut history = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            let current = Self::blob_id_at(&commit, path)?;
            let previous = match commit.parent(0) {
                Ok(parent) => Self::blob_id_at(&parent, path)?,
                Err(_) => None,
            };
            if current != previous {
                history.push(self.commit_info(&commit)?);
            }
        }

        Ok(history)
    }

    fn blob_id_at(commit: &git2::Commit<'_>, path: &str) -> Result<Option<git2::Oid>, GitError> {
        let tree = commit.tree()?;
        match tree.get_path(Path::new(path)) {
            Ok(entry) if entry.kind() == Some(git2::ObjectType::Blob) => Ok(Some(entry.id())),
            Ok(_) => Ok(None),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::from_git2(e, path)),
        }
    }

    fn commit_info(&self, commit: &git2::Commit<'_>) -> Result<CommitInfo, GitError> {
        let author = commit.author();
        let author_time = chrono::DateTime::from_timestamp(author.when().seconds(), 0)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH)
            .with_timezone(&chrono::Utc);

        Ok(CommitInfo {
            version: Version::new(commit.id().to_string())?,
            summary: commit.summary().unwrap_or("").to_string(),
            author_name: author.name().unwrap_or("").to_string(),
            author_time,
        })
    }

    /// Whether `ancestor` is reachable from `descendant`.
    pub fn is_ancestor(&self, ancestor: &Version, descendant: &Version) -> Result<bool, GitError> {
        let ancestor = self.find_commit(ancestor)?.id();
        let descendant = self.find_commit(descendant)?.id();
        if ancestor == descendant {
            return Ok(true);
        }
        Ok(self.repo.graph_descendant_of(descendant, ancestor)?)
    }

    // =========================================================================
    // Working Tree Mutation
    // =========================================================================

    /// Apply `changes` to the working tree and index, then commit on `HEAD`.
    ///
    /// If the resulting tree is identical to `HEAD`'s tree no commit is
    /// created and the current `HEAD` is returned.
    pub fn commit_changes(&self, changes: &[Change], message: &str) -> Result<CommitOutcome, GitError> {
        let work_dir = self.work_dir()?.to_path_buf();
        let mut index = self.repo.index()?;

        for change in changes {
            match change {
                Change::Write { path, content } => {
                    let file = work_dir.join(path);
                    if let Some(parent) = file.parent() {
                        fs::create_dir_all(parent).map_err(|e| GitError::io(parent, e))?;
                    }
                    fs::write(&file, content).map_err(|e| GitError::io(&file, e))?;
                    index
                        .add_path(Path::new(path))
                        .map_err(|e| GitError::from_git2(e, path))?;
                }
                Change::Remove { path } => {
                    let file = work_dir.join(path);
                    if file.is_file() {
                        fs::remove_file(&file).map_err(|e| GitError::io(&file, e))?;
                        prune_empty_dirs(&work_dir, &file);
                    }
                    index
                        .remove_path(Path::new(path))
                        .map_err(|e| GitError::from_git2(e, path))?;
                }
            }
        }

        index.write()?;
        let tree_id = index.write_tree()?;
        let parent = self.head_commit()?;

        if parent.tree_id() == tree_id {
            return Ok(CommitOutcome {
                version: Version::new(parent.id().to_string())?,
                created: false,
            });
        }

        let tree = self.repo.find_tree(tree_id)?;
        let sig = self.signature()?;
        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &[&parent])?;

        Ok(CommitOutcome {
            version: Version::new(oid.to_string())?,
            created: true,
        })
    }
}

/// Remove directories left empty by deleting `file`, stopping at `root`.
fn prune_empty_dirs(root: &Path, file: &Path) {
    let mut dir = file.parent();
    while let Some(d) = dir {
        if d == root || fs::remove_dir(d).is_err() {
            break;
        }
        dir = d.parent();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn author() -> Author {
        Author::new("Test User", "test@example.com")
    }

    fn trunk() -> BranchName {
        BranchName::new("master").unwrap()
    }

    fn init_repo() -> (TempDir, Git) {
        let temp = TempDir::new().unwrap();
        let git = Git::init(&temp.path().join("repo"), &trunk(), author()).unwrap();
        (temp, git)
    }

    mod git_error {
        use super::*;

        #[test]
        fn display_formatting() {
            let err = GitError::RefNotFound {
                refname: "refs/heads/dev".to_string(),
            };
            assert!(err.to_string().contains("refs/heads/dev"));

            let err = GitError::BranchExists {
                branch: "dev".to_string(),
            };
            assert!(err.to_string().contains("already exists"));
        }

        #[test]
        fn type_errors_convert() {
            let err: GitError = TypeError::InvalidVersion("short".into()).into();
            assert!(matches!(err, GitError::InvalidOid { .. }));
            let err: GitError = TypeError::InvalidBranchName("x".into()).into();
            assert!(matches!(err, GitError::InvalidRefName { .. }));
        }
    }

    #[test]
    fn init_creates_trunk_with_initial_commit() {
        let (_temp, git) = init_repo();
        assert_eq!(git.current_branch().unwrap(), Some(trunk()));
        assert!(git.head_version().is_ok());
        assert_eq!(git.list_branches().unwrap(), vec![trunk()]);
        assert!(git.list_files(None).unwrap().is_empty());
    }

    #[test]
    fn init_twice_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("repo");
        Git::init(&path, &trunk(), author()).unwrap();
        assert!(Git::init(&path, &trunk(), author()).is_err());
    }

    #[test]
    fn open_non_repository_fails() {
        let temp = TempDir::new().unwrap();
        let result = Git::open(temp.path(), author());
        assert!(matches!(result, Err(GitError::NotARepo { .. })));
    }

    #[test]
    fn open_does_not_discover_parent() {
        let (temp, _git) = init_repo();
        let nested = temp.path().join("repo").join("nested");
        fs::create_dir_all(&nested).unwrap();
        assert!(matches!(
            Git::open(&nested, author()),
            Err(GitError::NotARepo { .. })
        ));
    }

    #[test]
    fn commit_and_read_back() {
        let (_temp, git) = init_repo();
        let before = git.head_version().unwrap();

        let outcome = git
            .commit_changes(&[Change::write("svc/a.yaml", "a: 1")], "add a")
            .unwrap();
        assert!(outcome.created);
        assert_ne!(outcome.version, before);
        assert_eq!(git.head_version().unwrap(), outcome.version);
        assert_eq!(git.read_file("svc/a.yaml").unwrap(), Some(b"a: 1".to_vec()));
        assert_eq!(git.read_file("svc").unwrap(), None);
        assert_eq!(git.read_file("missing").unwrap(), None);
    }

    #[test]
    fn unchanged_tree_creates_no_commit() {
        let (_temp, git) = init_repo();
        let first = git
            .commit_changes(&[Change::write("a", "x")], "add")
            .unwrap();
        let second = git
            .commit_changes(&[Change::write("a", "x")], "again")
            .unwrap();
        assert!(!second.created);
        assert_eq!(first.version, second.version);
    }

    #[test]
    fn remove_prunes_empty_directories() {
        let (_temp, git) = init_repo();
        git.commit_changes(&[Change::write("deep/dir/file", "x")], "add")
            .unwrap();
        git.commit_changes(&[Change::remove("deep/dir/file")], "rm")
            .unwrap();

        assert_eq!(git.read_file("deep/dir/file").unwrap(), None);
        assert!(!git.work_dir().unwrap().join("deep").exists());
    }

    #[test]
    fn read_at_old_version() {
        let (_temp, git) = init_repo();
        let v1 = git
            .commit_changes(&[Change::write("a", "one")], "1")
            .unwrap()
            .version;
        git.commit_changes(&[Change::write("a", "two")], "2").unwrap();

        assert_eq!(git.read_file_at(&v1, "a").unwrap(), Some(b"one".to_vec()));
        assert_eq!(git.read_file("a").unwrap(), Some(b"two".to_vec()));
    }

    #[test]
    fn read_at_unknown_version_fails() {
        let (_temp, git) = init_repo();
        let unknown = Version::new("1".repeat(40)).unwrap();
        assert!(matches!(
            git.read_file_at(&unknown, "a"),
            Err(GitError::ObjectNotFound { .. })
        ));
    }

    #[test]
    fn branch_lifecycle() {
        let (_temp, git) = init_repo();
        git.commit_changes(&[Change::write("shared", "trunk")], "base")
            .unwrap();

        let dev = BranchName::new("dev").unwrap();
        assert!(!git.branch_exists(&dev));
        let start = git.create_branch(&dev, &trunk()).unwrap();
        assert!(git.branch_exists(&dev));
        assert_eq!(start, git.head_version().unwrap());

        assert!(matches!(
            git.create_branch(&dev, &trunk()),
            Err(GitError::BranchExists { .. })
        ));

        let missing = BranchName::new("nope").unwrap();
        let other = BranchName::new("other").unwrap();
        assert!(matches!(
            git.create_branch(&other, &missing),
            Err(GitError::RefNotFound { .. })
        ));
        assert!(matches!(
            git.checkout_branch(&missing),
            Err(GitError::RefNotFound { .. })
        ));
    }

    #[test]
    fn checkout_switches_working_tree() {
        let (_temp, git) = init_repo();
        let dev = BranchName::new("dev").unwrap();
        git.create_branch(&dev, &trunk()).unwrap();

        git.checkout_branch(&dev).unwrap();
        assert_eq!(git.current_branch().unwrap(), Some(dev.clone()));
        git.commit_changes(&[Change::write("only-dev", "x")], "dev file")
            .unwrap();

        git.checkout_branch(&trunk()).unwrap();
        assert_eq!(git.read_file("only-dev").unwrap(), None);
        assert!(!git.work_dir().unwrap().join("only-dev").exists());

        git.checkout_branch(&dev).unwrap();
        assert!(git.work_dir().unwrap().join("only-dev").exists());
    }

    #[test]
    fn list_files_under_directory() {
        let (_temp, git) = init_repo();
        git.commit_changes(
            &[
                Change::write("root.yaml", "r"),
                Change::write("carts/values.yaml", "v"),
                Change::write("carts/templates/svc.yaml", "s"),
                Change::write("db/values.yaml", "d"),
            ],
            "files",
        )
        .unwrap();

        assert_eq!(git.list_files(None).unwrap().len(), 4);
        assert_eq!(
            git.list_files(Some("carts")).unwrap(),
            vec!["carts/templates/svc.yaml", "carts/values.yaml"]
        );
        assert!(git.list_files(Some("missing")).unwrap().is_empty());
        assert!(git.list_files(Some("root.yaml")).unwrap().is_empty());
    }

    #[test]
    fn blocking_entries_between_files_and_directories() {
        let (_temp, git) = init_repo();
        git.commit_changes(&[Change::write("svc/a", "x")], "add").unwrap();

        assert_eq!(git.blocking_entry("svc").unwrap(), Some("svc".to_string()));
        assert_eq!(git.blocking_entry("svc/a/b").unwrap(), Some("svc/a".to_string()));
        assert_eq!(git.blocking_entry("svc/a/b/c").unwrap(), Some("svc/a".to_string()));
        assert_eq!(git.blocking_entry("svc/a").unwrap(), None);
        assert_eq!(git.blocking_entry("svc/b").unwrap(), None);
        assert_eq!(git.blocking_entry("other/a").unwrap(), None);
    }

    #[test]
    fn history_tracks_only_changes_to_path() {
        let (_temp, git) = init_repo();
        let v1 = git.commit_changes(&[Change::write("a", "1")], "a1").unwrap().version;
        git.commit_changes(&[Change::write("b", "1")], "b1").unwrap();
        let v3 = git.commit_changes(&[Change::write("a", "2")], "a2").unwrap().version;

        let history = git.file_history("a").unwrap();
        let versions: Vec<Version> = history.iter().map(|c| c.version.clone()).collect();
        assert_eq!(versions, vec![v3, v1]);
        assert_eq!(history[0].summary, "a2");
        assert_eq!(history[0].author_name, "Test User");
    }

    #[test]
    fn ancestry() {
        let (_temp, git) = init_repo();
        let base = git.head_version().unwrap();
        let next = git.commit_changes(&[Change::write("a", "1")], "a").unwrap().version;
        assert!(git.is_ancestor(&base, &next).unwrap());
        assert!(!git.is_ancestor(&next, &base).unwrap());
        assert!(git.is_ancestor(&next, &next).unwrap());
    }
}
