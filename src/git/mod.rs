//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. All repository reads and writes
//! flow through this interface. No other module should import `git2`.
//!
//! # Responsibilities
//!
//! - Repository creation and opening (one repository per project)
//! - Branch operations (create, checkout, list, exists)
//! - File reads at `HEAD` and at historical commits
//! - Working-tree writes committed on top of `HEAD`
//! - Per-file history
//!
//! # Invariants
//!
//! - No other module calls git2 directly
//! - All operations return strong types (Version, BranchName)
//! - A commit is only created when the tree actually changes

mod interface;

pub use interface::{Author, Change, CommitInfo, CommitOutcome, Git, GitError};
