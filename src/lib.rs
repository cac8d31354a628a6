//! cfgstore - A versioned, multi-tenant configuration store
//!
//! Every project is an isolated git repository, every stage a branch that
//! diverges from trunk, and every resource a tracked file. Each mutation is
//! one commit, so any resource can be read back at any past version.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to the store)
//! - [`api`] - Request handlers mapping store outcomes to status codes and payloads
//! - [`store`] - Projects, stages, and resources behind the serialization lock
//! - [`core`] - Domain types, pipeline definitions, configuration, and the lock
//! - [`git`] - Single interface for all Git operations
//!
//! # Correctness Invariants
//!
//! 1. At most one checkout-bearing operation runs at any instant, process-wide
//! 2. Names and paths are validated before they reach the filesystem
//! 3. Every version returned by a mutation is the branch head after it
//! 4. Writing unchanged content never creates a commit

pub mod api;
pub mod cli;
pub mod core;
pub mod git;
pub mod store;
