//! core
//!
//! Core domain types, schemas, and operations.
//!
//! # Modules
//!
//! - [`types`] - Strong types and path sanitizing: ProjectName, StageName, ResourcePath, Version
//! - [`shipyard`] - Pipeline definition schema and deployment strategies
//! - [`ops`] - The global serialization lock
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for on-disk storage
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid names from reaching the filesystem
//! - Schemas are strict where we own them and lenient where consumers evolve

pub mod config;
pub mod ops;
pub mod paths;
pub mod shipyard;
pub mod types;
