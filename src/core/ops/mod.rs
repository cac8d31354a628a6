//! core::ops
//!
//! Mutation discipline for the store.
//!
//! # Modules
//!
//! - [`lock`] - The global serialization lock
//!
//! # Architecture
//!
//! Every checkout-bearing operation:
//! 1. Acquires the store lock
//! 2. Re-checks project and stage existence under the lock
//! 3. Checks out the target branch
//! 4. Reads, or writes and commits
//! 5. Releases the lock by dropping the guard

pub mod lock;

pub use lock::{LockError, LockGuard, StoreLock};
