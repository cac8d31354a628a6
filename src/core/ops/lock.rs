//! core::ops::lock
//!
//! The global serialization lock.
//!
//! # Architecture
//!
//! Every project repository has exactly one working tree, and a checkout
//! changes what every later read or write of that tree sees. The store
//! therefore allows at most one checkout-bearing sequence at any instant.
//!
//! Two layers enforce this:
//!
//! - a process-wide [`Mutex`] shared by every [`StoreLock`] in the process,
//!   regardless of which data directory it points at;
//! - an OS-level exclusive file lock (`fs2`) on `<data_dir>/.cfgstore.lock`,
//!   which serializes separate processes sharing one data directory.
//!
//! The mutex is taken first, so within one process only a single thread ever
//! waits on the file lock.
//!
//! # Invariants
//!
//! - The guard must be held for the whole check-checkout-operate sequence
//! - The guard is released on drop (RAII), on every exit path including panics
//! - Acquisition blocks; there is no timeout inside the core
//!
//! # Example
//!
//! ```ignore
//! use cfgstore::core::ops::lock::StoreLock;
//! use cfgstore::core::paths::StorePaths;
//!
//! let lock = StoreLock::new(StorePaths::new("/data/config".into()));
//! let guard = lock.acquire()?;
//! // checkout, read, write, commit ...
//! drop(guard);
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use fs2::FileExt;
use thiserror::Error;

use crate::core::paths::StorePaths;

/// The single in-process gate.
static PROCESS_GATE: Mutex<()> = Mutex::new(());

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Failed to create lock file or directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),
}

/// Lock handle for one data directory.
#[derive(Debug, Clone)]
pub struct StoreLock {
    paths: StorePaths,
}

impl StoreLock {
    /// Create a lock handle. Nothing is acquired yet.
    pub fn new(paths: StorePaths) -> Self {
        Self { paths }
    }

    /// Acquire the lock, blocking until it is available.
    ///
    /// # Errors
    ///
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be acquired
    pub fn acquire(&self) -> Result<LockGuard, LockError> {
        // The gate guards no data, so a poisoned gate is still a valid gate.
        let gate = PROCESS_GATE.lock().unwrap_or_else(|e| e.into_inner());

        let file = self.open_lock_file()?;
        file.lock_exclusive()
            .map_err(|e| LockError::AcquireFailed(e.to_string()))?;

        log::trace!("acquired store lock {}", self.paths.lock_path().display());
        Ok(LockGuard {
            path: self.paths.lock_path(),
            file: Some(file),
            _gate: gate,
        })
    }

    fn open_lock_file(&self) -> Result<File, LockError> {
        let dir = &self.paths.data_dir;
        fs::create_dir_all(dir).map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", dir.display(), e))
        })?;

        let path = self.paths.lock_path();
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e)))
    }
}

/// Proof that the store lock is held.
///
/// Released when dropped.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
    file: Option<File>,
    _gate: MutexGuard<'static, ()>,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
        log::trace!("released store lock {}", self.path.display());
    }
}
