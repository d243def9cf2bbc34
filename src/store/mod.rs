//! Persistent store for duty, shift and sanction records.
//!
//! The store owns one set of [`Tables`] behind a mutex. Mutations go through
//! [`Store::transaction`]: the closure works on a copy of the tables, and the
//! copy replaces the live tables only if the closure succeeds and, for a
//! file-backed store, the snapshot was written. A failed transaction leaves
//! nothing behind, and readers never observe a half-applied transition.
//!
//! Transactions are serialized by the mutex, so operations for one member
//! never interleave.
//!
//! # Example
//!
//! ```
//! use duty_engine::store::Store;
//! use duty_engine::models::MemberId;
//!
//! let store = Store::in_memory();
//! store
//!     .transaction(|tables| {
//!         tables.duty_state_mut(MemberId(1)).on_duty = true;
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let on_duty = store
//!     .read(|tables| tables.duty_state(MemberId(1)).is_some_and(|s| s.on_duty))
//!     .unwrap();
//! assert!(on_duty);
//! ```

mod snapshot;
mod tables;

pub use tables::Tables;

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use crate::error::{EngineError, EngineResult};

/// Transactional record store.
#[derive(Debug)]
pub struct Store {
    tables: Mutex<Tables>,
    snapshot_path: Option<PathBuf>,
}

impl Store {
    /// Creates an empty store that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            snapshot_path: None,
        }
    }

    /// Opens a store persisted at `path`, loading the snapshot if present.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the snapshot cannot be read, parsed, or
    /// breaks one of the uniqueness rules.
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref();
        let tables = match snapshot::load(path)? {
            Some(tables) => {
                info!(path = %path.display(), "Store restored from snapshot");
                tables
            }
            None => {
                info!(path = %path.display(), "No snapshot found, starting empty store");
                Tables::default()
            }
        };

        Ok(Self {
            tables: Mutex::new(tables),
            snapshot_path: Some(path.to_path_buf()),
        })
    }

    /// Runs `f` as one all-or-nothing transaction.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns, or a storage error if the lock is
    /// poisoned or the snapshot cannot be written. In every error case the
    /// tables are left exactly as they were.
    pub fn transaction<T>(
        &self,
        f: impl FnOnce(&mut Tables) -> EngineResult<T>,
    ) -> EngineResult<T> {
        let mut live = self.lock()?;
        let mut working = live.clone();

        let output = f(&mut working)?;

        if let Some(path) = &self.snapshot_path {
            snapshot::save(path, &working)?;
        }
        *live = working;
        debug!("Transaction committed");
        Ok(output)
    }

    /// Runs `f` against a consistent view of the tables.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the lock is poisoned.
    pub fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> EngineResult<T> {
        let tables = self.lock()?;
        Ok(f(&tables))
    }

    fn lock(&self) -> EngineResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| EngineError::storage("store lock poisoned"))
    }
}
