//! # Storage Backend API
//!
//! A thin interface over the key-value store the hook persists into. Backends
//! only provide byte-level primitives; record layout and encoding live in the
//! hook crate.
//!
//! The API differentiates between two types of database access:
//!
//! - Read views ([`StorageReadView`]): point lookups, with no atomicity
//!   guarantees between operations.
//! - Write batches ([`StorageWriteBatch`]): buffered writes that become visible
//!   atomically at commit time.

use crate::error::StoreError;
use std::fmt::Debug;

/// This trait provides the minimal set of operations required from a database backend.
pub trait StorageBackend: Debug + Send + Sync {
    /// Opens a new read view.
    fn begin_read(&self) -> Result<Box<dyn StorageReadView + '_>, StoreError>;

    /// Creates a new, empty write batch.
    fn begin_write(&self) -> Result<Box<dyn StorageWriteBatch + 'static>, StoreError>;
}

/// Read-only view of the database.
pub trait StorageReadView {
    /// Retrieves a value by key. Absence is `Ok(None)`.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError>;
}

/// Write batch interface.
///
/// Changes are not persisted until [`commit()`](StorageWriteBatch::commit) is called.
/// A batch outlives its commits: after a successful commit it is empty and can keep
/// accumulating writes for the next one.
pub trait StorageWriteBatch: Send {
    /// Stages a key-value pair. A later put for the same key overwrites it.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError>;

    /// Writes every staged pair to the database atomically and empties the batch.
    ///
    /// The batch is empty afterwards even if the commit fails: a failed commit
    /// discards the staged pairs, and the caller must stage them again to retry.
    fn commit(&mut self) -> Result<(), StoreError>;

    /// Drops every staged pair without writing it.
    fn reset(&mut self);

    /// Number of staged writes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
