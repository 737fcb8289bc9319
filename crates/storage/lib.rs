pub mod api;
pub mod backend;
pub mod error;

use std::{path::Path, sync::Arc};

use tracing::info;

pub use api::{StorageBackend, StorageReadView, StorageWriteBatch};
pub use backend::InMemoryBackend;
#[cfg(feature = "rocksdb")]
pub use backend::RocksDBBackend;
pub use error::StoreError;

/// Datadir value that selects the in-memory engine.
pub const MEMORY_DATADIR: &str = "memory";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineType {
    InMemory,
    #[cfg(feature = "rocksdb")]
    RocksDB,
}

impl EngineType {
    /// Picks the engine for a datadir: the word `memory` selects [`EngineType::InMemory`],
    /// anything else is a path to an on-disk database.
    pub fn from_datadir(datadir: &str) -> Result<Self, StoreError> {
        if datadir == MEMORY_DATADIR {
            return Ok(EngineType::InMemory);
        }
        Self::on_disk()
    }

    #[cfg(feature = "rocksdb")]
    fn on_disk() -> Result<Self, StoreError> {
        Ok(EngineType::RocksDB)
    }

    #[cfg(not(feature = "rocksdb"))]
    fn on_disk() -> Result<Self, StoreError> {
        Err(StoreError::EngineUnavailable("rocksdb"))
    }
}

/// Opens the backend for the given engine. The path is ignored for [`EngineType::InMemory`].
pub fn open_backend(
    path: impl AsRef<Path>,
    engine_type: EngineType,
) -> Result<Arc<dyn StorageBackend>, StoreError> {
    info!(engine = ?engine_type, path = %path.as_ref().display(), "Opening storage backend");
    let backend: Arc<dyn StorageBackend> = match engine_type {
        EngineType::InMemory => Arc::new(InMemoryBackend::open()?),
        #[cfg(feature = "rocksdb")]
        EngineType::RocksDB => Arc::new(RocksDBBackend::open(path)?),
    };
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_datadir_selects_in_memory_engine() {
        assert_eq!(
            EngineType::from_datadir(MEMORY_DATADIR).unwrap(),
            EngineType::InMemory
        );
    }

    #[cfg(feature = "rocksdb")]
    #[test]
    fn path_datadir_selects_rocksdb() {
        assert_eq!(
            EngineType::from_datadir("/tmp/txhook").unwrap(),
            EngineType::RocksDB
        );
    }

    #[cfg(not(feature = "rocksdb"))]
    #[test]
    fn path_datadir_without_rocksdb_fails() {
        assert!(matches!(
            EngineType::from_datadir("/tmp/txhook"),
            Err(StoreError::EngineUnavailable("rocksdb"))
        ));
    }
}
