use crate::api::{StorageBackend, StorageReadView, StorageWriteBatch};
use crate::error::StoreError;
use rocksdb::{DBWithThreadMode, MultiThreaded, Options, WriteBatch};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// RocksDB backend. Hook records share the default column family, partitioned by key prefix.
#[derive(Debug)]
pub struct RocksDBBackend {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl RocksDBBackend {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        opts.set_max_background_jobs(4);
        opts.set_write_buffer_size(64 * 1024 * 1024); // 64MB
        opts.set_max_write_buffer_number(3);
        opts.set_target_file_size_base(128 * 1024 * 1024); // 128MB

        opts.set_wal_recovery_mode(rocksdb::DBRecoveryMode::PointInTime);
        opts.set_compression_type(rocksdb::DBCompressionType::Lz4);

        let db = DBWithThreadMode::<MultiThreaded>::open(&opts, path.as_ref()).map_err(|e| {
            StoreError::Custom(format!(
                "Failed to open RocksDB at {}: {e}",
                path.as_ref().display()
            ))
        })?;
        info!(path = %path.as_ref().display(), "Opened RocksDB");

        Ok(Self { db: Arc::new(db) })
    }
}

impl Drop for RocksDBBackend {
    fn drop(&mut self) {
        if let Some(db) = Arc::get_mut(&mut self.db) {
            db.cancel_all_background_work(true);
        }
    }
}

impl StorageBackend for RocksDBBackend {
    fn begin_read(&self) -> Result<Box<dyn StorageReadView + '_>, StoreError> {
        Ok(Box::new(RocksDBReadTx {
            db: self.db.clone(),
        }))
    }

    fn begin_write(&self) -> Result<Box<dyn StorageWriteBatch + 'static>, StoreError> {
        Ok(Box::new(RocksDBWriteTx {
            db: self.db.clone(),
            batch: WriteBatch::default(),
        }))
    }
}

pub struct RocksDBReadTx {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
}

impl StorageReadView for RocksDBReadTx {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.db.get(key)?)
    }
}

pub struct RocksDBWriteTx {
    /// Database reference for writing
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    /// Write batch for accumulating changes
    batch: WriteBatch,
}

impl StorageWriteBatch for RocksDBWriteTx {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.batch.put(key, value);
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        // Take ownership of the batch (replaces it with an empty one) since db.write() consumes it
        let batch = std::mem::take(&mut self.batch);
        self.db
            .write(batch)
            .map_err(|e| StoreError::Custom(format!("Failed to commit batch: {e}")))
    }

    fn reset(&mut self) {
        self.batch.clear();
    }

    fn len(&self) -> usize {
        self.batch.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn committed_writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let backend = RocksDBBackend::open(dir.path()).unwrap();
            let mut batch = backend.begin_write().unwrap();
            batch.put(b"key", b"value").unwrap();
            batch.commit().unwrap();

            batch.put(b"uncommitted", b"value").unwrap();
            batch.reset();
            assert!(batch.is_empty());
        }

        let backend = RocksDBBackend::open(dir.path()).unwrap();
        let read = backend.begin_read().unwrap();
        assert_eq!(read.get(b"key").unwrap(), Some(b"value".to_vec()));
        assert_eq!(read.get(b"uncommitted").unwrap(), None);
    }
}
