use crate::api::{StorageBackend, StorageReadView, StorageWriteBatch};
use crate::error::StoreError;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard};

type Database = BTreeMap<Vec<u8>, Vec<u8>>;

#[derive(Debug, Default)]
pub struct InMemoryBackend {
    inner: Arc<RwLock<Database>>,
}

impl InMemoryBackend {
    pub fn open() -> Result<Self, StoreError> {
        Ok(Self::default())
    }
}

impl StorageBackend for InMemoryBackend {
    fn begin_read(&self) -> Result<Box<dyn StorageReadView + '_>, StoreError> {
        let guard = self.inner.read().map_err(|_| StoreError::LockError)?;
        Ok(Box::new(InMemoryReadTx { guard }))
    }

    fn begin_write(&self) -> Result<Box<dyn StorageWriteBatch + 'static>, StoreError> {
        Ok(Box::new(InMemoryWriteTx {
            backend: self.inner.clone(),
            pending: Vec::new(),
        }))
    }
}

pub struct InMemoryReadTx<'a> {
    guard: RwLockReadGuard<'a, Database>,
}

impl StorageReadView for InMemoryReadTx<'_> {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.guard.get(key).cloned())
    }
}

pub struct InMemoryWriteTx {
    backend: Arc<RwLock<Database>>,
    pending: Vec<(Vec<u8>, Vec<u8>)>,
}

impl StorageWriteBatch for InMemoryWriteTx {
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), StoreError> {
        self.pending.push((key.to_vec(), value.to_vec()));
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let pending = std::mem::take(&mut self.pending);
        let mut db = self.backend.write().map_err(|_| StoreError::LockError)?;
        // Applied in staging order so the last put for a key wins
        for (key, value) in pending {
            db.insert(key, value);
        }
        Ok(())
    }

    fn reset(&mut self) {
        self.pending.clear();
    }

    fn len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get(backend: &InMemoryBackend, key: &[u8]) -> Option<Vec<u8>> {
        backend.begin_read().unwrap().get(key).unwrap()
    }

    #[test]
    fn writes_are_invisible_until_commit() {
        let backend = InMemoryBackend::open().unwrap();
        let mut batch = backend.begin_write().unwrap();

        batch.put(b"key", b"value").unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(get(&backend, b"key"), None);

        batch.commit().unwrap();
        assert!(batch.is_empty());
        assert_eq!(get(&backend, b"key"), Some(b"value".to_vec()));
    }

    #[test]
    fn reset_discards_staged_writes() {
        let backend = InMemoryBackend::open().unwrap();
        let mut batch = backend.begin_write().unwrap();

        batch.put(b"key", b"value").unwrap();
        batch.reset();
        batch.commit().unwrap();

        assert_eq!(get(&backend, b"key"), None);
    }

    #[test]
    fn batch_is_reusable_after_commit() {
        let backend = InMemoryBackend::open().unwrap();
        let mut batch = backend.begin_write().unwrap();

        batch.put(b"a", b"1").unwrap();
        batch.commit().unwrap();
        batch.put(b"b", b"2").unwrap();
        batch.commit().unwrap();

        assert_eq!(get(&backend, b"a"), Some(b"1".to_vec()));
        assert_eq!(get(&backend, b"b"), Some(b"2".to_vec()));
    }

    #[test]
    fn failed_commit_discards_staged_writes() {
        let backend = InMemoryBackend::open().unwrap();
        let mut batch = backend.begin_write().unwrap();
        batch.put(b"key", b"value").unwrap();

        let inner = backend.inner.clone();
        // Poison the lock so the commit cannot take it
        let _ = std::thread::spawn(move || {
            let _guard = inner.write().unwrap();
            panic!("poison");
        })
        .join();

        assert!(matches!(batch.commit(), Err(StoreError::LockError)));
        assert!(batch.is_empty());
    }

    #[test]
    fn last_put_wins() {
        let backend = InMemoryBackend::open().unwrap();
        let mut batch = backend.begin_write().unwrap();

        batch.put(b"key", b"first").unwrap();
        batch.put(b"key", b"second").unwrap();
        batch.commit().unwrap();

        assert_eq!(get(&backend, b"key"), Some(b"second".to_vec()));
    }
}
