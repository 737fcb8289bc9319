use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Custom(String),
    #[cfg(feature = "rocksdb")]
    #[error("Rocksdb error: {0}")]
    RocksdbError(#[from] rocksdb::Error),
    #[error("Failed to lock database")]
    LockError,
    #[error("Engine {0} is not available, rebuild with the `{0}` feature")]
    EngineUnavailable(&'static str),
}
