pub mod in_memory;
#[cfg(feature = "rocksdb")]
pub mod rocksdb;

pub use self::in_memory::InMemoryBackend;
#[cfg(feature = "rocksdb")]
pub use self::rocksdb::RocksDBBackend;
