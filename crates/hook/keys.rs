//! Storage keys for hook records.
//!
//! Every key is a fixed per-kind prefix followed by the raw 32 bytes of the
//! identifying hash:
//!
//! | Kind             | Key                 | Value                         |
//! |------------------|---------------------|-------------------------------|
//! | Transaction error| `"e"` ++ tx hash    | RLP [`TransactionError`]      |
//! | Block call count | `"ic"` ++ block hash| RLP `u64`                     |
//! | Block call log   | `"i"` ++ block hash | RLP list of [`InternalCall`]  |
//!
//! `"i"` is itself a prefix of `"ic"`, so a key's kind is determined by its
//! prefix together with its length (33 bytes for `e`/`i`, 34 for `ic`).
//!
//! [`TransactionError`]: crate::types::TransactionError
//! [`InternalCall`]: crate::types::InternalCall

use ethereum_types::H256;

use crate::types::{BlockHash, TxHash};

const TX_ERROR_PREFIX: &[u8] = b"e";
const BLOCK_CALL_COUNT_PREFIX: &[u8] = b"ic";
const BLOCK_CALLS_PREFIX: &[u8] = b"i";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    TxError,
    BlockCallCount,
    BlockCalls,
}

impl RecordKind {
    pub const ALL: [RecordKind; 3] = [
        RecordKind::TxError,
        RecordKind::BlockCallCount,
        RecordKind::BlockCalls,
    ];

    pub const fn prefix(self) -> &'static [u8] {
        match self {
            RecordKind::TxError => TX_ERROR_PREFIX,
            RecordKind::BlockCallCount => BLOCK_CALL_COUNT_PREFIX,
            RecordKind::BlockCalls => BLOCK_CALLS_PREFIX,
        }
    }

    /// Total length of a key of this kind.
    pub const fn key_len(self) -> usize {
        self.prefix().len() + H256::len_bytes()
    }

    /// Splits a raw storage key back into its kind and hash.
    /// Returns `None` for keys outside the hook's key space.
    pub fn from_key(key: &[u8]) -> Option<(RecordKind, H256)> {
        RecordKind::ALL.into_iter().find_map(|kind| {
            if key.len() != kind.key_len() {
                return None;
            }
            let hash = key.strip_prefix(kind.prefix())?;
            Some((kind, H256::from_slice(hash)))
        })
    }
}

/// Builds the storage key of a record: `kind.prefix() ++ hash`.
pub fn make_key(kind: RecordKind, hash: &H256) -> Vec<u8> {
    let mut key = Vec::with_capacity(kind.key_len());
    key.extend_from_slice(kind.prefix());
    key.extend_from_slice(hash.as_bytes());
    key
}

pub fn tx_error_key(tx_hash: &TxHash) -> Vec<u8> {
    make_key(RecordKind::TxError, tx_hash)
}

pub fn block_call_count_key(block_hash: &BlockHash) -> Vec<u8> {
    make_key(RecordKind::BlockCallCount, block_hash)
}

pub fn block_calls_key(block_hash: &BlockHash) -> Vec<u8> {
    make_key(RecordKind::BlockCalls, block_hash)
}
