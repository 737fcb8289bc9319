use thiserror::Error;
use txhook_rlp::error::RLPDecodeError;
use txhook_storage::StoreError;

#[derive(Debug, Error)]
pub enum HookError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Failed to decode hook record: {0}")]
    Decode(#[from] RLPDecodeError),
    #[error("No block is being recorded, call begin_block first")]
    NoActiveBlock,
    #[error("No transaction is being recorded, call begin_transaction first")]
    NoActiveTransaction,
}
