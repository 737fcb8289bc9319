//! Records the internal calls and execution errors of the transactions in a block,
//! and persists them next to the chain data for point lookups by block or
//! transaction hash.
//!
//! The host execution engine drives a [`Recorder`] through each block:
//! [`Recorder::begin_block`], then per transaction [`Recorder::begin_transaction`],
//! [`Recorder::record_call`] for every sub-call and, if the transaction fails,
//! [`Recorder::record_error`] followed by [`Recorder::discard_current_transaction_calls`].
//! [`Recorder::finalize_block`] persists everything the block produced.

pub mod config;
pub mod error;
pub mod keys;
pub mod recorder;
pub mod types;

pub use config::HookConfig;
pub use error::HookError;
pub use ethereum_types::{Address, H256, U256};
pub use recorder::Recorder;
pub use types::{BlockCallLog, BlockHash, BlockId, BlockNumber, InternalCall, TransactionError, TxHash};
