use std::{fmt, sync::Arc};

use ethereum_types::{Address, U256};
use tracing::{debug, info, warn};
use txhook_rlp::decode::RLPDecode;
use txhook_storage::{StorageBackend, StorageWriteBatch};

use crate::{
    config::HookConfig,
    error::HookError,
    keys::{block_call_count_key, block_calls_key, tx_error_key},
    types::{BlockCallLog, BlockHash, BlockId, InternalCall, TransactionError, TxHash},
};

/// Buffers the internal calls of the block being executed and persists them,
/// together with transaction errors, when the block is finalized.
///
/// The host drives it from a single thread, once per block:
///
/// ```text
/// begin_block
///   (begin_transaction
///      record_call*
///      [record_error, discard_current_transaction_calls])*
/// finalize_block
/// ```
///
/// Calls of a failed transaction are dropped from the buffer by
/// [`discard_current_transaction_calls`](Self::discard_current_transaction_calls)
/// without touching calls of earlier transactions in the block.
pub struct Recorder {
    backend: Arc<dyn StorageBackend>,
    /// Opened on the first block and reused afterwards; empty between blocks
    batch: Option<Box<dyn StorageWriteBatch>>,
    block: Option<BlockId>,
    tx: Option<TxHash>,
    /// Calls reported so far in the current block, in report order
    calls: Vec<InternalCall>,
    /// How many of the trailing entries of `calls` belong to the current transaction
    current_tx_calls: usize,
}

impl fmt::Debug for Recorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Recorder")
            .field("backend", &self.backend)
            .field("block", &self.block)
            .field("tx", &self.tx)
            .field("calls", &self.calls.len())
            .field("current_tx_calls", &self.current_tx_calls)
            .finish()
    }
}

impl Recorder {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            batch: None,
            block: None,
            tx: None,
            calls: Vec::new(),
            current_tx_calls: 0,
        }
    }

    /// Builds a recorder only if the hook is enabled. A host holding `None` skips
    /// every hook call, so nothing is recorded while disabled.
    pub fn from_config(config: &HookConfig, backend: Arc<dyn StorageBackend>) -> Option<Self> {
        if !config.enabled {
            debug!("Hook is disabled, internal calls will not be recorded");
            return None;
        }
        info!("Hook is enabled, recording internal calls and transaction errors");
        Some(Self::new(backend))
    }

    /// Starts recording `block`. Anything buffered for a block that was never
    /// finalized is dropped, including its staged transaction errors.
    pub fn begin_block(&mut self, block: BlockId) -> Result<(), HookError> {
        if let Some(stale) = self.block {
            warn!(
                block_number = stale.number,
                block_hash = %stale.hash,
                discarded_calls = self.calls.len(),
                "Discarding block that was never finalized"
            );
        }

        self.calls.clear();
        self.current_tx_calls = 0;
        self.tx = None;
        self.block = None;

        if let Some(batch) = self.batch.as_mut() {
            batch.reset();
        } else {
            self.batch = Some(self.backend.begin_write()?);
        }
        self.block = Some(block);

        debug!(block_number = block.number, block_hash = %block.hash, "Recording block");
        Ok(())
    }

    /// Starts recording the transaction `tx_hash` of the current block.
    pub fn begin_transaction(&mut self, tx_hash: TxHash) -> Result<(), HookError> {
        if self.block.is_none() {
            return Err(HookError::NoActiveBlock);
        }
        self.tx = Some(tx_hash);
        self.current_tx_calls = 0;
        Ok(())
    }

    /// Buffers a sub-call of the current transaction.
    pub fn record_call(
        &mut self,
        call_type: impl Into<String>,
        from: Address,
        to: Address,
        gas_limit: u64,
        value: U256,
    ) -> Result<(), HookError> {
        let block = self.block.ok_or(HookError::NoActiveBlock)?;
        let tx_hash = self.tx.ok_or(HookError::NoActiveTransaction)?;

        self.calls.push(InternalCall::new(
            block.number,
            block.hash,
            tx_hash,
            call_type,
            from,
            to,
            gas_limit,
            value,
        ));
        self.current_tx_calls += 1;
        Ok(())
    }

    /// Stages the failure of the current transaction in the block's batch. It is
    /// persisted by [`finalize_block`](Self::finalize_block); buffered calls are
    /// left untouched.
    pub fn record_error(&mut self, message: impl Into<String>) -> Result<(), HookError> {
        let tx_hash = self.tx.ok_or(HookError::NoActiveTransaction)?;
        let batch = self.batch.as_mut().ok_or(HookError::NoActiveBlock)?;

        TransactionError::new(tx_hash, message).write(&mut **batch)?;
        Ok(())
    }

    /// Drops the calls buffered by the current transaction and returns how many
    /// were dropped. Calls from earlier transactions of the block are kept.
    pub fn discard_current_transaction_calls(&mut self) -> usize {
        debug_assert!(self.current_tx_calls <= self.calls.len());
        let discarded = self.current_tx_calls.min(self.calls.len());
        self.calls.truncate(self.calls.len() - discarded);
        self.current_tx_calls = 0;

        if discarded > 0 {
            debug!(tx_hash = ?self.tx, discarded, "Discarded internal calls of failed transaction");
        }
        discarded
    }

    /// Persists the current block: first commits the staged transaction errors,
    /// then writes the call count and call log and commits again.
    ///
    /// The two commits are not atomic with each other. If the second one fails
    /// the errors are already durable while the call log is not, so the host
    /// must treat any error here as a failed block.
    ///
    /// Either way the block is over when this returns. After a failure the
    /// staged writes are gone and the recorder is idle, so the block has to be
    /// re-run from [`begin_block`](Self::begin_block); its unsaved calls stay
    /// readable through [`pending_calls`](Self::pending_calls) until then.
    pub fn finalize_block(&mut self) -> Result<(), HookError> {
        let block = self.block.ok_or(HookError::NoActiveBlock)?;
        let batch = self.batch.as_mut().ok_or(HookError::NoActiveBlock)?;

        self.block = None;
        self.tx = None;
        self.current_tx_calls = 0;

        let result = Self::flush_block(&mut **batch, block, &mut self.calls);
        if let Err(err) = &result {
            batch.reset();
            warn!(
                block_number = block.number,
                block_hash = %block.hash,
                unsaved_calls = self.calls.len(),
                %err,
                "Failed to persist block"
            );
        }
        result
    }

    fn flush_block(
        batch: &mut dyn StorageWriteBatch,
        block: BlockId,
        calls: &mut Vec<InternalCall>,
    ) -> Result<(), HookError> {
        batch.commit()?;

        let log = BlockCallLog::new(block.hash, std::mem::take(calls));
        if let Err(err) = log.write(batch) {
            *calls = log.into_calls();
            return Err(err.into());
        }

        debug!(
            block_number = block.number,
            block_hash = %block.hash,
            calls = log.len(),
            "Committed block internal calls"
        );
        Ok(())
    }

    /// Block currently being recorded, if any.
    pub fn current_block(&self) -> Option<BlockId> {
        self.block
    }

    pub fn current_transaction(&self) -> Option<TxHash> {
        self.tx
    }

    /// Calls buffered for the current block that have not been discarded.
    pub fn pending_calls(&self) -> &[InternalCall] {
        &self.calls
    }

    pub fn current_transaction_call_count(&self) -> usize {
        self.current_tx_calls
    }

    /// Looks up the error recorded for a transaction. `Ok(None)` if it never failed
    /// (or its block was never finalized).
    pub fn get_transaction_error(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionError>, HookError> {
        self.read_record(&tx_error_key(&tx_hash))
    }

    /// Number of internal calls committed for a block. Written for every
    /// finalized block, including those without calls.
    pub fn get_block_call_count(&self, block_hash: BlockHash) -> Result<Option<u64>, HookError> {
        self.read_record(&block_call_count_key(&block_hash))
    }

    /// Internal calls committed for a block.
    ///
    /// A block without calls has no call log, so this returns `Ok(None)` for it
    /// just as for an unknown block; use [`get_block_call_count`](Self::get_block_call_count)
    /// to tell them apart.
    pub fn get_block_calls(
        &self,
        block_hash: BlockHash,
    ) -> Result<Option<Vec<InternalCall>>, HookError> {
        self.read_record(&block_calls_key(&block_hash))
    }

    fn read_record<T: RLPDecode>(&self, key: &[u8]) -> Result<Option<T>, HookError> {
        let bytes = self.backend.begin_read()?.get(key)?;
        bytes
            .map(|bytes| T::decode(&bytes).map_err(HookError::from))
            .transpose()
    }
}
