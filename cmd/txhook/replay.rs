use ethereum_types::{Address, H256, U256};
use serde::Deserialize;
use tracing::debug;
use txhook::{BlockId, HookError, Recorder};

/// Execution trace fed to `txhook replay`. Hashes and `value` are `0x`-prefixed hex.
#[derive(Debug, Clone, Deserialize)]
pub struct Trace {
    pub blocks: Vec<TraceBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraceBlock {
    pub number: u64,
    pub hash: H256,
    #[serde(default)]
    pub transactions: Vec<TraceTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraceTransaction {
    pub hash: H256,
    #[serde(default)]
    pub calls: Vec<TraceCall>,
    /// Set when the transaction failed
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraceCall {
    #[serde(rename = "type")]
    pub call_type: String,
    pub from: Address,
    pub to: Address,
    pub gas: u64,
    #[serde(default)]
    pub value: U256,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub blocks: usize,
    /// Calls that were committed, i.e. excluding those of failed transactions
    pub calls: usize,
    pub failed_transactions: usize,
}

/// Drives `recorder` through every block of `trace` the way an execution engine would.
/// Stops at the first block that fails to finalize.
pub fn replay(recorder: &mut Recorder, trace: &Trace) -> Result<ReplaySummary, HookError> {
    let mut summary = ReplaySummary::default();

    for block in &trace.blocks {
        recorder.begin_block(BlockId::new(block.number, block.hash))?;

        for tx in &block.transactions {
            recorder.begin_transaction(tx.hash)?;
            for call in &tx.calls {
                recorder.record_call(
                    call.call_type.as_str(),
                    call.from,
                    call.to,
                    call.gas,
                    call.value,
                )?;
            }

            if let Some(message) = &tx.error {
                recorder.record_error(message.as_str())?;
                let discarded = recorder.discard_current_transaction_calls();
                debug!(tx_hash = %tx.hash, discarded, "Transaction failed");
                summary.failed_transactions += 1;
            }
        }

        summary.calls += recorder.pending_calls().len();
        recorder.finalize_block()?;
        summary.blocks += 1;
    }

    Ok(summary)
}
