use bytes::BufMut;
use ethereum_types::{Address, H256, U256};
use serde::{Deserialize, Serialize};
use txhook_rlp::{
    decode::RLPDecode,
    encode::RLPEncode,
    error::RLPDecodeError,
    structs::{Decoder, Encoder},
};
use txhook_storage::{StorageWriteBatch, StoreError};

use crate::keys::{block_call_count_key, block_calls_key, tx_error_key};

pub type BlockHash = H256;
pub type BlockNumber = u64;
pub type TxHash = H256;

/// Identity of the block being recorded. Only its number and hash are consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockId {
    pub number: BlockNumber,
    pub hash: BlockHash,
}

impl BlockId {
    pub fn new(number: BlockNumber, hash: BlockHash) -> Self {
        Self { number, hash }
    }
}

/// A sub-call made while executing a top-level transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalCall {
    pub block_number: BlockNumber,
    pub block_hash: BlockHash,
    /// Hash of the top-level transaction the call belongs to
    pub parent_tx_hash: TxHash,
    /// e.g. `call`, `delegatecall`, `create`
    pub call_type: String,
    pub from: Address,
    pub to: Address,
    pub gas_limit: u64,
    pub value: U256,
}

impl InternalCall {
    // The record owns its copy of `value`; later changes to the caller's value do not reach it.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        block_number: BlockNumber,
        block_hash: BlockHash,
        parent_tx_hash: TxHash,
        call_type: impl Into<String>,
        from: Address,
        to: Address,
        gas_limit: u64,
        value: U256,
    ) -> Self {
        Self {
            block_number,
            block_hash,
            parent_tx_hash,
            call_type: call_type.into(),
            from,
            to,
            gas_limit,
            value,
        }
    }
}

impl RLPEncode for InternalCall {
    fn encode(&self, buf: &mut dyn BufMut) {
        Encoder::new(buf)
            .encode_field(&self.block_number)
            .encode_field(&self.block_hash)
            .encode_field(&self.parent_tx_hash)
            .encode_field(&self.call_type)
            .encode_field(&self.from)
            .encode_field(&self.to)
            .encode_field(&self.gas_limit)
            .encode_field(&self.value)
            .finish();
    }
}

impl RLPDecode for InternalCall {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let decoder = Decoder::new(rlp)?;
        let (block_number, decoder) = decoder.decode_field("block_number")?;
        let (block_hash, decoder) = decoder.decode_field("block_hash")?;
        let (parent_tx_hash, decoder) = decoder.decode_field("parent_tx_hash")?;
        let (call_type, decoder) = decoder.decode_field("call_type")?;
        let (from, decoder) = decoder.decode_field("from")?;
        let (to, decoder) = decoder.decode_field("to")?;
        let (gas_limit, decoder) = decoder.decode_field("gas_limit")?;
        let (value, decoder) = decoder.decode_field("value")?;
        let rest = decoder.finish()?;
        let call = InternalCall {
            block_number,
            block_hash,
            parent_tx_hash,
            call_type,
            from,
            to,
            gas_limit,
            value,
        };
        Ok((call, rest))
    }
}

/// The failure of a transaction. Written immediately when reported; a second
/// error for the same hash overwrites the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionError {
    pub tx_hash: TxHash,
    pub message: String,
}

impl TransactionError {
    pub fn new(tx_hash: TxHash, message: impl Into<String>) -> Self {
        Self {
            tx_hash,
            message: message.into(),
        }
    }

    /// Stages the error in `batch`. It becomes durable with the batch's next commit.
    pub fn write(&self, batch: &mut dyn StorageWriteBatch) -> Result<(), StoreError> {
        batch.put(&tx_error_key(&self.tx_hash), &self.encode_to_vec())
    }
}

impl RLPEncode for TransactionError {
    fn encode(&self, buf: &mut dyn BufMut) {
        Encoder::new(buf)
            .encode_field(&self.tx_hash)
            .encode_field(&self.message)
            .finish();
    }
}

impl RLPDecode for TransactionError {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let decoder = Decoder::new(rlp)?;
        let (tx_hash, decoder) = decoder.decode_field("tx_hash")?;
        let (message, decoder) = decoder.decode_field("message")?;
        let rest = decoder.finish()?;
        Ok((TransactionError { tx_hash, message }, rest))
    }
}

/// Every internal call committed for a block, in the order they were reported.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockCallLog {
    pub block_hash: BlockHash,
    calls: Vec<InternalCall>,
}

impl BlockCallLog {
    pub fn new(block_hash: BlockHash, calls: Vec<InternalCall>) -> Self {
        Self { block_hash, calls }
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    pub fn into_calls(self) -> Vec<InternalCall> {
        self.calls
    }

    /// Writes the call count and, if there is at least one call, the calls
    /// themselves, then commits `batch`.
    ///
    /// An empty block leaves no entry under the call log key, so readers must
    /// consult the count to tell an empty block from an unrecorded one.
    pub fn write(&self, batch: &mut dyn StorageWriteBatch) -> Result<(), StoreError> {
        let count = self.calls.len() as u64;
        batch.put(&block_call_count_key(&self.block_hash), &count.encode_to_vec())?;

        if !self.is_empty() {
            batch.put(&block_calls_key(&self.block_hash), &self.calls.encode_to_vec())?;
        }

        batch.commit()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;

    fn sample_call(gas_limit: u64) -> InternalCall {
        InternalCall::new(
            17,
            H256::from_low_u64_be(0xb10c),
            H256::from_low_u64_be(0x7a),
            "delegatecall",
            Address::from(hex!("ef2d6d194084c2de36e0dabfce45d046b37d1106")),
            Address::from_low_u64_be(0xc0de),
            gas_limit,
            U256::from(10u64).pow(U256::from(18u64)),
        )
    }

    #[test]
    fn internal_call_roundtrip() {
        let call = sample_call(21_000);
        let decoded = InternalCall::decode(&call.encode_to_vec()).unwrap();
        assert_eq!(decoded, call);
    }

    #[test]
    fn internal_call_list_roundtrip() {
        let calls: Vec<InternalCall> = (0..5).map(|i| sample_call(i * 1000)).collect();
        let decoded = Vec::<InternalCall>::decode(&calls.encode_to_vec()).unwrap();
        assert_eq!(decoded, calls);
    }

    #[test]
    fn transaction_error_roundtrip() {
        let error = TransactionError::new(H256::repeat_byte(0x42), "execution reverted");
        let decoded = TransactionError::decode(&error.encode_to_vec()).unwrap();
        assert_eq!(decoded, error);
    }

    #[test]
    fn value_is_not_aliased() {
        let mut value = U256::from(1_000u64);
        let call = InternalCall::new(
            1,
            H256::zero(),
            H256::zero(),
            "call",
            Address::zero(),
            Address::zero(),
            0,
            value,
        );
        value += U256::from(1u64);

        assert_eq!(value, U256::from(1_001u64));
        assert_eq!(call.value, U256::from(1_000u64));
    }

    #[test]
    fn truncated_call_fails_to_decode() {
        let encoded = sample_call(21_000).encode_to_vec();
        assert!(InternalCall::decode(&encoded[..encoded.len() - 1]).is_err());
    }

    #[test]
    fn error_record_is_not_a_call() {
        let encoded = TransactionError::new(H256::zero(), "out of gas").encode_to_vec();
        assert!(InternalCall::decode(&encoded).is_err());
    }

    #[test]
    fn internal_call_serializes_to_camel_case_json() {
        let json = serde_json::to_value(sample_call(21_000)).unwrap();
        assert_eq!(json["callType"], "delegatecall");
        assert_eq!(json["gasLimit"], 21_000);
        assert!(json.get("parentTxHash").is_some());
    }
}
