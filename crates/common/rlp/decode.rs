use super::{
    constants::{RLP_EMPTY_LIST, RLP_NULL},
    error::RLPDecodeError,
};
use ethereum_types::{Address, H160, H256, U256};

/// Max payload size accepted when decoding.
/// Nothing the hook persists comes close to this, so larger payloads are corrupt data.
const MAX_RLP_BYTES: usize = 1024 * 1024 * 1024;

/// Trait for decoding RLP encoded slices of data.
/// Implementors provide [`decode_unfinished`](RLPDecode::decode_unfinished), which returns
/// the decoded value along with the remaining bytes. Consumers call [`decode`](RLPDecode::decode),
/// which additionally rejects trailing bytes.
pub trait RLPDecode: Sized {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError>;

    fn decode(rlp: &[u8]) -> Result<Self, RLPDecodeError> {
        let (decoded, remaining) = Self::decode_unfinished(rlp)?;
        if !remaining.is_empty() {
            return Err(RLPDecodeError::InvalidLength);
        }

        Ok(decoded)
    }
}

impl RLPDecode for u8 {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (bytes, rest) = decode_bytes(rlp)?;
        let padded_bytes: [u8; 1] = static_left_pad(bytes)?;
        Ok((padded_bytes[0], rest))
    }
}

impl RLPDecode for u64 {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (bytes, rest) = decode_bytes(rlp)?;
        let padded_bytes = static_left_pad(bytes)?;
        Ok((u64::from_be_bytes(padded_bytes), rest))
    }
}

impl RLPDecode for usize {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (bytes, rest) = decode_bytes(rlp)?;
        let padded_bytes = static_left_pad(bytes)?;
        Ok((usize::from_be_bytes(padded_bytes), rest))
    }
}

impl RLPDecode for U256 {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (bytes, rest) = decode_bytes(rlp)?;
        let padded_bytes: [u8; 32] = static_left_pad(bytes)?;
        Ok((U256::from_big_endian(&padded_bytes), rest))
    }
}

// Decodes a string of exactly N bytes. Lists are decoded through Vec<T>.
impl<const N: usize> RLPDecode for [u8; N] {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (decoded_bytes, rest) = decode_bytes(rlp)?;
        let value = decoded_bytes
            .try_into()
            .map_err(|_| RLPDecodeError::InvalidLength)?;
        Ok((value, rest))
    }
}

impl RLPDecode for H256 {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (value, rest) = RLPDecode::decode_unfinished(rlp)?;
        Ok((H256(value), rest))
    }
}

impl RLPDecode for Address {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (value, rest) = RLPDecode::decode_unfinished(rlp)?;
        Ok((H160(value), rest))
    }
}

impl RLPDecode for String {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (str_bytes, rest) = decode_bytes(rlp)?;
        let value =
            String::from_utf8(str_bytes.to_vec()).map_err(|_| RLPDecodeError::MalformedData)?;
        Ok((value, rest))
    }
}

// A Vec<T> is a list of elements of the same type.
impl<T: RLPDecode> RLPDecode for Vec<T> {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        if rlp.first() == Some(&RLP_EMPTY_LIST) {
            return Ok((Vec::new(), &rlp[1..]));
        }

        let (is_list, payload, input_rest) = decode_rlp_item(rlp)?;
        if !is_list {
            return Err(RLPDecodeError::UnexpectedString);
        }

        let mut result = Vec::new();
        let mut current_slice = payload;

        while !current_slice.is_empty() {
            let (item, rest_current_list) = T::decode_unfinished(current_slice)?;
            result.push(item);
            current_slice = rest_current_list;
        }

        Ok((result, input_rest))
    }
}

/// Reads the big-endian length that follows a long-form prefix and checks it
/// against the available data.
fn long_payload(data: &[u8], length_of_length: usize) -> Result<(usize, usize), RLPDecodeError> {
    let length_bytes = data
        .get(1..length_of_length + 1)
        .ok_or(RLPDecodeError::InvalidLength)?;
    let length = usize::from_be_bytes(static_left_pad(length_bytes)?);
    if length < 56 {
        // Should have used the short form
        return Err(RLPDecodeError::MalformedData);
    }
    Ok((length_of_length + 1, length))
}

/// It returns a 3-element tuple with the following elements:
/// - A boolean indicating if the item is a list or not.
/// - The payload of the item, without its prefix.
/// - The remaining bytes after the item.
pub fn decode_rlp_item(data: &[u8]) -> Result<(bool, &[u8], &[u8]), RLPDecodeError> {
    let first_byte = *data.first().ok_or(RLPDecodeError::InvalidLength)?;

    let (is_list, offset, length) = match first_byte {
        0..=0x7f => return Ok((false, &data[..1], &data[1..])),
        RLP_NULL..=0xb7 => (false, 1, (first_byte - RLP_NULL) as usize),
        0xb8..=0xbf => {
            let (offset, length) = long_payload(data, (first_byte - 0xb7) as usize)?;
            (false, offset, length)
        }
        RLP_EMPTY_LIST..=0xf7 => (true, 1, (first_byte - RLP_EMPTY_LIST) as usize),
        0xf8..=0xff => {
            let (offset, length) = long_payload(data, (first_byte - 0xf7) as usize)?;
            (true, offset, length)
        }
    };

    if length > MAX_RLP_BYTES || data.len() < offset + length {
        return Err(RLPDecodeError::InvalidLength);
    }

    let payload = &data[offset..offset + length];
    // A single byte below 0x80 must be encoded as itself
    if !is_list && length == 1 && payload[0] < RLP_NULL {
        return Err(RLPDecodeError::MalformedData);
    }

    Ok((is_list, payload, &data[offset + length..]))
}

/// Decodes the payload of an RLP string item.
/// It returns a 2-element tuple with the following elements:
/// - The payload of the item.
/// - The remaining bytes after the item.
pub fn decode_bytes(data: &[u8]) -> Result<(&[u8], &[u8]), RLPDecodeError> {
    let (is_list, payload, rest) = decode_rlp_item(data)?;
    if is_list {
        return Err(RLPDecodeError::UnexpectedList);
    }
    Ok((payload, rest))
}

/// Pads a slice of bytes with zeros on the left to make it a fixed size array.
/// Leading zeros in the input are rejected, as canonical integers never carry them.
#[inline]
pub fn static_left_pad<const N: usize>(data: &[u8]) -> Result<[u8; N], RLPDecodeError> {
    let mut result = [0; N];

    if data.is_empty() {
        return Ok(result);
    }
    if data[0] == 0 {
        return Err(RLPDecodeError::MalformedData);
    }
    if data.len() > N {
        return Err(RLPDecodeError::InvalidLength);
    }
    result[N - data.len()..].copy_from_slice(data);
    Ok(result)
}
