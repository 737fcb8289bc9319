use bytes::BufMut;
use ethereum_types::{Address, H256, U256};

use super::constants::{RLP_EMPTY_LIST, RLP_NULL};

/// Function for encoding a value to RLP.
/// For encoding the value into a buffer directly, use [`RLPEncode::encode`].
pub fn encode<T: RLPEncode>(value: T) -> Vec<u8> {
    let mut buf = Vec::new();
    value.encode(&mut buf);
    buf
}

pub trait RLPEncode {
    fn encode(&self, buf: &mut dyn BufMut);

    /// Size in bytes of the encoded value, prefix included.
    fn length(&self) -> usize {
        self.encode_to_vec().len()
    }

    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

/// Writes the prefix of a string or list header: `short_base + len` for
/// payloads under 56 bytes, or `long_base + len(len)` followed by the
/// big-endian length otherwise.
fn encode_header(payload_len: usize, short_base: u8, long_base: u8, buf: &mut dyn BufMut) {
    if payload_len < 56 {
        buf.put_u8(short_base + payload_len as u8);
    } else {
        let be_len = payload_len.to_be_bytes();
        let start = be_len
            .iter()
            .position(|&b| b != 0)
            .unwrap_or(be_len.len() - 1);
        buf.put_u8(long_base + (be_len.len() - start) as u8);
        buf.put_slice(&be_len[start..]);
    }
}

/// Writes the header of a list whose encoded items take `payload_len` bytes.
#[inline]
pub fn encode_length(payload_len: usize, buf: &mut dyn BufMut) {
    encode_header(payload_len, RLP_EMPTY_LIST, 0xf7, buf);
}

/// Computes the length needed for a list with the given payload length
#[inline]
pub const fn list_length(payload_len: usize) -> usize {
    if payload_len < 56 {
        1 + payload_len
    } else {
        let be_len = payload_len.ilog2() / 8 + 1;
        1 + be_len as usize + payload_len
    }
}

// Integers are encoded as their big-endian bytes without leading zeros,
// so zero becomes the empty string.
#[inline]
fn encode_integer<const N: usize>(value_be: [u8; N], buf: &mut dyn BufMut) {
    let start = value_be.iter().position(|&b| b != 0).unwrap_or(N);
    value_be[start..].encode(buf)
}

impl RLPEncode for u8 {
    fn encode(&self, buf: &mut dyn BufMut) {
        encode_integer(self.to_be_bytes(), buf);
    }
}

impl RLPEncode for u64 {
    fn encode(&self, buf: &mut dyn BufMut) {
        encode_integer(self.to_be_bytes(), buf);
    }
}

impl RLPEncode for usize {
    fn encode(&self, buf: &mut dyn BufMut) {
        encode_integer(self.to_be_bytes(), buf);
    }
}

impl RLPEncode for U256 {
    fn encode(&self, buf: &mut dyn BufMut) {
        encode_integer(self.to_big_endian(), buf);
    }
}

impl RLPEncode for [u8] {
    #[inline(always)]
    fn encode(&self, buf: &mut dyn BufMut) {
        if self.len() == 1 && self[0] < RLP_NULL {
            buf.put_u8(self[0]);
        } else {
            encode_header(self.len(), RLP_NULL, 0xb7, buf);
            buf.put_slice(self);
        }
    }
}

impl<const N: usize> RLPEncode for [u8; N] {
    #[inline]
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_slice().encode(buf)
    }
}

impl RLPEncode for str {
    #[inline]
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_bytes().encode(buf)
    }
}

impl RLPEncode for String {
    #[inline]
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_bytes().encode(buf)
    }
}

impl RLPEncode for H256 {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_bytes().encode(buf)
    }

    #[inline]
    fn length(&self) -> usize {
        1 + 32
    }
}

impl RLPEncode for Address {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_bytes().encode(buf)
    }

    #[inline]
    fn length(&self) -> usize {
        1 + 20
    }
}

impl<T: RLPEncode> RLPEncode for Vec<T> {
    fn encode(&self, buf: &mut dyn BufMut) {
        let payload_len: usize = self.iter().map(|item| item.length()).sum();
        encode_length(payload_len, buf);
        for item in self {
            item.encode(buf);
        }
    }

    fn length(&self) -> usize {
        list_length(self.iter().map(|item| item.length()).sum())
    }
}

impl<T: RLPEncode + ?Sized> RLPEncode for &T {
    #[inline]
    fn encode(&self, buf: &mut dyn BufMut) {
        (**self).encode(buf)
    }

    #[inline]
    fn length(&self) -> usize {
        (**self).length()
    }
}

#[cfg(test)]
mod tests {
    use ethereum_types::{Address, H256, U256};
    use hex_literal::hex;

    use super::{RLPEncode, encode};
    use crate::constants::{RLP_EMPTY_LIST, RLP_NULL};

    #[test]
    fn can_encode_u64() {
        assert_eq!(0u64.encode_to_vec(), vec![RLP_NULL]);
        assert_eq!(1u64.encode_to_vec(), vec![0x01]);
        assert_eq!(0x7fu64.encode_to_vec(), vec![0x7f]);
        assert_eq!(0x80u64.encode_to_vec(), vec![RLP_NULL + 1, 0x80]);
        assert_eq!(0x0400u64.encode_to_vec(), vec![RLP_NULL + 2, 0x04, 0x00]);
        assert_eq!(
            u64::MAX.encode_to_vec(),
            vec![RLP_NULL + 8, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]
        );
    }

    #[test]
    fn can_encode_u256() {
        assert_eq!(U256::zero().encode_to_vec(), vec![RLP_NULL]);
        assert_eq!(U256::from(0x0400u64).encode_to_vec(), vec![RLP_NULL + 2, 0x04, 0x00]);

        let encoded = U256::MAX.encode_to_vec();
        assert_eq!(encoded.len(), 33);
        assert_eq!(encoded[0], RLP_NULL + 32);
    }

    #[test]
    fn can_encode_strings() {
        assert_eq!("".encode_to_vec(), vec![RLP_NULL]);
        assert_eq!("dog".encode_to_vec(), vec![RLP_NULL + 3, b'd', b'o', b'g']);

        let long = "Lorem ipsum dolor sit amet, consectetur adipisicing elit";
        let encoded = long.to_string().encode_to_vec();
        assert_eq!(&encoded[..2], &[0xb8, 0x38]);
        assert_eq!(&encoded[2..], long.as_bytes());
    }

    #[test]
    fn can_encode_fixed_hashes() {
        let address = Address::from(hex!("ef2d6d194084c2de36e0dabfce45d046b37d1106"));
        let encoded = address.encode_to_vec();
        assert_eq!(encoded[0], RLP_NULL + 20);
        assert_eq!(&encoded[1..], address.as_bytes());
        assert_eq!(encoded.len(), address.length());

        let hash = H256::repeat_byte(0xab);
        let encoded = hash.encode_to_vec();
        assert_eq!(encoded[0], RLP_NULL + 32);
        assert_eq!(encoded.len(), hash.length());
    }

    #[test]
    fn can_encode_lists() {
        let empty: Vec<u64> = vec![];
        assert_eq!(encode(empty), vec![RLP_EMPTY_LIST]);

        let list = vec!["cat".to_string(), "dog".to_string()];
        assert_eq!(
            encode(&list),
            vec![0xc8, 0x83, b'c', b'a', b't', 0x83, b'd', b'o', b'g']
        );
        assert_eq!(list.length(), 9);
    }

    #[test]
    fn long_list_uses_long_header() {
        let list: Vec<H256> = (0..3).map(H256::from_low_u64_be).collect();
        let encoded = list.encode_to_vec();
        // 3 * 33 = 99 payload bytes
        assert_eq!(&encoded[..2], &[0xf8, 99]);
        assert_eq!(encoded.len(), list.length());
    }
}
