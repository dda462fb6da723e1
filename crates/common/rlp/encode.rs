use bytes::{BufMut, Bytes};
use ethereum_types::{Address, Bloom, H256, U256};

use super::constants::{RLP_EMPTY_LIST, RLP_NULL};

/// Function for encoding a value to RLP.
/// For encoding the value into a buffer directly, use [`RLPEncode::encode`].
pub fn encode<T: RLPEncode>(value: T) -> Vec<u8> {
    let mut buf = Vec::new();
    value.encode(&mut buf);
    buf
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

/// Computes the length needed for a given byte-string and first byte
#[inline]
pub const fn bytes_length(bytes_len: usize, first_byte: u8) -> usize {
    if bytes_len == 1 && first_byte <= 0x7f {
        return 1;
    }
    if bytes_len < 56 {
        return 1 + bytes_len;
    }
    let be_len = bytes_len.ilog2() / 8 + 1;
    1 + be_len as usize + bytes_len
}

pub trait RLPEncode {
    fn encode(&self, buf: &mut dyn BufMut);

    fn length(&self) -> usize {
        self.encode_to_vec().len()
    }

    fn encode_to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode(&mut buf);
        buf
    }
}

/// Writes a length prefix: `short_base + len` for short payloads, otherwise
/// `long_base + len(len)` followed by the big-endian length.
#[inline]
fn encode_prefix(len: usize, short_base: u8, long_base: u8, buf: &mut dyn BufMut) {
    if len < 56 {
        buf.put_u8(short_base + len as u8);
    } else {
        let bytes = len.to_be_bytes();
        let start = bytes.iter().position(|&x| x != 0).unwrap_or(bytes.len() - 1);
        buf.put_u8(long_base + (bytes.len() - start) as u8);
        buf.put_slice(&bytes[start..]);
    }
}

/// Writes the list header for a payload of `total_len` bytes.
#[inline]
pub fn encode_length(total_len: usize, buf: &mut dyn BufMut) {
    encode_prefix(total_len, RLP_EMPTY_LIST, 0xf7, buf);
}

// integer types impls

#[inline]
fn impl_encode<const N: usize>(value_be: [u8; N], buf: &mut dyn BufMut) {
    let start = value_be.iter().position(|&b| b != 0).unwrap_or(N);
    value_be[start..].encode(buf);
}

macro_rules! impl_rlp_encode_uint {
    ($($t:ty),*) => {
        $(
            impl RLPEncode for $t {
                fn encode(&self, buf: &mut dyn BufMut) {
                    impl_encode(self.to_be_bytes(), buf);
                }

                #[inline]
                fn length(&self) -> usize {
                    let bytes = self.to_be_bytes();
                    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
                    RLPEncode::length(&bytes[start..])
                }
            }
        )*
    };
}

impl_rlp_encode_uint!(u8, u16, u32, u64, usize, u128);

impl RLPEncode for [u8] {
    #[inline(always)]
    fn encode(&self, buf: &mut dyn BufMut) {
        if self.len() == 1 && self[0] < RLP_NULL {
            buf.put_u8(self[0]);
        } else {
            encode_prefix(self.len(), RLP_NULL, 0xb7, buf);
            buf.put_slice(self);
        }
    }

    #[inline]
    fn length(&self) -> usize {
        match self.first() {
            None => 1,
            Some(first) => bytes_length(self.len(), *first),
        }
    }
}

impl<const N: usize> RLPEncode for [u8; N] {
    #[inline]
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_slice().encode(buf)
    }

    #[inline]
    fn length(&self) -> usize {
        self.as_slice().length()
    }
}

impl RLPEncode for str {
    #[inline]
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_bytes().encode(buf)
    }

    #[inline]
    fn length(&self) -> usize {
        RLPEncode::length(self.as_bytes())
    }
}

impl RLPEncode for Bytes {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_ref().encode(buf)
    }

    fn length(&self) -> usize {
        self.as_ref().length()
    }
}

impl RLPEncode for U256 {
    fn encode(&self, buf: &mut dyn BufMut) {
        let leading_zeros_in_bytes: usize = (self.leading_zeros() / 8) as usize;
        let bytes = self.to_big_endian();
        bytes[leading_zeros_in_bytes..].encode(buf)
    }
}

impl RLPEncode for H256 {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_bytes().encode(buf)
    }

    #[inline]
    fn length(&self) -> usize {
        33
    }
}

impl RLPEncode for Address {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_bytes().encode(buf)
    }

    #[inline]
    fn length(&self) -> usize {
        21
    }
}

impl RLPEncode for Bloom {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.as_bytes().encode(buf)
    }

    #[inline]
    fn length(&self) -> usize {
        259
    }
}

impl<T: RLPEncode> RLPEncode for Vec<T> {
    #[inline(always)]
    fn encode(&self, buf: &mut dyn BufMut) {
        if self.is_empty() {
            buf.put_u8(RLP_EMPTY_LIST);
            return;
        }
        let payload_len: usize = self.iter().map(|item| item.length()).sum();
        encode_length(payload_len, buf);
        for item in self {
            item.encode(buf);
        }
    }

    #[inline]
    fn length(&self) -> usize {
        list_length(self.iter().map(|item| item.length()).sum())
    }
}

impl<S: RLPEncode, T: RLPEncode> RLPEncode for (S, T) {
    fn encode(&self, buf: &mut dyn BufMut) {
        super::structs::Encoder::new(buf)
            .encode_field(&self.0)
            .encode_field(&self.1)
            .finish();
    }

    #[inline]
    fn length(&self) -> usize {
        list_length(self.0.length() + self.1.length())
    }
}

impl<T: RLPEncode + ?Sized> RLPEncode for &T {
    fn encode(&self, buf: &mut dyn BufMut) {
        (*self).encode(buf)
    }

    fn length(&self) -> usize {
        (*self).length()
    }
}
