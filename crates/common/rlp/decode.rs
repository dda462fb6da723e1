use super::{
    constants::{RLP_EMPTY_LIST, RLP_NULL},
    error::RLPDecodeError,
};
use bytes::Bytes;
use ethereum_types::{Address, Bloom, H160, H256, U256};

/// Max payload size accepted when decoding.
/// No well-formed RSK header, transaction, receipt or proof node comes near it.
const MAX_RLP_BYTES: usize = 1024 * 1024 * 1024;

/// Trait for decoding RLP encoded slices of data.
/// Implementors provide [`decode_unfinished`](RLPDecode::decode_unfinished), which returns the
/// decoded value along with the remaining bytes. Consumers usually call
/// [`decode`](RLPDecode::decode), which also checks that the whole input was consumed.
pub trait RLPDecode: Sized {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError>;

    fn decode(rlp: &[u8]) -> Result<Self, RLPDecodeError> {
        let (decoded, remaining) = Self::decode_unfinished(rlp)?;
        if !remaining.is_empty() {
            return Err(RLPDecodeError::invalid_length());
        }

        Ok(decoded)
    }
}

macro_rules! impl_rlp_decode_uint {
    ($($t:ty),*) => {
        $(
            impl RLPDecode for $t {
                fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
                    let (bytes, rest) = decode_bytes(rlp)?;
                    let padded_bytes = static_left_pad(bytes)?;
                    Ok((<$t>::from_be_bytes(padded_bytes), rest))
                }
            }
        )*
    };
}

impl_rlp_decode_uint!(u8, u16, u32, u64, usize, u128);

// Decodes a byte string of a fixed size. Lists of elements go through the Vec<T>
// or tuple implementations instead.
impl<const N: usize> RLPDecode for [u8; N] {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (decoded_bytes, rest) = decode_bytes(rlp)?;
        let value = decoded_bytes
            .try_into()
            .map_err(|_| RLPDecodeError::invalid_length())?;

        Ok((value, rest))
    }
}

impl RLPDecode for Bytes {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (decoded, rest) = decode_bytes(rlp)?;
        Ok((Bytes::copy_from_slice(decoded), rest))
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

impl RLPDecode for Bloom {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (value, rest) = RLPDecode::decode_unfinished(rlp)?;
        Ok((Bloom(value), rest))
    }
}

impl RLPDecode for U256 {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (bytes, rest) = decode_bytes(rlp)?;
        let padded_bytes: [u8; 32] = static_left_pad(bytes)?;
        Ok((U256::from_big_endian(&padded_bytes), rest))
    }
}

impl<T: RLPDecode> RLPDecode for Vec<T> {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        if rlp.is_empty() {
            return Err(RLPDecodeError::invalid_length());
        }

        if rlp[0] == RLP_EMPTY_LIST {
            return Ok((Vec::new(), &rlp[1..]));
        }

        let (is_list, payload, input_rest) = decode_rlp_item(rlp)?;
        if !is_list {
            return Err(RLPDecodeError::unexpected_string());
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

impl<T1: RLPDecode, T2: RLPDecode> RLPDecode for (T1, T2) {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let (is_list, payload, input_rest) = decode_rlp_item(rlp)?;
        if !is_list {
            return Err(RLPDecodeError::unexpected_string());
        }

        let (first, first_rest) = T1::decode_unfinished(payload)?;
        let (second, second_rest) = T2::decode_unfinished(first_rest)?;

        // check that there is no more data to parse after the second element.
        if !second_rest.is_empty() {
            return Err(RLPDecodeError::malformed_data());
        }

        Ok(((first, second), input_rest))
    }
}

/// Reads a big-endian length of `len_of_len` bytes following the prefix byte.
fn read_long_length(data: &[u8], len_of_len: usize) -> Result<usize, RLPDecodeError> {
    let length_bytes = data
        .get(1..len_of_len + 1)
        .ok_or(RLPDecodeError::invalid_length())?;
    let length = usize::from_be_bytes(static_left_pad(length_bytes)?);
    if length > MAX_RLP_BYTES {
        return Err(RLPDecodeError::invalid_length());
    }
    Ok(length)
}

/// Returns `(is_list, header_len, payload_len)` for the item at the start of `data`.
fn item_layout(data: &[u8]) -> Result<(bool, usize, usize), RLPDecodeError> {
    let first_byte = *data.first().ok_or(RLPDecodeError::invalid_length())?;
    let layout = match first_byte {
        0..=0x7F => (false, 0, 1),
        0x80..=0xB7 => (false, 1, (first_byte - RLP_NULL) as usize),
        0xB8..=0xBF => {
            let len_of_len = (first_byte - 0xB7) as usize;
            (false, 1 + len_of_len, read_long_length(data, len_of_len)?)
        }
        RLP_EMPTY_LIST..=0xF7 => (true, 1, (first_byte - RLP_EMPTY_LIST) as usize),
        0xF8..=0xFF => {
            let len_of_len = (first_byte - 0xF7) as usize;
            (true, 1 + len_of_len, read_long_length(data, len_of_len)?)
        }
    };
    if data.len() < layout.1 + layout.2 {
        return Err(RLPDecodeError::invalid_length());
    }
    Ok(layout)
}

/// Decodes an RLP item from a slice of bytes.
/// It returns a 3-element tuple with the following elements:
/// - A boolean indicating if the item is a list or not.
/// - The payload of the item, without its prefix.
/// - The remaining bytes after the item.
pub fn decode_rlp_item(data: &[u8]) -> Result<(bool, &[u8], &[u8]), RLPDecodeError> {
    let (is_list, header_len, payload_len) = item_layout(data)?;
    let end = header_len + payload_len;
    Ok((is_list, &data[header_len..end], &data[end..]))
}

/// Splits an RLP item in two:
/// - The first item including its prefix
/// - The remaining bytes after the item
pub fn get_item_with_prefix(data: &[u8]) -> Result<(&[u8], &[u8]), RLPDecodeError> {
    let (_, header_len, payload_len) = item_layout(data)?;
    Ok(data.split_at(header_len + payload_len))
}

/// Decodes the payload of an RLP item from a slice of bytes.
/// It returns a 2-element tuple with the following elements:
/// - The payload of the item.
/// - The remaining bytes after the item.
pub fn decode_bytes(data: &[u8]) -> Result<(&[u8], &[u8]), RLPDecodeError> {
    let (is_list, payload, rest) = decode_rlp_item(data)?;
    if is_list {
        return Err(RLPDecodeError::unexpected_list());
    }
    Ok((payload, rest))
}

/// Pads a slice of bytes with zeros on the left to make it a fixed size slice.
/// The size of the data must be less than or equal to the size of the output array,
/// and canonical integers never carry a leading zero byte.
#[inline]
pub fn static_left_pad<const N: usize>(data: &[u8]) -> Result<[u8; N], RLPDecodeError> {
    let mut result = [0; N];

    if data.is_empty() {
        return Ok(result);
    }
    if data[0] == 0 {
        return Err(RLPDecodeError::malformed_data());
    }
    if data.len() > N {
        return Err(RLPDecodeError::invalid_length());
    }
    result[N - data.len()..].copy_from_slice(data);
    Ok(result)
}
