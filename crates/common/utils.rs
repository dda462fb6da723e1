use ethereum_types::U256;
use rsk_rlp::error::RLPDecodeError;

/// Big-endian bytes of `value` without leading zeros. Zero yields an empty vec.
pub fn u64_to_minimal_bytes(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

/// Big-endian bytes of `value` without leading zeros. Zero yields an empty vec.
pub fn u256_to_minimal_bytes(value: U256) -> Vec<u8> {
    let bytes = value.to_big_endian();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    bytes[first..].to_vec()
}

/// Reads a big-endian unsigned integer, tolerating leading zero bytes.
/// Some RSK encodings write zero as `0x00` instead of the empty string.
pub fn u64_from_lenient_bytes(bytes: &[u8]) -> Result<u64, RLPDecodeError> {
    let significant = strip_zeros(bytes);
    if significant.len() > 8 {
        return Err(RLPDecodeError::InvalidLength(Some("u64")));
    }
    Ok(significant
        .iter()
        .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte)))
}

/// Reads a big-endian unsigned integer, tolerating leading zero bytes.
pub fn u256_from_lenient_bytes(bytes: &[u8]) -> Result<U256, RLPDecodeError> {
    let significant = strip_zeros(bytes);
    if significant.len() > 32 {
        return Err(RLPDecodeError::InvalidLength(Some("U256")));
    }
    Ok(U256::from_big_endian(significant))
}

fn strip_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}

/// Decodes a hex string as returned by the node's JSON-RPC.
/// The `0x` prefix is optional and odd-length input is left-padded with a zero nibble.
pub fn decode_hex(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    if digits.len() % 2 == 1 {
        hex::decode(format!("0{digits}"))
    } else {
        hex::decode(digits)
    }
}
