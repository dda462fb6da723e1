//! Mapping of accounts, storage slots and code into keys of the unified trie.
//!
//! Every key segment is preceded by a "secure" prefix (the first bytes of its keccak)
//! so keys spread evenly across the trie while the original data stays recoverable.

use ethereum_types::{Address, H256};
use rsk_crypto::keccak::keccak_hash;

/// Number of keccak bytes prepended to each key segment.
pub const SECURE_KEY_SIZE: usize = 10;
/// Domain byte that starts every account key.
pub const DOMAIN_PREFIX: u8 = 0x00;
/// Separates an account key from the storage key of one of its slots.
pub const STORAGE_PREFIX: u8 = 0x00;
/// Suffix appended to an account key to reach the account's code.
pub const CODE_PREFIX: u8 = 0x80;

/// Length in bytes of an account key: domain byte, secure prefix and address.
pub const ACCOUNT_KEY_SIZE: usize = 1 + SECURE_KEY_SIZE + Address::len_bytes();

pub fn secure_key_prefix(data: &[u8]) -> [u8; SECURE_KEY_SIZE] {
    let mut prefix = [0u8; SECURE_KEY_SIZE];
    prefix.copy_from_slice(&keccak_hash(data)[..SECURE_KEY_SIZE]);
    prefix
}

/// `0x00 ‖ keccak(address)[..10] ‖ address`
pub fn account_key(address: &Address) -> Vec<u8> {
    let mut key = Vec::with_capacity(ACCOUNT_KEY_SIZE);
    key.push(DOMAIN_PREFIX);
    key.extend_from_slice(&secure_key_prefix(address.as_bytes()));
    key.extend_from_slice(address.as_bytes());
    key
}

/// `account_key ‖ 0x00 ‖ keccak(slot)[..10] ‖ slot without leading zeros`
pub fn account_storage_key(address: &Address, slot: &H256) -> Vec<u8> {
    let stripped = strip_leading_zeros(slot.as_bytes());
    let mut key = account_key(address);
    key.reserve(1 + SECURE_KEY_SIZE + stripped.len());
    key.push(STORAGE_PREFIX);
    key.extend_from_slice(&secure_key_prefix(slot.as_bytes()));
    key.extend_from_slice(stripped);
    key
}

/// `account_key ‖ 0x80`
pub fn account_code_key(address: &Address) -> Vec<u8> {
    let mut key = account_key(address);
    key.push(CODE_PREFIX);
    key
}

/// Drops leading zero bytes. An all-zero input strips to an empty slice.
pub fn strip_leading_zeros(data: &[u8]) -> &[u8] {
    let first = data.iter().position(|b| *b != 0).unwrap_or(data.len());
    &data[first..]
}
