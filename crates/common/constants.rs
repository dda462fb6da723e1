use ethereum_types::{Address, H256};
use hex_literal::hex;

// === Well known hashes ===

/// Keccak of the empty byte string, the code hash of accounts without code.
pub const EMPTY_CODE_HASH: H256 = H256(hex!(
    "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
));

// === System contracts ===

/// Reward manager contract, recipient of the block reward transaction.
pub const REMASC_ADDRESS: Address = ethereum_types::H160(hex!("0000000000000000000000000000000001000008"));

// === Header encoding ===

/// Width of the gas limit field on networks that store it padded.
pub const GAS_LIMIT_WIDTH: usize = 4;

pub use rsk_trie::EMPTY_TRIE_HASH;
