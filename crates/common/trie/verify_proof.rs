use std::{collections::HashMap, sync::Arc};

use ethereum_types::{Address, H256};
use rsk_crypto::keccak::keccak;
use rsk_rlp::{decode::decode_bytes, error::RLPDecodeError};
use tracing::{debug, trace};

use crate::{
    ProofNode,
    bit_path::BitPath,
    error::TrieError,
    key_mapper::{account_key, account_storage_key, strip_leading_zeros},
    node::{Node, NodeRef},
};

/// Outcome of verifying an account proof against a state root.
#[derive(Debug)]
pub struct AccountProofResult {
    /// Whether the proof is consistent with the state root
    pub valid: bool,
    pub key: Address,
    /// RLP-encoded account state, `None` if the proof shows the account is absent
    pub value: Option<Vec<u8>>,
    pub error: Option<TrieError>,
}

/// Outcome of verifying a storage proof against a state root.
#[derive(Debug)]
pub struct StorageProofResult {
    pub valid: bool,
    pub key: H256,
    pub value: Option<Vec<u8>>,
    pub error: Option<TrieError>,
}

/// Verifies that `proof` is a valid proof of `key` in the trie with root hash `root`.
///
/// Proof items are RLP byte strings wrapping serialized trie nodes, in any order.
/// Returns the value stored under `key`, or `None` if the proof shows the key is absent.
pub fn verify_proof(
    root: H256,
    key: &[u8],
    proof: &[ProofNode],
) -> Result<Option<Vec<u8>>, TrieError> {
    if proof.is_empty() {
        return Err(TrieError::EmptyProof);
    }

    let mut nodes = HashMap::with_capacity(proof.len());
    for item in proof {
        let (message, rest) = decode_bytes(item)?;
        if !rest.is_empty() {
            return Err(RLPDecodeError::invalid_length().into());
        }
        // Every item must be a canonical node, even the ones traversal never reaches
        let node = Arc::new(Node::decode_raw(message)?);
        nodes.insert(keccak(message), node);
    }
    debug!(
        root = ?root,
        nodes = nodes.len(),
        "Verifying proof for key 0x{}",
        hex::encode(key)
    );

    let mut node = nodes
        .get(&root)
        .cloned()
        .ok_or(TrieError::RootNotFound(root))?;
    let key = BitPath::from_bytes(key);
    let mut position = 0;

    loop {
        let remaining = key.skip(position)?;
        let shared_path = node.shared_path();
        if shared_path.len() > remaining.len() {
            return Err(TrieError::KeyTooShort { position });
        }
        if remaining.common_prefix(shared_path).len() < shared_path.len() {
            debug!(position, "Key diverges from the shared path, proving absence");
            return Ok(None);
        }
        position += shared_path.len();

        if position == key.len() {
            if node.has_long_value() {
                return Err(TrieError::LongValueNotInProof(node.hash()));
            }
            return Ok(node.value().map(<[u8]>::to_vec));
        }

        let bit = key.get(position);
        position += 1;
        trace!(position, bit, "Following child");
        node = match node.child(bit) {
            NodeRef::Empty => {
                debug!(position, "Reached an empty child, proving absence");
                return Ok(None);
            }
            NodeRef::Node(child) => child.clone(),
            NodeRef::Hash(hash) => nodes
                .get(hash)
                .cloned()
                .ok_or(TrieError::MissingProofNode(*hash))?,
        };
    }
}

/// Verifies an account proof as returned in the `accountProof` field of `eth_getProof`.
/// Verification failures are reported in the result.
pub fn verify_account_proof(
    state_root: H256,
    address: Address,
    proof: &[ProofNode],
) -> AccountProofResult {
    match verify_proof(state_root, &account_key(&address), proof) {
        Ok(value) => AccountProofResult {
            valid: true,
            key: address,
            value,
            error: None,
        },
        Err(err) => {
            debug!(address = ?address, %err, "Account proof rejected");
            AccountProofResult {
                valid: false,
                key: address,
                value: None,
                error: Some(err),
            }
        }
    }
}

/// Verifies a storage proof. Storage lives in the same trie as accounts, so the proof
/// is checked against the state root.
pub fn verify_storage_proof(
    state_root: H256,
    address: Address,
    slot: H256,
    proof: &[ProofNode],
) -> StorageProofResult {
    match verify_proof(state_root, &account_storage_key(&address, &slot), proof) {
        Ok(value) => StorageProofResult {
            valid: true,
            key: slot,
            value,
            error: None,
        },
        Err(err) => {
            debug!(address = ?address, slot = ?slot, %err, "Storage proof rejected");
            StorageProofResult {
                valid: false,
                key: slot,
                value: None,
                error: Some(err),
            }
        }
    }
}

/// Verifies a storage proof and compares the proven value with `expected`.
/// Leading zeros are ignored and an absent slot equals zero.
pub fn verify_storage_value(
    state_root: H256,
    address: Address,
    slot: H256,
    expected: &[u8],
    proof: &[ProofNode],
) -> Result<bool, TrieError> {
    let result = verify_storage_proof(state_root, address, slot, proof);
    if let Some(err) = result.error {
        return Err(err);
    }
    let proven = result.value.unwrap_or_default();
    Ok(strip_leading_zeros(&proven) == strip_leading_zeros(expected))
}

/// Decodes hex proof items as found in `eth_getProof` responses.
/// The `0x` prefix is optional and odd-length strings are left-padded with a zero nibble.
pub fn decode_hex_proof_nodes<S: AsRef<str>>(items: &[S]) -> Result<Vec<ProofNode>, TrieError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let item = item.as_ref();
            let digits = item.strip_prefix("0x").unwrap_or(item);
            let decoded = if digits.len() % 2 == 1 {
                hex::decode(format!("0{digits}"))
            } else {
                hex::decode(digits)
            };
            decoded.map_err(|err| TrieError::Verify(format!("proof node {i} is not hex: {err}")))
        })
        .collect()
}
