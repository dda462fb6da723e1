use std::collections::BTreeMap;

use ethereum_types::{Address, H256, U256};
use rsk_rlp::{decode::RLPDecode, error::RLPDecodeError};
use rsk_trie::{
    AccountProofResult, StorageProofResult, decode_hex_proof_nodes, verify_account_proof,
    verify_storage_proof,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::account::AccountState;
use crate::{constants::EMPTY_CODE_HASH, errors::ProofResponseError, utils::decode_hex};

/// Response of `eth_getProof` for one account and a set of its storage slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofResponse {
    pub address: Address,
    pub account_proof: Vec<String>,
    #[serde(default, with = "crate::serde_utils::u256::hex_str")]
    pub balance: U256,
    pub code_hash: H256,
    #[serde(default, with = "crate::serde_utils::u64::hex_str")]
    pub nonce: u64,
    pub storage_hash: H256,
    #[serde(default)]
    pub storage_proof: Vec<StorageProof>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageProof {
    pub key: String,
    pub value: String,
    pub proof: Vec<String>,
}

/// Verification outcome for a whole [`ProofResponse`].
#[derive(Debug)]
pub struct VerifiedProofResult {
    pub account: AccountProofResult,
    pub storage: BTreeMap<H256, StorageProofResult>,
    /// Whether the account proof and every storage proof verified
    pub all_valid: bool,
}

impl VerifiedProofResult {
    /// Decodes the proven account value. `None` when the proof shows the account is absent.
    pub fn account_state(&self) -> Result<Option<AccountState>, RLPDecodeError> {
        self.account
            .value
            .as_deref()
            .map(AccountState::decode)
            .transpose()
    }
}

impl ProofResponse {
    pub fn balance(&self) -> U256 {
        self.balance
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Accounts with code have a code hash other than the hash of the empty string.
    pub fn is_contract(&self) -> bool {
        self.code_hash != EMPTY_CODE_HASH
    }

    /// Reported value of `slot`, or `None` if the response has no proof for it.
    /// Values are read as `0x` prefixed hex, or as decimal without the prefix.
    pub fn storage_value(&self, slot: H256) -> Result<Option<U256>, ProofResponseError> {
        for storage_proof in &self.storage_proof {
            if parse_storage_key(&storage_proof.key)? != slot {
                continue;
            }
            let value = &storage_proof.value;
            let parsed = match value.strip_prefix("0x") {
                Some("") => Some(U256::zero()),
                Some(digits) => U256::from_str_radix(digits, 16).ok(),
                None => U256::from_dec_str(value).ok(),
            };
            return parsed
                .map(Some)
                .ok_or_else(|| ProofResponseError::InvalidHex {
                    field: "storageProof.value",
                    value: value.clone(),
                });
        }
        Ok(None)
    }

    /// Checks the account proof and every storage proof against `state_root`.
    ///
    /// Proofs that fail to verify are reported in the result. Proof nodes or storage keys
    /// that are not valid hex are an error.
    pub fn verify(&self, state_root: H256) -> Result<VerifiedProofResult, ProofResponseError> {
        let account_nodes = decode_hex_proof_nodes(&self.account_proof)?;
        let account = verify_account_proof(state_root, self.address, &account_nodes);
        let mut all_valid = account.valid;

        let mut storage = BTreeMap::new();
        for storage_proof in &self.storage_proof {
            let slot = parse_storage_key(&storage_proof.key)?;
            let nodes = decode_hex_proof_nodes(&storage_proof.proof)?;
            let result = verify_storage_proof(state_root, self.address, slot, &nodes);
            all_valid &= result.valid;
            storage.insert(slot, result);
        }

        debug!(
            address = ?self.address,
            slots = storage.len(),
            all_valid,
            "Verified proof response"
        );
        Ok(VerifiedProofResult {
            account,
            storage,
            all_valid,
        })
    }
}

/// Reads a storage key the way the node reports it: short keys are left-padded and
/// only the rightmost 32 bytes of long keys are kept.
pub fn parse_storage_key(key: &str) -> Result<H256, ProofResponseError> {
    let bytes = decode_hex(key).map_err(|_| ProofResponseError::InvalidHex {
        field: "storageProof.key",
        value: key.to_string(),
    })?;
    let bytes = &bytes[bytes.len().saturating_sub(32)..];
    let mut slot = H256::zero();
    slot.0[32 - bytes.len()..].copy_from_slice(bytes);
    Ok(slot)
}
