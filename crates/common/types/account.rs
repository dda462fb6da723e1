use bytes::Bytes;
use ethereum_types::U256;
use rsk_rlp::{decode::RLPDecode, error::RLPDecodeError, structs::Decoder};

use crate::utils::{u64_from_lenient_bytes, u256_from_lenient_bytes};

/// Account state as stored in the unified trie: `[nonce, balance, ...]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountState {
    pub nonce: u64,
    pub balance: U256,
}

impl RLPDecode for AccountState {
    /// Fields after the balance (such as the hibernation flag) are ignored.
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let decoder = Decoder::new(rlp)?;
        let (nonce, decoder): (Bytes, _) = decoder.decode_field("nonce")?;
        let (balance, decoder): (Bytes, _) = decoder.decode_field("balance")?;
        let state = AccountState {
            nonce: u64_from_lenient_bytes(&nonce)?,
            balance: u256_from_lenient_bytes(&balance)?,
        };
        Ok((state, decoder.finish_unchecked()))
    }
}
