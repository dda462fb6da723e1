use bytes::{BufMut, Bytes};
use ethereum_types::{Address, H256, U256};
use rsk_crypto::keccak::keccak;
use rsk_rlp::{
    decode::RLPDecode,
    encode::RLPEncode,
    error::RLPDecodeError,
    structs::{Decoder, Encoder},
};

use crate::utils::{
    u64_from_lenient_bytes, u64_to_minimal_bytes, u256_from_lenient_bytes, u256_to_minimal_bytes,
};

/// An RSK transaction as committed to the transactions trie.
///
/// Externally signed transactions use the Ethereum encoding. Transactions without a
/// signature, such as the block reward (REMASC) transaction, use the RSK node's own
/// conventions for zero values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transaction {
    pub nonce: u64,
    pub gas_price: U256,
    pub gas_limit: u64,
    /// `None` for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
    pub v: U256,
    pub r: U256,
    pub s: U256,
}

impl Transaction {
    /// A transaction carries an external signature when both `r` and `s` are set.
    pub fn is_signed_external(&self) -> bool {
        !self.r.is_zero() && !self.s.is_zero()
    }

    pub fn hash(&self) -> H256 {
        keccak(self.encode_to_vec())
    }

    fn encoded_fields(&self) -> [Vec<u8>; 9] {
        let (gas_price, gas_limit, to) = if self.is_signed_external() {
            (
                u256_to_minimal_bytes(self.gas_price),
                u64_to_minimal_bytes(self.gas_limit),
                self.to.map(|to| to.as_bytes().to_vec()).unwrap_or_default(),
            )
        } else {
            (
                coin_non_null_zero(u256_to_minimal_bytes(self.gas_price)),
                coin_non_null_zero(u64_to_minimal_bytes(self.gas_limit)),
                self.to
                    .filter(|to| !to.is_zero())
                    .map(|to| to.as_bytes().to_vec())
                    .unwrap_or_default(),
            )
        };
        [
            u64_to_minimal_bytes(self.nonce),
            gas_price,
            gas_limit,
            to,
            u256_to_minimal_bytes(self.value),
            self.data.to_vec(),
            u256_to_minimal_bytes(self.v),
            u256_to_minimal_bytes(self.r),
            u256_to_minimal_bytes(self.s),
        ]
    }
}

/// Zero is written as a single `0x00` byte instead of the empty string.
fn coin_non_null_zero(bytes: Vec<u8>) -> Vec<u8> {
    if bytes.is_empty() { vec![0x00] } else { bytes }
}

impl RLPEncode for Transaction {
    fn encode(&self, buf: &mut dyn BufMut) {
        self.encoded_fields()
            .iter()
            .fold(Encoder::new(buf), |encoder, field| encoder.encode_bytes(field))
            .finish();
    }
}

impl RLPDecode for Transaction {
    /// Integers are read leniently so both zero conventions are accepted.
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let decoder = Decoder::new(rlp)?;
        let (nonce, decoder): (Bytes, _) = decoder.decode_field("nonce")?;
        let (gas_price, decoder): (Bytes, _) = decoder.decode_field("gas_price")?;
        let (gas_limit, decoder): (Bytes, _) = decoder.decode_field("gas_limit")?;
        let (to, decoder): (Bytes, _) = decoder.decode_field("to")?;
        let (value, decoder): (Bytes, _) = decoder.decode_field("value")?;
        let (data, decoder) = decoder.decode_field("data")?;
        let (v, decoder): (Bytes, _) = decoder.decode_field("v")?;
        let (r, decoder): (Bytes, _) = decoder.decode_field("r")?;
        let (s, decoder): (Bytes, _) = decoder.decode_field("s")?;
        let rest = decoder.finish()?;

        let to = match to.len() {
            0 => None,
            20 => Some(Address::from_slice(&to)),
            _ => return Err(RLPDecodeError::InvalidLength(Some("Transaction to"))),
        };

        Ok((
            Transaction {
                nonce: u64_from_lenient_bytes(&nonce)?,
                gas_price: u256_from_lenient_bytes(&gas_price)?,
                gas_limit: u64_from_lenient_bytes(&gas_limit)?,
                to,
                value: u256_from_lenient_bytes(&value)?,
                data,
                v: u256_from_lenient_bytes(&v)?,
                r: u256_from_lenient_bytes(&r)?,
                s: u256_from_lenient_bytes(&s)?,
            },
            rest,
        ))
    }
}
