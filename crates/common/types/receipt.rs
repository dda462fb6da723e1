use bytes::Bytes;
use ethereum_types::{Address, Bloom, BloomInput, H256};
use rsk_crypto::keccak::keccak_hash;
use rsk_rlp::{
    decode::RLPDecode,
    encode::RLPEncode,
    error::RLPDecodeError,
    structs::{Decoder, Encoder},
};
use serde::{Deserialize, Serialize};

use crate::utils::u64_from_lenient_bytes;

/// Status byte written by the node for a transaction that executed successfully.
pub const STATUS_SUCCESS: [u8; 1] = [0x01];

/// Result of a transaction, as committed to the receipts trie.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Receipt {
    /// Legacy post-transaction state. The node mirrors the status here.
    pub post_state: Bytes,
    /// Cumulative gas used by this and all previous transactions in the block.
    pub cumulative_gas_used: u64,
    pub logs_bloom: Bloom,
    pub logs: Vec<Log>,
    pub gas_used: u64,
    /// `[0x01]` on success, empty on failure.
    pub status: Bytes,
}

impl Receipt {
    pub fn is_successful(&self) -> bool {
        self.status.as_ref() == STATUS_SUCCESS
    }
}

pub fn bloom_from_logs(logs: &[Log]) -> Bloom {
    let mut bloom = Bloom::zero();
    for log in logs {
        let address_hash = keccak_hash(log.address);
        bloom.accrue(BloomInput::Hash(&address_hash));
        for topic in log.topics.iter() {
            let topic_hash = keccak_hash(*topic);
            bloom.accrue(BloomInput::Hash(&topic_hash));
        }
    }
    bloom
}

impl RLPEncode for Receipt {
    fn encode(&self, buf: &mut dyn bytes::BufMut) {
        Encoder::new(buf)
            .encode_bytes(&self.post_state)
            .encode_field(&self.cumulative_gas_used)
            .encode_field(&self.logs_bloom)
            .encode_field(&self.logs)
            .encode_field(&self.gas_used)
            .encode_bytes(&self.status)
            .finish();
    }
}

impl RLPDecode for Receipt {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let decoder = Decoder::new(rlp)?;
        let (post_state, decoder) = decoder.decode_field("post_state")?;
        let (cumulative_gas_used, decoder): (Bytes, _) =
            decoder.decode_field("cumulative_gas_used")?;
        let (logs_bloom, decoder) = decoder.decode_field("logs_bloom")?;
        let (logs, decoder) = decoder.decode_field("logs")?;
        let (gas_used, decoder): (Bytes, _) = decoder.decode_field("gas_used")?;
        let (status, decoder) = decoder.decode_field("status")?;
        let receipt = Receipt {
            post_state,
            cumulative_gas_used: u64_from_lenient_bytes(&cumulative_gas_used)?,
            logs_bloom,
            logs,
            gas_used: u64_from_lenient_bytes(&gas_used)?,
            status,
        };
        Ok((receipt, decoder.finish()?))
    }
}

/// Data record produced during the execution of a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: Bytes,
}

impl RLPEncode for Log {
    fn encode(&self, buf: &mut dyn bytes::BufMut) {
        Encoder::new(buf)
            .encode_field(&self.address)
            .encode_field(&self.topics)
            .encode_field(&self.data)
            .finish();
    }
}

impl RLPDecode for Log {
    fn decode_unfinished(rlp: &[u8]) -> Result<(Self, &[u8]), RLPDecodeError> {
        let decoder = Decoder::new(rlp)?;
        let (address, decoder) = decoder.decode_field("address")?;
        let (topics, decoder) = decoder.decode_field("topics")?;
        let (data, decoder) = decoder.decode_field("data")?;
        let log = Log {
            address,
            topics,
            data,
        };
        Ok((log, decoder.finish()?))
    }
}
