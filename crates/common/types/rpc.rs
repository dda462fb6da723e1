use bytes::Bytes;
use ethereum_types::{Address, Bloom, H256, U256};
use serde::{Deserialize, Serialize};

use super::{
    block_header::BlockHeaderInput,
    receipt::{Log, Receipt},
    transaction::Transaction,
};

/// Block as returned by `eth_getBlockByNumber` with full transactions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    #[serde(with = "crate::serde_utils::u64::hex_str")]
    pub number: u64,
    pub hash: H256,
    pub parent_hash: H256,
    pub sha3_uncles: H256,
    pub miner: Address,
    pub state_root: H256,
    pub transactions_root: H256,
    pub receipts_root: H256,
    pub logs_bloom: Bloom,
    #[serde(default, with = "crate::serde_utils::u256::hex_str")]
    pub difficulty: U256,
    #[serde(default, with = "crate::serde_utils::u64::hex_str")]
    pub gas_limit: u64,
    #[serde(default, with = "crate::serde_utils::u64::hex_str")]
    pub gas_used: u64,
    #[serde(default, with = "crate::serde_utils::u64::hex_str")]
    pub timestamp: u64,
    #[serde(default, with = "crate::serde_utils::bytes")]
    pub extra_data: Bytes,
    #[serde(default, with = "crate::serde_utils::u256::hex_str_opt")]
    pub minimum_gas_price: Option<U256>,
    #[serde(default, with = "crate::serde_utils::u256::hex_str")]
    pub paid_fees: U256,
    #[serde(default)]
    pub uncles: Vec<H256>,
    #[serde(default)]
    pub transactions: Vec<RpcTransaction>,
    #[serde(default, with = "crate::serde_utils::bytes")]
    pub bitcoin_merged_mining_header: Bytes,
    #[serde(default, with = "crate::serde_utils::bytes")]
    pub bitcoin_merged_mining_merkle_proof: Bytes,
    #[serde(default, with = "crate::serde_utils::bytes")]
    pub bitcoin_merged_mining_coinbase_transaction: Bytes,
    #[serde(default)]
    pub rsk_pte_edges: Option<Vec<i16>>,
    #[serde(default, with = "crate::serde_utils::bytes::opt")]
    pub umm_root: Option<Bytes>,
    #[serde(default, with = "crate::serde_utils::bytes::opt")]
    pub base_event: Option<Bytes>,
}

impl RpcBlock {
    /// Header values as the node reports them.
    ///
    /// A missing minimum gas price reads as zero. An empty `rskPteEdges` array
    /// is treated as absent.
    pub fn to_header_input(&self) -> BlockHeaderInput {
        BlockHeaderInput {
            parent_hash: self.parent_hash,
            uncles_hash: self.sha3_uncles,
            coinbase: self.miner,
            state_root: self.state_root,
            tx_trie_root: self.transactions_root,
            receipt_trie_root: self.receipts_root,
            logs_bloom: self.logs_bloom,
            difficulty: self.difficulty,
            number: self.number,
            gas_limit: self.gas_limit,
            gas_used: self.gas_used,
            timestamp: self.timestamp,
            extra_data: self.extra_data.clone(),
            paid_fees: self.paid_fees,
            minimum_gas_price: Some(self.minimum_gas_price.unwrap_or_default()),
            uncle_count: self.uncles.len() as u64,
            bitcoin_merged_mining_header: self.bitcoin_merged_mining_header.clone(),
            bitcoin_merged_mining_merkle_proof: self.bitcoin_merged_mining_merkle_proof.clone(),
            bitcoin_merged_mining_coinbase_transaction: self
                .bitcoin_merged_mining_coinbase_transaction
                .clone(),
            tx_execution_sublists_edges: self
                .rsk_pte_edges
                .clone()
                .filter(|edges| !edges.is_empty()),
            umm_root: self.umm_root.clone(),
            base_event: self.base_event.clone(),
        }
    }

    pub fn to_transactions(&self) -> Vec<Transaction> {
        self.transactions
            .iter()
            .map(RpcTransaction::to_transaction)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcTransaction {
    pub hash: H256,
    #[serde(default, with = "crate::serde_utils::u64::hex_str")]
    pub nonce: u64,
    #[serde(default, with = "crate::serde_utils::u256::hex_str")]
    pub gas_price: U256,
    #[serde(default, with = "crate::serde_utils::u64::hex_str")]
    pub gas: u64,
    #[serde(default, with = "crate::serde_utils::bytes::opt")]
    pub to: Option<Bytes>,
    #[serde(default, with = "crate::serde_utils::u256::hex_str")]
    pub value: U256,
    #[serde(default, with = "crate::serde_utils::bytes")]
    pub input: Bytes,
    #[serde(default, with = "crate::serde_utils::u256::hex_str")]
    pub v: U256,
    #[serde(default, with = "crate::serde_utils::u256::hex_str")]
    pub r: U256,
    #[serde(default, with = "crate::serde_utils::u256::hex_str")]
    pub s: U256,
}

impl RpcTransaction {
    /// `to` of `null` or `"0x"` is a contract creation.
    pub fn to_transaction(&self) -> Transaction {
        Transaction {
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas,
            to: self
                .to
                .as_ref()
                .filter(|to| !to.is_empty())
                .map(|to| address_from_bytes(to)),
            value: self.value,
            data: self.input.clone(),
            v: self.v,
            r: self.r,
            s: self.s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcReceipt {
    pub transaction_hash: H256,
    #[serde(default, with = "crate::serde_utils::u64::hex_str")]
    pub cumulative_gas_used: u64,
    #[serde(default, with = "crate::serde_utils::u64::hex_str")]
    pub gas_used: u64,
    #[serde(default)]
    pub logs: Vec<RpcLog>,
    pub logs_bloom: Bloom,
    #[serde(default, with = "crate::serde_utils::bytes::opt")]
    pub status: Option<Bytes>,
    #[serde(default, with = "crate::serde_utils::bytes::opt")]
    pub root: Option<Bytes>,
}

impl RpcReceipt {
    /// The post state is the reported `root` when present, otherwise the status bytes.
    /// A zero status is stored as empty bytes, the node's encoding of a failure.
    pub fn to_receipt(&self) -> Receipt {
        let status = self
            .status
            .clone()
            .filter(|status| status.iter().any(|b| *b != 0))
            .unwrap_or_default();
        let post_state = match &self.root {
            Some(root) if !root.is_empty() => root.clone(),
            _ => status.clone(),
        };
        Receipt {
            post_state,
            cumulative_gas_used: self.cumulative_gas_used,
            logs_bloom: self.logs_bloom,
            logs: self.logs.iter().map(RpcLog::to_log).collect(),
            gas_used: self.gas_used,
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub address: Address,
    #[serde(default)]
    pub topics: Vec<H256>,
    #[serde(default, with = "crate::serde_utils::bytes")]
    pub data: Bytes,
}

impl RpcLog {
    pub fn to_log(&self) -> Log {
        Log {
            address: self.address,
            topics: self.topics.clone(),
            data: self.data.clone(),
        }
    }
}

/// Keeps the rightmost 20 bytes, left-padding shorter input.
fn address_from_bytes(bytes: &[u8]) -> Address {
    let bytes = &bytes[bytes.len().saturating_sub(20)..];
    let mut address = Address::zero();
    address.0[20 - bytes.len()..].copy_from_slice(bytes);
    address
}
