use ethereum_types::H256;
use rsk_rlp::encode::RLPEncode;
use rsk_trie::{Trie, TrieError};
use tracing::debug;

use super::{receipt::Receipt, transaction::Transaction};

/// Root of the transactions trie of a block.
/// An empty list yields the empty trie hash.
pub fn compute_transactions_root(transactions: &[Transaction]) -> Result<H256, TrieError> {
    let root = compute_indexed_root(transactions)?;
    debug!(count = transactions.len(), root = ?root, "Computed transactions root");
    Ok(root)
}

/// Root of the receipts trie of a block.
/// An empty list yields the empty trie hash.
pub fn compute_receipts_root(receipts: &[Receipt]) -> Result<H256, TrieError> {
    let root = compute_indexed_root(receipts)?;
    debug!(count = receipts.len(), root = ?root, "Computed receipts root");
    Ok(root)
}

/// Inserts each item's encoding under the RLP of its position in the list.
fn compute_indexed_root<T: RLPEncode>(items: &[T]) -> Result<H256, TrieError> {
    items
        .iter()
        .enumerate()
        .try_fold(Trie::new(), |trie, (index, item)| {
            trie.put(&(index as u64).encode_to_vec(), &item.encode_to_vec())
        })
        .map(|trie| trie.hash())
}
