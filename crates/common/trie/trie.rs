pub mod bit_path;
mod codec;
pub mod db;
pub mod error;
pub mod key_mapper;
mod node;
mod trie_iter;
pub mod varint;
mod verify_proof;

use std::{fmt, sync::Arc};

use ethereum_types::H256;
use rsk_crypto::keccak::keccak;
use rsk_rlp::{constants::RLP_NULL, encode::RLPEncode};

pub use self::bit_path::BitPath;
pub use self::codec::encode_shared_path;
pub use self::db::{InMemoryTrieStore, TrieStore};
pub use self::error::TrieError;
pub use self::node::{MAX_EMBEDDED_NODE_SIZE, MAX_INLINE_VALUE_SIZE, Node, NodeRef, NodeValue};
pub use self::trie_iter::{InOrderIter, IterationElement, PostOrderIter, PreOrderIter};
pub use self::verify_proof::{
    AccountProofResult, StorageProofResult, decode_hex_proof_nodes, verify_account_proof,
    verify_proof, verify_storage_proof, verify_storage_value,
};

use lazy_static::lazy_static;

lazy_static! {
    // Hash value for an empty trie, equal to keccak(RLP_NULL)
    pub static ref EMPTY_TRIE_HASH: H256 = keccak([RLP_NULL]);
}

/// RLP-wrapped serialized trie node, as carried in a proof
pub type ProofNode = Vec<u8>;

/// Unified binary trie with RSK's canonical node encoding.
///
/// A `Trie` is an immutable snapshot: [`Trie::put`] and [`Trie::delete`] return a new
/// trie sharing every unmodified node with the original.
#[derive(Clone)]
pub struct Trie {
    root: Arc<Node>,
    store: Arc<dyn TrieStore>,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    /// Creates an empty trie backed by a fresh in-memory store
    pub fn new() -> Self {
        Self::with_store(Arc::new(InMemoryTrieStore::new_empty()))
    }

    /// Creates an empty trie backed by `store`
    pub fn with_store(store: Arc<dyn TrieStore>) -> Self {
        Self {
            root: Arc::new(Node::empty()),
            store,
        }
    }

    /// Opens the trie rooted at `root`, which must be present in `store`
    /// unless it is the empty trie hash.
    pub fn open(store: Arc<dyn TrieStore>, root: H256) -> Result<Self, TrieError> {
        if root == *EMPTY_TRIE_HASH {
            return Ok(Self::with_store(store));
        }
        let root = store.retrieve(root)?.ok_or(TrieError::RootNotFound(root))?;
        Ok(Self { root, store })
    }

    pub fn root_node(&self) -> &Arc<Node> {
        &self.root
    }

    pub fn store(&self) -> &Arc<dyn TrieStore> {
        &self.store
    }

    /// Retrieves the value stored under `key`
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, TrieError> {
        self.root
            .get(&BitPath::from_bytes(key), self.store.as_ref())
    }

    /// Returns a trie with `value` stored under `key`. An empty value removes the key.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<Trie, TrieError> {
        let root = self
            .root
            .put(&BitPath::from_bytes(key), value, self.store.as_ref())?;
        Ok(Self {
            root,
            store: self.store.clone(),
        })
    }

    /// Returns a trie without `key`
    pub fn delete(&self, key: &[u8]) -> Result<Trie, TrieError> {
        self.put(key, &[])
    }

    /// Hash of the root node, [`EMPTY_TRIE_HASH`] for the empty trie
    pub fn hash(&self) -> H256 {
        self.root.hash()
    }

    /// Persists every node not embedded in its parent, along with every long value.
    pub fn save(&self) -> Result<(), TrieError> {
        if self.root.is_empty_trie() {
            return Ok(());
        }
        save_node(&self.root, self.store.as_ref(), false)
    }

    /// Obtains a merkle proof for `key`: the serialized nodes traversed from the root until
    /// the lookup ends, each wrapped as an RLP byte string, ordered from leaf to root.
    /// Embedded nodes travel inside their parent and are not listed.
    /// The proof is still constructed if the key is not in the trie, proving its absence.
    /// The empty trie has no nodes, so its proof is empty and cannot be verified: check
    /// the root against [`EMPTY_TRIE_HASH`] instead.
    pub fn get_proof(&self, key: &[u8]) -> Result<Vec<ProofNode>, TrieError> {
        let mut proof = Vec::new();
        if self.root.is_empty_trie() {
            return Ok(proof);
        }
        let mut key = BitPath::from_bytes(key);
        let mut node = self.root.clone();
        let mut embedded = false;
        loop {
            if !embedded {
                proof.push(node.encoded().encode_to_vec());
            }
            let shared_path = node.shared_path();
            let common = key.common_prefix(shared_path).len();
            if common < shared_path.len() || common == key.len() {
                break;
            }
            let child_ref = node.child(key.get(common));
            embedded = child_ref.is_embeddable();
            let Some(child) = child_ref.get_node(self.store.as_ref())? else {
                break;
            };
            key = key.skip(common + 1)?;
            node = child;
        }
        proof.reverse();
        Ok(proof)
    }

    /// Number of nodes in the trie, embedded ones included
    pub fn trie_size(&self) -> Result<usize, TrieError> {
        if self.root.is_empty_trie() {
            return Ok(0);
        }
        self.pre_order_iter()
            .try_fold(0, |count, element| element.map(|_| count + 1))
    }

    pub fn in_order_iter(&self) -> InOrderIter {
        InOrderIter::new(self)
    }

    pub fn pre_order_iter(&self) -> PreOrderIter {
        PreOrderIter::new(self)
    }

    pub fn post_order_iter(&self) -> PostOrderIter {
        PostOrderIter::new(self)
    }
}

fn save_node(node: &Node, store: &dyn TrieStore, embedded: bool) -> Result<(), TrieError> {
    for child in [node.left(), node.right()] {
        // Hash references point at nodes already in the store
        if let NodeRef::Node(child) = child {
            save_node(child, store, child.is_embeddable())?;
        }
    }
    if node.has_long_value() {
        if let (Some(hash), Some(bytes)) = (node.value_hash(), node.value()) {
            store.save_value(hash, bytes)?;
        }
    }
    if !embedded {
        store.save(node)?;
    }
    Ok(())
}

impl fmt::Debug for Trie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Trie")
            .field("root", &self.root.hash())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hex_literal::hex;
    use proptest::{
        collection::{btree_map, btree_set, vec},
        prelude::*,
    };

    fn trie_from(pairs: &[(&[u8], &[u8])]) -> Trie {
        pairs
            .iter()
            .try_fold(Trie::new(), |trie, (key, value)| trie.put(key, value))
            .unwrap()
    }

    #[test]
    fn empty_trie_hash() {
        assert_eq!(
            *EMPTY_TRIE_HASH,
            H256(hex!(
                "56e81f171bcc55a6ff8345e692c0f86e5b48e01b996cadc001622fb5e363b421"
            ))
        );
        assert_eq!(Trie::new().hash(), *EMPTY_TRIE_HASH);
    }

    #[test]
    fn get_inserted() {
        let trie = trie_from(&[(b"first", b"value"), (b"second", b"value")]);
        assert_eq!(trie.get(b"first").unwrap(), Some(b"value".to_vec()));
        assert_eq!(trie.get(b"second").unwrap(), Some(b"value".to_vec()));
        assert_eq!(trie.get(b"third").unwrap(), None);
    }

    #[test]
    fn put_keeps_previous_snapshot() {
        let before = trie_from(&[(b"key", b"one")]);
        let after = before.put(b"key", b"two").unwrap();
        assert_eq!(before.get(b"key").unwrap(), Some(b"one".to_vec()));
        assert_eq!(after.get(b"key").unwrap(), Some(b"two".to_vec()));
        assert_ne!(before.hash(), after.hash());
    }

    #[test]
    fn get_prefix_and_extension_keys() {
        let trie = trie_from(&[
            (&[0x0a], b"short"),
            (&[0x0a, 0x0b], b"long"),
            (&[0x0a, 0x0b, 0x0c], b"longer"),
        ]);
        assert_eq!(trie.get(&[0x0a]).unwrap(), Some(b"short".to_vec()));
        assert_eq!(trie.get(&[0x0a, 0x0b]).unwrap(), Some(b"long".to_vec()));
        assert_eq!(
            trie.get(&[0x0a, 0x0b, 0x0c]).unwrap(),
            Some(b"longer".to_vec())
        );
        assert_eq!(trie.get(&[0x0a, 0x0c]).unwrap(), None);
        assert_eq!(trie.get(&[]).unwrap(), None);
    }

    #[test]
    fn single_entry_hash_matches_remasc_tx_root() {
        // Block 1 of regtest carries only the REMASC transaction, keyed by RLP(0)
        let remasc = hex!("dd8000009400000000000000000000000000000000010000088080808080");
        let trie = Trie::new().put(&[0x80], &remasc).unwrap();
        assert_eq!(
            trie.root_node().encoded(),
            [&hex!("500780")[..], &remasc[..]].concat().as_slice()
        );
        assert_eq!(
            trie.hash(),
            H256(hex!(
                "8c9664a30670ddc67aa13992fdd8751b7b797bbe172506ffd5cda10ebbf97952"
            ))
        );
    }

    #[test]
    fn value_length_boundary() {
        let inline = vec![0xaa; 32];
        let long = vec![0xaa; 33];
        let trie = trie_from(&[(b"a", &inline), (b"b", &long)]);
        assert_eq!(trie.get(b"a").unwrap(), Some(inline));
        assert_eq!(trie.get(b"b").unwrap(), Some(long.clone()));

        let a = Trie::new().put(b"a", &[0xaa; 32]).unwrap();
        let b = Trie::new().put(b"b", &long).unwrap();
        assert!(!a.root_node().has_long_value());
        assert!(b.root_node().has_long_value());
        assert_eq!(b.root_node().value_hash(), Some(keccak(&long)));
    }

    #[test]
    fn delete_equals_never_inserted() {
        let with = trie_from(&[(b"do", b"verb"), (b"dog", b"puppy"), (b"doge", b"coin")]);
        let without = trie_from(&[(b"do", b"verb"), (b"doge", b"coin")]);
        let deleted = with.delete(b"dog").unwrap();
        assert_eq!(deleted.hash(), without.hash());
        assert_eq!(deleted.get(b"dog").unwrap(), None);
        assert_eq!(deleted.get(b"doge").unwrap(), Some(b"coin".to_vec()));

        let emptied = deleted
            .delete(b"do")
            .and_then(|trie| trie.delete(b"doge"))
            .unwrap();
        assert_eq!(emptied.hash(), *EMPTY_TRIE_HASH);
    }

    #[test]
    fn save_and_open_with_long_values() {
        let long = vec![0x5a; 100];
        let trie = trie_from(&[
            (b"alpha", b"1"),
            (b"beta", &long),
            (b"gamma", &[0x01; 40]),
            (b"delta", b"4"),
        ]);
        trie.save().unwrap();

        let reopened = Trie::open(trie.store().clone(), trie.hash()).unwrap();
        assert_eq!(reopened.hash(), trie.hash());
        assert_eq!(reopened.get(b"alpha").unwrap(), Some(b"1".to_vec()));
        assert_eq!(reopened.get(b"beta").unwrap(), Some(long));
        assert_eq!(reopened.get(b"gamma").unwrap(), Some(vec![0x01; 40]));
        assert_eq!(reopened.get(b"epsilon").unwrap(), None);

        // Updates on a reopened trie resolve hashed children through the store
        let updated = reopened.put(b"delta", b"5").unwrap();
        let direct = trie.put(b"delta", b"5").unwrap();
        assert_eq!(updated.hash(), direct.hash());
    }

    #[test]
    fn open_unknown_root_fails() {
        let store: Arc<dyn TrieStore> = Arc::new(InMemoryTrieStore::new_empty());
        let missing = H256::repeat_byte(0x11);
        assert!(matches!(
            Trie::open(store.clone(), missing),
            Err(TrieError::RootNotFound(hash)) if hash == missing
        ));
        assert_eq!(
            Trie::open(store, *EMPTY_TRIE_HASH).unwrap().hash(),
            *EMPTY_TRIE_HASH
        );
    }

    #[test]
    fn trie_size_counts_nodes() {
        assert_eq!(Trie::new().trie_size().unwrap(), 0);
        assert_eq!(trie_from(&[(b"a", b"1")]).trie_size().unwrap(), 1);
        let trie = trie_from(&[(&[0x00], b"1"), (&[0x80], b"2")]);
        assert_eq!(trie.trie_size().unwrap(), 3);
    }

    #[test]
    fn proof_of_present_key() {
        let trie = trie_from(&[
            (b"horse", b"stallion"),
            (b"house", &[0x77; 24]),
            (b"doge", b"coin"),
            (b"dog", b"puppy"),
        ]);
        let cases: [(&[u8], Vec<u8>); 3] = [
            (b"horse", b"stallion".to_vec()),
            (b"dog", b"puppy".to_vec()),
            (b"house", vec![0x77; 24]),
        ];
        for (key, value) in cases {
            let proof = trie.get_proof(key).unwrap();
            assert_eq!(
                verify_proof(trie.hash(), key, &proof).unwrap(),
                Some(value)
            );
        }
    }

    #[test]
    fn proof_of_absent_key() {
        let trie = trie_from(&[(b"horse", b"stallion"), (b"dog", b"puppy")]);
        let proof = trie.get_proof(b"cat").unwrap();
        assert!(!proof.is_empty());
        assert_eq!(verify_proof(trie.hash(), b"cat", &proof).unwrap(), None);
    }

    #[test]
    fn proof_is_ordered_leaf_to_root() {
        let trie = trie_from(&[
            (b"a-long-enough-key-to-keep-nodes-large-0", &[0x01; 30]),
            (b"a-long-enough-key-to-keep-nodes-large-1", &[0x02; 30]),
            (b"b-long-enough-key-to-keep-nodes-large-0", &[0x03; 30]),
        ]);
        let proof = trie.get_proof(b"a-long-enough-key-to-keep-nodes-large-1").unwrap();
        assert!(proof.len() > 1);
        let root_item = proof.last().unwrap();
        assert_eq!(root_item, &trie.root_node().encoded().encode_to_vec());
    }

    #[test]
    fn empty_trie_proof_is_empty() {
        let trie = Trie::new();
        let proof = trie.get_proof(b"any").unwrap();
        assert!(proof.is_empty());
        assert!(matches!(
            verify_proof(trie.hash(), b"any", &proof),
            Err(TrieError::EmptyProof)
        ));
    }

    #[test]
    fn put_then_get_overlapping_keys() {
        let mut trie = Trie::new();
        for i in 0u16..300 {
            trie = trie.put(&i.to_be_bytes(), &i.to_le_bytes()).unwrap();
        }
        for i in 0u16..300 {
            assert_eq!(
                trie.get(&i.to_be_bytes()).unwrap(),
                Some(i.to_le_bytes().to_vec())
            );
        }
        for i in (0u16..300).filter(|i| i % 2 == 0) {
            trie = trie.delete(&i.to_be_bytes()).unwrap();
        }
        for i in 0u16..300 {
            let expected = (i % 2 == 1).then(|| i.to_le_bytes().to_vec());
            assert_eq!(trie.get(&i.to_be_bytes()).unwrap(), expected);
        }
    }

    proptest! {
        #[test]
        fn proptest_get_inserted(data in btree_map(vec(any::<u8>(), 1..40), vec(any::<u8>(), 1..80), 1..60)) {
            let trie = data
                .iter()
                .try_fold(Trie::new(), |trie, (key, value)| trie.put(key, value))
                .unwrap();
            for (key, value) in &data {
                prop_assert_eq!(trie.get(key).unwrap(), Some(value.clone()));
            }
        }

        #[test]
        fn proptest_insertion_order_independent(data in btree_map(vec(any::<u8>(), 1..40), vec(any::<u8>(), 1..80), 1..60)) {
            let forward = data
                .iter()
                .try_fold(Trie::new(), |trie, (key, value)| trie.put(key, value))
                .unwrap();
            let backward = data
                .iter()
                .rev()
                .try_fold(Trie::new(), |trie, (key, value)| trie.put(key, value))
                .unwrap();
            prop_assert_eq!(forward.hash(), backward.hash());
        }

        #[test]
        fn proptest_shuffled_insertion_same_nodes(
            (pairs, shuffled) in btree_map(vec(any::<u8>(), 1..40), vec(any::<u8>(), 1..80), 1..60)
                .prop_flat_map(|data| {
                    let pairs: Vec<_> = data.into_iter().collect();
                    (Just(pairs.clone()), Just(pairs).prop_shuffle())
                })
        ) {
            let sorted = pairs
                .iter()
                .try_fold(Trie::new(), |trie, (key, value)| trie.put(key, value))
                .unwrap();
            let permuted = shuffled
                .iter()
                .try_fold(Trie::new(), |trie, (key, value)| trie.put(key, value))
                .unwrap();
            prop_assert_eq!(sorted.hash(), permuted.hash());
            let serialized = |trie: &Trie| {
                trie.pre_order_iter()
                    .map(|element| element.map(|element| element.node.encoded().to_vec()))
                    .collect::<Result<Vec<_>, _>>()
                    .unwrap()
            };
            prop_assert_eq!(serialized(&sorted), serialized(&permuted));
        }

        #[test]
        fn proptest_delete_matches_never_inserted(data in btree_set(vec(any::<u8>(), 1..40), 2..60)) {
            let keys: Vec<_> = data.into_iter().collect();
            let (removed, kept) = keys.split_at(keys.len() / 2);
            let full = keys
                .iter()
                .try_fold(Trie::new(), |trie, key| trie.put(key, key))
                .unwrap();
            let deleted = removed
                .iter()
                .try_fold(full, |trie, key| trie.delete(key))
                .unwrap();
            let expected = kept
                .iter()
                .try_fold(Trie::new(), |trie, key| trie.put(key, key))
                .unwrap();
            prop_assert_eq!(deleted.hash(), expected.hash());
            for key in removed {
                prop_assert_eq!(deleted.get(key).unwrap(), None);
            }
        }

        #[test]
        fn proptest_proof_round_trip(data in btree_map(vec(any::<u8>(), 32), vec(any::<u8>(), 1..33), 1..60), absent in vec(any::<u8>(), 32)) {
            prop_assume!(!data.contains_key(&absent));
            let trie = data
                .iter()
                .try_fold(Trie::new(), |trie, (key, value)| trie.put(key, value))
                .unwrap();
            for (key, value) in &data {
                let proof = trie.get_proof(key).unwrap();
                prop_assert_eq!(verify_proof(trie.hash(), key, &proof).unwrap(), Some(value.clone()));
            }
            // Keys share one length, so no shared path can outrun the absent key
            let proof = trie.get_proof(&absent).unwrap();
            prop_assert_eq!(verify_proof(trie.hash(), &absent, &proof).unwrap(), None);
        }
    }
}
