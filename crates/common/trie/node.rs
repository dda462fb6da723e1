mod node_ref;

use std::sync::{Arc, OnceLock};

use ethereum_types::H256;
use rsk_crypto::keccak::keccak;

pub use node_ref::NodeRef;

use crate::{
    EMPTY_TRIE_HASH, bit_path::BitPath, codec, db::TrieStore, error::TrieError, varint::Uint24,
};

/// Terminal nodes whose message fits in this many bytes are embedded in their parent.
pub const MAX_EMBEDDED_NODE_SIZE: usize = 44;
/// Values longer than this are referenced by hash and length instead of stored inline.
pub const MAX_INLINE_VALUE_SIZE: usize = 32;

/// The value held by a node.
///
/// Long values decoded from a node message only carry their hash and length;
/// the bytes have to be fetched from a [`TrieStore`].
#[derive(Debug, Clone, Default)]
pub struct NodeValue {
    bytes: Option<Vec<u8>>,
    length: Uint24,
    hash: OnceLock<H256>,
}

impl NodeValue {
    pub fn none() -> Self {
        Self::default()
    }

    /// Builds a value from raw bytes. An empty slice means "no value".
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TrieError> {
        if bytes.is_empty() {
            return Ok(Self::none());
        }
        Ok(Self {
            length: Uint24::from_len(bytes.len())?,
            bytes: Some(bytes.to_vec()),
            hash: OnceLock::new(),
        })
    }

    pub(crate) fn long_by_hash(hash: H256, length: Uint24) -> Self {
        Self {
            bytes: None,
            length,
            hash: OnceLock::from(hash),
        }
    }

    pub fn is_present(&self) -> bool {
        self.length.value() > 0
    }

    pub fn is_long(&self) -> bool {
        self.length.value() as usize > MAX_INLINE_VALUE_SIZE
    }

    pub fn length(&self) -> Uint24 {
        self.length
    }

    /// The value bytes, when known locally.
    pub fn bytes(&self) -> Option<&[u8]> {
        self.bytes.as_deref()
    }

    pub fn hash(&self) -> Option<H256> {
        if let Some(hash) = self.hash.get() {
            return Some(*hash);
        }
        self.bytes
            .as_ref()
            .map(|bytes| *self.hash.get_or_init(|| keccak(bytes)))
    }

    fn matches(&self, other: &[u8]) -> bool {
        if self.length.value() as usize != other.len() {
            return false;
        }
        match &self.bytes {
            Some(bytes) => bytes == other,
            None => self.hash() == Some(keccak(other)),
        }
    }
}

/// A node of the unified binary trie.
///
/// Nodes are immutable: every update builds new nodes along the modified path and
/// shares every untouched subtree with the previous version.
#[derive(Debug)]
pub struct Node {
    shared_path: BitPath,
    value: NodeValue,
    left: NodeRef,
    right: NodeRef,
    children_size: u64,
    encoded: OnceLock<Vec<u8>>,
    hash: OnceLock<H256>,
}

impl Default for Node {
    fn default() -> Self {
        Self::empty()
    }
}

impl Node {
    /// The canonical empty trie.
    pub fn empty() -> Self {
        Self::from_parts(
            BitPath::empty(),
            NodeValue::none(),
            NodeRef::Empty,
            NodeRef::Empty,
            0,
        )
    }

    pub(crate) fn from_parts(
        shared_path: BitPath,
        value: NodeValue,
        left: NodeRef,
        right: NodeRef,
        children_size: u64,
    ) -> Self {
        Self {
            shared_path,
            value,
            left,
            right,
            children_size,
            encoded: OnceLock::new(),
            hash: OnceLock::new(),
        }
    }

    /// Builds a node computing its children size, resolving hash-referenced children through `store`.
    pub(crate) fn build(
        shared_path: BitPath,
        value: NodeValue,
        left: NodeRef,
        right: NodeRef,
        store: &dyn TrieStore,
    ) -> Result<Self, TrieError> {
        let children_size = left.referenced_size(store)? + right.referenced_size(store)?;
        Ok(Self::from_parts(shared_path, value, left, right, children_size))
    }

    /// A terminal node holding `value` under `shared_path`.
    pub fn terminal(shared_path: BitPath, value: &[u8]) -> Result<Self, TrieError> {
        Ok(Self::from_parts(
            shared_path,
            NodeValue::from_bytes(value)?,
            NodeRef::Empty,
            NodeRef::Empty,
            0,
        ))
    }

    /// Decodes a node message. The message is kept as the node's encoding so its hash
    /// is always the hash of the bytes it was read from.
    pub fn decode_raw(message: &[u8]) -> Result<Self, TrieError> {
        let node = codec::decode_node(message)?;
        let _ = node.encoded.set(message.to_vec());
        Ok(node)
    }

    pub fn shared_path(&self) -> &BitPath {
        &self.shared_path
    }

    pub fn node_value(&self) -> &NodeValue {
        &self.value
    }

    /// Inline value bytes, or the long value bytes when known locally.
    pub fn value(&self) -> Option<&[u8]> {
        self.value.bytes()
    }

    pub fn value_length(&self) -> Uint24 {
        self.value.length()
    }

    pub fn value_hash(&self) -> Option<H256> {
        self.value.hash()
    }

    pub fn has_long_value(&self) -> bool {
        self.value.is_long()
    }

    pub fn left(&self) -> &NodeRef {
        &self.left
    }

    pub fn right(&self) -> &NodeRef {
        &self.right
    }

    /// Child reference selected by an implicit key bit (`0` left, `1` right).
    pub fn child(&self, bit: u8) -> &NodeRef {
        if bit == 0 { &self.left } else { &self.right }
    }

    pub fn children_size(&self) -> u64 {
        self.children_size
    }

    pub fn is_terminal(&self) -> bool {
        self.left.is_empty() && self.right.is_empty()
    }

    pub fn is_empty_trie(&self) -> bool {
        !self.value.is_present() && self.is_terminal()
    }

    pub fn is_embeddable(&self) -> bool {
        self.is_terminal() && self.encoded().len() <= MAX_EMBEDDED_NODE_SIZE
    }

    /// Canonical serialization of this node.
    pub fn encoded(&self) -> &[u8] {
        self.encoded.get_or_init(|| codec::encode_node(self))
    }

    pub fn hash(&self) -> H256 {
        *self.hash.get_or_init(|| {
            if self.is_empty_trie() {
                *EMPTY_TRIE_HASH
            } else {
                keccak(self.encoded())
            }
        })
    }

    /// Contribution of this node to its parent's children size.
    pub(crate) fn referenced_size(&self) -> u64 {
        let long_value_length = if self.value.is_long() {
            self.value.length().value() as u64
        } else {
            0
        };
        self.children_size + long_value_length + self.encoded().len() as u64
    }

    /// Returns this node's value, fetching long values from `store` when needed.
    pub fn get_value(&self, store: &dyn TrieStore) -> Result<Option<Vec<u8>>, TrieError> {
        if !self.value.is_present() {
            return Ok(None);
        }
        if let Some(bytes) = self.value.bytes() {
            return Ok(Some(bytes.to_vec()));
        }
        let Some(hash) = self.value.hash() else {
            return Ok(None);
        };
        store
            .retrieve_value(hash)?
            .map(Some)
            .ok_or(TrieError::BrokenStore(hash))
    }

    /// Looks up `key` below this node.
    pub fn get(&self, key: &BitPath, store: &dyn TrieStore) -> Result<Option<Vec<u8>>, TrieError> {
        let shared_len = self.shared_path.len();
        let common = key.common_prefix(&self.shared_path).len();
        if common < shared_len {
            return Ok(None);
        }
        if common == key.len() {
            return self.get_value(store);
        }
        let bit = key.get(common);
        match self.child(bit).get_node(store)? {
            Some(child) => child.get(&key.skip(common + 1)?, store),
            None => Ok(None),
        }
    }

    /// Stores `value` under `key`, returning the new root of this subtree.
    /// An empty value deletes the key. Unchanged subtrees are returned as the same `Arc`.
    pub fn put(
        self: &Arc<Self>,
        key: &BitPath,
        value: &[u8],
        store: &dyn TrieStore,
    ) -> Result<Arc<Node>, TrieError> {
        let shared_len = self.shared_path.len();
        let common = key.common_prefix(&self.shared_path).len();

        if common < shared_len {
            if value.is_empty() {
                return Ok(self.clone());
            }
            return Arc::new(self.split(common)?).put(key, value, store);
        }

        if shared_len == key.len() {
            if value.is_empty() {
                if !self.value.is_present() {
                    return Ok(self.clone());
                }
                let without_value = Node::from_parts(
                    self.shared_path.clone(),
                    NodeValue::none(),
                    self.left.clone(),
                    self.right.clone(),
                    self.children_size,
                );
                return Ok(Arc::new(without_value.coalesce(store)?));
            }
            if self.value.matches(value) {
                return Ok(self.clone());
            }
            return Ok(Arc::new(Node::from_parts(
                self.shared_path.clone(),
                NodeValue::from_bytes(value)?,
                self.left.clone(),
                self.right.clone(),
                self.children_size,
            )));
        }

        if self.is_empty_trie() {
            if value.is_empty() {
                return Ok(self.clone());
            }
            return Ok(Arc::new(Node::terminal(key.clone(), value)?));
        }

        let bit = key.get(shared_len);
        let child = self
            .child(bit)
            .get_node(store)?
            .unwrap_or_else(|| Arc::new(Node::empty()));
        let new_child = child.put(&key.skip(shared_len + 1)?, value, store)?;
        if Arc::ptr_eq(&child, &new_child) {
            return Ok(self.clone());
        }

        let new_ref = NodeRef::from_node(new_child);
        let (left, right) = if bit == 0 {
            (new_ref, self.right.clone())
        } else {
            (self.left.clone(), new_ref)
        };
        let rebuilt = Node::build(
            self.shared_path.clone(),
            self.value.clone(),
            left,
            right,
            store,
        )?;
        if value.is_empty() {
            return Ok(Arc::new(rebuilt.coalesce(store)?));
        }
        Ok(Arc::new(rebuilt))
    }

    /// Splits this node at bit `position` of its shared path: the new node keeps the
    /// common part and holds the remainder of this node as its only child.
    fn split(&self, position: usize) -> Result<Node, TrieError> {
        let bit = self.shared_path.get(position);
        let remainder = Node::from_parts(
            self.shared_path.skip(position + 1)?,
            self.value.clone(),
            self.left.clone(),
            self.right.clone(),
            self.children_size,
        );
        let remainder_size = remainder.referenced_size();
        let remainder = NodeRef::from_node(Arc::new(remainder));
        let (left, right) = if bit == 0 {
            (remainder, NodeRef::Empty)
        } else {
            (NodeRef::Empty, remainder)
        };
        Ok(Node::from_parts(
            self.shared_path.slice(0, position)?,
            NodeValue::none(),
            left,
            right,
            remainder_size,
        ))
    }

    /// Restores the canonical shape after a deletion: a node without value and children
    /// becomes the empty trie, and a node without value and a single child merges with it.
    fn coalesce(self, store: &dyn TrieStore) -> Result<Node, TrieError> {
        if self.value.is_present() {
            return Ok(self);
        }
        let (bit, child_ref) = match (self.left.is_empty(), self.right.is_empty()) {
            (true, true) => return Ok(Node::empty()),
            (false, false) => return Ok(self),
            (false, true) => (0, &self.left),
            (true, false) => (1, &self.right),
        };
        let Some(child) = child_ref.get_node(store)? else {
            return Ok(Node::empty());
        };
        Ok(Node::from_parts(
            self.shared_path.rebuild_shared_path(bit, &child.shared_path),
            child.value.clone(),
            child.left.clone(),
            child.right.clone(),
            child.children_size,
        ))
    }
}
