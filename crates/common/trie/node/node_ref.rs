use std::sync::Arc;

use ethereum_types::H256;
use tracing::warn;

use crate::{db::TrieStore, error::TrieError};

use super::Node;

/// A reference from a node to one of its children.
#[derive(Clone, Debug, Default)]
pub enum NodeRef {
    /// No child on this side.
    #[default]
    Empty,
    /// The child lives in a [`TrieStore`], referenced by its hash.
    Hash(H256),
    /// The child is held in memory (built locally or embedded in its parent's message).
    Node(Arc<Node>),
}

impl NodeRef {
    /// Wraps a node, mapping the empty trie to [`NodeRef::Empty`].
    pub fn from_node(node: Arc<Node>) -> Self {
        if node.is_empty_trie() {
            Self::Empty
        } else {
            Self::Node(node)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, NodeRef::Empty)
    }

    /// Resolves the referenced node. A hash the store cannot resolve is a broken store.
    pub fn get_node(&self, store: &dyn TrieStore) -> Result<Option<Arc<Node>>, TrieError> {
        match self {
            NodeRef::Empty => Ok(None),
            NodeRef::Node(node) => Ok(Some(node.clone())),
            NodeRef::Hash(hash) => match store.retrieve(*hash)? {
                Some(node) => Ok(Some(node)),
                None => {
                    warn!(hash = ?hash, "Trie node referenced by hash is missing from the store");
                    Err(TrieError::BrokenStore(*hash))
                }
            },
        }
    }

    pub fn hash(&self) -> Option<H256> {
        match self {
            NodeRef::Empty => None,
            NodeRef::Hash(hash) => Some(*hash),
            NodeRef::Node(node) => Some(node.hash()),
        }
    }

    /// Whether the child is serialized inline in its parent instead of by hash.
    pub fn is_embeddable(&self) -> bool {
        match self {
            NodeRef::Node(node) => node.is_embeddable(),
            _ => false,
        }
    }

    pub(crate) fn referenced_size(&self, store: &dyn TrieStore) -> Result<u64, TrieError> {
        Ok(self
            .get_node(store)?
            .map(|node| node.referenced_size())
            .unwrap_or_default())
    }
}

impl From<Node> for NodeRef {
    fn from(value: Node) -> Self {
        Self::from_node(Arc::new(value))
    }
}

impl From<H256> for NodeRef {
    fn from(value: H256) -> Self {
        Self::Hash(value)
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.hash() == other.hash()
    }
}
