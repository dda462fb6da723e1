use crate::{error::TrieError, node::Node};
use ethereum_types::H256;
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

/// Content-addressed storage for trie nodes and long values.
///
/// Nodes are stored under the hash of their message, long values under the hash of
/// their bytes.
pub trait TrieStore: Send + Sync {
    fn save(&self, node: &Node) -> Result<(), TrieError>;
    fn save_value(&self, hash: H256, value: &[u8]) -> Result<(), TrieError>;
    fn retrieve(&self, hash: H256) -> Result<Option<Arc<Node>>, TrieError>;
    fn retrieve_value(&self, hash: H256) -> Result<Option<Vec<u8>>, TrieError>;
}

/// InMemory implementation for the TrieStore trait.
#[derive(Clone, Default)]
pub struct InMemoryTrieStore {
    inner: Arc<Mutex<HashMap<H256, Vec<u8>>>>,
}

impl InMemoryTrieStore {
    pub fn new_empty() -> Self {
        Self {
            inner: Default::default(),
        }
    }

    /// Number of stored entries, nodes and long values combined.
    pub fn len(&self) -> Result<usize, TrieError> {
        Ok(self.inner.lock().map_err(|_| TrieError::LockError)?.len())
    }

    pub fn is_empty(&self) -> Result<bool, TrieError> {
        Ok(self.len()? == 0)
    }
}

impl TrieStore for InMemoryTrieStore {
    fn save(&self, node: &Node) -> Result<(), TrieError> {
        self.inner
            .lock()
            .map_err(|_| TrieError::LockError)?
            .insert(node.hash(), node.encoded().to_vec());
        Ok(())
    }

    fn save_value(&self, hash: H256, value: &[u8]) -> Result<(), TrieError> {
        self.inner
            .lock()
            .map_err(|_| TrieError::LockError)?
            .insert(hash, value.to_vec());
        Ok(())
    }

    fn retrieve(&self, hash: H256) -> Result<Option<Arc<Node>>, TrieError> {
        let message = self
            .inner
            .lock()
            .map_err(|_| TrieError::LockError)?
            .get(&hash)
            .cloned();
        message
            .map(|message| Node::decode_raw(&message).map(Arc::new))
            .transpose()
    }

    fn retrieve_value(&self, hash: H256) -> Result<Option<Vec<u8>>, TrieError> {
        Ok(self
            .inner
            .lock()
            .map_err(|_| TrieError::LockError)?
            .get(&hash)
            .cloned())
    }
}
