use ethereum_types::H256;
use rsk_rlp::error::RLPDecodeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrieError {
    #[error(transparent)]
    RLPDecode(#[from] RLPDecodeError),
    #[error("Malformed trie node encoding: {0}")]
    MalformedEncoding(String),
    #[error("Bit path slice [{from}, {to}) out of range for length {len}")]
    OutOfRange { from: usize, to: usize, len: usize },
    #[error("Value of {0} bytes exceeds the maximum trie value length")]
    ValueTooLong(usize),
    #[error("Verification Error: {0}")]
    Verify(String),
    #[error("Lock Error: Panicked when trying to acquire a lock")]
    LockError,

    #[error("Empty proof: at least one node is required")]
    EmptyProof,
    #[error("Root {0:#x} not found among the proof nodes")]
    RootNotFound(H256),
    #[error("Proof node {0:#x} referenced during traversal is missing")]
    MissingProofNode(H256),
    #[error("Key too short: node shared path exceeds the remaining key at bit {position}")]
    KeyTooShort { position: usize },
    #[error("Value for node {0:#x} is stored by hash and cannot be revealed by a proof")]
    LongValueNotInProof(H256),
    #[error("Broken store: node or value {0:#x} is referenced but not stored")]
    BrokenStore(H256),
}
