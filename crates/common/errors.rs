use rsk_trie::TrieError;

#[derive(thiserror::Error, Debug)]
pub enum HeaderEncodeError {
    #[error("Gas limit {0} does not fit in 4 bytes")]
    GasLimitOverflow(u64),
    #[error("Transaction execution sublist edge {0} is negative")]
    NegativeEdge(i16),
}

#[derive(thiserror::Error, Debug)]
pub enum ProofResponseError {
    #[error("Invalid hex in {field}: {value}")]
    InvalidHex { field: &'static str, value: String },
    #[error(transparent)]
    Trie(#[from] TrieError),
}
