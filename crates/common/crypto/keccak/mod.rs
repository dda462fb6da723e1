use ethereum_types::H256;
use sha3::Digest;

/// Keccak-256 of `data` (the pre-NIST padding used by Ethereum and RSK).
pub fn keccak_hash(data: impl AsRef<[u8]>) -> [u8; 32] {
    sha3::Keccak256::digest(data.as_ref()).into()
}

/// Same as [`keccak_hash`], wrapped as an [`H256`].
pub fn keccak(data: impl AsRef<[u8]>) -> H256 {
    H256(keccak_hash(data))
}

/// Incremental Keccak-256 hasher.
#[derive(Clone, Default)]
pub struct Keccak256(sha3::Keccak256);

impl Keccak256 {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(mut self, data: impl AsRef<[u8]>) -> Self {
        self.0.update(data.as_ref());
        self
    }

    pub fn finalize(self) -> [u8; 32] {
        self.0.finalize().into()
    }
}
