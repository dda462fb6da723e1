//! # rsk-crypto
//!
//! Hashing primitives shared by the RSK verifier crates.
//!
//! Every content address in RSK (trie nodes, long values, block headers,
//! transactions and secure key prefixes) is a Keccak-256 digest.
//!
//! ```rust
//! use rsk_crypto::keccak::{keccak_hash, Keccak256};
//!
//! // Single-shot
//! let hash = keccak_hash(b"hello");
//!
//! // Streaming
//! let streamed = Keccak256::new()
//!     .update(b"hel")
//!     .update(b"lo")
//!     .finalize();
//! assert_eq!(hash, streamed);
//! ```

pub mod keccak;
