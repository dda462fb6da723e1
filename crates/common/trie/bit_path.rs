use std::{fmt, sync::Arc};

use crate::error::TrieError;

/// An immutable view over a sequence of bits (each stored as a `0` or `1` byte).
///
/// Views created by [`BitPath::slice`] and [`BitPath::common_prefix`] share the
/// underlying bit array and only move the `[offset, limit)` window.
#[derive(Clone)]
pub struct BitPath {
    bits: Arc<[u8]>,
    offset: usize,
    limit: usize,
}

impl BitPath {
    pub fn empty() -> Self {
        Self::from_bits(Vec::new())
    }

    /// Wraps an already expanded bit vector. Every element must be `0` or `1`.
    pub fn from_bits(bits: Vec<u8>) -> Self {
        debug_assert!(bits.iter().all(|b| *b <= 1));
        let limit = bits.len();
        Self {
            bits: bits.into(),
            offset: 0,
            limit,
        }
    }

    /// Expands each byte into 8 bits, most significant bit first.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::from_bits(expand_bits(bytes, bytes.len() * 8))
    }

    /// Reads the first `bit_len` bits out of a packed encoding, as produced by [`BitPath::encode`].
    pub fn from_encoded(encoded: &[u8], bit_len: usize) -> Result<Self, TrieError> {
        if bit_len > encoded.len() * 8 {
            return Err(TrieError::MalformedEncoding(format!(
                "{} bytes cannot hold a path of {bit_len} bits",
                encoded.len()
            )));
        }
        Ok(Self::from_bits(expand_bits(encoded, bit_len)))
    }

    pub fn len(&self) -> usize {
        self.limit - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.limit == self.offset
    }

    /// Returns the bit at position `index` of this view.
    /// Callers must keep `index < self.len()`.
    pub fn get(&self, index: usize) -> u8 {
        debug_assert!(index < self.len());
        self.bits[self.offset + index]
    }

    pub fn as_bits(&self) -> &[u8] {
        &self.bits[self.offset..self.limit]
    }

    pub fn slice(&self, from: usize, to: usize) -> Result<Self, TrieError> {
        if from > to || to > self.len() {
            return Err(TrieError::OutOfRange {
                from,
                to,
                len: self.len(),
            });
        }
        Ok(Self {
            bits: self.bits.clone(),
            offset: self.offset + from,
            limit: self.offset + to,
        })
    }

    /// Drops the first `count` bits.
    pub fn skip(&self, count: usize) -> Result<Self, TrieError> {
        self.slice(count, self.len())
    }

    /// Longest prefix shared by both paths, as a view over `self`.
    pub fn common_prefix(&self, other: &BitPath) -> BitPath {
        let common = self
            .as_bits()
            .iter()
            .zip(other.as_bits())
            .take_while(|(a, b)| a == b)
            .count();
        Self {
            bits: self.bits.clone(),
            offset: self.offset,
            limit: self.offset + common,
        }
    }

    /// Packs the bits into bytes, zero-padding the trailing byte.
    pub fn encode(&self) -> Vec<u8> {
        let mut encoded = vec![0u8; self.len().div_ceil(8)];
        for (i, bit) in self.as_bits().iter().enumerate() {
            if *bit == 1 {
                encoded[i / 8] |= 0x80 >> (i % 8);
            }
        }
        encoded
    }

    /// Prepends `count` zero bits.
    pub fn left_pad(&self, count: usize) -> BitPath {
        let mut bits = vec![0u8; count];
        bits.extend_from_slice(self.as_bits());
        Self::from_bits(bits)
    }

    /// Path of a child node: `self ‖ implicit_bit ‖ child_path`.
    pub fn rebuild_shared_path(&self, implicit_bit: u8, child_path: &BitPath) -> BitPath {
        let mut bits = Vec::with_capacity(self.len() + 1 + child_path.len());
        bits.extend_from_slice(self.as_bits());
        bits.push(implicit_bit);
        bits.extend_from_slice(child_path.as_bits());
        Self::from_bits(bits)
    }

    /// Copies the bits of this view into a new vector.
    pub fn expand(&self) -> Vec<u8> {
        self.as_bits().to_vec()
    }
}

fn expand_bits(bytes: &[u8], bit_len: usize) -> Vec<u8> {
    (0..bit_len)
        .map(|i| (bytes[i / 8] >> (7 - i % 8)) & 1)
        .collect()
}

impl Default for BitPath {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for BitPath {
    fn eq(&self, other: &Self) -> bool {
        self.as_bits() == other.as_bits()
    }
}

impl Eq for BitPath {}

impl fmt::Display for BitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.as_bits() {
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitPath({self})")
    }
}
