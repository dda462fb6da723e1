use crate::error::TrieError;

/// Bitcoin-style variable length integer, used for size prefixes in node messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VarInt(pub u64);

impl VarInt {
    /// Number of bytes needed to encode `value`.
    pub const fn size_of(value: u64) -> usize {
        if value < 0xfd {
            1
        } else if value <= 0xffff {
            3
        } else if value <= 0xffff_ffff {
            5
        } else {
            9
        }
    }

    pub fn encode(&self, buf: &mut Vec<u8>) {
        let value = self.0;
        match Self::size_of(value) {
            1 => buf.push(value as u8),
            3 => {
                buf.push(0xfd);
                buf.extend_from_slice(&(value as u16).to_le_bytes());
            }
            5 => {
                buf.push(0xfe);
                buf.extend_from_slice(&(value as u32).to_le_bytes());
            }
            _ => {
                buf.push(0xff);
                buf.extend_from_slice(&value.to_le_bytes());
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(Self::size_of(self.0));
        self.encode(&mut buf);
        buf
    }

    /// Decodes a VarInt from the start of `data`, returning it with the number of bytes read.
    pub fn decode(data: &[u8]) -> Result<(Self, usize), TrieError> {
        let first = *data
            .first()
            .ok_or_else(|| TrieError::MalformedEncoding("missing varint".to_string()))?;
        let width = match first {
            0xfd => 2,
            0xfe => 4,
            0xff => 8,
            small => return Ok((Self(small as u64), 1)),
        };
        let bytes = data.get(1..1 + width).ok_or_else(|| {
            TrieError::MalformedEncoding(format!("truncated {width}-byte varint"))
        })?;
        let mut le = [0u8; 8];
        le[..width].copy_from_slice(bytes);
        Ok((Self(u64::from_le_bytes(le)), 1 + width))
    }
}

/// Unsigned 24-bit integer, serialized as 3 big-endian bytes. Bounds trie value lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Uint24(u32);

impl Uint24 {
    pub const MAX: u32 = 0x00ff_ffff;
    pub const BYTES: usize = 3;

    pub fn from_len(len: usize) -> Result<Self, TrieError> {
        u32::try_from(len)
            .ok()
            .filter(|len| *len <= Self::MAX)
            .map(Self)
            .ok_or(TrieError::ValueTooLong(len))
    }

    pub const fn value(&self) -> u32 {
        self.0
    }

    pub const fn to_be_bytes(&self) -> [u8; 3] {
        let [_, a, b, c] = self.0.to_be_bytes();
        [a, b, c]
    }

    pub fn decode(data: &[u8]) -> Result<Self, TrieError> {
        match data {
            [a, b, c] => Ok(Self(u32::from_be_bytes([0, *a, *b, *c]))),
            _ => Err(TrieError::MalformedEncoding(format!(
                "expected 3 bytes for a value length, got {}",
                data.len()
            ))),
        }
    }
}
