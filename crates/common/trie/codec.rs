//! Canonical node serialization.
//!
//! A node message is laid out as:
//!
//! ```text
//! flags | [shared path] | [left child] | [right child] | [children size] | value
//! ```
//!
//! Children are either embedded (varint length followed by the child's message) or
//! referenced by their 32-byte hash. Values longer than 32 bytes are replaced by their
//! hash followed by a 3-byte big-endian length.

use std::sync::Arc;

use ethereum_types::H256;

use crate::{
    bit_path::BitPath,
    error::TrieError,
    node::{Node, NodeRef, NodeValue},
    varint::{Uint24, VarInt},
};

const VERSION_MASK: u8 = 0b1100_0000;
const FLAG_VERSION: u8 = 0b0100_0000;
const FLAG_LONG_VALUE: u8 = 0b0010_0000;
const FLAG_SHARED_PATH: u8 = 0b0001_0000;
const FLAG_LEFT: u8 = 0b0000_1000;
const FLAG_RIGHT: u8 = 0b0000_0100;
const FLAG_LEFT_EMBEDDED: u8 = 0b0000_0010;
const FLAG_RIGHT_EMBEDDED: u8 = 0b0000_0001;

const HASH_LEN: usize = 32;

pub(crate) fn encode_node(node: &Node) -> Vec<u8> {
    let shared_path = node.shared_path();
    let (left, right) = (node.left(), node.right());

    let mut flags = FLAG_VERSION;
    if node.has_long_value() {
        flags |= FLAG_LONG_VALUE;
    }
    if !shared_path.is_empty() {
        flags |= FLAG_SHARED_PATH;
    }
    if !left.is_empty() {
        flags |= FLAG_LEFT;
    }
    if !right.is_empty() {
        flags |= FLAG_RIGHT;
    }
    if left.is_embeddable() {
        flags |= FLAG_LEFT_EMBEDDED;
    }
    if right.is_embeddable() {
        flags |= FLAG_RIGHT_EMBEDDED;
    }

    let mut buf = vec![flags];
    if !shared_path.is_empty() {
        encode_shared_path(shared_path, &mut buf);
    }
    encode_child(left, &mut buf);
    encode_child(right, &mut buf);
    if !node.is_terminal() {
        VarInt(node.children_size()).encode(&mut buf);
    }

    let value = node.node_value();
    if value.is_long() {
        if let Some(hash) = value.hash() {
            buf.extend_from_slice(hash.as_bytes());
        }
        buf.extend_from_slice(&value.length().to_be_bytes());
    } else if let Some(bytes) = value.bytes() {
        buf.extend_from_slice(bytes);
    }
    buf
}

fn encode_child(child: &NodeRef, buf: &mut Vec<u8>) {
    match child {
        NodeRef::Empty => {}
        NodeRef::Node(node) if node.is_embeddable() => {
            let message = node.encoded();
            VarInt(message.len() as u64).encode(buf);
            buf.extend_from_slice(message);
        }
        NodeRef::Node(node) => buf.extend_from_slice(node.hash().as_bytes()),
        NodeRef::Hash(hash) => buf.extend_from_slice(hash.as_bytes()),
    }
}

/// Writes a shared path: a length prefix followed by the packed bits.
///
/// Lengths 1..=32 use a single byte `len - 1`, lengths 160..=382 a single byte
/// `len - 128`. Any other length is written as `0xFF` followed by a varint.
pub fn encode_shared_path(path: &BitPath, buf: &mut Vec<u8>) {
    let len = path.len();
    match len {
        1..=32 => buf.push((len - 1) as u8),
        160..=382 => buf.push((len - 128) as u8),
        _ => {
            buf.push(0xff);
            VarInt(len as u64).encode(buf);
        }
    }
    buf.extend_from_slice(&path.encode());
}

pub(crate) fn decode_node(message: &[u8]) -> Result<Node, TrieError> {
    let mut reader = Reader::new(message);
    let flags = reader.byte()?;
    if flags & VERSION_MASK != FLAG_VERSION {
        return Err(TrieError::MalformedEncoding(format!(
            "unknown node version in flags {flags:#010b}"
        )));
    }

    let shared_path = if flags & FLAG_SHARED_PATH != 0 {
        decode_shared_path(&mut reader)?
    } else {
        BitPath::empty()
    };
    let left = decode_child(
        &mut reader,
        flags & FLAG_LEFT != 0,
        flags & FLAG_LEFT_EMBEDDED != 0,
    )?;
    let right = decode_child(
        &mut reader,
        flags & FLAG_RIGHT != 0,
        flags & FLAG_RIGHT_EMBEDDED != 0,
    )?;
    let children_size = if left.is_empty() && right.is_empty() {
        0
    } else {
        reader.varint()?
    };

    let value = if flags & FLAG_LONG_VALUE != 0 {
        let hash = H256::from_slice(reader.take(HASH_LEN)?);
        let length = Uint24::decode(reader.take(Uint24::BYTES)?)?;
        if !reader.rest().is_empty() {
            return Err(TrieError::MalformedEncoding(
                "trailing bytes after long value reference".to_string(),
            ));
        }
        NodeValue::long_by_hash(hash, length)
    } else {
        NodeValue::from_bytes(reader.rest())?
    };

    Ok(Node::from_parts(
        shared_path,
        value,
        left,
        right,
        children_size,
    ))
}

fn decode_shared_path(reader: &mut Reader<'_>) -> Result<BitPath, TrieError> {
    let prefix = reader.byte()?;
    let len = match prefix {
        0..=31 => prefix as usize + 1,
        32..=254 => prefix as usize + 128,
        255 => usize::try_from(reader.varint()?).map_err(|_| {
            TrieError::MalformedEncoding("shared path length overflows".to_string())
        })?,
    };
    let packed = reader.take(len.div_ceil(8))?;
    BitPath::from_encoded(packed, len)
}

fn decode_child(
    reader: &mut Reader<'_>,
    present: bool,
    embedded: bool,
) -> Result<NodeRef, TrieError> {
    if !present {
        return Ok(NodeRef::Empty);
    }
    if embedded {
        let len = usize::try_from(reader.varint()?).map_err(|_| {
            TrieError::MalformedEncoding("embedded node length overflows".to_string())
        })?;
        let child = Node::decode_raw(reader.take(len)?)?;
        return Ok(NodeRef::Node(Arc::new(child)));
    }
    Ok(NodeRef::Hash(H256::from_slice(reader.take(HASH_LEN)?)))
}

struct Reader<'a> {
    data: &'a [u8],
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], TrieError> {
        if self.data.len() < len {
            return Err(TrieError::MalformedEncoding(format!(
                "expected {len} more bytes, found {}",
                self.data.len()
            )));
        }
        let (head, tail) = self.data.split_at(len);
        self.data = tail;
        Ok(head)
    }

    fn byte(&mut self) -> Result<u8, TrieError> {
        Ok(self.take(1)?[0])
    }

    fn varint(&mut self) -> Result<u64, TrieError> {
        let (value, read) = VarInt::decode(self.data)?;
        self.data = &self.data[read..];
        Ok(value.0)
    }

    fn rest(&self) -> &'a [u8] {
        self.data
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db::InMemoryTrieStore;
    use hex_literal::hex;

    fn path_prefix(len: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_shared_path(&BitPath::from_bits(vec![1; len]), &mut buf);
        buf[..buf.len() - len.div_ceil(8)].to_vec()
    }

    #[test]
    fn shared_path_length_prefixes() {
        assert_eq!(path_prefix(1), vec![0x00]);
        assert_eq!(path_prefix(32), vec![31]);
        assert_eq!(path_prefix(33), vec![0xff, 33]);
        assert_eq!(path_prefix(159), vec![0xff, 159]);
        assert_eq!(path_prefix(160), vec![32]);
        assert_eq!(path_prefix(248), vec![120]);
        assert_eq!(path_prefix(382), vec![254]);
        assert_eq!(path_prefix(383), hex!("fffd7f01").to_vec());
    }

    #[test]
    fn shared_path_round_trip_across_prefix_forms() {
        for len in [1usize, 7, 32, 33, 86, 159, 160, 200, 382, 383, 600] {
            let bits = (0..len).map(|i| (i % 3 == 0) as u8).collect();
            let path = BitPath::from_bits(bits);
            let mut buf = Vec::new();
            encode_shared_path(&path, &mut buf);
            let mut reader = Reader::new(&buf);
            assert_eq!(decode_shared_path(&mut reader).unwrap(), path);
            assert!(reader.rest().is_empty());
        }
    }

    #[test]
    fn encodes_terminal_node() {
        let node = Node::terminal(BitPath::from_bytes(&[0x80]), &[0x01, 0x02]).unwrap();
        assert_eq!(node.encoded(), &hex!("5007800102"));
    }

    #[test]
    fn encodes_node_without_shared_path() {
        let node = Node::terminal(BitPath::empty(), &[0xaa]).unwrap();
        assert_eq!(node.encoded(), &hex!("40aa"));
    }

    #[test]
    fn encodes_long_value_by_hash() {
        let value = vec![0x11u8; 33];
        let node = Node::terminal(BitPath::from_bytes(&[0x01]), &value).unwrap();
        let encoded = node.encoded();
        assert_eq!(encoded[0], 0x70);
        assert_eq!(&encoded[3..35], rsk_crypto::keccak::keccak(&value).as_bytes());
        assert_eq!(&encoded[35..], &[0x00, 0x00, 33]);
    }

    #[test]
    fn thirty_two_byte_value_is_inline() {
        let value = vec![0x11u8; 32];
        let node = Node::terminal(BitPath::from_bytes(&[0x01]), &value).unwrap();
        assert!(!node.has_long_value());
        assert_eq!(node.encoded()[0], 0x50);
        assert_eq!(&node.encoded()[3..], value.as_slice());
    }

    #[test]
    fn decode_preserves_hash_and_children() {
        let store = InMemoryTrieStore::new_empty();
        let root = Arc::new(Node::empty());
        let root = root
            .put(&BitPath::from_bytes(&[0x00]), &[0x01], &store)
            .unwrap();
        let root = root
            .put(&BitPath::from_bytes(&[0x80]), &[0x33; 40], &store)
            .unwrap();
        let root = root
            .put(&BitPath::from_bytes(&[0x81, 0x01]), &[0x22; 20], &store)
            .unwrap();

        let decoded = Node::decode_raw(root.encoded()).unwrap();
        assert_eq!(decoded.hash(), root.hash());
        assert_eq!(encode_node(&decoded), root.encoded());
        assert_eq!(decoded.children_size(), root.children_size());
        assert!(matches!(decoded.left(), NodeRef::Node(_)));
        assert!(matches!(decoded.right(), NodeRef::Hash(_)));
        assert_eq!(decoded.right().hash(), root.right().hash());
    }

    #[test]
    fn decode_long_value_reference() {
        let value = vec![0x44u8; 64];
        let node = Node::terminal(BitPath::from_bytes(&[0x02]), &value).unwrap();
        let decoded = Node::decode_raw(node.encoded()).unwrap();
        assert!(decoded.has_long_value());
        assert_eq!(decoded.value(), None);
        assert_eq!(decoded.value_length().value(), 64);
        assert_eq!(decoded.value_hash(), node.value_hash());
        assert_eq!(encode_node(&decoded), node.encoded());
    }

    #[test]
    fn rejects_malformed_messages() {
        assert!(matches!(
            decode_node(&[]),
            Err(TrieError::MalformedEncoding(_))
        ));
        assert!(matches!(
            decode_node(&hex!("80aa")),
            Err(TrieError::MalformedEncoding(_))
        ));
        // left child hash truncated
        assert!(matches!(
            decode_node(&hex!("48aabb")),
            Err(TrieError::MalformedEncoding(_))
        ));
        // long value with trailing data
        let mut long = vec![0x60];
        long.extend_from_slice(&[0u8; 35]);
        long.push(0x01);
        assert!(matches!(
            decode_node(&long),
            Err(TrieError::MalformedEncoding(_))
        ));
    }
}
