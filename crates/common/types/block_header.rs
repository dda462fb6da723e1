//! RSK block header hashing.
//!
//! The header hash is the keccak of an RLP list whose layout depends on the header
//! version and on which RSKIPs are active. Every element is a byte string, and the
//! zero/empty conventions differ per field, so the list is built explicitly instead
//! of deriving it from typed fields.

use bytes::Bytes;
use ethereum_types::{Address, Bloom, H256, U256};
use rsk_crypto::keccak::keccak;
use rsk_rlp::{encode::RLPEncode, structs::encode_bytes_list};

use crate::{
    constants::GAS_LIMIT_WIDTH,
    errors::HeaderEncodeError,
    utils::{u64_to_minimal_bytes, u256_to_minimal_bytes},
};

/// Header layout version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum HeaderVersion {
    /// Bloom in the hash encoding, edges as a trailing field.
    #[default]
    V0 = 0,
    /// Bloom and edges folded into the extension data.
    V1 = 1,
    /// Like V1, with the base event added to the extension.
    V2 = 2,
}

impl HeaderVersion {
    pub fn has_extension(self) -> bool {
        self >= HeaderVersion::V1
    }
}

impl TryFrom<u8> for HeaderVersion {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::V0),
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            other => Err(other),
        }
    }
}

/// Network rules that shape the header encoding at a given height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHashConfig {
    /// Leave the merged mining merkle proof and coinbase out of the hash.
    pub use_rskip92_encoding: bool,
    pub version: HeaderVersion,
    /// Always encode the UMM root, as empty bytes when the block carries none.
    pub include_umm_root: bool,
    /// Encode the gas limit padded to 4 bytes instead of minimal bytes.
    pub use_4_byte_gas_limit: bool,
}

impl Default for BlockHashConfig {
    /// Regtest rules: everything active from genesis.
    fn default() -> Self {
        Self {
            use_rskip92_encoding: true,
            version: HeaderVersion::V2,
            include_umm_root: true,
            use_4_byte_gas_limit: true,
        }
    }
}

/// Selects which optional parts of the header are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingMode {
    pub with_merged_mining: bool,
    pub with_merkle_proof_and_coinbase: bool,
    /// Replace the bloom with the extension data on headers that have one.
    pub compressed: bool,
}

impl EncodingMode {
    /// Every field, bloom included, as exchanged between nodes.
    pub const FULL: Self = Self {
        with_merged_mining: true,
        with_merkle_proof_and_coinbase: true,
        compressed: false,
    };

    /// Encoding hashed to obtain the block hash.
    pub const fn for_hash(use_rskip92_encoding: bool) -> Self {
        Self {
            with_merged_mining: true,
            with_merkle_proof_and_coinbase: !use_rskip92_encoding,
            compressed: true,
        }
    }
}

/// Header values as reported by a node, before the encoding rules are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockHeaderInput {
    pub parent_hash: H256,
    pub uncles_hash: H256,
    pub coinbase: Address,
    pub state_root: H256,
    pub tx_trie_root: H256,
    pub receipt_trie_root: H256,
    pub logs_bloom: Bloom,
    pub difficulty: U256,
    pub number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: Bytes,
    pub paid_fees: U256,
    pub minimum_gas_price: Option<U256>,
    pub uncle_count: u64,
    pub bitcoin_merged_mining_header: Bytes,
    pub bitcoin_merged_mining_merkle_proof: Bytes,
    pub bitcoin_merged_mining_coinbase_transaction: Bytes,
    /// `None` when the block has no edges field, `Some(vec![])` when it is present but empty.
    pub tx_execution_sublists_edges: Option<Vec<i16>>,
    /// `None` when the block has no UMM root, `Some(empty)` when it is present but empty.
    pub umm_root: Option<Bytes>,
    pub base_event: Option<Bytes>,
}

/// A header ready to be encoded. Built from a [`BlockHeaderInput`] with
/// [`BlockHeader::from_input`], which resolves the network dependent rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub parent_hash: H256,
    pub uncles_hash: H256,
    pub coinbase: Address,
    pub state_root: H256,
    pub tx_trie_root: H256,
    pub receipt_trie_root: H256,
    pub logs_bloom: Bloom,
    pub difficulty: U256,
    pub number: u64,
    /// Raw gas limit bytes, kept as they must be encoded.
    pub gas_limit: Bytes,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: Bytes,
    pub paid_fees: U256,
    pub minimum_gas_price: Option<U256>,
    pub uncle_count: u64,
    pub bitcoin_merged_mining_header: Bytes,
    pub bitcoin_merged_mining_merkle_proof: Bytes,
    pub bitcoin_merged_mining_coinbase_transaction: Bytes,
    pub tx_execution_sublists_edges: Option<Vec<i16>>,
    pub umm_root: Option<Bytes>,
    pub base_event: Option<Bytes>,
    pub use_rskip92_encoding: bool,
    pub version: HeaderVersion,
}

impl BlockHeader {
    pub fn from_input(
        input: &BlockHeaderInput,
        config: BlockHashConfig,
    ) -> Result<Self, HeaderEncodeError> {
        let gas_limit = encode_gas_limit(input.gas_limit, config.use_4_byte_gas_limit)?;

        let umm_root = match (&input.umm_root, config.include_umm_root) {
            (Some(root), _) => Some(root.clone()),
            (None, true) => Some(Bytes::new()),
            (None, false) => None,
        };

        let tx_execution_sublists_edges = match &input.tx_execution_sublists_edges {
            Some(edges) => Some(edges.clone()),
            None if config.version.has_extension() => Some(Vec::new()),
            None => None,
        };

        let base_event = match config.version {
            HeaderVersion::V2 => input.base_event.clone(),
            _ => None,
        };

        Ok(Self {
            parent_hash: input.parent_hash,
            uncles_hash: input.uncles_hash,
            coinbase: input.coinbase,
            state_root: input.state_root,
            tx_trie_root: input.tx_trie_root,
            receipt_trie_root: input.receipt_trie_root,
            logs_bloom: input.logs_bloom,
            difficulty: input.difficulty,
            number: input.number,
            gas_limit,
            gas_used: input.gas_used,
            timestamp: input.timestamp,
            extra_data: input.extra_data.clone(),
            paid_fees: input.paid_fees,
            minimum_gas_price: input.minimum_gas_price,
            uncle_count: input.uncle_count,
            bitcoin_merged_mining_header: input.bitcoin_merged_mining_header.clone(),
            bitcoin_merged_mining_merkle_proof: input.bitcoin_merged_mining_merkle_proof.clone(),
            bitcoin_merged_mining_coinbase_transaction: input
                .bitcoin_merged_mining_coinbase_transaction
                .clone(),
            tx_execution_sublists_edges,
            umm_root,
            base_event,
            use_rskip92_encoding: config.use_rskip92_encoding,
            version: config.version,
        })
    }

    /// Ordered byte-string elements of the header list for the given mode.
    pub fn encoded_fields(&self, mode: EncodingMode) -> Result<Vec<Vec<u8>>, HeaderEncodeError> {
        let mut fields = Vec::with_capacity(24);

        fields.push(self.parent_hash.as_bytes().to_vec());
        fields.push(self.uncles_hash.as_bytes().to_vec());
        fields.push(encode_rsk_address(&self.coinbase));
        fields.push(self.state_root.as_bytes().to_vec());
        fields.push(self.tx_trie_root.as_bytes().to_vec());
        fields.push(self.receipt_trie_root.as_bytes().to_vec());

        if self.version.has_extension() && mode.compressed {
            fields.push(self.extension_data());
        } else {
            fields.push(self.logs_bloom.as_bytes().to_vec());
        }

        fields.push(u256_to_minimal_bytes(self.difficulty));
        fields.push(u64_to_minimal_bytes(self.number));
        fields.push(self.gas_limit.to_vec());
        fields.push(u64_to_minimal_bytes(self.gas_used));
        fields.push(u64_to_minimal_bytes(self.timestamp));
        fields.push(self.extra_data.to_vec());
        fields.push(u256_to_minimal_bytes(self.paid_fees));
        fields.push(encode_signed_coin_non_null_zero(self.minimum_gas_price));
        fields.push(u64_to_minimal_bytes(self.uncle_count));

        if let Some(umm_root) = &self.umm_root {
            fields.push(umm_root.to_vec());
        }

        match self.version {
            HeaderVersion::V0 => {
                if let Some(edges) = &self.tx_execution_sublists_edges {
                    fields.push(encode_edges_as_rlp(edges)?);
                }
            }
            HeaderVersion::V1 if !mode.compressed => {
                fields.push(vec![self.version as u8]);
                if let Some(edges) = &self.tx_execution_sublists_edges {
                    fields.push(encode_edges_as_rlp(edges)?);
                }
            }
            // Folded into the extension data
            _ => {}
        }

        if mode.with_merged_mining && self.has_merged_mining_fields() {
            fields.push(self.bitcoin_merged_mining_header.to_vec());
            if mode.with_merkle_proof_and_coinbase {
                fields.push(self.bitcoin_merged_mining_merkle_proof.to_vec());
                fields.push(self.bitcoin_merged_mining_coinbase_transaction.to_vec());
            }
        }

        Ok(fields)
    }

    pub fn encode_with_mode(&self, mode: EncodingMode) -> Result<Vec<u8>, HeaderEncodeError> {
        Ok(encode_bytes_list(&self.encoded_fields(mode)?))
    }

    /// Encoding whose keccak is the block hash.
    pub fn encoded_for_hash(&self) -> Result<Vec<u8>, HeaderEncodeError> {
        self.encode_with_mode(EncodingMode::for_hash(self.use_rskip92_encoding))
    }

    pub fn full_encoded(&self) -> Result<Vec<u8>, HeaderEncodeError> {
        self.encode_with_mode(EncodingMode::FULL)
    }

    pub fn hash(&self) -> Result<H256, HeaderEncodeError> {
        Ok(keccak(self.encoded_for_hash()?))
    }

    /// `keccak(RLP([keccak(bloom), base_event?, edges?]))`. The base event is only part
    /// of V2 headers, where it is encoded as empty bytes when absent.
    pub fn extension_hash(&self) -> H256 {
        let mut content = vec![keccak(self.logs_bloom.as_bytes()).as_bytes().to_vec()];
        if self.version == HeaderVersion::V2 {
            content.push(self.base_event.as_ref().map(|e| e.to_vec()).unwrap_or_default());
        }
        if let Some(edges) = &self.tx_execution_sublists_edges {
            content.push(encode_edges_as_le_bytes(edges));
        }
        keccak(encode_bytes_list(&content))
    }

    /// `RLP([[version], extension_hash])`, the element that replaces the bloom in
    /// compressed encodings of V1 and V2 headers.
    pub fn extension_data(&self) -> Vec<u8> {
        encode_bytes_list(&[
            vec![self.version as u8],
            self.extension_hash().as_bytes().to_vec(),
        ])
    }

    pub fn has_merged_mining_fields(&self) -> bool {
        !self.bitcoin_merged_mining_header.is_empty()
            || !self.bitcoin_merged_mining_merkle_proof.is_empty()
            || !self.bitcoin_merged_mining_coinbase_transaction.is_empty()
    }
}

/// Computes the block hash of `input` under `config`.
pub fn compute_block_hash(
    input: &BlockHeaderInput,
    config: BlockHashConfig,
) -> Result<H256, HeaderEncodeError> {
    BlockHeader::from_input(input, config)?.hash()
}

/// Returns the header encoding hashed by [`compute_block_hash`].
pub fn encoded_block_header(
    input: &BlockHeaderInput,
    config: BlockHashConfig,
) -> Result<Vec<u8>, HeaderEncodeError> {
    BlockHeader::from_input(input, config)?.encoded_for_hash()
}

fn encode_gas_limit(gas_limit: u64, padded: bool) -> Result<Bytes, HeaderEncodeError> {
    if gas_limit == 0 {
        return Ok(Bytes::new());
    }
    if !padded {
        return Ok(Bytes::from(u64_to_minimal_bytes(gas_limit)));
    }
    let narrow =
        u32::try_from(gas_limit).map_err(|_| HeaderEncodeError::GasLimitOverflow(gas_limit))?;
    let bytes: [u8; GAS_LIMIT_WIDTH] = narrow.to_be_bytes();
    Ok(Bytes::copy_from_slice(&bytes))
}

/// The zero address is encoded as empty bytes.
fn encode_rsk_address(address: &Address) -> Vec<u8> {
    if address.is_zero() {
        Vec::new()
    } else {
        address.as_bytes().to_vec()
    }
}

/// Absent is empty bytes, zero is a single `0x00` byte.
fn encode_signed_coin_non_null_zero(value: Option<U256>) -> Vec<u8> {
    match value {
        None => Vec::new(),
        Some(value) if value.is_zero() => vec![0x00],
        Some(value) => u256_to_minimal_bytes(value),
    }
}

/// RLP list of the edges as unsigned integers, or empty bytes when there are none.
fn encode_edges_as_rlp(edges: &[i16]) -> Result<Vec<u8>, HeaderEncodeError> {
    if edges.is_empty() {
        return Ok(Vec::new());
    }
    let edges = edges
        .iter()
        .map(|edge| u64::try_from(*edge).map_err(|_| HeaderEncodeError::NegativeEdge(*edge)))
        .collect::<Result<Vec<u64>, _>>()?;
    Ok(edges.encode_to_vec())
}

/// Each edge as two little-endian bytes.
fn encode_edges_as_le_bytes(edges: &[i16]) -> Vec<u8> {
    edges.iter().flat_map(|edge| edge.to_le_bytes()).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use hex_literal::hex;
    use rsk_rlp::decode::RLPDecode;

    const BLOCK_1_HASH: H256 = H256(hex!(
        "fe10930e0ad3742e3fe1d7200c4d54573d58033cc03484137dc7ec5a761ecffe"
    ));

    const BLOCK_1_ENCODED: [u8; 346] = hex!(
        "f90157a08ea789fabef0dd4946ed53f001e7b6f8a8d0c22a612a6099fc7f93c990af68fea01dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d4934794ec4ddeb4380ad69b3e509baad9f158cdf4e4681da0f276a3a8c9c4eb4dcbbfb9bf6965f36dc611b815614c0d7cd06e15b8890c272ca08c9664a30670ddc67aa13992fdd8751b7b797bbe172506ffd5cda10ebbf97952a066cfdb731f620cd96e2c2cb0f7d3c3a2879c29b40014aa27efbbf3cf9cd3b0f6a3e201a0339bef53725a6ddba6dd20e727e3fe46866efc57a35164222577762e02d8c6ef010184009896808084696e7bb295d40192534e415053484f542d34366165353338653280008080b850711101000000000000000000000000000000000000000000000000000000000000000000f452061f4aea40ba9a9dca66ce43eaad20e9d59b4d19fa4415dd22d3de8c2ec3b27b6e69ffff7f2103000000"
    );

    const V1_CONFIG: BlockHashConfig = BlockHashConfig {
        use_rskip92_encoding: true,
        version: HeaderVersion::V1,
        include_umm_root: true,
        use_4_byte_gas_limit: true,
    };

    const V0_CONFIG: BlockHashConfig = BlockHashConfig {
        use_rskip92_encoding: true,
        version: HeaderVersion::V0,
        include_umm_root: false,
        use_4_byte_gas_limit: false,
    };

    fn block_1_input() -> BlockHeaderInput {
        BlockHeaderInput {
            parent_hash: H256(hex!(
                "8ea789fabef0dd4946ed53f001e7b6f8a8d0c22a612a6099fc7f93c990af68fe"
            )),
            uncles_hash: H256(hex!(
                "1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347"
            )),
            coinbase: ethereum_types::H160(hex!("ec4ddeb4380ad69b3e509baad9f158cdf4e4681d")),
            state_root: H256(hex!(
                "f276a3a8c9c4eb4dcbbfb9bf6965f36dc611b815614c0d7cd06e15b8890c272c"
            )),
            tx_trie_root: H256(hex!(
                "8c9664a30670ddc67aa13992fdd8751b7b797bbe172506ffd5cda10ebbf97952"
            )),
            receipt_trie_root: H256(hex!(
                "66cfdb731f620cd96e2c2cb0f7d3c3a2879c29b40014aa27efbbf3cf9cd3b0f6"
            )),
            logs_bloom: Bloom::zero(),
            difficulty: U256::one(),
            number: 1,
            gas_limit: 10_000_000,
            gas_used: 0,
            timestamp: 0x696e7bb2,
            extra_data: Bytes::copy_from_slice(&hex!(
                "d40192534e415053484f542d343661653533386532"
            )),
            paid_fees: U256::zero(),
            minimum_gas_price: Some(U256::zero()),
            uncle_count: 0,
            bitcoin_merged_mining_header: Bytes::copy_from_slice(&hex!(
                "711101000000000000000000000000000000000000000000000000000000000000000000f452061f4aea40ba9a9dca66ce43eaad20e9d59b4d19fa4415dd22d3de8c2ec3b27b6e69ffff7f2103000000"
            )),
            tx_execution_sublists_edges: Some(vec![]),
            ..Default::default()
        }
    }

    fn empty_header_input() -> BlockHeaderInput {
        BlockHeaderInput {
            uncles_hash: H256(hex!(
                "1dcc4de8dec75d7aab85b567b6ccd41ad312451b948a7413f0a142fd40d49347"
            )),
            difficulty: U256::one(),
            number: 1,
            gas_limit: 10_000_000,
            timestamp: 1_000_000,
            minimum_gas_price: Some(U256::zero()),
            tx_execution_sublists_edges: Some(vec![]),
            ..Default::default()
        }
    }

    fn decode_fields(encoded: &[u8]) -> Vec<Bytes> {
        Vec::<Bytes>::decode(encoded).unwrap()
    }

    #[test]
    fn block_1_encoding_matches_node() {
        let encoded = encoded_block_header(&block_1_input(), V1_CONFIG).unwrap();
        assert_eq!(encoded, BLOCK_1_ENCODED);
    }

    #[test]
    fn block_1_hash_matches_node() {
        assert_eq!(compute_block_hash(&block_1_input(), V1_CONFIG).unwrap(), BLOCK_1_HASH);
    }

    #[test]
    fn block_1_full_encoding_layout() {
        let header = BlockHeader::from_input(&block_1_input(), V1_CONFIG).unwrap();
        let fields = decode_fields(&header.full_encoded().unwrap());
        // 16 core fields, umm root, version, edges and three merged mining fields
        assert_eq!(fields.len(), 22);
        assert_eq!(fields[6].as_ref(), Bloom::zero().as_bytes());
        assert_eq!(fields[16], Bytes::new());
        assert_eq!(fields[17].as_ref(), &[0x01]);
        assert_eq!(fields[18], Bytes::new());
        assert_eq!(fields[19], header.bitcoin_merged_mining_header);
        assert!(fields[20].is_empty() && fields[21].is_empty());

        let hash_fields = decode_fields(&header.encoded_for_hash().unwrap());
        assert_eq!(hash_fields.len(), 18);
        assert_eq!(hash_fields[6].as_ref(), header.extension_data().as_slice());
    }

    #[test]
    fn extension_hash_v1() {
        let header = BlockHeader::from_input(&empty_header_input(), V1_CONFIG).unwrap();
        assert_eq!(
            header.extension_hash(),
            H256(hex!(
                "339bef53725a6ddba6dd20e727e3fe46866efc57a35164222577762e02d8c6ef"
            ))
        );
        let mut expected = hex!("e201a0").to_vec();
        expected.extend_from_slice(header.extension_hash().as_bytes());
        assert_eq!(header.extension_data(), expected);
    }

    #[test]
    fn extension_hash_v2() {
        let config = BlockHashConfig {
            version: HeaderVersion::V2,
            ..V1_CONFIG
        };
        let header = BlockHeader::from_input(&empty_header_input(), config).unwrap();
        assert_eq!(
            header.extension_hash(),
            H256(hex!(
                "9aca8469839f117b1a26abbdea244a32cb0833e387cf6af9dc13eb336094d3c2"
            ))
        );
        assert_eq!(header.extension_data()[1], 0x02);
    }

    #[test]
    fn base_event_is_kept_only_for_v2() {
        let input = BlockHeaderInput {
            base_event: Some(Bytes::from_static(&[0xaa, 0xbb])),
            ..empty_header_input()
        };
        let v1 = BlockHeader::from_input(&input, V1_CONFIG).unwrap();
        assert_eq!(v1.base_event, None);
        let v2_config = BlockHashConfig {
            version: HeaderVersion::V2,
            ..V1_CONFIG
        };
        let v2 = BlockHeader::from_input(&input, v2_config).unwrap();
        let v2_without_event =
            BlockHeader::from_input(&empty_header_input(), v2_config).unwrap();
        assert_ne!(v2.extension_hash(), v2_without_event.extension_hash());
    }

    #[test]
    fn minimum_gas_price_zero_is_zero_byte() {
        let header = BlockHeader::from_input(&empty_header_input(), V0_CONFIG).unwrap();
        let fields = header.encoded_fields(EncodingMode::FULL).unwrap();
        assert_eq!(fields[14], vec![0x00]);

        let input = BlockHeaderInput {
            minimum_gas_price: None,
            ..empty_header_input()
        };
        let header = BlockHeader::from_input(&input, V0_CONFIG).unwrap();
        let fields = header.encoded_fields(EncodingMode::FULL).unwrap();
        assert!(fields[14].is_empty());
    }

    #[test]
    fn zero_values_encode_as_empty() {
        let input = BlockHeaderInput {
            difficulty: U256::zero(),
            number: 0,
            gas_limit: 0,
            timestamp: 0,
            ..empty_header_input()
        };
        let header = BlockHeader::from_input(&input, V0_CONFIG).unwrap();
        let fields = header.encoded_fields(EncodingMode::FULL).unwrap();
        // coinbase, difficulty, number, gas limit, gas used, timestamp, paid fees, uncle count
        for index in [2, 7, 8, 9, 10, 11, 13, 15] {
            assert!(fields[index].is_empty(), "field {index} is not empty");
        }
    }

    #[test]
    fn gas_limit_width_depends_on_network() {
        let padded = BlockHeader::from_input(&empty_header_input(), V1_CONFIG).unwrap();
        assert_eq!(padded.gas_limit.as_ref(), &hex!("00989680"));
        let minimal = BlockHeader::from_input(&empty_header_input(), V0_CONFIG).unwrap();
        assert_eq!(minimal.gas_limit.as_ref(), &hex!("989680"));
    }

    #[test]
    fn padded_gas_limit_overflow() {
        let input = BlockHeaderInput {
            gas_limit: u64::from(u32::MAX) + 1,
            ..empty_header_input()
        };
        assert!(matches!(
            BlockHeader::from_input(&input, V1_CONFIG),
            Err(HeaderEncodeError::GasLimitOverflow(_))
        ));
        assert!(BlockHeader::from_input(&input, V0_CONFIG).is_ok());
    }

    #[test]
    fn missing_edges_default_to_empty_with_extension() {
        let without_edges = BlockHeaderInput {
            tx_execution_sublists_edges: None,
            ..empty_header_input()
        };
        assert_eq!(
            compute_block_hash(&without_edges, V1_CONFIG).unwrap(),
            compute_block_hash(&empty_header_input(), V1_CONFIG).unwrap()
        );
    }

    #[test]
    fn v0_edges_field_present_only_when_set() {
        let without_edges = BlockHeaderInput {
            tx_execution_sublists_edges: None,
            ..empty_header_input()
        };
        let absent = BlockHeader::from_input(&without_edges, V0_CONFIG).unwrap();
        let empty = BlockHeader::from_input(&empty_header_input(), V0_CONFIG).unwrap();
        let absent_fields = absent.encoded_fields(EncodingMode::FULL).unwrap();
        let empty_fields = empty.encoded_fields(EncodingMode::FULL).unwrap();
        assert_eq!(absent_fields.len() + 1, empty_fields.len());
        assert!(empty_fields[16].is_empty());
        assert_ne!(absent.hash().unwrap(), empty.hash().unwrap());
    }

    #[test]
    fn v0_edges_are_an_rlp_list() {
        let input = BlockHeaderInput {
            tx_execution_sublists_edges: Some(vec![0, 5, 300]),
            ..empty_header_input()
        };
        let header = BlockHeader::from_input(&input, V0_CONFIG).unwrap();
        let fields = header.encoded_fields(EncodingMode::FULL).unwrap();
        assert_eq!(fields[16], hex!("c5800582012c").to_vec());
    }

    #[test]
    fn negative_edges() {
        let input = BlockHeaderInput {
            tx_execution_sublists_edges: Some(vec![3, -1]),
            ..empty_header_input()
        };
        let v0 = BlockHeader::from_input(&input, V0_CONFIG).unwrap();
        assert!(matches!(v0.hash(), Err(HeaderEncodeError::NegativeEdge(-1))));
        // Extension edges are raw little-endian shorts
        let v1 = BlockHeader::from_input(&input, V1_CONFIG).unwrap();
        assert!(v1.hash().is_ok());
    }

    #[test]
    fn umm_root_rules() {
        let header = BlockHeader::from_input(&empty_header_input(), V1_CONFIG).unwrap();
        assert_eq!(header.umm_root, Some(Bytes::new()));

        let header = BlockHeader::from_input(&empty_header_input(), V0_CONFIG).unwrap();
        assert_eq!(header.umm_root, None);

        let with_root = BlockHeaderInput {
            umm_root: Some(Bytes::from_static(&[0x11; 20])),
            ..empty_header_input()
        };
        let header = BlockHeader::from_input(&with_root, V0_CONFIG).unwrap();
        assert_eq!(header.umm_root, with_root.umm_root);
    }

    #[test]
    fn merged_mining_proof_included_before_rskip92() {
        let input = BlockHeaderInput {
            bitcoin_merged_mining_header: Bytes::from_static(&[0x01; 80]),
            bitcoin_merged_mining_merkle_proof: Bytes::from_static(&[0x02; 32]),
            bitcoin_merged_mining_coinbase_transaction: Bytes::from_static(&[0x03; 64]),
            ..empty_header_input()
        };
        let pre_orchid = BlockHashConfig {
            use_rskip92_encoding: false,
            ..V0_CONFIG
        };
        let header = BlockHeader::from_input(&input, pre_orchid).unwrap();
        let fields = decode_fields(&header.encoded_for_hash().unwrap());
        assert_eq!(fields.last().unwrap().as_ref(), &[0x03; 64]);

        let header = BlockHeader::from_input(&input, V0_CONFIG).unwrap();
        let fields = decode_fields(&header.encoded_for_hash().unwrap());
        assert_eq!(fields.last().unwrap().as_ref(), &[0x01; 80]);
    }

    #[test]
    fn merged_mining_fields_skipped_when_empty() {
        let header = BlockHeader::from_input(&empty_header_input(), V0_CONFIG).unwrap();
        assert!(!header.has_merged_mining_fields());
        // 16 core fields and the empty edges
        assert_eq!(header.encoded_fields(EncodingMode::FULL).unwrap().len(), 17);
    }

    #[test]
    fn header_version_from_byte() {
        assert_eq!(HeaderVersion::try_from(1), Ok(HeaderVersion::V1));
        assert_eq!(HeaderVersion::try_from(3), Err(3));
        assert!(!HeaderVersion::V0.has_extension());
        assert!(HeaderVersion::V2.has_extension());
    }
}
