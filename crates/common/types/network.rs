use std::{convert::Infallible, fmt, str::FromStr};

use tracing::warn;

use super::block_header::{BlockHashConfig, HeaderVersion};

/// Orchid: merged mining proof and coinbase leave the block hash (RSKIP-92).
pub const MAINNET_ORCHID_HEIGHT: u64 = 729_000;
/// Papyrus 2.0.0: headers carry a UMM root.
pub const MAINNET_PAPYRUS200_HEIGHT: u64 = 2_392_700;
pub const TESTNET_PAPYRUS200_HEIGHT: u64 = 863_000;
/// Reed 8.1.0: V1 headers with extension data.
pub const TESTNET_REED810_HEIGHT: u64 = 7_139_600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Network {
    Mainnet,
    Testnet,
    #[default]
    Regtest,
}

impl Network {
    /// Header encoding rules in force at `block_number`.
    pub fn block_hash_config(self, block_number: u64) -> BlockHashConfig {
        match self {
            Network::Regtest => BlockHashConfig::default(),
            Network::Mainnet => BlockHashConfig {
                use_rskip92_encoding: block_number >= MAINNET_ORCHID_HEIGHT,
                version: HeaderVersion::V0,
                include_umm_root: block_number >= MAINNET_PAPYRUS200_HEIGHT,
                use_4_byte_gas_limit: false,
            },
            Network::Testnet => BlockHashConfig {
                use_rskip92_encoding: true,
                version: if block_number >= TESTNET_REED810_HEIGHT {
                    HeaderVersion::V1
                } else {
                    HeaderVersion::V0
                },
                include_umm_root: block_number >= TESTNET_PAPYRUS200_HEIGHT,
                use_4_byte_gas_limit: false,
            },
        }
    }
}

impl FromStr for Network {
    type Err = Infallible;

    /// Case-insensitive. Unknown names fall back to regtest.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "mainnet" => Network::Mainnet,
            "testnet" => Network::Testnet,
            "regtest" => Network::Regtest,
            other => {
                warn!(network = other, "Unknown network, using regtest rules");
                Network::Regtest
            }
        })
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
            Network::Regtest => write!(f, "regtest"),
        }
    }
}
