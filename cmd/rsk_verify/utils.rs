use std::{fs::File, io::BufReader, path::Path};

use eyre::{WrapErr, eyre};
use rsk_common::{Address, H256, utils::decode_hex};
use serde::de::DeserializeOwned;

/// Reads a JSON file holding either the bare value or a JSON-RPC response with the
/// value under `result`.
pub fn read_rpc_json_file<T: DeserializeOwned>(path: impl AsRef<Path>) -> eyre::Result<T> {
    let path = path.as_ref();
    let file = File::open(path).wrap_err_with(|| format!("Failed to open {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))
        .wrap_err_with(|| format!("Failed to parse {}", path.display()))?;
    from_rpc_value(value).wrap_err_with(|| format!("Unexpected content in {}", path.display()))
}

pub fn from_rpc_value<T: DeserializeOwned>(mut value: serde_json::Value) -> eyre::Result<T> {
    if let Some(error) = value.get("error").filter(|error| !error.is_null()) {
        return Err(eyre!("RPC error response: {error}"));
    }
    if let Some(result) = value.get_mut("result") {
        value = result.take();
    }
    Ok(serde_json::from_value(value)?)
}

pub fn parse_h256(s: &str) -> eyre::Result<H256> {
    let bytes = decode_hex(s)?;
    if bytes.len() != 32 {
        return Err(eyre!("Expected 32 bytes, got {}", bytes.len()));
    }
    Ok(H256::from_slice(&bytes))
}

pub fn parse_address(s: &str) -> eyre::Result<Address> {
    let bytes = decode_hex(s)?;
    if bytes.len() != 20 {
        return Err(eyre!("Expected 20 bytes, got {}", bytes.len()));
    }
    Ok(Address::from_slice(&bytes))
}
