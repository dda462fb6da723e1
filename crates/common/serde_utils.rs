use serde::{Deserialize, Deserializer, Serializer, de::Error};

use crate::utils::decode_hex;

/// Quantities as returned by the RSK node: `0x` prefixed, minimal, and sometimes
/// `0x` alone for zero.
fn parse_quantity_digits(value: &str) -> &str {
    let digits = value.trim_start_matches("0x");
    if digits.is_empty() { "0" } else { digits }
}

pub mod u256 {
    use super::*;
    use ethereum_types::U256;

    pub mod hex_str {
        use super::*;

        pub fn deserialize<'de, D>(d: D) -> Result<U256, D::Error>
        where
            D: Deserializer<'de>,
        {
            let value = Option::<String>::deserialize(d)?.unwrap_or_default();
            U256::from_str_radix(parse_quantity_digits(&value), 16)
                .map_err(|_| D::Error::custom("Failed to deserialize u256 value"))
        }

        pub fn serialize<S>(value: &U256, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&format!("{value:#x}"))
        }
    }

    pub mod hex_str_opt {
        use serde::Serialize;

        use super::*;

        pub fn serialize<S>(value: &Option<U256>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            Option::<String>::serialize(&value.map(|v| format!("{v:#x}")), serializer)
        }

        pub fn deserialize<'de, D>(d: D) -> Result<Option<U256>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let value = Option::<String>::deserialize(d)?;
            match value {
                Some(s) if !s.is_empty() => U256::from_str_radix(parse_quantity_digits(&s), 16)
                    .map_err(|_| D::Error::custom("Failed to deserialize U256 value"))
                    .map(Some),
                _ => Ok(None),
            }
        }
    }
}

pub mod u64 {
    use super::*;

    pub mod hex_str {
        use super::*;

        pub fn deserialize<'de, D>(d: D) -> Result<u64, D::Error>
        where
            D: Deserializer<'de>,
        {
            let value = Option::<String>::deserialize(d)?.unwrap_or_default();
            u64::from_str_radix(parse_quantity_digits(&value), 16)
                .map_err(|_| D::Error::custom("Failed to deserialize u64 value"))
        }

        pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&format!("{value:#x}"))
        }
    }

    pub mod hex_str_opt {
        use serde::Serialize;

        use super::*;

        pub fn serialize<S>(value: &Option<u64>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            Option::<String>::serialize(&value.map(|v| format!("{v:#x}")), serializer)
        }

        pub fn deserialize<'de, D>(d: D) -> Result<Option<u64>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let value = Option::<String>::deserialize(d)?;
            match value {
                Some(s) if !s.is_empty() => u64::from_str_radix(parse_quantity_digits(&s), 16)
                    .map_err(|_| D::Error::custom("Failed to deserialize u64 value"))
                    .map(Some),
                _ => Ok(None),
            }
        }
    }
}

pub mod vec_u8 {
    use super::*;

    pub fn deserialize<'de, D>(d: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(d)?.unwrap_or_default();
        decode_hex(&value).map_err(|e| D::Error::custom(e.to_string()))
    }

    pub fn serialize<S>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(value)))
    }
}

/// Serializes to and deserializes from 0x prefixed hex string.
/// `null` deserializes to empty bytes.
pub mod bytes {
    use ::bytes::Bytes;

    use super::*;

    pub fn deserialize<'de, D>(d: D) -> Result<Bytes, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(d)?.unwrap_or_default();
        let bytes = decode_hex(&value).map_err(|e| D::Error::custom(e.to_string()))?;
        Ok(Bytes::from(bytes))
    }

    pub fn serialize<S>(value: &Bytes, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("0x{value:x}"))
    }

    /// Keeps `null` apart from `"0x"`: the first is `None`, the second empty bytes.
    pub mod opt {
        use serde::Serialize;

        use super::*;

        pub fn deserialize<'de, D>(d: D) -> Result<Option<Bytes>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(d)?
                .map(|value| {
                    decode_hex(&value)
                        .map(Bytes::from)
                        .map_err(|e| D::Error::custom(e.to_string()))
                })
                .transpose()
        }

        pub fn serialize<S>(value: &Option<Bytes>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            Option::<String>::serialize(&value.as_ref().map(|v| format!("0x{v:x}")), serializer)
        }
    }
}
