//! Serde adapters that write digests as `0x`-prefixed hex strings.
//!
//! ```ignore
//! #[serde(with = "dropcraft_core::serde_hex")]
//! root: Hash,
//!
//! #[serde(default, with = "dropcraft_core::serde_hex::option")]
//! initial_root: Option<Hash>,
//! ```

use serde::{Deserialize, Deserializer, Serializer};

use crate::{hash_hex, parse_hash, Hash};

pub fn serialize<S: Serializer>(hash: &Hash, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&hash_hex(hash))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Hash, D::Error> {
    let s = String::deserialize(deserializer)?;
    parse_hash(&s).map_err(serde::de::Error::custom)
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(hash: &Option<Hash>, serializer: S) -> Result<S::Ok, S::Error> {
        match hash {
            Some(hash) => serializer.serialize_some(&hash_hex(hash)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Hash>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| parse_hash(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
