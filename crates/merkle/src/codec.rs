//! Canonical leaf encoding.
//!
//! Layout (version 1, 53 bytes):
//!
//! ```text
//! 0x01 | address (20 bytes) | entitlement (32 bytes, big-endian)
//! ```
//!
//! Every field is fixed width, so two different `(address, entitlement)`
//! pairs can never share an encoding. The entitlement is written as a
//! 256-bit big-endian word with the `u128` value in the low 16 bytes.
//!
//! Leaf hash: `Keccak256(encoding)`.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

use dropcraft_core::{parse_amount, Address, Amount, Hash, ADDRESS_LEN};

use crate::{MerkleError, Result};

/// Encoding version byte
pub const LEAF_VERSION: u8 = 1;

/// Width of the entitlement field in bytes
const AMOUNT_FIELD_LEN: usize = 32;

/// Total encoded leaf length
pub const LEAF_ENCODED_LEN: usize = 1 + ADDRESS_LEN + AMOUNT_FIELD_LEN;

/// One address's certified total entitlement for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Leaf {
    pub address: Address,
    pub entitlement: Amount,
}

impl Leaf {
    pub fn new(address: Address, entitlement: Amount) -> Self {
        Self { address, entitlement }
    }

    /// Parse a leaf from its textual parts (hex address, decimal or `0x` amount).
    pub fn parse(address: &str, entitlement: &str) -> Result<Self> {
        let address: Address = address.parse()?;
        let entitlement = parse_amount(entitlement)?;
        Ok(Self { address, entitlement })
    }

    pub fn encode(&self) -> [u8; LEAF_ENCODED_LEN] {
        encode_fields(self.address.as_bytes(), self.entitlement)
    }

    pub fn hash(&self) -> Hash {
        keccak256(&self.encode())
    }
}

/// Encode a raw `(address, entitlement)` pair.
///
/// Fails with `InvalidAddress` if `address` is not exactly 20 bytes.
pub fn encode_leaf(address: &[u8], entitlement: Amount) -> Result<[u8; LEAF_ENCODED_LEN]> {
    let address: &[u8; ADDRESS_LEN] = address.try_into().map_err(|_| {
        MerkleError::InvalidAddress(format!(
            "expected {} bytes, got {}",
            ADDRESS_LEN,
            address.len()
        ))
    })?;
    Ok(encode_fields(address, entitlement))
}

/// Leaf hash for an `(address, entitlement)` pair.
pub fn leaf_hash(address: &Address, entitlement: Amount) -> Hash {
    keccak256(&encode_fields(address.as_bytes(), entitlement))
}

pub fn keccak256(bytes: &[u8]) -> Hash {
    Keccak256::digest(bytes).into()
}

fn encode_fields(address: &[u8; ADDRESS_LEN], entitlement: Amount) -> [u8; LEAF_ENCODED_LEN] {
    let mut out = [0u8; LEAF_ENCODED_LEN];
    out[0] = LEAF_VERSION;
    out[1..1 + ADDRESS_LEN].copy_from_slice(address);
    // High 16 bytes of the 32-byte amount word stay zero.
    out[LEAF_ENCODED_LEN - 16..].copy_from_slice(&entitlement.to_be_bytes());
    out
}
