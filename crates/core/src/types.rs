use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Result, TypeError};

/// Width of an account address in bytes
pub const ADDRESS_LEN: usize = 20;

/// Width of a digest in bytes
pub const HASH_LEN: usize = 32;

/// 32-byte digest (leaf hashes, internal nodes, roots)
pub type Hash = [u8; HASH_LEN];

/// Token amount. Entitlements and claimed totals are unsigned 128-bit.
pub type Amount = u128;

/// A fixed-width 20-byte account address.
///
/// The canonical text form is `0x` followed by 40 lowercase hex characters.
/// Parsing accepts the prefix as optional and hex in either case; anything
/// of a different width is rejected.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Build an address from a raw byte slice, rejecting any other width.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; ADDRESS_LEN] = bytes.try_into().map_err(|_| {
            TypeError::InvalidAddress(format!(
                "expected {} bytes, got {}",
                ADDRESS_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// First four bytes as hex, for log lines
    pub fn short(&self) -> String {
        short_hex(&self.0)
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self> {
        let cleaned = strip_hex_prefix(s.trim());
        if cleaned.len() != ADDRESS_LEN * 2 {
            return Err(TypeError::InvalidAddress(format!(
                "expected {} hex chars, got {}",
                ADDRESS_LEN * 2,
                cleaned.len()
            )));
        }
        let mut bytes = [0u8; ADDRESS_LEN];
        hex::decode_to_slice(cleaned, &mut bytes)
            .map_err(|e| TypeError::InvalidAddress(format!("{}: {}", s.trim(), e)))?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for Address {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

/// Parse a 32-byte digest from hex, with or without `0x`.
pub fn parse_hash(s: &str) -> Result<Hash> {
    let cleaned = strip_hex_prefix(s.trim());
    if cleaned.len() != HASH_LEN * 2 {
        return Err(TypeError::InvalidHash(format!(
            "expected {} hex chars, got {}",
            HASH_LEN * 2,
            cleaned.len()
        )));
    }
    let mut hash = [0u8; HASH_LEN];
    hex::decode_to_slice(cleaned, &mut hash)
        .map_err(|e| TypeError::InvalidHash(format!("{}: {}", s.trim(), e)))?;
    Ok(hash)
}

/// Encode a digest as `0x`-prefixed lowercase hex.
pub fn hash_hex(hash: &Hash) -> String {
    format!("0x{}", hex::encode(hash))
}

/// Parse an amount written in decimal, or in hex with a `0x` prefix.
///
/// Values wider than 128 bits fail with `AmountOverflow`; anything that is
/// not a non-negative integer fails with `InvalidAmount`.
pub fn parse_amount(s: &str) -> Result<Amount> {
    let trimmed = s.trim();
    let (digits, radix) = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex_digits) => (hex_digits, 16),
        None => (trimmed, 10),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(TypeError::InvalidAmount(trimmed.to_string()));
    }

    // Every remaining failure is a width problem: the digits were validated above.
    u128::from_str_radix(digits, radix).map_err(|_| TypeError::AmountOverflow(trimmed.to_string()))
}

/// First four bytes of a buffer as hex.
pub fn short_hex(bytes: &[u8]) -> String {
    hex::encode(&bytes[..bytes.len().min(4)])
}

fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}
