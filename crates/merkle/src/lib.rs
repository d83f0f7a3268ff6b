//! DropCraft Merkle
//!
//! Leaf codec, binary Merkle tree, and distribution artifacts.
//!
//! The `MerkleTree` is built offline from an eligibility list to produce
//! a root and one proof per address. The same `hash_pair` and leaf codec
//! are used by the distributor to verify claims against the active root,
//! so a proof produced here verifies there byte for byte.

pub mod codec;
pub mod distribution;
pub mod merkle;

pub use codec::{encode_leaf, keccak256, leaf_hash, Leaf, LEAF_ENCODED_LEN, LEAF_VERSION};
pub use distribution::{uniform_leaves, ClaimEntry, ClaimIndex, Distribution, DistributionFile};
pub use merkle::{hash_pair, verify_hex, verify_leaf, MerkleProof, MerkleTree};

use dropcraft_core::{Address, TypeError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MerkleError {
    #[error("Empty distribution: at least one leaf is required")]
    EmptyDistribution,

    #[error("Duplicate address in leaf set: {0}")]
    DuplicateAddress(Address),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount overflow: {0}")]
    AmountOverflow(String),

    #[error("Malformed proof: {0}")]
    MalformedProof(String),

    #[error("Address not found in distribution: {0}")]
    UnknownAddress(Address),

    #[error("Inconsistent distribution: {0}")]
    Inconsistent(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<TypeError> for MerkleError {
    fn from(e: TypeError) -> Self {
        match e {
            TypeError::InvalidAddress(msg) => Self::InvalidAddress(msg),
            TypeError::InvalidHash(msg) => Self::MalformedProof(msg),
            TypeError::InvalidAmount(msg) => Self::InvalidAmount(msg),
            TypeError::AmountOverflow(msg) => Self::AmountOverflow(msg),
        }
    }
}

pub type Result<T> = std::result::Result<T, MerkleError>;
