//! DropCraft Core
//!
//! Primitive types shared by every DropCraft crate: fixed-width account
//! addresses, 32-byte digests, reward amounts, and the hex helpers used to
//! move them in and out of distribution files.

pub mod serde_hex;
mod types;

pub use types::*;

use thiserror::Error;

/// Errors raised while parsing textual primitives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Amount overflow: {0} does not fit in 128 bits")]
    AmountOverflow(String),
}

pub type Result<T> = std::result::Result<T, TypeError>;
