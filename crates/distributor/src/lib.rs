//! DropCraft Distributor
//!
//! Cumulative Merkle claim ledger for multi-round reward distributions.
//!
//! ## Distribution Flow
//!
//! 1. **Build**: Off-chain, `dropcraft-merkle` turns the eligibility list
//!    `(address, total_entitlement)` into a root plus one proof per address.
//! 2. **Set Root**: The administrator installs the root as the active round.
//!    Installing a new root never touches what has already been paid.
//! 3. **Claim**: An address submits `(amount, total_entitlement, proof)`.
//!    The proof is checked against the active root and the claim is paid
//!    only if `claimed_so_far + amount <= total_entitlement`.
//! 4. **Next Round**: A later root certifies a larger total; each address
//!    claims only the delta above what it already received.
//!
//! Token movement and administrator checks are collaborators behind the
//! `TokenLedger` and `Authorizer` traits.

mod auth;
mod distributor;
mod ledger;
mod round;
mod state;
mod token;
mod types;

pub use auth::{Authorizer, Owner};
pub use distributor::{Distributor, DistributorConfig};
pub use ledger::ClaimLedger;
pub use round::RoundController;
pub use state::{ActiveRound, DistributionState};
pub use token::{InMemoryTokenLedger, TokenLedger, TransferError};
pub use types::*;

use dropcraft_core::{Address, Amount};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DistributorError {
    #[error("Claim amount must be greater than zero")]
    ZeroAmount,

    #[error("Caller {caller} cannot claim on behalf of {address}")]
    Unauthorized { caller: Address, address: Address },

    #[error("No distribution root is active")]
    NoActiveRoot,

    #[error("Invalid Merkle proof")]
    InvalidProof,

    #[error(
        "Claim exceeds entitlement: already claimed {claimed}, requested {requested}, entitled to {entitlement}"
    )]
    ExceedsEntitlement {
        claimed: Amount,
        requested: Amount,
        entitlement: Amount,
    },

    #[error("Insufficient reserve: requested {requested}, available {available}")]
    InsufficientReserve { requested: Amount, available: Amount },

    #[error("Caller {0} is not an administrator")]
    NotAdministrator(Address),

    #[error("Reward token not configured")]
    TokenNotConfigured,

    #[error("Malformed proof: {0}")]
    MalformedProof(String),
}

pub type Result<T> = std::result::Result<T, DistributorError>;
