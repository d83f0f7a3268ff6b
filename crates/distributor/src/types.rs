//! Claim and event types

use std::fmt;

use dropcraft_core::{parse_amount, short_hex, Address, Amount, Hash};
use dropcraft_merkle::MerkleProof;

use crate::{DistributorError, Result};

/// Claim a slice of an address's cumulative entitlement.
///
/// `total_entitlement` is what the active root certifies for `address`;
/// `amount` is the new tokens requested on top of what was already paid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimRequest {
    pub address: Address,
    pub amount: Amount,
    pub total_entitlement: Amount,
    pub proof: MerkleProof,
}

impl ClaimRequest {
    pub fn new(address: Address, amount: Amount, total_entitlement: Amount, proof: MerkleProof) -> Self {
        Self {
            address,
            amount,
            total_entitlement,
            proof,
        }
    }

    /// Build a request from submitted text. Any field that does not parse
    /// fails with `MalformedProof`.
    pub fn parse<S: AsRef<str>>(
        address: &str,
        amount: &str,
        total_entitlement: &str,
        proof: &[S],
    ) -> Result<Self> {
        let address: Address = address.parse().map_err(malformed)?;
        let amount = parse_amount(amount).map_err(malformed)?;
        let total_entitlement = parse_amount(total_entitlement).map_err(malformed)?;
        let proof = MerkleProof::from_hex(proof).map_err(malformed)?;

        Ok(Self {
            address,
            amount,
            total_entitlement,
            proof,
        })
    }
}

fn malformed<E: fmt::Display>(e: E) -> DistributorError {
    DistributorError::MalformedProof(e.to_string())
}

/// Result of a successful claim
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimReceipt {
    pub address: Address,
    /// Tokens transferred by this claim
    pub paid: Amount,
    /// Claimed-to-date after this claim
    pub cumulative_claimed: Amount,
    /// Root the claim was verified against
    pub root: Hash,
    pub round: u64,
}

/// Confirmation of a root change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RootInstalled {
    /// The root now active
    pub root: Hash,
    /// Root it replaced, if any
    pub previous: Option<Hash>,
    /// Round number of the new root
    pub round: u64,
}

/// Per-address claimed-to-date. Never reset by a root rotation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClaimRecord {
    pub cumulative_claimed: Amount,
}

/// Committed state changes, in commit order, for external indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DistributionEvent {
    RootUpdated {
        previous: Option<Hash>,
        root: Hash,
        round: u64,
    },
    TokenUpdated {
        previous: Option<Address>,
        token: Address,
    },
    RewardsClaimed {
        address: Address,
        amount: Amount,
        cumulative_claimed: Amount,
        round: u64,
    },
    ReserveWithdrawn {
        to: Address,
        amount: Amount,
    },
}

impl fmt::Display for DistributionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootUpdated { previous, root, round } => write!(
                f,
                "root updated: round {} root {} (previous {})",
                round,
                short_hex(root),
                previous.map(|p| short_hex(&p)).unwrap_or_else(|| "none".to_string()),
            ),
            Self::TokenUpdated { previous, token } => write!(
                f,
                "token updated: {} (previous {})",
                token,
                previous.map(|p| p.to_string()).unwrap_or_else(|| "none".to_string()),
            ),
            Self::RewardsClaimed {
                address,
                amount,
                cumulative_claimed,
                round,
            } => write!(
                f,
                "rewards claimed: {} received {} (total {}) in round {}",
                address, amount, cumulative_claimed, round
            ),
            Self::ReserveWithdrawn { to, amount } => {
                write!(f, "reserve withdrawn: {} to {}", amount, to)
            }
        }
    }
}
