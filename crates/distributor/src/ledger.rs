//! Cumulative claim ledger.
//!
//! Pays `amount` to an address when the active root certifies its
//! `total_entitlement` and the address has not yet received that much.
//! The claimed-to-date record is only advanced after the token transfer
//! succeeds, so a failed claim leaves no trace.

use std::sync::Arc;

use tracing::{debug, info, warn};

use dropcraft_core::{short_hex, Address, Amount};
use dropcraft_merkle::verify_leaf;

use crate::state::DistributionState;
use crate::token::TokenLedger;
use crate::types::{ClaimReceipt, ClaimRequest, DistributionEvent};
use crate::{DistributorError, Result};

pub struct ClaimLedger {
    tokens: Arc<dyn TokenLedger>,
    /// Address holding the distribution's token reserve
    reserve: Address,
}

impl ClaimLedger {
    pub fn new(tokens: Arc<dyn TokenLedger>, reserve: Address) -> Self {
        Self { tokens, reserve }
    }

    pub fn reserve(&self) -> Address {
        self.reserve
    }

    /// Reserve balance in `token`
    pub fn reserve_balance(&self, token: &Address) -> Amount {
        self.tokens.balance_of(token, &self.reserve)
    }

    /// Process a claim submitted by `caller`.
    ///
    /// Checks run in order: zero amount, caller identity, proof against the
    /// active root, cumulative cap, reserve balance. The active round stays
    /// read-locked until the claim commits, so a concurrent root change
    /// waits for it.
    pub fn claim(
        &self,
        state: &DistributionState,
        request: &ClaimRequest,
        caller: &Address,
    ) -> Result<ClaimReceipt> {
        if request.amount == 0 {
            return Err(DistributorError::ZeroAmount);
        }
        if *caller != request.address {
            return Err(DistributorError::Unauthorized {
                caller: *caller,
                address: request.address,
            });
        }

        let active = state.read_active();
        let root = active.root.ok_or(DistributorError::NoActiveRoot)?;

        if !verify_leaf(&root, &request.address, request.total_entitlement, &request.proof) {
            debug!(
                "Rejected proof for {} against root {}",
                request.address.short(),
                short_hex(&root)
            );
            return Err(DistributorError::InvalidProof);
        }

        let record = state.record(&request.address);
        let mut record = record.lock();

        let claimed = record.cumulative_claimed;
        let cumulative = claimed
            .checked_add(request.amount)
            .filter(|total| *total <= request.total_entitlement)
            .ok_or(DistributorError::ExceedsEntitlement {
                claimed,
                requested: request.amount,
                entitlement: request.total_entitlement,
            })?;

        let token = active.token.ok_or(DistributorError::TokenNotConfigured)?;
        let available = self.tokens.balance_of(&token, &self.reserve);
        if available < request.amount {
            return Err(DistributorError::InsufficientReserve {
                requested: request.amount,
                available,
            });
        }

        if let Err(e) = self
            .tokens
            .transfer(&token, &self.reserve, &request.address, request.amount)
        {
            warn!("Transfer to {} failed: {}", request.address.short(), e);
            return Err(DistributorError::InsufficientReserve {
                requested: request.amount,
                available,
            });
        }

        record.cumulative_claimed = cumulative;
        state.emit(DistributionEvent::RewardsClaimed {
            address: request.address,
            amount: request.amount,
            cumulative_claimed: cumulative,
            round: active.round,
        });

        info!(
            "Claimed {} for {} (total {} of {}) in round {}",
            request.amount,
            request.address.short(),
            cumulative,
            request.total_entitlement,
            active.round
        );

        Ok(ClaimReceipt {
            address: request.address,
            paid: request.amount,
            cumulative_claimed: cumulative,
            root,
            round: active.round,
        })
    }
}
