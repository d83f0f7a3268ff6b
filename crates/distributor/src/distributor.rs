//! Distributor facade
//!
//! Wires one `DistributionState` to its claim ledger and round controller.
//! Every entry point takes the caller's address explicitly; there is no
//! ambient sender.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use dropcraft_core::{Address, Amount, Hash};

use crate::auth::{Authorizer, Owner};
use crate::ledger::ClaimLedger;
use crate::round::RoundController;
use crate::state::DistributionState;
use crate::token::TokenLedger;
use crate::types::{ClaimReceipt, ClaimRequest, DistributionEvent, RootInstalled};
use crate::{DistributorError, Result};

/// Distributor configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributorConfig {
    /// Address holding the token reserve
    pub address: Address,
    /// Administrator allowed to rotate roots and withdraw the reserve
    pub admin: Address,
    /// Token paid out by claims
    #[serde(default)]
    pub token: Option<Address>,
    /// Root installed at construction, as round 1
    #[serde(default, with = "dropcraft_core::serde_hex::option")]
    pub initial_root: Option<Hash>,
}

impl DistributorConfig {
    pub fn new(address: Address, admin: Address) -> Self {
        Self {
            address,
            admin,
            ..Default::default()
        }
    }

    pub fn with_token(mut self, token: Address) -> Self {
        self.token = Some(token);
        self
    }

    pub fn with_root(mut self, root: Hash) -> Self {
        self.initial_root = Some(root);
        self
    }
}

pub struct Distributor {
    config: DistributorConfig,
    state: DistributionState,
    ledger: ClaimLedger,
    rounds: RoundController,
    tokens: Arc<dyn TokenLedger>,
}

impl Distributor {
    /// Create a distributor administered by `config.admin`.
    pub fn new(config: DistributorConfig, tokens: Arc<dyn TokenLedger>) -> Self {
        let owner = Owner(config.admin);
        Self::with_authorizer(config, tokens, Arc::new(owner))
    }

    /// Create a distributor with a custom administrator policy.
    pub fn with_authorizer(
        config: DistributorConfig,
        tokens: Arc<dyn TokenLedger>,
        authorizer: Arc<dyn Authorizer>,
    ) -> Self {
        info!(
            "Distributor {} created (admin {}, round {})",
            config.address.short(),
            config.admin.short(),
            u64::from(config.initial_root.is_some())
        );

        Self {
            state: DistributionState::with_round(config.initial_root, config.token),
            ledger: ClaimLedger::new(Arc::clone(&tokens), config.address),
            rounds: RoundController::new(authorizer),
            tokens,
            config,
        }
    }

    pub fn config(&self) -> &DistributorConfig {
        &self.config
    }

    pub fn state(&self) -> &DistributionState {
        &self.state
    }

    /// Pay out part of the caller's cumulative entitlement.
    pub fn claim(&self, request: &ClaimRequest, caller: &Address) -> Result<ClaimReceipt> {
        self.ledger.claim(&self.state, request, caller)
    }

    /// Rotate to a new root. Returns the installed root and its round.
    pub fn set_root(&self, root: Hash, caller: &Address) -> Result<RootInstalled> {
        self.rounds.set_root(&self.state, root, caller)
    }

    pub fn set_token(&self, token: Address, caller: &Address) -> Result<()> {
        self.rounds.set_token(&self.state, token, caller)
    }

    /// Move `amount` of the reserve to `to`. Administrator only.
    pub fn withdraw_reserve(&self, to: &Address, amount: Amount, caller: &Address) -> Result<()> {
        self.rounds.authorize(caller)?;
        if amount == 0 {
            return Err(DistributorError::ZeroAmount);
        }

        let token = self.state.token().ok_or(DistributorError::TokenNotConfigured)?;
        let available = self.tokens.balance_of(&token, &self.config.address);
        if available < amount {
            return Err(DistributorError::InsufficientReserve {
                requested: amount,
                available,
            });
        }

        self.tokens
            .transfer(&token, &self.config.address, to, amount)
            .map_err(|_| DistributorError::InsufficientReserve {
                requested: amount,
                available,
            })?;

        self.state
            .emit(DistributionEvent::ReserveWithdrawn { to: *to, amount });
        info!("Withdrew {} from reserve to {}", amount, to.short());
        Ok(())
    }

    pub fn current_root(&self) -> Option<Hash> {
        self.state.current_root()
    }

    pub fn round(&self) -> u64 {
        self.state.round()
    }

    pub fn token(&self) -> Option<Address> {
        self.state.token()
    }

    pub fn cumulative_claimed(&self, address: &Address) -> Amount {
        self.state.cumulative_claimed(address)
    }

    /// Reserve balance in the configured token (0 if none is configured)
    pub fn reserve_balance(&self) -> Amount {
        self.state
            .token()
            .map(|token| self.ledger.reserve_balance(&token))
            .unwrap_or(0)
    }

    pub fn drain_events(&self) -> Vec<DistributionEvent> {
        self.state.drain_events()
    }
}
