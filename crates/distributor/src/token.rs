//! Token transfer collaborator.
//!
//! The distributor never stores balances itself; it asks a `TokenLedger`
//! for the reserve balance and to move tokens. `InMemoryTokenLedger` is the
//! development implementation, with balances tracked per (token, holder).

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

use dropcraft_core::{Address, Amount};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    #[error("Insufficient balance: requested {requested}, available {available}")]
    InsufficientBalance { requested: Amount, available: Amount },

    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

pub trait TokenLedger: Send + Sync {
    /// Balance of `holder` in `token`
    fn balance_of(&self, token: &Address, holder: &Address) -> Amount;

    /// Move `amount` of `token` from `from` to `to`.
    fn transfer(
        &self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TransferError>;
}

#[derive(Debug, Default)]
pub struct InMemoryTokenLedger {
    /// (token, holder) → balance
    balances: RwLock<HashMap<(Address, Address), Amount>>,
}

impl InMemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `token` to `holder` out of thin air.
    pub fn mint(&self, token: &Address, holder: &Address, amount: Amount) {
        let mut balances = self.balances.write();
        let balance = balances.entry((*token, *holder)).or_insert(0);
        *balance = balance.saturating_add(amount);
        debug!("Minted {} of token {} to {}", amount, token.short(), holder.short());
    }
}

impl TokenLedger for InMemoryTokenLedger {
    fn balance_of(&self, token: &Address, holder: &Address) -> Amount {
        self.balances
            .read()
            .get(&(*token, *holder))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(
        &self,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        let mut balances = self.balances.write();

        let available = balances.get(&(*token, *from)).copied().unwrap_or(0);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                requested: amount,
                available,
            });
        }

        let recipient = balances.get(&(*token, *to)).copied().unwrap_or(0);
        let credited = recipient
            .checked_add(amount)
            .ok_or_else(|| TransferError::Rejected("recipient balance overflow".to_string()))?;

        balances.insert((*token, *from), available - amount);
        // Self-transfer: the recipient entry is the sender entry, restore it.
        if from == to {
            balances.insert((*token, *to), available);
        } else {
            balances.insert((*token, *to), credited);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(b: u8) -> Address {
        Address::new([b; 20])
    }

    #[test]
    fn test_mint_and_balance() {
        let ledger = InMemoryTokenLedger::new();
        ledger.mint(&addr(0xEE), &addr(1), 1_000);
        ledger.mint(&addr(0xEE), &addr(1), 500);

        assert_eq!(ledger.balance_of(&addr(0xEE), &addr(1)), 1_500);
        assert_eq!(ledger.balance_of(&addr(0xEF), &addr(1)), 0);
    }

    #[test]
    fn test_transfer() {
        let ledger = InMemoryTokenLedger::new();
        let token = addr(0xEE);
        ledger.mint(&token, &addr(1), 1_000);

        ledger.transfer(&token, &addr(1), &addr(2), 400).unwrap();
        assert_eq!(ledger.balance_of(&token, &addr(1)), 600);
        assert_eq!(ledger.balance_of(&token, &addr(2)), 400);
    }

    #[test]
    fn test_transfer_insufficient() {
        let ledger = InMemoryTokenLedger::new();
        let token = addr(0xEE);
        ledger.mint(&token, &addr(1), 100);

        let result = ledger.transfer(&token, &addr(1), &addr(2), 101);
        assert_eq!(
            result,
            Err(TransferError::InsufficientBalance {
                requested: 101,
                available: 100
            })
        );
        assert_eq!(ledger.balance_of(&token, &addr(1)), 100);
        assert_eq!(ledger.balance_of(&token, &addr(2)), 0);
    }

    #[test]
    fn test_self_transfer_keeps_balance() {
        let ledger = InMemoryTokenLedger::new();
        let token = addr(0xEE);
        ledger.mint(&token, &addr(1), 100);

        ledger.transfer(&token, &addr(1), &addr(1), 60).unwrap();
        assert_eq!(ledger.balance_of(&token, &addr(1)), 100);
    }
}
