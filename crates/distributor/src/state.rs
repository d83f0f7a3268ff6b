//! Distribution state aggregate.
//!
//! One `DistributionState` per distribution: the active round plus every
//! address's claimed-to-date. Nothing here is global, so independent
//! distributions can live side by side.
//!
//! Locking: the active round sits behind a `RwLock`. Claims hold the read
//! side for their whole duration and root changes take the write side, so
//! a claim sees exactly one root. Each address's record has its own
//! `Mutex`; claims for different addresses never contend on it.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dropcraft_core::{Address, Amount, Hash};

use crate::types::{ClaimRecord, DistributionEvent};

/// The currently installed round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActiveRound {
    /// Active Merkle root (None until the first root is installed)
    pub root: Option<Hash>,
    /// Number of roots installed so far
    pub round: u64,
    /// Token backing the distribution
    pub token: Option<Address>,
}

#[derive(Debug, Default)]
pub struct DistributionState {
    active: RwLock<ActiveRound>,
    records: RwLock<HashMap<Address, Arc<Mutex<ClaimRecord>>>>,
    events: Mutex<Vec<DistributionEvent>>,
}

impl DistributionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State created with an initial root (round 1) and/or token.
    pub fn with_round(root: Option<Hash>, token: Option<Address>) -> Self {
        let active = ActiveRound {
            root,
            round: u64::from(root.is_some()),
            token,
        };
        Self {
            active: RwLock::new(active),
            ..Default::default()
        }
    }

    /// Snapshot of the active round
    pub fn active(&self) -> ActiveRound {
        *self.active.read()
    }

    pub fn current_root(&self) -> Option<Hash> {
        self.active.read().root
    }

    pub fn round(&self) -> u64 {
        self.active.read().round
    }

    pub fn token(&self) -> Option<Address> {
        self.active.read().token
    }

    /// Claimed-to-date for an address (0 if it never claimed)
    pub fn cumulative_claimed(&self, address: &Address) -> Amount {
        self.records
            .read()
            .get(address)
            .map(|record| record.lock().cumulative_claimed)
            .unwrap_or(0)
    }

    /// Number of addresses that have received anything
    pub fn claimant_count(&self) -> usize {
        self.records
            .read()
            .values()
            .filter(|record| record.lock().cumulative_claimed > 0)
            .count()
    }

    /// Sum of everything paid out across all rounds
    pub fn total_claimed(&self) -> Amount {
        self.records
            .read()
            .values()
            .map(|record| record.lock().cumulative_claimed)
            .fold(0, Amount::saturating_add)
    }

    /// Take all events recorded since the last drain.
    pub fn drain_events(&self) -> Vec<DistributionEvent> {
        std::mem::take(&mut *self.events.lock())
    }

    pub(crate) fn read_active(&self) -> RwLockReadGuard<'_, ActiveRound> {
        self.active.read()
    }

    pub(crate) fn write_active(&self) -> RwLockWriteGuard<'_, ActiveRound> {
        self.active.write()
    }

    /// Record handle for an address, created on first use.
    pub(crate) fn record(&self, address: &Address) -> Arc<Mutex<ClaimRecord>> {
        if let Some(record) = self.records.read().get(address) {
            return Arc::clone(record);
        }
        Arc::clone(self.records.write().entry(*address).or_default())
    }

    pub(crate) fn emit(&self, event: DistributionEvent) {
        self.events.lock().push(event);
    }
}
