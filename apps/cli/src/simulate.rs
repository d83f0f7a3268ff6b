//! Multi-round simulation.
//!
//! Installs each distribution file as the next round of one in-memory
//! distributor and lets every listed address claim whatever its new total
//! leaves outstanding.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use dropcraft_core::{Address, Amount, Hash};
use dropcraft_distributor::{
    ClaimRequest, DistributionEvent, Distributor, DistributorConfig, InMemoryTokenLedger,
};
use dropcraft_merkle::ClaimIndex;

const DEFAULT_DISTRIBUTOR: Address = Address::new([0xD1; 20]);
const DEFAULT_ADMIN: Address = Address::new([0xAD; 20]);
const DEFAULT_TOKEN: Address = Address::new([0x70; 20]);

/// Load a distributor config, filling in a token when none is set.
pub fn load_config(path: Option<&Path>) -> Result<DistributorConfig> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => DistributorConfig::new(DEFAULT_DISTRIBUTOR, DEFAULT_ADMIN),
    };
    if config.token.is_none() {
        config.token = Some(DEFAULT_TOKEN);
    }
    Ok(config)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub round: u64,
    pub root: Hash,
    /// Addresses paid this round
    pub claimants: usize,
    /// Tokens paid this round
    pub paid: Amount,
    /// Addresses whose claim was rejected
    pub rejected: usize,
}

#[derive(Debug)]
pub struct SimulationReport {
    pub rounds: Vec<RoundSummary>,
    pub events: Vec<DistributionEvent>,
    pub reserve_remaining: Amount,
}

/// Run every round in order. `reserve` defaults to the largest round total.
pub fn run(
    config: DistributorConfig,
    rounds: &[ClaimIndex],
    reserve: Option<Amount>,
) -> Result<SimulationReport> {
    let token = config.token.unwrap_or(DEFAULT_TOKEN);
    let admin = config.admin;
    let reserve = reserve.unwrap_or_else(|| rounds.iter().map(ClaimIndex::total).max().unwrap_or(0));

    let tokens = Arc::new(InMemoryTokenLedger::new());
    tokens.mint(&token, &config.address, reserve);
    let distributor = Distributor::new(config.with_token(token), tokens);

    let mut summaries = Vec::with_capacity(rounds.len());
    for index in rounds {
        let installed = distributor
            .set_root(index.root(), &admin)
            .context("Failed to install root")?;
        let round = installed.round;

        let mut summary = RoundSummary {
            round,
            root: installed.root,
            claimants: 0,
            paid: 0,
            rejected: 0,
        };

        for (leaf, proof) in index.entries() {
            let outstanding = leaf
                .entitlement
                .saturating_sub(distributor.cumulative_claimed(&leaf.address));
            if outstanding == 0 {
                continue;
            }

            let request = ClaimRequest::new(leaf.address, outstanding, leaf.entitlement, proof.clone());
            match distributor.claim(&request, &leaf.address) {
                Ok(receipt) => {
                    summary.claimants += 1;
                    summary.paid += receipt.paid;
                }
                Err(e) => {
                    warn!("Round {}: claim for {} rejected: {}", round, leaf.address.short(), e);
                    summary.rejected += 1;
                }
            }
        }

        info!(
            "Round {} paid {} to {} addresses ({} rejected)",
            round, summary.paid, summary.claimants, summary.rejected
        );
        summaries.push(summary);
    }

    Ok(SimulationReport {
        rounds: summaries,
        events: distributor.drain_events(),
        reserve_remaining: distributor.reserve_balance(),
    })
}
