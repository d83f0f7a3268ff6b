//! Round controller: administrator-only root and token changes.

use std::sync::Arc;

use tracing::{info, warn};

use dropcraft_core::{short_hex, Address, Hash};

use crate::auth::Authorizer;
use crate::state::DistributionState;
use crate::types::{DistributionEvent, RootInstalled};
use crate::{DistributorError, Result};

pub struct RoundController {
    authorizer: Arc<dyn Authorizer>,
}

impl RoundController {
    pub fn new(authorizer: Arc<dyn Authorizer>) -> Self {
        Self { authorizer }
    }

    /// Fail with `NotAdministrator` unless `caller` may administer.
    pub fn authorize(&self, caller: &Address) -> Result<()> {
        if self.authorizer.is_administrator(caller) {
            Ok(())
        } else {
            warn!("Rejected administrative call from {}", caller.short());
            Err(DistributorError::NotAdministrator(*caller))
        }
    }

    /// Install `root` as the active round.
    ///
    /// Takes effect for every claim that starts afterwards; claims already
    /// in flight finish against the previous root first. Claim records are
    /// untouched. Returns the installed root with its round number.
    pub fn set_root(
        &self,
        state: &DistributionState,
        root: Hash,
        caller: &Address,
    ) -> Result<RootInstalled> {
        self.authorize(caller)?;

        let mut active = state.write_active();
        let previous = active.root.replace(root);
        active.round += 1;
        let round = active.round;

        state.emit(DistributionEvent::RootUpdated { previous, root, round });
        drop(active);

        info!(
            "Round {} root {} installed (previous {})",
            round,
            short_hex(&root),
            previous.map(|p| short_hex(&p)).unwrap_or_else(|| "none".to_string())
        );
        Ok(RootInstalled { root, previous, round })
    }

    /// Configure the token the reserve pays out in.
    pub fn set_token(&self, state: &DistributionState, token: Address, caller: &Address) -> Result<()> {
        self.authorize(caller)?;

        let mut active = state.write_active();
        let previous = active.token.replace(token);
        state.emit(DistributionEvent::TokenUpdated { previous, token });
        drop(active);

        info!("Reward token set to {}", token);
        Ok(())
    }
}
