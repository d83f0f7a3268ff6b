//! Administrator checks for root and configuration changes.

use dropcraft_core::Address;

pub trait Authorizer: Send + Sync {
    fn is_administrator(&self, caller: &Address) -> bool;
}

/// Single-owner authorization: only the owner address is an administrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub Address);

impl Authorizer for Owner {
    fn is_administrator(&self, caller: &Address) -> bool {
        *caller == self.0
    }
}
