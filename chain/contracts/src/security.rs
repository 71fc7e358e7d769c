//! Privileged-identity guard
//!
//! The vault's withdraw path is restricted to the identity that constructed
//! it. The guard is set once and offers no way to hand the role over.

use custody_types::ids::Identity;
use tracing::warn;

use crate::errors::WithdrawError;

/// Holds the single identity allowed to run privileged operations.
#[derive(Debug, Clone)]
pub struct OwnerGuard {
    owner: Identity,
}

impl OwnerGuard {
    pub fn new(owner: Identity) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> &Identity {
        &self.owner
    }

    pub fn is_owner(&self, caller: &Identity) -> bool {
        *caller == self.owner
    }

    /// Refuse with `Unauthorized` unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: &Identity) -> Result<(), WithdrawError> {
        if !self.is_owner(caller) {
            warn!(caller = %caller, "Privileged call refused");
            return Err(WithdrawError::Unauthorized);
        }
        Ok(())
    }
}
