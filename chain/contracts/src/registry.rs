//! Authorization Registry: single-use token consumption
//!
//! Remembers every authorization token ever consumed. `consume` checks and
//! marks in one step; a token that made it into the set never leaves it
//! except through the rollback of the very operation that put it there.
//!
//! The registry is shared by reference: vaults hold a clone of the
//! `SharedRegistry` handle and lock it for the duration of a withdrawal.

use custody_types::ids::AuthorizationToken;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::audit::{AuditLog, Checkpoint};
use crate::errors::RegistryError;
use crate::events::{AuthorizationUsed, ContractEvent};

/// Handle through which vaults reach a registry they do not own.
pub type SharedRegistry = Arc<Mutex<AuthorizationRegistry>>;

/// Proof of a consumption that has not yet been committed by the caller's
/// atomic unit. Passing it back to `revert` undoes exactly that consumption.
#[derive(Debug)]
#[must_use = "a staged consumption must be committed or reverted"]
pub(crate) struct ConsumeReceipt {
    token: AuthorizationToken,
    checkpoint: Checkpoint,
}

/// Set of consumed authorization tokens plus its audit trail.
#[derive(Debug, Default)]
pub struct AuthorizationRegistry {
    consumed: HashSet<AuthorizationToken>,
    log: AuditLog,
}

impl AuthorizationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry behind a shareable handle.
    pub fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Consume `token`, or fail with `AlreadyUsed` if it was consumed before.
    ///
    /// On failure nothing changes and no event is emitted.
    pub fn consume(&mut self, token: AuthorizationToken) -> Result<ContractEvent, RegistryError> {
        let (event, _committed) = self.stage_consume(token)?;
        Ok(event)
    }

    /// Consume `token` and hand back a receipt so the caller can undo it if a
    /// later step of the same atomic unit fails.
    pub(crate) fn stage_consume(
        &mut self,
        token: AuthorizationToken,
    ) -> Result<(ContractEvent, ConsumeReceipt), RegistryError> {
        let checkpoint = self.log.checkpoint();

        if !self.consumed.insert(token) {
            warn!(token = %token, "Authorization replay refused");
            return Err(RegistryError::AlreadyUsed { token });
        }

        let event = ContractEvent::AuthorizationUsed(AuthorizationUsed { token });
        self.log.append(event.clone());
        info!(token = %token, consumed = self.consumed.len(), "Authorization consumed");

        Ok((event, ConsumeReceipt { token, checkpoint }))
    }

    /// Undo a staged consumption. Only reachable from inside the atomic unit
    /// that produced the receipt.
    pub(crate) fn revert(&mut self, receipt: ConsumeReceipt) {
        self.consumed.remove(&receipt.token);
        self.log.rollback(receipt.checkpoint);
        warn!(token = %receipt.token, "Authorization consumption rolled back");
    }

    /// Whether `token` has been consumed.
    pub fn is_consumed(&self, token: &AuthorizationToken) -> bool {
        self.consumed.contains(token)
    }

    /// Number of consumed tokens.
    pub fn consumed_count(&self) -> usize {
        self.consumed.len()
    }

    /// Events emitted so far, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &ContractEvent> + '_ {
        self.log.events()
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.log
    }
}
