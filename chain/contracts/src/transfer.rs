//! Value transfer seam
//!
//! The last step of a withdrawal hands value to the recipient. Whatever
//! moves the value implements `ValueTransfer`; a refusal makes the vault
//! roll the whole withdrawal back. `Ledger` is the in-memory backend: it
//! credits recipients and can be told to refuse specific ones.

use custody_types::ids::Identity;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::errors::TransferError;

/// Moves released value to a recipient.
pub trait ValueTransfer {
    /// Deliver `amount` to `recipient`. An `Err` means nothing was delivered.
    fn transfer(&mut self, recipient: &Identity, amount: Decimal) -> Result<(), TransferError>;
}

/// In-memory recipient ledger.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    credits: HashMap<Identity, Decimal>,
    rejecting: HashSet<Identity>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `recipient` refuse incoming value.
    pub fn reject(&mut self, recipient: Identity) {
        self.rejecting.insert(recipient);
    }

    /// Let a previously rejecting recipient accept value again.
    pub fn accept(&mut self, recipient: &Identity) {
        self.rejecting.remove(recipient);
    }

    pub fn is_rejecting(&self, recipient: &Identity) -> bool {
        self.rejecting.contains(recipient)
    }

    /// Value received so far by `recipient`.
    pub fn balance_of(&self, recipient: &Identity) -> Decimal {
        self.credits
            .get(recipient)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Sum of everything delivered to all recipients.
    pub fn total_credited(&self) -> Decimal {
        self.credits.values().copied().sum()
    }
}

impl ValueTransfer for Ledger {
    fn transfer(&mut self, recipient: &Identity, amount: Decimal) -> Result<(), TransferError> {
        if self.rejecting.contains(recipient) {
            return Err(TransferError::Rejected {
                recipient: recipient.to_string(),
            });
        }

        let current = self.credits.entry(recipient.clone()).or_insert(Decimal::ZERO);
        *current = current
            .checked_add(amount)
            .ok_or(TransferError::Overflow)?;

        debug!(recipient = %recipient, amount = %amount, "Ledger credited");
        Ok(())
    }
}
