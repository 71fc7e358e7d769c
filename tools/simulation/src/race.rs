//! Concurrent replay race
//!
//! Many threads present the same authorization to one vault at once. The
//! vault sits behind a lock, so calls serialize; exactly one must win and
//! every other attempt must see `AlreadyUsed`.

use custody_contracts::errors::VaultError;
use custody_contracts::registry::AuthorizationRegistry;
use custody_contracts::vault::SecureVault;
use custody_types::ids::{AuthorizationToken, Identity};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Barrier};
use std::thread;
use tracing::info;

use crate::scenario::Outcome;

/// Reasons a race cannot be set up.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RaceError {
    #[error("funding {threads} withdrawals of {amount} overflows the vault balance")]
    FundingOverflow { threads: usize, amount: Decimal },

    #[error("funding deposit rejected: {0}")]
    Funding(#[from] VaultError),
}

/// Tally of a replay race.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceReport {
    pub threads: usize,
    pub winners: usize,
    pub already_used: usize,
    pub other_failures: usize,
    pub final_balance: Decimal,
}

impl RaceReport {
    /// Exactly one winner and every loser rejected as a replay.
    pub fn exactly_once(&self) -> bool {
        self.winners == 1 && self.already_used == self.threads.saturating_sub(1) && self.other_failures == 0
    }
}

/// Race `threads` withdrawals of `amount` that all present `H(authorization)`
/// against a vault funded with `threads * amount`.
pub fn replay_race(
    threads: usize,
    authorization: &str,
    amount: Decimal,
) -> Result<RaceReport, RaceError> {
    let owner = Identity::new("owner");
    let depositor = Identity::new("depositor");
    let recipient = Identity::new("recipient");
    let token = AuthorizationToken::digest(authorization);

    let mut vault = SecureVault::new(owner.clone(), AuthorizationRegistry::shared());
    let funding = amount
        .checked_mul(Decimal::from(threads.max(1) as u64))
        .ok_or(RaceError::FundingOverflow { threads, amount })?;
    vault.deposit(&depositor, funding)?;

    let vault = Arc::new(Mutex::new(vault));
    let barrier = Arc::new(Barrier::new(threads.max(1)));

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let vault = Arc::clone(&vault);
            let barrier = Arc::clone(&barrier);
            let owner = owner.clone();
            let recipient = recipient.clone();
            thread::spawn(move || {
                barrier.wait();
                let mut vault = vault.lock();
                let result = vault.withdraw(&owner, token, &recipient, amount);
                Outcome::from_withdraw(&result.map(|_| ()))
            })
        })
        .collect();

    let mut report = RaceReport {
        threads,
        winners: 0,
        already_used: 0,
        other_failures: 0,
        final_balance: Decimal::ZERO,
    };

    for handle in handles {
        match handle.join() {
            Ok(Outcome::Ok) => report.winners += 1,
            Ok(Outcome::AlreadyUsed) => report.already_used += 1,
            _ => report.other_failures += 1,
        }
    }
    report.final_balance = vault.lock().balance();

    info!(
        threads,
        funding = %funding,
        winners = report.winners,
        already_used = report.already_used,
        "Replay race finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_race_single_winner() {
        let report = replay_race(12, "race", Decimal::ONE).unwrap();
        assert!(report.exactly_once(), "{:?}", report);
        assert_eq!(report.final_balance, Decimal::from(11));
    }

    #[test]
    fn test_race_single_thread() {
        let report = replay_race(1, "solo", Decimal::ONE).unwrap();
        assert!(report.exactly_once());
        assert_eq!(report.final_balance, Decimal::ZERO);
    }

    #[test]
    fn test_race_funding_overflow_is_an_error() {
        let result = replay_race(16, "race", Decimal::MAX);
        assert_eq!(
            result,
            Err(RaceError::FundingOverflow {
                threads: 16,
                amount: Decimal::MAX
            })
        );
    }

    #[test]
    fn test_race_rejected_funding_is_an_error() {
        // A valid race amount whose scale the vault refuses.
        let amount = Decimal::new(1, 20);
        let result = replay_race(4, "race", amount);
        assert!(matches!(result, Err(RaceError::Funding(VaultError::InvalidAmount(_)))));
    }
}
