//! Concurrency test
//!
//! Verifies exactly-once consumption when many callers present the same
//! authorization at the same time, both against one vault and against
//! separate vaults sharing one registry.

use custody_contracts::registry::AuthorizationRegistry;
use custody_contracts::vault::SecureVault;
use custody_simulation::race::{replay_race, RaceError};
use custody_types::ids::{AuthorizationToken, Identity};
use custody_types::numeric::parse_amount;
use rust_decimal::Decimal;
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn test_replay_race_various_widths() {
    for threads in [2, 4, 8, 32] {
        let report = replay_race(threads, &format!("race-{threads}"), Decimal::new(25, 2)).unwrap();
        assert!(report.exactly_once(), "threads={threads}: {:?}", report);
        assert_eq!(
            report.final_balance,
            Decimal::new(25, 2) * Decimal::from(threads as u64 - 1)
        );
    }
}

#[test]
fn test_replay_race_rejects_unfundable_amount() {
    let amount = parse_amount("79228162514264337593543950335").unwrap();
    let result = replay_race(16, "race", amount);
    assert!(
        matches!(result, Err(RaceError::FundingOverflow { threads: 16, .. })),
        "{:?}",
        result
    );
}

#[test]
fn test_distinct_tokens_all_succeed_concurrently() {
    let registry = AuthorizationRegistry::shared();
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let owner = Identity::new("owner");
                let mut vault = SecureVault::new(owner.clone(), registry);
                vault.deposit(&Identity::new("user"), Decimal::ONE).unwrap();
                barrier.wait();
                let token = AuthorizationToken::digest(format!("auth-{i}"));
                vault
                    .withdraw(&owner, token, &Identity::new("user"), Decimal::ONE)
                    .is_ok()
            })
        })
        .collect();

    let successes = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(successes, 8);
    assert_eq!(registry.lock().consumed_count(), 8);
}

#[test]
fn test_shared_registry_race_across_vaults() {
    let registry = AuthorizationRegistry::shared();
    let barrier = Arc::new(Barrier::new(6));
    let token = AuthorizationToken::digest("contested");

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let owner = Identity::new("owner");
                let mut vault = SecureVault::new(owner.clone(), registry);
                vault.deposit(&Identity::new("user"), Decimal::from(3)).unwrap();
                barrier.wait();
                let won = vault
                    .withdraw(&owner, token, &Identity::new("user"), Decimal::ONE)
                    .is_ok();
                (won, vault.balance())
            })
        })
        .collect();

    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(outcomes.iter().filter(|(won, _)| *won).count(), 1);
    assert!(outcomes
        .iter()
        .all(|(won, balance)| *balance == if *won { Decimal::from(2) } else { Decimal::from(3) }));
}
