//! Preset scenarios
//!
//! - `validate_flow`: deploy, deposit, withdraw, attempt replay
//! - `reference_scenarios`: the five acceptance scenarios for the vault
//! - `rollback_flow`: refused transfer followed by a retry with the same token
//! - `random_walk`: seeded random mix of valid and hostile calls

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::Decimal;

use crate::scenario::{Outcome, Scenario, Step};

pub const OWNER: &str = "owner";
pub const USER: &str = "user";

fn units(mantissa: i64, scale: u32) -> Decimal {
    Decimal::new(mantissa, scale)
}

/// Deposit 1, withdraw 0.5 with `H("test123")`, then replay the same token.
pub fn validate_flow() -> Scenario {
    Scenario::new("validate_flow", OWNER)
        .step(Step::deposit(USER, units(1, 0)).expecting(Outcome::Ok))
        .step(Step::withdraw(OWNER, "test123", USER, units(5, 1)).expecting(Outcome::Ok))
        .step(
            Step::withdraw(OWNER, "test123", USER, units(5, 1)).expecting(Outcome::AlreadyUsed),
        )
}

/// Acceptance scenarios, each on a fresh deployment.
pub fn reference_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("withdraw_with_fresh_token", OWNER)
            .step(Step::deposit(USER, units(1, 0)).expecting(Outcome::Ok))
            .step(Step::withdraw(OWNER, "auth1", USER, units(5, 1)).expecting(Outcome::Ok)),
        Scenario::new("replay_rejected", OWNER)
            .step(Step::deposit(USER, units(1, 0)).expecting(Outcome::Ok))
            .step(Step::withdraw(OWNER, "auth1", USER, units(5, 1)).expecting(Outcome::Ok))
            .step(
                Step::withdraw(OWNER, "auth1", USER, units(5, 1))
                    .expecting(Outcome::AlreadyUsed),
            ),
        Scenario::new("insufficient_funds", OWNER)
            .step(Step::deposit(USER, units(1, 0)).expecting(Outcome::Ok))
            .step(
                Step::withdraw(OWNER, "auth1", USER, units(2, 0))
                    .expecting(Outcome::InsufficientFunds),
            ),
        Scenario::new("non_owner_refused", OWNER)
            .step(Step::deposit(USER, units(1, 0)).expecting(Outcome::Ok))
            .step(
                Step::withdraw(USER, "auth1", USER, units(5, 1)).expecting(Outcome::Unauthorized),
            )
            .step(
                Step::withdraw(USER, "auth2", USER, units(100, 0))
                    .expecting(Outcome::Unauthorized),
            ),
        Scenario::new("two_tokens_drain", OWNER)
            .step(Step::deposit(USER, units(1, 0)).expecting(Outcome::Ok))
            .step(Step::withdraw(OWNER, "auth1", USER, units(5, 1)).expecting(Outcome::Ok))
            .step(Step::withdraw(OWNER, "auth2", USER, units(5, 1)).expecting(Outcome::Ok)),
    ]
}

/// A refused transfer must not burn the token.
pub fn rollback_flow() -> Scenario {
    Scenario::new("rollback_flow", OWNER)
        .rejecting("sink")
        .step(Step::deposit(USER, units(1, 0)).expecting(Outcome::Ok))
        .step(Step::withdraw(OWNER, "auth1", "sink", units(5, 1)).expecting(Outcome::TransferFailed))
        .step(Step::withdraw(OWNER, "auth1", USER, units(5, 1)).expecting(Outcome::Ok))
        .step(Step::withdraw(OWNER, "auth1", USER, units(5, 1)).expecting(Outcome::AlreadyUsed))
}

/// Seeded random mix of deposits and withdrawals from both identities,
/// drawing tokens from a small pool so replays are frequent. Steps carry no
/// expectations; the engine's invariant checks are the oracle.
pub fn random_walk(seed: u64, steps: usize) -> Scenario {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut scenario = Scenario::new(format!("random_walk_{seed}"), OWNER).rejecting("sink");

    for _ in 0..steps {
        let step = if rng.gen_bool(0.4) {
            let caller = if rng.gen_bool(0.5) { USER } else { OWNER };
            Step::deposit(caller, units(rng.gen_range(0..500), 2))
        } else {
            let caller = if rng.gen_bool(0.85) { OWNER } else { USER };
            let recipient = if rng.gen_bool(0.1) { "sink" } else { USER };
            let authorization = format!("auth{}", rng.gen_range(0..12));
            Step::withdraw(caller, &authorization, recipient, units(rng.gen_range(0..400), 2))
        };
        scenario = scenario.step(step);
    }
    scenario
}
