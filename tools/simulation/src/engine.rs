//! Scenario execution engine
//!
//! Deploys a fresh registry and vault the way a bootstrap script would,
//! replays a scenario step by step, and after every step checks:
//! - conservation: balance equals successful deposits minus successful
//!   withdrawals, and never drops below zero
//! - event fidelity: one vault event per successful call, one registry
//!   event per successful withdrawal, carrying the call's fields
//! - at-most-once: the registry's consumed set grows exactly with
//!   successful withdrawals, and a token consumed by a failed call is
//!   still unused afterwards

use custody_contracts::errors::ConfigError;
use custody_contracts::events::{AuthorizationUsed, ContractEvent, DepositMade, WithdrawalMade};
use custody_contracts::registry::{AuthorizationRegistry, SharedRegistry};
use custody_contracts::transfer::Ledger;
use custody_contracts::vault::SecureVault;
use custody_contracts::config::VaultConfig;
use custody_types::ids::AuthorizationToken;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::scenario::{Outcome, Scenario, Step};

/// Errors that prevent a scenario from running at all.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimulationError {
    #[error("vault deployment failed: {0}")]
    Deployment(#[from] ConfigError),
}

/// Record of one executed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub index: usize,
    pub label: String,
    pub outcome: Outcome,
    pub expected: Option<Outcome>,
    pub balance_after: Decimal,
}

impl StepRecord {
    pub fn met_expectation(&self) -> bool {
        self.expected.map_or(true, |e| e == self.outcome)
    }
}

/// A broken invariant observed after a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvariantViolation {
    pub step: usize,
    pub description: String,
}

/// Result of running one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub scenario: String,
    pub steps: Vec<StepRecord>,
    pub final_balance: Decimal,
    pub total_deposited: Decimal,
    pub total_withdrawn: Decimal,
    pub tokens_consumed: usize,
    pub vault_audit_head: String,
    pub registry_audit_head: String,
    pub violations: Vec<InvariantViolation>,
}

impl SimulationReport {
    /// Steps whose outcome differed from the declared expectation.
    pub fn unmet_expectations(&self) -> Vec<&StepRecord> {
        self.steps.iter().filter(|s| !s.met_expectation()).collect()
    }

    pub fn passed(&self) -> bool {
        self.violations.is_empty() && self.unmet_expectations().is_empty()
    }

    /// Count of steps with the given outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.steps.iter().filter(|s| s.outcome == outcome).count()
    }
}

/// Running tallies the engine keeps independently of the vault.
#[derive(Debug, Default)]
struct Model {
    deposited: Decimal,
    withdrawn: Decimal,
    vault_events: usize,
    consumed: HashSet<AuthorizationToken>,
}

/// One deployment of the registry/vault pair driven by a scenario.
pub struct Simulation {
    registry: SharedRegistry,
    vault: SecureVault<Ledger>,
    model: Model,
    violations: Vec<InvariantViolation>,
}

impl Simulation {
    /// Deploy a fresh pair for `scenario`.
    pub fn deploy(scenario: &Scenario, config: VaultConfig) -> Result<Self, SimulationError> {
        let registry = AuthorizationRegistry::shared();
        let mut ledger = Ledger::new();
        for recipient in &scenario.rejecting_recipients {
            ledger.reject(recipient.clone());
        }
        let vault = SecureVault::with_transfer(
            scenario.owner.clone(),
            Arc::clone(&registry),
            ledger,
            config,
        )?;

        Ok(Self {
            registry,
            vault,
            model: Model::default(),
            violations: Vec::new(),
        })
    }

    /// Run `scenario` on a fresh deployment with default configuration.
    pub fn run(scenario: &Scenario) -> Result<SimulationReport, SimulationError> {
        Self::run_with_config(scenario, VaultConfig::default())
    }

    pub fn run_with_config(
        scenario: &Scenario,
        config: VaultConfig,
    ) -> Result<SimulationReport, SimulationError> {
        info!(scenario = %scenario.name, steps = scenario.steps.len(), "Running scenario");
        let mut sim = Self::deploy(scenario, config)?;

        let records: Vec<StepRecord> = scenario
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| sim.execute(index, step))
            .collect();

        let report = sim.finish(scenario, records);
        if report.passed() {
            info!(scenario = %report.scenario, "Scenario passed");
        } else {
            warn!(
                scenario = %report.scenario,
                violations = report.violations.len(),
                unmet = report.unmet_expectations().len(),
                "Scenario failed"
            );
        }
        Ok(report)
    }

    /// Execute a single step and check invariants afterwards.
    pub fn execute(&mut self, index: usize, step: &Step) -> StepRecord {
        let outcome = match step {
            Step::Deposit { caller, amount, .. } => {
                let result = self.vault.deposit(caller, *amount);
                if let Ok(event) = &result {
                    self.model.deposited += *amount;
                    self.model.vault_events += 1;
                    let expected = ContractEvent::DepositMade(DepositMade {
                        depositor: caller.clone(),
                        amount: *amount,
                    });
                    self.check(index, *event == expected, "DepositMade fields differ from call");
                }
                Outcome::from_deposit(&result.map(|_| ()))
            }
            Step::Withdraw {
                caller,
                authorization,
                recipient,
                amount,
                ..
            } => {
                let token = AuthorizationToken::digest(authorization);
                let was_consumed = self.model.consumed.contains(&token);
                let result = self.vault.withdraw(caller, token, recipient, *amount);

                match &result {
                    Ok(event) => {
                        self.check(index, !was_consumed, "token honored twice");
                        self.model.withdrawn += *amount;
                        self.model.vault_events += 1;
                        self.model.consumed.insert(token);

                        let expected = ContractEvent::WithdrawalMade(WithdrawalMade {
                            recipient: recipient.clone(),
                            amount: *amount,
                        });
                        self.check(index, *event == expected, "WithdrawalMade fields differ from call");

                        let last = self.registry.lock().events().last().cloned();
                        self.check(
                            index,
                            last == Some(ContractEvent::AuthorizationUsed(AuthorizationUsed { token })),
                            "AuthorizationUsed missing or for another token",
                        );
                    }
                    Err(_) => {
                        let consumed_now = self.registry.lock().is_consumed(&token);
                        self.check(
                            index,
                            consumed_now == was_consumed,
                            "failed withdrawal changed token state",
                        );
                    }
                }
                Outcome::from_withdraw(&result.map(|_| ()))
            }
        };

        self.check_conservation(index);
        debug!(step = index, outcome = %outcome, balance = %self.vault.balance(), "Step executed");

        StepRecord {
            index,
            label: step.label(),
            outcome,
            expected: step.expected(),
            balance_after: self.vault.balance(),
        }
    }

    fn check_conservation(&mut self, index: usize) {
        let balance = self.vault.balance();
        let expected = self.model.deposited - self.model.withdrawn;

        self.check(index, balance >= Decimal::ZERO, "balance negative");
        self.check(index, balance == expected, "balance differs from deposits minus withdrawals");
        self.check(
            index,
            self.vault.transfer_backend().total_credited() == self.model.withdrawn,
            "recipients credited differently from withdrawals",
        );
        self.check(
            index,
            self.vault.events().count() == self.model.vault_events,
            "vault event count differs from successful calls",
        );

        let registry = self.registry.lock();
        let consumed = registry.consumed_count();
        let registry_events = registry.events().count();
        drop(registry);
        self.check(
            index,
            consumed == self.model.consumed.len() && registry_events == consumed,
            "registry consumed set out of step with withdrawals",
        );
    }

    fn check(&mut self, step: usize, holds: bool, description: &str) {
        if !holds {
            warn!(step, description, "Invariant violated");
            self.violations.push(InvariantViolation {
                step,
                description: description.to_string(),
            });
        }
    }

    fn finish(mut self, scenario: &Scenario, steps: Vec<StepRecord>) -> SimulationReport {
        let last = steps.len();
        let vault_ok = self.vault.audit_log().verify().is_ok();
        self.check(last, vault_ok, "vault audit chain broken");

        let (registry_ok, registry_head, tokens_consumed) = {
            let registry = self.registry.lock();
            (
                registry.audit_log().verify().is_ok(),
                registry.audit_log().head_hex(),
                registry.consumed_count(),
            )
        };
        self.check(last, registry_ok, "registry audit chain broken");

        SimulationReport {
            run_id: Uuid::now_v7(),
            scenario: scenario.name.clone(),
            steps,
            final_balance: self.vault.balance(),
            total_deposited: self.vault.total_deposited(),
            total_withdrawn: self.vault.total_withdrawn(),
            tokens_consumed,
            vault_audit_head: self.vault.audit_log().head_hex(),
            registry_audit_head: registry_head,
            violations: self.violations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenarios;

    #[test]
    fn test_validate_flow_passes() {
        let report = Simulation::run(&scenarios::validate_flow()).unwrap();
        assert!(report.passed(), "{:?}", report.violations);
        assert_eq!(report.final_balance, Decimal::new(5, 1));
        assert_eq!(report.count(Outcome::AlreadyUsed), 1);
        assert_eq!(report.tokens_consumed, 1);
    }

    #[test]
    fn test_reference_scenarios_pass() {
        for scenario in scenarios::reference_scenarios() {
            let report = Simulation::run(&scenario).unwrap();
            assert!(report.passed(), "{} failed: {:?}", scenario.name, report);
        }
    }

    #[test]
    fn test_rollback_flow_passes() {
        let report = Simulation::run(&scenarios::rollback_flow()).unwrap();
        assert!(report.passed(), "{:?}", report);
        assert_eq!(report.count(Outcome::TransferFailed), 1);
        assert_eq!(report.final_balance, Decimal::new(5, 1));
    }

    #[test]
    fn test_unmet_expectation_reported() {
        let scenario = Scenario::new("wrong", "owner")
            .step(Step::deposit("user", Decimal::ONE).expecting(Outcome::Unauthorized));
        let report = Simulation::run(&scenario).unwrap();
        assert!(!report.passed());
        assert_eq!(report.unmet_expectations().len(), 1);
        assert!(report.violations.is_empty());
    }

    #[test]
    fn test_random_walk_holds_invariants() {
        for seed in 0..10 {
            let report = Simulation::run(&scenarios::random_walk(seed, 200)).unwrap();
            assert!(report.violations.is_empty(), "seed {seed}: {:?}", report.violations);
        }
    }

    #[test]
    fn test_withdraw_step_consumes_digest_of_authorization() {
        let scenario = Scenario::new("digest", "owner");
        let mut sim = Simulation::deploy(&scenario, VaultConfig::default()).unwrap();
        sim.execute(0, &Step::deposit("user", Decimal::ONE));
        let record = sim.execute(1, &Step::withdraw("owner", "auth1", "user", Decimal::ONE));

        assert_eq!(record.outcome, Outcome::Ok);
        let registry = sim.registry.lock();
        assert!(registry.is_consumed(&AuthorizationToken::digest("auth1")));
        assert!(!registry.is_consumed(&AuthorizationToken::from_bytes([0u8; 32])));
        assert_eq!(registry.consumed_count(), 1);
    }

    #[test]
    fn test_invalid_config_refuses_deployment() {
        let result = Simulation::run_with_config(
            &scenarios::validate_flow(),
            VaultConfig { unit_scale: 99 },
        );
        assert!(matches!(result, Err(SimulationError::Deployment(_))));
    }
}
