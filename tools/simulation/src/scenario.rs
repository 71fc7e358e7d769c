//! Scenario scripts
//!
//! A scenario is an ordered list of calls against a freshly deployed
//! registry/vault pair. Steps can carry the outcome they expect, so a
//! scenario doubles as an executable acceptance check. Scenarios are plain
//! JSON and can be loaded from disk.

use custody_contracts::errors::{VaultError, WithdrawError};
use custody_types::ids::{AuthorizationToken, Identity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome class of a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    InvalidAmount,
    Overflow,
    Unauthorized,
    InsufficientFunds,
    AlreadyUsed,
    TransferFailed,
}

impl Outcome {
    pub fn from_deposit(result: &Result<(), VaultError>) -> Self {
        match result {
            Ok(()) => Self::Ok,
            Err(VaultError::InvalidAmount(_)) => Self::InvalidAmount,
            Err(VaultError::Overflow) => Self::Overflow,
        }
    }

    pub fn from_withdraw(result: &Result<(), WithdrawError>) -> Self {
        match result {
            Ok(()) => Self::Ok,
            Err(WithdrawError::Unauthorized) => Self::Unauthorized,
            Err(WithdrawError::InvalidAmount(_)) => Self::InvalidAmount,
            Err(WithdrawError::InsufficientFunds { .. }) => Self::InsufficientFunds,
            Err(WithdrawError::Authorization(_)) => Self::AlreadyUsed,
            Err(WithdrawError::TransferFailed { .. }) => Self::TransferFailed,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Ok => "ok",
            Self::InvalidAmount => "invalid_amount",
            Self::Overflow => "overflow",
            Self::Unauthorized => "unauthorized",
            Self::InsufficientFunds => "insufficient_funds",
            Self::AlreadyUsed => "already_used",
            Self::TransferFailed => "transfer_failed",
        };
        f.write_str(s)
    }
}

/// One call in a scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Deposit {
        caller: Identity,
        amount: Decimal,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect: Option<Outcome>,
    },
    Withdraw {
        caller: Identity,
        /// Out-of-band artifact; the token is its digest.
        authorization: String,
        recipient: Identity,
        amount: Decimal,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        expect: Option<Outcome>,
    },
}

impl Step {
    pub fn deposit(caller: &str, amount: Decimal) -> Self {
        Self::Deposit {
            caller: Identity::new(caller),
            amount,
            expect: None,
        }
    }

    pub fn withdraw(caller: &str, authorization: &str, recipient: &str, amount: Decimal) -> Self {
        Self::Withdraw {
            caller: Identity::new(caller),
            authorization: authorization.to_string(),
            recipient: Identity::new(recipient),
            amount,
            expect: None,
        }
    }

    /// Attach an expected outcome.
    pub fn expecting(mut self, outcome: Outcome) -> Self {
        match &mut self {
            Self::Deposit { expect, .. } | Self::Withdraw { expect, .. } => {
                *expect = Some(outcome)
            }
        }
        self
    }

    pub fn expected(&self) -> Option<Outcome> {
        match self {
            Self::Deposit { expect, .. } | Self::Withdraw { expect, .. } => *expect,
        }
    }

    /// Token presented by a withdraw step.
    pub fn token(&self) -> Option<AuthorizationToken> {
        match self {
            Self::Withdraw { authorization, .. } => Some(AuthorizationToken::digest(authorization)),
            Self::Deposit { .. } => None,
        }
    }

    /// Short human-readable description for reports.
    pub fn label(&self) -> String {
        match self {
            Self::Deposit { caller, amount, .. } => format!("deposit {} by {}", amount, caller),
            Self::Withdraw {
                caller,
                authorization,
                recipient,
                amount,
                ..
            } => format!(
                "withdraw {} to {} by {} with H({:?})",
                amount, recipient, caller, authorization
            ),
        }
    }
}

/// A named, replayable sequence of calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Deployer of the vault, i.e. the privileged identity.
    pub owner: Identity,
    /// Recipients that refuse incoming value.
    #[serde(default)]
    pub rejecting_recipients: Vec<Identity>,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, owner: &str) -> Self {
        Self {
            name: name.into(),
            owner: Identity::new(owner),
            rejecting_recipients: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn rejecting(mut self, recipient: &str) -> Self {
        self.rejecting_recipients.push(Identity::new(recipient));
        self
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_from_json() {
        let json = r#"{
            "name": "manual",
            "owner": "owner",
            "steps": [
                {"op": "deposit", "caller": "user", "amount": "1"},
                {"op": "withdraw", "caller": "owner", "authorization": "auth1",
                 "recipient": "user", "amount": "0.5", "expect": "ok"}
            ]
        }"#;
        let scenario = Scenario::from_json(json).unwrap();
        assert_eq!(scenario.steps.len(), 2);
        assert!(scenario.rejecting_recipients.is_empty());
        assert_eq!(scenario.steps[1].expected(), Some(Outcome::Ok));
        assert_eq!(
            scenario.steps[1].token(),
            Some(AuthorizationToken::digest("auth1"))
        );
    }

    #[test]
    fn test_builder_round_trip() {
        let scenario = Scenario::new("built", "owner")
            .rejecting("sink")
            .step(Step::deposit("user", Decimal::ONE).expecting(Outcome::Ok));
        let json = serde_json::to_string(&scenario).unwrap();
        assert_eq!(Scenario::from_json(&json).unwrap(), scenario);
    }

    #[test]
    fn test_outcome_classification() {
        let err: Result<(), WithdrawError> = Err(WithdrawError::Unauthorized);
        assert_eq!(Outcome::from_withdraw(&err), Outcome::Unauthorized);
        assert_eq!(Outcome::from_deposit(&Err(VaultError::Overflow)), Outcome::Overflow);
        assert_eq!(Outcome::AlreadyUsed.to_string(), "already_used");
    }

    #[test]
    fn test_deposit_has_no_token() {
        assert!(Step::deposit("user", Decimal::ONE).token().is_none());
    }
}
