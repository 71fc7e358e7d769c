//! Contract events
//!
//! Events are immutable audit records. Each carries exactly the fields an
//! external watcher needs and nothing else; the registry emits
//! `AuthorizationUsed`, the vault emits `DepositMade` and `WithdrawalMade`.

use custody_types::ids::{AuthorizationToken, Identity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Value credited to the vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositMade {
    pub depositor: Identity,
    pub amount: Decimal,
}

/// Value released to a recipient against a fresh authorization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalMade {
    pub recipient: Identity,
    pub amount: Decimal,
}

/// Authorization token consumed by the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationUsed {
    pub token: AuthorizationToken,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    DepositMade(DepositMade),
    WithdrawalMade(WithdrawalMade),
    AuthorizationUsed(AuthorizationUsed),
}

impl ContractEvent {
    /// Short event name, as shown in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DepositMade(_) => "DepositMade",
            Self::WithdrawalMade(_) => "WithdrawalMade",
            Self::AuthorizationUsed(_) => "AuthorizationUsed",
        }
    }

    /// Canonical byte encoding used for audit hashing.
    ///
    /// Layout: tag byte, then each field length-prefixed (u32 BE). Amounts
    /// are normalized first so `1.0` and `1` encode identically.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64);
        match self {
            Self::DepositMade(e) => {
                out.push(0x01);
                put_field(&mut out, e.depositor.as_str().as_bytes());
                put_field(&mut out, e.amount.normalize().to_string().as_bytes());
            }
            Self::WithdrawalMade(e) => {
                out.push(0x02);
                put_field(&mut out, e.recipient.as_str().as_bytes());
                put_field(&mut out, e.amount.normalize().to_string().as_bytes());
            }
            Self::AuthorizationUsed(e) => {
                out.push(0x03);
                put_field(&mut out, e.token.as_bytes());
            }
        }
        out
    }
}

fn put_field(out: &mut Vec<u8>, field: &[u8]) {
    out.extend_from_slice(&(field.len() as u32).to_be_bytes());
    out.extend_from_slice(field);
}
