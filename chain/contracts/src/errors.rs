//! Contract-specific error types
//!
//! Error taxonomy for the registry, the vault, and their plumbing. Every
//! failure is returned synchronously and leaves both contracts unchanged.

use custody_types::errors::AmountError;
use custody_types::ids::AuthorizationToken;
use thiserror::Error;

/// Authorization registry errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Authorization already used: {token}")]
    AlreadyUsed { token: AuthorizationToken },
}

/// Vault errors on the deposit path
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VaultError {
    #[error("Invalid deposit amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Arithmetic overflow in balance calculation")]
    Overflow,
}

/// Withdrawal errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WithdrawError {
    #[error("Unauthorized: caller is not the vault owner")]
    Unauthorized,

    #[error("Invalid withdrawal amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: String, available: String },

    #[error(transparent)]
    Authorization(#[from] RegistryError),

    #[error("Transfer to {recipient} failed: {reason}")]
    TransferFailed { recipient: String, reason: String },
}

impl WithdrawError {
    /// True when the token was already consumed and a fresh one is needed.
    pub fn is_already_used(&self) -> bool {
        matches!(self, Self::Authorization(RegistryError::AlreadyUsed { .. }))
    }
}

/// Value transfer errors raised by a transfer backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    #[error("Recipient {recipient} rejected the transfer")]
    Rejected { recipient: String },

    #[error("Recipient balance overflow")]
    Overflow,
}

/// Audit log integrity errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuditError {
    #[error("Audit chain broken at sequence {sequence}")]
    ChainBroken { sequence: u64 },

    #[error("Audit sequence mismatch: expected {expected}, found {actual}")]
    SequenceMismatch { expected: u64, actual: u64 },
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Unit scale {scale} exceeds maximum {max}")]
    InvalidScale { scale: u32, max: u32 },
}
