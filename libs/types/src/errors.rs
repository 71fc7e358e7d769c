//! Error types for shared custody types
//!
//! Kept separate from the contract errors so tooling can validate input
//! without pulling in the contract crate.

use thiserror::Error;

/// Amount validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("Amount must be positive: {amount}")]
    NotPositive { amount: String },

    #[error("Amount {amount} exceeds unit precision of {scale} decimal places")]
    ExcessPrecision { amount: String, scale: u32 },

    #[error("Invalid amount: {0}")]
    Parse(String),
}

/// Identity construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Identity must not be empty")]
    Empty,
}

/// Authorization token decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Invalid token hex: {0}")]
    InvalidHex(String),

    #[error("Invalid token length: expected 32 bytes, got {0}")]
    InvalidLength(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_error_display() {
        let err = AmountError::NotPositive {
            amount: "-1".to_string(),
        };
        assert_eq!(err.to_string(), "Amount must be positive: -1");
    }

    #[test]
    fn test_excess_precision_display() {
        let err = AmountError::ExcessPrecision {
            amount: "0.0000001".to_string(),
            scale: 6,
        };
        assert!(err.to_string().contains("6 decimal places"));
    }

    #[test]
    fn test_token_length_display() {
        let err = TokenError::InvalidLength(31);
        assert!(err.to_string().contains("31"));
    }
}
