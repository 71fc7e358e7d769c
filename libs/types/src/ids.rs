//! Identifier types for custody participants and authorizations
//!
//! `Identity` names whoever sits on either end of a call (depositor,
//! privileged caller, withdrawal recipient). `AuthorizationToken` is the
//! caller-supplied digest that releases a single withdrawal.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::errors::{IdentityError, TokenError};

/// Width of an authorization token in bytes
pub const TOKEN_WIDTH: usize = 32;

/// Caller or recipient address
///
/// Opaque to the contracts: two identities are the same party iff their
/// strings are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Identity(String);

impl Identity {
    /// Create a new identity
    ///
    /// # Panics
    /// Panics if the identity is empty
    pub fn new(address: impl Into<String>) -> Self {
        let s = address.into();
        assert!(!s.is_empty(), "Identity must not be empty");
        Self(s)
    }

    /// Try to create an identity, returning None if empty
    pub fn try_new(address: impl Into<String>) -> Option<Self> {
        let s = address.into();
        if s.is_empty() {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Get the address string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Identity {
    type Error = IdentityError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_new(s).ok_or(IdentityError::Empty)
    }
}

impl TryFrom<&str> for Identity {
    type Error = IdentityError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::try_new(s).ok_or(IdentityError::Empty)
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.0
    }
}

/// Single-use authorization credential
///
/// A fixed-width digest derived out-of-band by the caller. The contracts
/// never mint tokens; they only remember which ones were spent.
/// Serialized as lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct AuthorizationToken([u8; TOKEN_WIDTH]);

impl AuthorizationToken {
    /// Wrap raw bytes. Any bit pattern is a valid token.
    pub const fn from_bytes(bytes: [u8; TOKEN_WIDTH]) -> Self {
        Self(bytes)
    }

    /// Derive a token as the SHA-256 digest of an authorization artifact.
    pub fn digest(artifact: impl AsRef<[u8]>) -> Self {
        let hash = Sha256::digest(artifact.as_ref());
        let mut bytes = [0u8; TOKEN_WIDTH];
        bytes.copy_from_slice(&hash);
        Self(bytes)
    }

    /// Decode from a hex string, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, TokenError> {
        let trimmed = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(trimmed).map_err(|e| TokenError::InvalidHex(e.to_string()))?;
        let bytes: [u8; TOKEN_WIDTH] = raw
            .as_slice()
            .try_into()
            .map_err(|_| TokenError::InvalidLength(raw.len()))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; TOKEN_WIDTH] {
        &self.0
    }
}

impl fmt::Display for AuthorizationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl fmt::Debug for AuthorizationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthorizationToken({})", self)
    }
}

impl From<AuthorizationToken> for String {
    fn from(token: AuthorizationToken) -> Self {
        token.to_hex()
    }
}

impl TryFrom<String> for AuthorizationToken {
    type Error = TokenError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}
