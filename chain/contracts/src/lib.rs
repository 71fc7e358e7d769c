//! Contract Logic for Authorization-Gated Custody
//!
//! This crate implements the two contracts of the custody system: an
//! authorization registry that honors each token at most once, and a vault
//! that releases funds only against a fresh token.
//!
//! # Modules
//! - `events`: Audit events emitted by both contracts
//! - `errors`: Contract-specific error types
//! - `audit`: Append-only, hash-chained event log
//! - `security`: Privileged-identity guard
//! - `config`: Vault configuration
//! - `transfer`: Value transfer seam and in-memory recipient ledger
//! - `registry`: Authorization registry (check-and-consume)
//! - `vault`: Aggregate custody balance, deposit and withdraw
//!
//! # Version
//! v0.1.0: initial implementation

pub mod errors;
pub mod events;
pub mod audit;
pub mod security;
pub mod config;
pub mod transfer;
pub mod registry;
pub mod vault;

pub use registry::{AuthorizationRegistry, SharedRegistry};
pub use vault::SecureVault;

/// Contract ABI version: frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
