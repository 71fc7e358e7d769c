//! Simulation & Acceptance Testing for the Custody Vault
//!
//! Wires a registry and a vault together the way a deployment script does,
//! drives them through scripted or randomized call sequences, and checks
//! conservation, at-most-once consumption and event fidelity on every step.
//!
//! # Modules
//! - `scenario`: Step and scenario definitions (JSON-loadable)
//! - `scenarios`: Preset and seeded random scenarios
//! - `engine`: Scenario runner with per-step invariant checks
//! - `race`: Concurrent replay race against a single vault
//! - `export`: JSON report export
//! - `logging`: Tracing subscriber setup for the binary

pub mod scenario;
pub mod scenarios;
pub mod engine;
pub mod race;
pub mod export;
pub mod logging;

/// Crate version constant
pub const VERSION: &str = "1.0.0";
