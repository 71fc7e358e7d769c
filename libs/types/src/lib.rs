//! Types library for the custody vault
//!
//! Shared type definitions used by the contract layer and the tooling around
//! it. Everything here is plain data: no component state lives in this crate.
//!
//! # Version
//! v1.0.0 - Frozen, wire-compatible with the audit log format
//!
//! # Modules
//! - `ids`: Caller identities and authorization tokens
//! - `numeric`: Fixed-point value amounts and their validation
//! - `errors`: Error taxonomy for shared types

// Public modules
pub mod ids;
pub mod numeric;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::errors::*;
}
