//! Warden Core - shared foundation for the Warden authorization crates
//!
//! This crate carries the unified error type used across the workspace.
//! Domain crates re-export it rather than defining their own hierarchies,
//! so adapters branch on one taxonomy regardless of which crate produced
//! the failure.

#![forbid(unsafe_code)]

/// Unified error handling
pub mod errors;

pub use errors::{WardenError, WardenResult};
