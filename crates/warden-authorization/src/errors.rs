//! Authorization error handling using the unified error system
//!
//! Uses the unified `WardenError` from warden-core so adapters branch on a
//! single taxonomy across crates.

pub use warden_core::{WardenError, WardenResult};

/// Result type alias for authorization operations
pub type AuthorizationResult<T> = WardenResult<T>;
