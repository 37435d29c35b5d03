//! Warden Authorization prelude.
//!
//! Curated re-exports for adapter crates without pulling in extra modules.

pub use crate::check::{AuthorizationOutcome, Denial};
pub use crate::errors::{WardenError, WardenResult};
pub use crate::map::{IntoNames, PermissionMap, PermissionMapBuilder};
pub use crate::predicate::{CheckContext, Predicate};
pub use crate::resolver::Authorizer;
pub use crate::store::{PredicateStore, StoreConfig, StoreSnapshot};
