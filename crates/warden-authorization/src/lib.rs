#![deny(clippy::await_holding_lock)]
//! # Warden Authorization - declarative only/except resolution
//!
//! Resolves whether the current subject is authorized, given a declarative
//! [`PermissionMap`] of "only"/"except" permission names evaluated against a
//! registry of named predicates. Each predicate may settle synchronously or
//! suspend; within a phase all checks are raced and the first grant wins.
//!
//! UI bindings and router guards sit outside this crate: they build a
//! [`PermissionMap`] from declarative input, call [`Authorizer::authorize`],
//! and translate the [`AuthorizationOutcome`] into visual or navigational
//! effect.

pub mod check;
pub mod errors;
pub mod map;
pub mod predicate;
pub mod prelude;
pub mod resolver;
pub mod store;

pub use check::{AuthorizationOutcome, Denial, PendingCheck};
pub use errors::{WardenError, WardenResult};
pub use map::{IntoNames, PermissionMap, PermissionMapBuilder};
pub use predicate::{CheckContext, Predicate};
pub use resolver::Authorizer;
pub use store::{PredicateStore, StoreConfig, StoreSnapshot};
