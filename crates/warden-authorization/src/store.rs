//! Predicate registry
//!
//! Process-wide store of named permission/role definitions. Registration is
//! expected at startup/configuration time; resolution never reads the live
//! store directly but works against an immutable [`StoreSnapshot`] captured
//! when `authorize` is invoked, so redefinition mid-flight cannot race an
//! in-progress resolution.
//!
//! A definition is either a [`Predicate`] or a *composite*: a list of member
//! names granted iff every member grants. Composites express roles backed by
//! permission lists and may reference names defined later; membership is
//! resolved against the snapshot at evaluation time.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::{self, BoxFuture};
use serde_json::Value;
use tracing::debug;

use crate::errors::{WardenError, WardenResult};
use crate::map::IntoNames;
use crate::predicate::{AsyncFnPredicate, CheckContext, FnPredicate, Predicate};

/// Registry configuration.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Fail redefinition with `DuplicateDefinition` instead of overwriting
    pub strict: bool,
}

/// One registry entry.
#[derive(Clone)]
enum Definition {
    /// A directly-evaluated predicate
    Predicate(Arc<dyn Predicate>),
    /// A role backed by member names, granted iff every member grants
    Composite(Arc<[String]>),
}

/// Registry of named predicate definitions.
pub struct PredicateStore {
    definitions: RwLock<HashMap<String, Definition>>,
    config: StoreConfig,
}

impl PredicateStore {
    /// Create an empty store with default (overwrite-on-redefine) behavior
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with explicit configuration
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            definitions: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Register (or in non-strict mode overwrite) a named predicate
    pub fn define(
        &self,
        name: impl Into<String>,
        predicate: impl Predicate + 'static,
    ) -> WardenResult<()> {
        self.insert(name.into(), Definition::Predicate(Arc::new(predicate)))
    }

    /// Register a synchronous closure as a predicate
    pub fn define_fn<F>(&self, name: impl Into<String>, check: F) -> WardenResult<()>
    where
        F: Fn(&str, &CheckContext, Option<&Value>) -> bool + Send + Sync + 'static,
    {
        self.define(name, FnPredicate::new(check))
    }

    /// Register a closure producing a boxed future as a predicate
    pub fn define_async<F>(&self, name: impl Into<String>, check: F) -> WardenResult<()>
    where
        F: Fn(&str, &CheckContext, Option<&Value>) -> BoxFuture<'static, WardenResult<bool>>
            + Send
            + Sync
            + 'static,
    {
        self.define(name, AsyncFnPredicate::new(check))
    }

    /// Register one validator under several names, shared via `Arc`
    pub fn define_many_fn<F>(&self, names: impl IntoNames, check: F) -> WardenResult<()>
    where
        F: Fn(&str, &CheckContext, Option<&Value>) -> bool + Send + Sync + 'static,
    {
        let shared: Arc<dyn Predicate> = Arc::new(FnPredicate::new(check));
        for name in names.into_names() {
            self.insert(name, Definition::Predicate(Arc::clone(&shared)))?;
        }
        Ok(())
    }

    /// Register a composite definition: granted iff every member grants.
    ///
    /// Members may name definitions registered later; they are resolved
    /// against the snapshot at evaluation time. An empty member list and
    /// direct self-reference are rejected here; indirect cycles are caught
    /// during evaluation.
    pub fn define_composite(
        &self,
        name: impl Into<String>,
        members: impl IntoNames,
    ) -> WardenResult<()> {
        let name = name.into();
        let members = members.into_names();
        if members.is_empty() {
            return Err(WardenError::invalid(format!(
                "composite '{name}' must have at least one member"
            )));
        }
        if members.iter().any(|member| *member == name) {
            return Err(WardenError::invalid(format!(
                "composite '{name}' references itself"
            )));
        }
        self.insert(name, Definition::Composite(members.into()))
    }

    /// Remove a definition; returns whether one existed
    pub fn remove(&self, name: &str) -> bool {
        let removed = self.write().remove(name).is_some();
        if removed {
            debug!(name, "Removed predicate definition");
        }
        removed
    }

    /// Whether a definition exists under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Names of all current definitions, in no particular order
    pub fn names(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the store has no definitions
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Drop every definition
    pub fn clear(&self) {
        self.write().clear();
        debug!("Cleared predicate store");
    }

    /// Capture an immutable snapshot for one resolution
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            definitions: Arc::new(self.read().clone()),
        }
    }

    fn insert(&self, name: String, definition: Definition) -> WardenResult<()> {
        if name.is_empty() {
            return Err(WardenError::invalid("definition name must be non-empty"));
        }
        let mut definitions = self.write();
        if self.config.strict && definitions.contains_key(&name) {
            return Err(WardenError::duplicate_definition(name));
        }
        debug!(name = %name, "Registered predicate definition");
        definitions.insert(name, definition);
        Ok(())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Definition>> {
        self.definitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Definition>> {
        self.definitions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PredicateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for PredicateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PredicateStore")
            .field("names", &self.names())
            .field("config", &self.config)
            .finish()
    }
}

/// Immutable view of the store, captured once per resolution.
#[derive(Clone)]
pub struct StoreSnapshot {
    definitions: Arc<HashMap<String, Definition>>,
}

impl StoreSnapshot {
    /// Whether a definition exists under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    /// Evaluate one named definition against this snapshot.
    ///
    /// Composites evaluate their members concurrently; all must grant.
    pub async fn evaluate(
        &self,
        name: &str,
        context: &CheckContext,
        params: Option<&Value>,
    ) -> WardenResult<bool> {
        self.evaluate_named(name, context, params, &[]).await
    }

    fn evaluate_named<'a>(
        &'a self,
        name: &'a str,
        context: &'a CheckContext,
        params: Option<&'a Value>,
        trail: &'a [String],
    ) -> BoxFuture<'a, WardenResult<bool>> {
        Box::pin(async move {
            if trail.iter().any(|seen| seen == name) {
                return Err(WardenError::invalid(format!(
                    "cyclic composite definition involving '{name}'"
                )));
            }
            match self.definitions.get(name) {
                None => Err(WardenError::unknown_permission(name)),
                Some(Definition::Predicate(predicate)) => {
                    predicate.evaluate(name, context, params).await
                }
                Some(Definition::Composite(members)) => {
                    let mut trail_here = Vec::with_capacity(trail.len() + 1);
                    trail_here.extend_from_slice(trail);
                    trail_here.push(name.to_string());

                    let member_checks = members
                        .iter()
                        .map(|member| self.evaluate_named(member, context, params, &trail_here));
                    for settled in future::join_all(member_checks).await {
                        if !settled? {
                            return Ok(false);
                        }
                    }
                    Ok(true)
                }
            }
        })
    }
}

impl std::fmt::Debug for StoreSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSnapshot")
            .field("names", &self.definitions.keys().collect::<Vec<_>>())
            .finish()
    }
}
