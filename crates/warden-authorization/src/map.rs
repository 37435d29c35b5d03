//! Permission maps
//!
//! A [`PermissionMap`] is the declarative input to one authorization
//! request: the "only" names (any grants access), the "except" names (any
//! match revokes access, evaluated first), opaque `params` handed to every
//! predicate unchanged, and an optional redirect target the resolver passes
//! through untouched for the adapter's use.
//!
//! Maps are fully determined at construction and compared structurally, one
//! per UI element render or navigation attempt.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::check::PendingCheck;
use crate::errors::{WardenError, WardenResult};
use crate::predicate::CheckContext;
use crate::store::StoreSnapshot;

/// Conversion of declarative input into a list of predicate names.
///
/// Lets callers hand over a single name or any common sequence shape, the
/// way declarative attributes arrive from adapters.
pub trait IntoNames {
    /// Normalize into an ordered name list
    fn into_names(self) -> Vec<String>;
}

impl IntoNames for &str {
    fn into_names(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoNames for String {
    fn into_names(self) -> Vec<String> {
        vec![self]
    }
}

impl<S: Into<String>> IntoNames for Vec<S> {
    fn into_names(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<S: Into<String> + Clone> IntoNames for &[S] {
    fn into_names(self) -> Vec<String> {
        self.iter().cloned().map(Into::into).collect()
    }
}

impl<S: Into<String>, const N: usize> IntoNames for [S; N] {
    fn into_names(self) -> Vec<String> {
        self.into_iter().map(Into::into).collect()
    }
}

/// Immutable declarative input to one authorization request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PermissionMap {
    only: Vec<String>,
    except: Vec<String>,
    params: Option<Value>,
    redirect_to: Option<Value>,
}

impl PermissionMap {
    /// Start building a map
    pub fn builder() -> PermissionMapBuilder {
        PermissionMapBuilder::default()
    }

    /// Names any of which grants access (empty means no restriction)
    pub fn only(&self) -> &[String] {
        &self.only
    }

    /// Names any of which revokes access, evaluated first
    pub fn except(&self) -> &[String] {
        &self.except
    }

    /// Opaque context value passed to every predicate unchanged
    pub fn params(&self) -> Option<&Value> {
        self.params.as_ref()
    }

    /// Fallback target metadata, uninterpreted by the resolver
    pub fn redirect_to(&self) -> Option<&Value> {
        self.redirect_to.as_ref()
    }

    /// Map a name list into one [`PendingCheck`] per name.
    ///
    /// The sole coupling point between maps and the registry: construction
    /// stays cheap and synchronous, the returned checks carry the
    /// asynchronous, fallible work. An unknown name fails here so
    /// misconfiguration is caught before any predicate runs.
    pub fn resolve_property_validity(
        &self,
        names: &[String],
        snapshot: &StoreSnapshot,
        context: &CheckContext,
    ) -> WardenResult<Vec<PendingCheck>> {
        names
            .iter()
            .map(|name| {
                if !snapshot.contains(name) {
                    return Err(WardenError::unknown_permission(name.clone()));
                }
                let snapshot = snapshot.clone();
                let context = context.clone();
                let params = self.params.clone();
                let check_name = name.clone();
                Ok(PendingCheck::new(
                    name.clone(),
                    Box::pin(async move {
                        snapshot
                            .evaluate(&check_name, &context, params.as_ref())
                            .await
                    }),
                ))
            })
            .collect()
    }
}

/// Fluent constructor for [`PermissionMap`].
#[derive(Debug, Default)]
pub struct PermissionMapBuilder {
    map: PermissionMap,
}

impl PermissionMapBuilder {
    /// Set the "only" names (single name or sequence)
    pub fn only(mut self, names: impl IntoNames) -> Self {
        self.map.only = names.into_names();
        self
    }

    /// Set the "except" names (single name or sequence)
    pub fn except(mut self, names: impl IntoNames) -> Self {
        self.map.except = names.into_names();
        self
    }

    /// Set the opaque params value
    pub fn params(mut self, params: Value) -> Self {
        self.map.params = Some(params);
        self
    }

    /// Set the redirect target metadata
    pub fn redirect_to(mut self, target: Value) -> Self {
        self.map.redirect_to = Some(target);
        self
    }

    /// Finish the map
    pub fn build(self) -> PermissionMap {
        self.map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PredicateStore;
    use serde_json::json;

    #[test]
    fn builder_normalizes_single_names_and_sequences() {
        let from_single = PermissionMap::builder().only("USER").build();
        let from_vec = PermissionMap::builder().only(vec!["USER"]).build();
        let from_array = PermissionMap::builder().only(["USER"]).build();

        assert_eq!(from_single, from_vec);
        assert_eq!(from_vec, from_array);
        assert_eq!(from_single.only(), ["USER".to_string()]);
    }

    #[test]
    fn equality_spans_all_four_fields() {
        let base = PermissionMap::builder()
            .only(["USER"])
            .except(["BANNED"])
            .params(json!({"foo": true}))
            .redirect_to(json!("login"))
            .build();
        let same = PermissionMap::builder()
            .only(["USER"])
            .except(["BANNED"])
            .params(json!({"foo": true}))
            .redirect_to(json!("login"))
            .build();
        let different_params = PermissionMap::builder()
            .only(["USER"])
            .except(["BANNED"])
            .params(json!({"foo": false}))
            .redirect_to(json!("login"))
            .build();

        assert_eq!(base, same);
        assert_ne!(base, different_params);
    }

    #[test]
    fn empty_name_list_yields_no_checks() {
        let store = PredicateStore::new();
        let map = PermissionMap::builder().build();

        let checks = map
            .resolve_property_validity(map.only(), &store.snapshot(), &CheckContext::new())
            .unwrap();
        assert!(checks.is_empty());
    }

    #[test]
    fn unknown_name_fails_before_any_predicate_runs() {
        let store = PredicateStore::new();
        store.define_fn("USER", |_, _, _| true).unwrap();
        let map = PermissionMap::builder().only(["USER", "GHOST"]).build();

        let err = map
            .resolve_property_validity(map.only(), &store.snapshot(), &CheckContext::new())
            .unwrap_err();
        assert_eq!(err, WardenError::unknown_permission("GHOST"));
    }

    #[tokio::test]
    async fn checks_carry_the_map_params() {
        let store = PredicateStore::new();
        store
            .define_fn("USER", |_, _, params: Option<&Value>| params.is_some())
            .unwrap();
        let map = PermissionMap::builder()
            .only(["USER"])
            .params(json!({"foo": true}))
            .build();

        let checks = map
            .resolve_property_validity(map.only(), &store.snapshot(), &CheckContext::new())
            .unwrap();
        assert_eq!(checks.len(), 1);
        assert_eq!(checks[0].name(), "USER");
    }
}
