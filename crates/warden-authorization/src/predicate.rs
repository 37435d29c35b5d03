//! Named capability predicates
//!
//! A predicate is the unit of authorization logic: given the name it was
//! invoked under, the per-invocation [`CheckContext`], and the permission
//! map's opaque `params`, it answers whether the capability holds. A
//! predicate may answer immediately or suspend on I/O; the resolver treats
//! both uniformly.

use std::collections::HashMap;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::errors::WardenResult;

/// Per-invocation context handed to every predicate unchanged.
///
/// Adapters put whatever the surrounding request carries in here (routing
/// transition properties, the element being rendered, ...). It is scoped to
/// one `authorize` call and never part of [`crate::PermissionMap`] equality.
#[derive(Debug, Clone, Default)]
pub struct CheckContext {
    /// Additional context data
    pub context_data: HashMap<String, Value>,
}

impl CheckContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a context entry
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.context_data.insert(key.into(), value);
        self
    }

    /// Look up a context entry
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.context_data.get(key)
    }
}

/// A pluggable capability check bound to a name in the registry.
///
/// Returning `Ok(false)` is an ordinary denial. Returning `Err` signals the
/// predicate itself failed (backend unreachable, malformed params, ...) and
/// is surfaced as a denial-with-reason, distinct from `Ok(false)`.
#[async_trait]
pub trait Predicate: Send + Sync {
    /// Evaluate whether the named capability holds.
    async fn evaluate(
        &self,
        name: &str,
        context: &CheckContext,
        params: Option<&Value>,
    ) -> WardenResult<bool>;
}

/// Adapter: a plain synchronous closure as a predicate.
pub(crate) struct FnPredicate<F> {
    check: F,
}

impl<F> FnPredicate<F> {
    pub(crate) fn new(check: F) -> Self {
        Self { check }
    }
}

#[async_trait]
impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&str, &CheckContext, Option<&Value>) -> bool + Send + Sync,
{
    async fn evaluate(
        &self,
        name: &str,
        context: &CheckContext,
        params: Option<&Value>,
    ) -> WardenResult<bool> {
        Ok((self.check)(name, context, params))
    }
}

/// Adapter: a closure producing a boxed future as a predicate.
///
/// The closure must clone whatever it needs out of its arguments before
/// building the future; the future itself owns its state.
pub(crate) struct AsyncFnPredicate<F> {
    check: F,
}

impl<F> AsyncFnPredicate<F> {
    pub(crate) fn new(check: F) -> Self {
        Self { check }
    }
}

#[async_trait]
impl<F> Predicate for AsyncFnPredicate<F>
where
    F: Fn(&str, &CheckContext, Option<&Value>) -> BoxFuture<'static, WardenResult<bool>>
        + Send
        + Sync,
{
    async fn evaluate(
        &self,
        name: &str,
        context: &CheckContext,
        params: Option<&Value>,
    ) -> WardenResult<bool> {
        (self.check)(name, context, params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn sync_closure_resolves_immediately() {
        let predicate = FnPredicate::new(|_name: &str, _ctx: &CheckContext, params: Option<&Value>| params.is_some());
        let ctx = CheckContext::new();

        assert!(predicate
            .evaluate("USER", &ctx, Some(&json!({"foo": true})))
            .await
            .unwrap());
        assert!(!predicate.evaluate("USER", &ctx, None).await.unwrap());
    }

    #[tokio::test]
    async fn async_closure_sees_cloned_params() {
        let predicate = AsyncFnPredicate::new(|_name: &str, _ctx: &CheckContext, params: Option<&Value>| {
            let granted = params.map(|p| p["foo"] == json!(true)).unwrap_or(false);
            Box::pin(async move { Ok(granted) }) as BoxFuture<'static, WardenResult<bool>>
        });
        let ctx = CheckContext::new();

        assert!(predicate
            .evaluate("AUTHORIZED", &ctx, Some(&json!({"foo": true})))
            .await
            .unwrap());
    }

    #[test]
    fn context_entries_round_trip() {
        let ctx = CheckContext::new().with("route", json!("/admin"));
        assert_eq!(ctx.get("route"), Some(&json!("/admin")));
        assert_eq!(ctx.get("missing"), None);
    }
}
