//! Authorization resolver
//!
//! The two-phase state machine consuming a [`PermissionMap`]'s pending
//! checks:
//!
//! ```text
//! Start → (has except?) → EvaluatingExcept → any granted → Unauthorized
//!                               │ all denied
//!        (has only?) ──────────┘
//!             │ no            │ yes
//!        Authorized      EvaluatingOnly → any granted → Authorized
//!                               │ all denied → Unauthorized
//! ```
//!
//! Within a phase every check is dispatched together and raced for the
//! first grant; once a grant settles, the remaining in-flight checks are
//! dropped and cannot affect the delivered outcome. Across phases the
//! except phase always settles fully before the only phase starts. No
//! ordering is guaranteed among checks within one phase, and the core
//! imposes no timeout: a predicate that never settles stalls the
//! resolution, which callers must bound themselves.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use tracing::debug;

use crate::check::{AuthorizationOutcome, CheckVerdict, Denial, PendingCheck};
use crate::errors::WardenResult;
use crate::map::PermissionMap;
use crate::predicate::CheckContext;
use crate::store::PredicateStore;

/// Resolves permission maps into terminal authorization outcomes.
#[derive(Debug, Clone)]
pub struct Authorizer {
    store: Arc<PredicateStore>,
}

impl Authorizer {
    /// Create a resolver over the given registry
    pub fn new(store: Arc<PredicateStore>) -> Self {
        Self { store }
    }

    /// The registry this resolver reads from
    pub fn store(&self) -> &PredicateStore {
        &self.store
    }

    /// Resolve a map with an empty invocation context
    pub async fn authorize(&self, map: &PermissionMap) -> WardenResult<AuthorizationOutcome> {
        self.authorize_in(map, &CheckContext::default()).await
    }

    /// Resolve a map with adapter-supplied invocation context.
    ///
    /// Captures a registry snapshot up front; definitions added or replaced
    /// while this call is in flight do not affect it. Unknown names in
    /// either list abort with `UnknownPermission` rather than folding into
    /// a denial.
    pub async fn authorize_in(
        &self,
        map: &PermissionMap,
        context: &CheckContext,
    ) -> WardenResult<AuthorizationOutcome> {
        let snapshot = self.store.snapshot();

        // Except phase: any grant revokes access outright.
        if !map.except().is_empty() {
            debug!(names = ?map.except(), "Evaluating except phase");
            let checks = map.resolve_property_validity(map.except(), &snapshot, context)?;
            if let RaceOutcome::Granted { name } = race_for_grant(checks).await? {
                debug!(name = %name, "Except check matched, access revoked");
                return Ok(AuthorizationOutcome::Unauthorized {
                    denial: Denial::Revoked { name },
                });
            }
        }

        // Only phase: an empty list imposes no restriction (default allow).
        if map.only().is_empty() {
            debug!("No only constraint, access authorized by default");
            return Ok(AuthorizationOutcome::Authorized { granted_by: None });
        }

        debug!(names = ?map.only(), "Evaluating only phase");
        let checks = map.resolve_property_validity(map.only(), &snapshot, context)?;
        match race_for_grant(checks).await? {
            RaceOutcome::Granted { name } => {
                debug!(name = %name, "Only check granted, access authorized");
                Ok(AuthorizationOutcome::Authorized {
                    granted_by: Some(name),
                })
            }
            RaceOutcome::AllDenied(denial) => {
                debug!(name = %denial.name(), "Every only check denied, access unauthorized");
                Ok(AuthorizationOutcome::Unauthorized { denial })
            }
            // Unreachable given the is_empty guard above, kept total.
            RaceOutcome::Empty => Ok(AuthorizationOutcome::Authorized { granted_by: None }),
        }
    }
}

/// How one phase's race settled.
enum RaceOutcome {
    /// Some check granted; the rest were abandoned
    Granted { name: String },
    /// Every check denied; carries the last denial to settle
    AllDenied(Denial),
    /// The phase had no checks (vacuously passed)
    Empty,
}

/// Race a phase's checks for the first grant.
///
/// All checks are dispatched together; the first to settle granted wins and
/// the remaining futures are dropped. If every check settles denied, the
/// last-settled denial is the aggregate failure. Misconfiguration from any
/// check aborts the race.
async fn race_for_grant(checks: Vec<PendingCheck>) -> WardenResult<RaceOutcome> {
    let mut in_flight: FuturesUnordered<_> =
        checks.into_iter().map(PendingCheck::settle).collect();

    let mut last_denial = None;
    while let Some(settled) = in_flight.next().await {
        match settled? {
            CheckVerdict::Granted { name } => return Ok(RaceOutcome::Granted { name }),
            CheckVerdict::Denied(denial) => last_denial = Some(denial),
        }
    }

    Ok(match last_denial {
        Some(denial) => RaceOutcome::AllDenied(denial),
        None => RaceOutcome::Empty,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn sleepy_check(name: &str, granted: bool, delay: Duration) -> PendingCheck {
        PendingCheck::new(
            name.to_string(),
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                Ok(granted)
            }),
        )
    }

    fn stuck_check(name: &str) -> PendingCheck {
        PendingCheck::new(name.to_string(), Box::pin(futures::future::pending()))
    }

    #[tokio::test]
    async fn empty_phase_is_vacuous() {
        match race_for_grant(Vec::new()).await.unwrap() {
            RaceOutcome::Empty => {}
            _ => panic!("expected vacuous pass"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_grant_wins_and_abandons_the_rest() {
        let checks = vec![
            stuck_check("STUCK"),
            sleepy_check("SLOW", true, Duration::from_secs(5)),
            sleepy_check("FAST", true, Duration::from_millis(1)),
        ];

        match race_for_grant(checks).await.unwrap() {
            RaceOutcome::Granted { name } => assert_eq!(name, "FAST"),
            _ => panic!("expected a grant"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn all_denied_attributes_the_last_to_settle() {
        let checks = vec![
            sleepy_check("EARLY", false, Duration::from_millis(1)),
            sleepy_check("LATE", false, Duration::from_millis(50)),
        ];

        match race_for_grant(checks).await.unwrap() {
            RaceOutcome::AllDenied(denial) => assert_eq!(denial.name(), "LATE"),
            _ => panic!("expected aggregate denial"),
        }
    }

    #[tokio::test]
    async fn misconfiguration_aborts_the_race() {
        let checks = vec![
            sleepy_check("OK", false, Duration::from_millis(1)),
            PendingCheck::new(
                "BROKEN".to_string(),
                Box::pin(async {
                    Err(crate::errors::WardenError::unknown_permission("MEMBER"))
                }),
            ),
        ];

        assert!(race_for_grant(checks).await.is_err());
    }
}
