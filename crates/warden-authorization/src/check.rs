//! Pending checks and resolution outcomes
//!
//! A [`PendingCheck`] is one unit of in-flight work tied to one predicate
//! name; it exists only for the duration of a single resolution. Settlement
//! normalizes the predicate's answer into a [`CheckVerdict`], and the
//! resolver combines verdicts into one terminal [`AuthorizationOutcome`].

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::WardenResult;

/// Why a resolution ended Unauthorized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Denial {
    /// A name in the `except` list matched, revoking access
    Revoked {
        /// The except-listed predicate that granted
        name: String,
    },

    /// Every `only` check denied; attribution is the last check to settle
    Refused {
        /// The last-settling predicate that returned false
        name: String,
    },

    /// A predicate failed for a reason other than returning false
    Failed {
        /// The predicate that failed
        name: String,
        /// Human-readable failure reason
        reason: String,
    },
}

impl Denial {
    /// The predicate name this denial is attributed to
    pub fn name(&self) -> &str {
        match self {
            Self::Revoked { name } | Self::Refused { name } | Self::Failed { name, .. } => name,
        }
    }
}

/// Terminal outcome of one resolution call, delivered exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthorizationOutcome {
    /// Access granted
    Authorized {
        /// The granting predicate, or `None` for default allow (empty `only`)
        granted_by: Option<String>,
    },

    /// Access denied, with attribution
    Unauthorized {
        /// Which check caused the denial, and how
        denial: Denial,
    },
}

impl AuthorizationOutcome {
    /// Whether access was granted
    pub fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized { .. })
    }

    /// The granting predicate name, if any
    pub fn granted_by(&self) -> Option<&str> {
        match self {
            Self::Authorized { granted_by } => granted_by.as_deref(),
            Self::Unauthorized { .. } => None,
        }
    }

    /// The denial, if access was refused
    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Authorized { .. } => None,
            Self::Unauthorized { denial } => Some(denial),
        }
    }
}

/// How one check settled within a phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CheckVerdict {
    /// The predicate granted
    Granted {
        /// The granting predicate
        name: String,
    },
    /// The predicate denied (refusal or evaluation failure)
    Denied(Denial),
}

/// One asynchronous unit of work for one predicate name.
pub struct PendingCheck {
    name: String,
    work: BoxFuture<'static, WardenResult<bool>>,
}

impl PendingCheck {
    pub(crate) fn new(name: String, work: BoxFuture<'static, WardenResult<bool>>) -> Self {
        Self { name, work }
    }

    /// The predicate name this check is bound to
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Drive the check to completion and normalize its answer.
    ///
    /// Misconfiguration (unknown names inside composites, cyclic
    /// definitions) aborts the resolution; any other predicate failure is a
    /// denial-with-reason so callers can tell it apart from an ordinary
    /// `false`.
    pub(crate) async fn settle(self) -> WardenResult<CheckVerdict> {
        match self.work.await {
            Ok(true) => Ok(CheckVerdict::Granted { name: self.name }),
            Ok(false) => Ok(CheckVerdict::Denied(Denial::Refused { name: self.name })),
            Err(err) if err.is_misconfiguration() => Err(err),
            Err(err) => {
                warn!(name = %self.name, error = %err, "Predicate evaluation failed");
                Ok(CheckVerdict::Denied(Denial::Failed {
                    name: self.name,
                    reason: err.to_string(),
                }))
            }
        }
    }
}

impl std::fmt::Debug for PendingCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingCheck")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
