//! Unified error system for Warden
//!
//! A single error type covering every failure the workspace surfaces.
//! Authorization *denial* is not an error and never appears here; denial is
//! an ordinary outcome delivered by the resolver. These variants cover
//! misconfiguration and mechanical failure only.

use serde::{Deserialize, Serialize};

/// Unified error type for all Warden operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum WardenError {
    /// A permission or role name with no registered definition
    #[error("Unknown permission: {name}")]
    UnknownPermission {
        /// The name that failed lookup
        name: String,
    },

    /// Strict-mode registration collided with an existing definition
    #[error("Duplicate definition: {name}")]
    DuplicateDefinition {
        /// The name that was already defined
        name: String,
    },

    /// Invalid input or definition (empty member list, cyclic composite, ...)
    #[error("Invalid: {message}")]
    Invalid {
        /// Error message describing the invalid input
        message: String,
    },

    /// A predicate failed for a reason other than returning false
    #[error("Predicate evaluation failed: {message}")]
    Evaluation {
        /// Error message describing the predicate failure
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl WardenError {
    /// Create an unknown permission error
    pub fn unknown_permission(name: impl Into<String>) -> Self {
        Self::UnknownPermission { name: name.into() }
    }

    /// Create a duplicate definition error
    pub fn duplicate_definition(name: impl Into<String>) -> Self {
        Self::DuplicateDefinition { name: name.into() }
    }

    /// Create an invalid input error
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    /// Create a predicate evaluation error
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error marks misconfiguration rather than a runtime
    /// predicate failure. Misconfiguration aborts a resolution outright;
    /// everything else is folded into a denial-with-reason.
    pub fn is_misconfiguration(&self) -> bool {
        matches!(
            self,
            Self::UnknownPermission { .. } | Self::DuplicateDefinition { .. } | Self::Invalid { .. }
        )
    }
}

/// Standard Result type for Warden operations
pub type WardenResult<T> = std::result::Result<T, WardenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_the_offending_name() {
        let err = WardenError::unknown_permission("MANAGER");
        assert_eq!(err.to_string(), "Unknown permission: MANAGER");
    }

    #[test]
    fn misconfiguration_classification() {
        assert!(WardenError::unknown_permission("X").is_misconfiguration());
        assert!(WardenError::invalid("cycle").is_misconfiguration());
        assert!(WardenError::duplicate_definition("X").is_misconfiguration());
        assert!(!WardenError::evaluation("backend down").is_misconfiguration());
        assert!(!WardenError::internal("broken").is_misconfiguration());
    }
}
