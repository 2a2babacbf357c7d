//! Error types for grant checks
//!
//! A failed check is distinct from a denied one: `Ok(false)` means the
//! role was determined not to hold the permission, while an `Err` means the
//! outcome could not be determined at all.

use thiserror::Error;

/// Failure signalled by a condition, either through its completion handle
/// or by resolving its future to an error.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConditionError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl ConditionError {
    /// Create a condition error with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error (database lookup, remote call, ...).
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The message this condition failed with.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Grant check error types.
#[derive(Debug, Error)]
pub enum GrantError {
    /// A condition on the evaluated path failed
    #[error("Condition failed: {0}")]
    ConditionFailed(#[from] ConditionError),

    /// The rule graph reachable from the checked role contains a cycle
    #[error("Cyclic rule graph: {}", .cycle.join(" -> "))]
    CyclicRuleGraph {
        /// Identifiers forming the cycle, first and last being equal.
        cycle: Vec<String>,
    },
}

/// Result type for grant operations.
pub type GrantResult<T> = Result<T, GrantError>;

impl GrantError {
    /// Check if this error came from a rule condition.
    pub fn is_condition_failure(&self) -> bool {
        matches!(self, GrantError::ConditionFailed(_))
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            GrantError::ConditionFailed(_) => "CONDITION_FAILED",
            GrantError::CyclicRuleGraph { .. } => "CYCLIC_RULE_GRAPH",
        }
    }
}
