//! Error taxonomy for interpretation and execution
//!
//! Interpretation failures (`UnrecognizedIntent`, `MissingRequiredEntity`) are
//! expected outcomes of free-text input and are surfaced as a `NoPlan` value
//! at the pipeline boundary, never as bubbled errors. `UnhandledIntent` is the
//! one wiring defect that must propagate as a hard error.

use crate::entity::EntityKey;
use crate::intent::Intent;
use thiserror::Error;

/// Failures while interpreting a command into an action plan.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    #[error("no intent rule matched the command")]
    UnrecognizedIntent,

    #[error("intent '{intent}' requires entity '{entity}' which was not extracted")]
    MissingRequiredEntity { intent: Intent, entity: EntityKey },

    /// Internal invariant violation: a classified intent has no handler.
    #[error("no handler registered for intent '{0}'")]
    UnhandledIntent(Intent),

    #[error("action plan has no steps")]
    EmptyPlan,

    #[error("step {index} uses action kind '{kind}' the execution engine does not understand")]
    UnsupportedStep { index: usize, kind: String },

    #[error("step {index} is malformed: {reason}")]
    MalformedStep { index: usize, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PlanError {
    /// Expected outcomes of free-text input, recovered as `NoPlan` by the
    /// pipeline. Everything else indicates a defect and propagates.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PlanError::UnrecognizedIntent | PlanError::MissingRequiredEntity { .. }
        )
    }
}

/// Failures while executing a single action step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    #[error("no locator strategy resolved to exactly one live element")]
    TargetNotResolved,

    #[error("target did not become visible and enabled within {timeout_ms}ms")]
    ActionabilityTimeout { timeout_ms: u64 },

    #[error("target stayed obstructed after overlay clearing and all interaction fallbacks")]
    ObstructionPersistent,

    #[error("navigation did not settle: {0}")]
    NavigationFailure(String),

    #[error("driver failure: {0}")]
    Driver(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_split_matches_propagation_policy() {
        assert!(PlanError::UnrecognizedIntent.is_recoverable());
        assert!(PlanError::MissingRequiredEntity {
            intent: Intent::BookFlight,
            entity: EntityKey::Origin,
        }
        .is_recoverable());

        assert!(!PlanError::UnhandledIntent(Intent::Search).is_recoverable());
        assert!(!PlanError::EmptyPlan.is_recoverable());
    }
}
