//! Execution reporting - per-step and plan-level outcomes
//!
//! The engine records one `StepRecord` per attempted step. A plan either runs
//! to completion or is aborted at the first failed `required` step; steps
//! after an abort are never attempted and get no record.

use crate::action::ActionKind;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal status of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Succeeded,
    SucceededViaFallback,
    /// Best-effort step failed; execution continued
    Skipped,
    /// Required step failed; plan aborted
    Failed,
}

/// Plan-level status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Completed,
    Aborted,
}

/// Opaque reference to a captured diagnostic artifact (snapshot, serialized
/// page state). The driver owns the artifact; this is only the handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRef {
    pub id: Uuid,
    /// Driver-assigned label, e.g. a file name
    pub label: String,
}

impl DiagnosticRef {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: label.into(),
        }
    }
}

/// Outcome of one attempted step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub index: usize,
    pub action: ActionKind,
    pub status: StepStatus,

    /// Which fallback path produced success, when not the primary one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<DiagnosticRef>,
}

/// Aggregate result of executing one plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionReport {
    pub status: PlanStatus,
    pub steps: Vec<StepRecord>,
}

impl ExecutionReport {
    pub fn succeeded(&self) -> bool {
        self.status == PlanStatus::Completed
    }

    /// The diagnostic captured at the point of failure, if any.
    pub fn failure_diagnostic(&self) -> Option<&DiagnosticRef> {
        self.steps
            .iter()
            .rev()
            .find(|s| s.status == StepStatus::Failed)
            .and_then(|s| s.diagnostic.as_ref())
    }

    pub fn counts(&self) -> (usize, usize, usize) {
        let ok = self
            .steps
            .iter()
            .filter(|s| {
                matches!(
                    s.status,
                    StepStatus::Succeeded | StepStatus::SucceededViaFallback
                )
            })
            .count();
        let skipped = self
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Skipped)
            .count();
        let failed = self
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Failed)
            .count();
        (ok, skipped, failed)
    }
}
