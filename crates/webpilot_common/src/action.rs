//! Action plan schema - the primitive steps the execution engine understands
//!
//! Wire shape (consumed by the UI-driver collaborator):
//! `{ action, selector?, value?, key?, timeout_ms?, criticality }`.
//! A target's `selector` is an ordered list of locator strategies tried in
//! declared order until one resolves.

use crate::error::PlanError;
use serde::{Deserialize, Serialize};

/// Primitive operation kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Navigate,
    Fill,
    Click,
    PressKey,
    Wait,
    CaptureState,
    /// Extension seam for embedders; never produced by the built-in handlers
    /// and rejected by plan validation.
    Custom(String),
}

impl ActionKind {
    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::Navigate => "navigate",
            ActionKind::Fill => "fill",
            ActionKind::Click => "click",
            ActionKind::PressKey => "press_key",
            ActionKind::Wait => "wait",
            ActionKind::CaptureState => "capture_state",
            ActionKind::Custom(name) => name.as_str(),
        }
    }

    /// Kinds the execution engine implements.
    pub fn is_executable(&self) -> bool {
        !matches!(self, ActionKind::Custom(_))
    }
}

/// One locator strategy. Ordered from accessibility-relationship lookup down
/// to raw attribute lookup, matching how targets are resolved at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locator {
    /// Accessible-label lookup (aria-label / associated <label>)
    Label(String),
    /// Placeholder-text lookup
    Placeholder(String),
    /// Role-based contextual lookup ("button" named "Search", ...)
    Role { role: String, name: String },
    /// CSS attribute selector
    Css(String),
}

/// Ordered candidate locator strategies for one step's target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Target {
    pub strategies: Vec<Locator>,
}

impl Target {
    pub fn new(strategies: Vec<Locator>) -> Self {
        Self { strategies }
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self {
            strategies: vec![Locator::Css(selector.into())],
        }
    }

    pub fn label(text: impl Into<String>) -> Self {
        Self {
            strategies: vec![Locator::Label(text.into())],
        }
    }

    /// Append a lower-priority fallback strategy.
    pub fn or(mut self, locator: Locator) -> Self {
        self.strategies.push(locator);
        self
    }
}

/// Whether a failed step aborts the plan or is recorded and skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Criticality {
    #[default]
    Required,
    BestEffort,
}

/// A single primitive operation against the UI session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionStep {
    pub action: ActionKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<Target>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Per-step override of the engine's default wait budget
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    #[serde(default)]
    pub criticality: Criticality,
}

impl ActionStep {
    fn bare(action: ActionKind) -> Self {
        Self {
            action,
            selector: None,
            value: None,
            key: None,
            timeout_ms: None,
            criticality: Criticality::Required,
        }
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            value: Some(url.into()),
            ..Self::bare(ActionKind::Navigate)
        }
    }

    pub fn fill(target: Target, value: impl Into<String>) -> Self {
        Self {
            selector: Some(target),
            value: Some(value.into()),
            ..Self::bare(ActionKind::Fill)
        }
    }

    pub fn click(target: Target) -> Self {
        Self {
            selector: Some(target),
            ..Self::bare(ActionKind::Click)
        }
    }

    pub fn press(target: Target, key: impl Into<String>) -> Self {
        Self {
            selector: Some(target),
            key: Some(key.into()),
            ..Self::bare(ActionKind::PressKey)
        }
    }

    pub fn wait(timeout_ms: u64) -> Self {
        Self {
            timeout_ms: Some(timeout_ms),
            ..Self::bare(ActionKind::Wait)
        }
    }

    /// Request a diagnostic state capture (visual snapshot / serialized page
    /// state) tagged with `label`.
    pub fn capture(label: impl Into<String>) -> Self {
        Self {
            value: Some(label.into()),
            ..Self::bare(ActionKind::CaptureState)
        }
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn best_effort(mut self) -> Self {
        self.criticality = Criticality::BestEffort;
        self
    }
}

/// Ordered sequence of steps; order is execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionPlan {
    pub steps: Vec<ActionStep>,
}

impl ActionPlan {
    pub fn new(steps: Vec<ActionStep>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Reject plans the engine cannot run. Called by the synthesizer before a
    /// plan crosses the producer-to-engine boundary.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.steps.is_empty() {
            return Err(PlanError::EmptyPlan);
        }

        for (index, step) in self.steps.iter().enumerate() {
            if !step.action.is_executable() {
                return Err(PlanError::UnsupportedStep {
                    index,
                    kind: step.action.as_str().to_string(),
                });
            }

            let malformed = |reason: &str| PlanError::MalformedStep {
                index,
                reason: reason.to_string(),
            };

            match step.action {
                ActionKind::Navigate => {
                    if step.value.is_none() {
                        return Err(malformed("navigate requires a url value"));
                    }
                }
                ActionKind::Fill => {
                    if step.selector.is_none() || step.value.is_none() {
                        return Err(malformed("fill requires a selector and a value"));
                    }
                }
                ActionKind::Click => {
                    if step.selector.is_none() {
                        return Err(malformed("click requires a selector"));
                    }
                }
                ActionKind::PressKey => {
                    if step.selector.is_none() || step.key.is_none() {
                        return Err(malformed("press_key requires a selector and a key"));
                    }
                }
                ActionKind::Wait => {
                    if step.timeout_ms.is_none() {
                        return Err(malformed("wait requires timeout_ms"));
                    }
                }
                ActionKind::CaptureState | ActionKind::Custom(_) => {}
            }

            if let Some(target) = &step.selector {
                if target.strategies.is_empty() {
                    return Err(malformed("target has no locator strategies"));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_plan_is_rejected() {
        assert_eq!(ActionPlan::new(vec![]).validate(), Err(PlanError::EmptyPlan));
    }

    #[test]
    fn custom_kind_is_rejected() {
        let plan = ActionPlan::new(vec![ActionStep::bare(ActionKind::Custom("solve".into()))]);
        assert_eq!(
            plan.validate(),
            Err(PlanError::UnsupportedStep {
                index: 0,
                kind: "solve".to_string()
            })
        );
    }

    #[test]
    fn malformed_steps_are_rejected() {
        let plan = ActionPlan::new(vec![ActionStep::bare(ActionKind::Fill)]);
        assert!(matches!(
            plan.validate(),
            Err(PlanError::MalformedStep { index: 0, .. })
        ));

        let plan = ActionPlan::new(vec![ActionStep {
            selector: Some(Target::new(vec![])),
            ..ActionStep::bare(ActionKind::Click)
        }]);
        assert!(matches!(plan.validate(), Err(PlanError::MalformedStep { .. })));
    }

    #[test]
    fn wire_schema_matches_contract() {
        let step = ActionStep::fill(
            Target::label("Where from?").or(Locator::Css("[aria-label*='Where from?']".into())),
            "Mumbai",
        )
        .with_timeout(10_000);

        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["action"], "fill");
        assert_eq!(json["value"], "Mumbai");
        assert_eq!(json["timeout_ms"], 10_000);
        assert_eq!(json["criticality"], "required");
        assert_eq!(json["selector"][0]["label"], "Where from?");

        let back: ActionStep = serde_json::from_value(json).unwrap();
        assert_eq!(back, step);
    }

    #[test]
    fn criticality_serializes_kebab_case() {
        let step = ActionStep::capture("failure").best_effort();
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["criticality"], "best-effort");
    }
}
