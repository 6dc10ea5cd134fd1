//! Interpretation pipeline - command text in, validated action plan out
//!
//! Glues the extractor, the classifier and the handler registry. "No plan"
//! is a value, not an error: unrecognized input and missing entities come
//! back as `Interpretation::NoPlan` so callers cannot confuse an expected
//! dead end with a wiring defect. Only non-recoverable `PlanError`s propagate.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};
use webpilot_common::action::ActionPlan;
use webpilot_common::config::AutomationConfig;
use webpilot_common::entity::{EntityKey, EntityMap};
use webpilot_common::error::PlanError;
use webpilot_common::intent::Intent;
use webpilot_common::Command;

use crate::entities::Extractor;
use crate::handlers::{HandlerRegistry, PlanContext};
use crate::intent_router;

/// Why a command produced no plan. All of these are expected outcomes of
/// free-text input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum NoPlanReason {
    /// Nothing left after normalization
    EmptyCommand,
    /// No intent rule matched
    Unrecognized,
    /// The intent matched but a required slot could not be extracted
    MissingEntity { intent: Intent, entity: EntityKey },
}

impl std::fmt::Display for NoPlanReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoPlanReason::EmptyCommand => write!(f, "the command is empty"),
            NoPlanReason::Unrecognized => write!(f, "no intent rule matched the command"),
            NoPlanReason::MissingEntity { intent, entity } => write!(
                f,
                "intent '{intent}' needs '{entity}' which could not be extracted"
            ),
        }
    }
}

/// Outcome of interpreting one command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", untagged)]
pub enum Interpretation {
    Plan {
        intent: Intent,
        entities: EntityMap,
        plan: ActionPlan,
    },
    NoPlan(NoPlanReason),
}

impl Interpretation {
    pub fn plan(&self) -> Option<&ActionPlan> {
        match self {
            Interpretation::Plan { plan, .. } => Some(plan),
            Interpretation::NoPlan(_) => None,
        }
    }
}

/// One-time-constructed interpreter: compiled extraction patterns plus the
/// handler dispatch table.
pub struct Interpreter {
    extractor: Extractor,
    registry: HandlerRegistry,
}

impl Interpreter {
    pub fn new() -> Result<Self> {
        let registry = HandlerRegistry::new();
        registry.verify()?;
        Ok(Self {
            extractor: Extractor::new()?,
            registry,
        })
    }

    /// Interpret one command against the given configuration and reference
    /// date. Deterministic: same inputs, same interpretation.
    pub fn interpret(
        &self,
        command: &Command,
        config: &AutomationConfig,
        today: NaiveDate,
    ) -> Result<Interpretation, PlanError> {
        if command.is_empty() {
            return Ok(Interpretation::NoPlan(NoPlanReason::EmptyCommand));
        }

        let entities = self.extractor.extract(command, today, config);
        debug!(command = %command.normalized, slots = entities.len(), "extracted entities");

        let intent = intent_router::classify(&command.normalized, &entities, &config.intent_rules);
        if intent == Intent::Unrecognized {
            info!(command = %command.normalized, "no intent rule matched");
            return Ok(Interpretation::NoPlan(NoPlanReason::Unrecognized));
        }
        info!(%intent, command = %command.normalized, "classified command");

        let ctx = PlanContext { config, today };
        let plan = match self.registry.handle(intent, command, &entities, &ctx) {
            Ok(plan) => plan,
            Err(PlanError::MissingRequiredEntity { intent, entity }) => {
                info!(%intent, %entity, "required entity missing, no plan");
                return Ok(Interpretation::NoPlan(NoPlanReason::MissingEntity {
                    intent,
                    entity,
                }));
            }
            Err(err) => return Err(err),
        };

        // A handler emitting an invalid plan is a defect, not user input.
        plan.validate()?;
        debug!(steps = plan.len(), "synthesized action plan");

        Ok(Interpretation::Plan {
            intent,
            entities,
            plan,
        })
    }
}
