//! Execution engine - runs validated action plans against a UiDriver
//!
//! Steps run strictly in order. Each interacting step goes through the same
//! state machine: resolve the target over its ordered locator strategies,
//! wait for it to become actionable, check the geometric center for
//! obstruction (with one overlay-clearing pass), then walk the interaction
//! fallback chain. A failed `required` step captures a diagnostic and aborts
//! the rest of the plan; a failed `best-effort` step is recorded and skipped.

use std::time::Duration;

use tracing::{debug, info, warn};
use webpilot_common::action::{ActionKind, ActionPlan, ActionStep, Criticality, Locator, Target};
use webpilot_common::config::{AutomationConfig, EngineConfig};
use webpilot_common::error::{ExecError, PlanError};
use webpilot_common::report::{
    DiagnosticRef, ExecutionReport, PlanStatus, StepRecord, StepStatus,
};

use crate::driver::{DriverError, InteractionMode, NodeHandle, UiDriver};
use crate::resilience::{settle_network, wait_until, WaitError};

/// What a successful step leaves behind.
struct StepOutcome {
    /// The interaction mode that worked, when it was not the primary one
    fallback: Option<String>,
    diagnostic: Option<DiagnosticRef>,
}

impl StepOutcome {
    fn clean() -> Self {
        Self {
            fallback: None,
            diagnostic: None,
        }
    }
}

/// Sequences one plan at a time over an exclusively-held driver session.
pub struct ExecutionEngine<D: UiDriver> {
    driver: D,
    engine: EngineConfig,
    overlay_dismissors: Vec<Locator>,
}

impl<D: UiDriver> ExecutionEngine<D> {
    pub fn new(driver: D, config: &AutomationConfig) -> Self {
        Self {
            driver,
            engine: config.engine,
            overlay_dismissors: config.overlay_dismissors.clone(),
        }
    }

    /// Hand the session back to the embedder.
    pub fn into_driver(self) -> D {
        self.driver
    }

    pub async fn execute(&mut self, plan: &ActionPlan) -> Result<ExecutionReport, PlanError> {
        plan.validate()?;

        let mut steps = Vec::with_capacity(plan.len());
        for (index, step) in plan.steps.iter().enumerate() {
            debug!(index, action = step.action.as_str(), "running step");

            match self.run_step(step).await {
                Ok(outcome) => {
                    if let Some(mode) = &outcome.fallback {
                        info!(index, mode, "step succeeded via fallback");
                    }
                    steps.push(StepRecord {
                        index,
                        action: step.action.clone(),
                        status: match outcome.fallback {
                            Some(_) => StepStatus::SucceededViaFallback,
                            None => StepStatus::Succeeded,
                        },
                        fallback: outcome.fallback,
                        error: None,
                        diagnostic: outcome.diagnostic,
                    });
                }
                Err(err) if step.criticality == Criticality::BestEffort => {
                    warn!(index, %err, "best-effort step failed, continuing");
                    steps.push(StepRecord {
                        index,
                        action: step.action.clone(),
                        status: StepStatus::Skipped,
                        fallback: None,
                        error: Some(err.to_string()),
                        diagnostic: None,
                    });
                }
                Err(err) => {
                    warn!(index, %err, "required step failed, aborting plan");
                    let diagnostic = self
                        .driver
                        .capture_state(&format!("step-{index}-failure"))
                        .await
                        .ok();
                    steps.push(StepRecord {
                        index,
                        action: step.action.clone(),
                        status: StepStatus::Failed,
                        fallback: None,
                        error: Some(err.to_string()),
                        diagnostic,
                    });
                    return Ok(ExecutionReport {
                        status: PlanStatus::Aborted,
                        steps,
                    });
                }
            }
        }

        Ok(ExecutionReport {
            status: PlanStatus::Completed,
            steps,
        })
    }

    async fn run_step(&mut self, step: &ActionStep) -> Result<StepOutcome, ExecError> {
        match &step.action {
            ActionKind::Wait => {
                // Validation guarantees timeout_ms; stay safe anyway
                let ms = step.timeout_ms.unwrap_or(0);
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(StepOutcome::clean())
            }
            ActionKind::Navigate => {
                let url = step.value.as_deref().unwrap_or("");
                self.driver
                    .navigate(url)
                    .await
                    .map_err(|e| ExecError::NavigationFailure(e.to_string()))?;
                let budget = step.timeout_ms.unwrap_or(self.engine.navigation_timeout_ms);
                settle_network(
                    &mut self.driver,
                    Duration::from_millis(budget),
                    Duration::from_millis(self.engine.poll_interval_ms),
                    Duration::from_millis(self.engine.settle_buffer_ms),
                )
                .await
                .map_err(|e| ExecError::NavigationFailure(e.to_string()))?;
                Ok(StepOutcome::clean())
            }
            ActionKind::CaptureState => {
                let label = step.value.as_deref().unwrap_or("capture");
                let diagnostic = self
                    .driver
                    .capture_state(label)
                    .await
                    .map_err(|e| ExecError::Driver(e.to_string()))?;
                Ok(StepOutcome {
                    fallback: None,
                    diagnostic: Some(diagnostic),
                })
            }
            ActionKind::Fill | ActionKind::Click | ActionKind::PressKey => {
                self.run_interaction(step).await
            }
            ActionKind::Custom(kind) => {
                // Unreachable past validation
                Err(ExecError::Driver(format!("unsupported action '{kind}'")))
            }
        }
    }

    async fn run_interaction(&mut self, step: &ActionStep) -> Result<StepOutcome, ExecError> {
        let target = step
            .selector
            .as_ref()
            .ok_or(ExecError::TargetNotResolved)?;

        let node = self.resolve_target(target).await?;

        let stability_budget = step.timeout_ms.unwrap_or(self.engine.stability_timeout_ms);
        self.wait_actionable(node, stability_budget).await?;

        // One obstruction-clearing pass, then re-check. A still-obstructed
        // target is not a failure yet: the later fallback modes do not go
        // through hit-testing.
        let mut obstructed = self.obstruction_at_center(node).await?.is_some();
        if obstructed {
            debug!("target center obstructed, attempting overlay dismissal");
            self.dismiss_overlays().await;
            self.wait_actionable(node, stability_budget).await?;
            obstructed = self.obstruction_at_center(node).await?.is_some();
        }

        let budget = Duration::from_millis(self.engine.interaction_timeout_ms);
        let mut last_error = None;
        for mode in InteractionMode::CHAIN {
            let attempt = match &step.action {
                ActionKind::Click => self.driver.click(node, mode, budget).await,
                ActionKind::Fill => {
                    let text = step.value.as_deref().unwrap_or("");
                    self.driver.fill(node, text, mode, budget).await
                }
                ActionKind::PressKey => {
                    let key = step.key.as_deref().unwrap_or("");
                    self.driver.press(node, key, mode, budget).await
                }
                _ => unreachable!("run_interaction only sees interacting kinds"),
            };

            match attempt {
                Ok(()) => {
                    return Ok(StepOutcome {
                        fallback: (mode != InteractionMode::Direct)
                            .then(|| mode.as_str().to_string()),
                        diagnostic: None,
                    })
                }
                Err(err) if err.is_fallback_eligible() => {
                    debug!(mode = mode.as_str(), %err, "interaction mode failed");
                    last_error = Some(err);
                }
                Err(err) => return Err(ExecError::Driver(err.to_string())),
            }
        }

        if obstructed || last_error == Some(DriverError::Intercepted) {
            Err(ExecError::ObstructionPersistent)
        } else {
            Err(ExecError::ActionabilityTimeout {
                timeout_ms: self.engine.interaction_timeout_ms,
            })
        }
    }

    /// First locator strategy that resolves to exactly one live (attached and
    /// visible) element wins. Zero or ambiguous matches fall through to the
    /// next strategy.
    async fn resolve_target(&mut self, target: &Target) -> Result<NodeHandle, ExecError> {
        for locator in &target.strategies {
            let nodes = self
                .driver
                .resolve(locator)
                .await
                .map_err(|e| ExecError::Driver(e.to_string()))?;

            let mut live = Vec::new();
            for node in nodes {
                match self.driver.is_visible(node).await {
                    Ok(true) => live.push(node),
                    Ok(false) => {}
                    // A node going stale mid-scan just isn't live
                    Err(DriverError::Gone) => {}
                    Err(e) => return Err(ExecError::Driver(e.to_string())),
                }
            }

            if let [single] = live.as_slice() {
                return Ok(*single);
            }
        }
        Err(ExecError::TargetNotResolved)
    }

    /// Bounded wait for the node to be visible and enabled.
    async fn wait_actionable(&mut self, node: NodeHandle, budget_ms: u64) -> Result<(), ExecError> {
        let result = wait_until(
            &mut self.driver,
            move |d| {
                Box::pin(async move { Ok(d.is_visible(node).await? && d.is_enabled(node).await?) })
            },
            Duration::from_millis(budget_ms),
            Duration::from_millis(self.engine.poll_interval_ms),
        )
        .await;

        match result {
            Ok(()) => Ok(()),
            Err(WaitError::Timeout(_)) => Err(ExecError::ActionabilityTimeout {
                timeout_ms: budget_ms,
            }),
            Err(WaitError::Driver(e)) => Err(ExecError::Driver(e.to_string())),
        }
    }

    /// The element, if any, that would swallow an interaction aimed at the
    /// target's geometric center. The target itself and its descendants do
    /// not count as obstructions.
    async fn obstruction_at_center(
        &mut self,
        node: NodeHandle,
    ) -> Result<Option<NodeHandle>, ExecError> {
        let driver_err = |e: DriverError| ExecError::Driver(e.to_string());

        let Some(rect) = self.driver.bounding_box(node).await.map_err(driver_err)? else {
            // No layout box, nothing to hit-test
            return Ok(None);
        };
        let (x, y) = rect.center();
        let Some(top) = self.driver.node_at_point(x, y).await.map_err(driver_err)? else {
            return Ok(None);
        };
        if top == node
            || self
                .driver
                .is_descendant_of(top, node)
                .await
                .map_err(driver_err)?
        {
            return Ok(None);
        }
        Ok(Some(top))
    }

    /// Click the first visible configured dismissor, if any. Failures here
    /// are swallowed: the obstruction re-check decides what happens next.
    async fn dismiss_overlays(&mut self) {
        let dismissors = self.overlay_dismissors.clone();
        let budget = Duration::from_millis(self.engine.interaction_timeout_ms);

        for locator in &dismissors {
            let nodes = match self.driver.resolve(locator).await {
                Ok(nodes) => nodes,
                Err(_) => continue,
            };
            for node in nodes {
                if !matches!(self.driver.is_visible(node).await, Ok(true)) {
                    continue;
                }
                match self.driver.click(node, InteractionMode::Direct, budget).await {
                    Ok(()) => {
                        debug!(?locator, "dismissed an overlay");
                        return;
                    }
                    Err(_) => continue,
                }
            }
        }
    }
}
