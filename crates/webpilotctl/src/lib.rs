//! webpilotctl - free-text command interpretation and resilient plan execution
//!
//! The pipeline half (`entities`, `intent_router`, `handlers`, `pipeline`)
//! turns one normalized command into one validated `ActionPlan`. The engine
//! half (`driver`, `resilience`, `executor`) runs such a plan against any
//! `UiDriver` implementation the embedding application supplies.

pub mod cli;
pub mod commands;
pub mod driver;
pub mod entities;
pub mod executor;
pub mod handlers;
pub mod intent_router;
pub mod output;
pub mod pipeline;
pub mod resilience;

pub use driver::{DriverError, InteractionMode, NodeHandle, Rect, UiDriver};
pub use executor::ExecutionEngine;
pub use handlers::{HandlerRegistry, PlanContext};
pub use pipeline::{Interpretation, Interpreter, NoPlanReason};
