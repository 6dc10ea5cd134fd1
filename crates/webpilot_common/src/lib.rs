//! Webpilot Common - Shared types and schemas for the webpilot workspace
//!
//! Everything the interpreter and the execution engine exchange lives here:
//! the command/intent/entity data model, the action-plan schema, execution
//! reports, the error taxonomy, and the read-only automation configuration.

pub mod action;
pub mod command;
pub mod config;
pub mod dates;
pub mod entity;
pub mod error;
pub mod intent;
pub mod report;

pub use action::{ActionKind, ActionPlan, ActionStep, Criticality, Locator, Target};
pub use command::Command;
pub use config::AutomationConfig;
pub use entity::{EntityKey, EntityMap, EntityValue};
pub use error::{ExecError, PlanError};
pub use intent::Intent;
pub use report::{DiagnosticRef, ExecutionReport, PlanStatus, StepRecord, StepStatus};
