//! Terminal output - ASCII-only, bracketed status tags

use owo_colors::OwoColorize;
use webpilot_common::action::ActionPlan;
use webpilot_common::entity::EntityMap;
use webpilot_common::intent::Intent;
use webpilot_common::Command;

use crate::pipeline::NoPlanReason;

pub fn display_plan(command: &Command, intent: Intent, entities: &EntityMap, plan: &ActionPlan) {
    println!();
    println!("{} {}", "[INTENT]".bright_green(), intent.to_string().bold());
    println!("  command: {}", command.normalized);

    if !entities.is_empty() {
        println!();
        println!("[ENTITIES]");
        for (key, value) in entities.iter() {
            println!("  * {} = {:?}", key.to_string().cyan(), value);
        }
    }

    println!();
    println!("[PLAN] {} step(s)", plan.len());
    for (index, step) in plan.steps.iter().enumerate() {
        let mut line = format!("  {}. {}", index + 1, step.action.as_str());
        if let Some(value) = &step.value {
            line.push_str(&format!(" value={value:?}"));
        }
        if let Some(key) = &step.key {
            line.push_str(&format!(" key={key:?}"));
        }
        if let Some(timeout) = step.timeout_ms {
            line.push_str(&format!(" timeout={timeout}ms"));
        }
        if step.criticality == webpilot_common::action::Criticality::BestEffort {
            line.push_str(&format!(" {}", "[best-effort]".yellow()));
        }
        println!("{line}");
    }
    println!();
}

pub fn display_no_plan(command: &Command, reason: &NoPlanReason) {
    println!();
    println!("{} {}", "[NO PLAN]".yellow(), reason);
    println!("  command: {}", command.normalized);
    println!();
}

pub fn display_error(message: &str) {
    eprintln!();
    eprintln!("{} {}", "[ERROR]".red(), message);
    eprintln!();
}

pub fn display_ok(message: &str) {
    println!("{} {}", "[OK]".bright_green(), message);
}
