//! Subcommand execution

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use webpilot_common::config::AutomationConfig;
use webpilot_common::Command;

use crate::handlers::HandlerRegistry;
use crate::output;
use crate::pipeline::{Interpretation, Interpreter};

fn load_config(path: Option<&Path>) -> Result<AutomationConfig> {
    match path {
        Some(path) => AutomationConfig::load_from(path),
        None => AutomationConfig::load(),
    }
}

pub fn plan(
    config_path: Option<&Path>,
    text: &[String],
    json: bool,
    date: Option<NaiveDate>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let interpreter = Interpreter::new()?;
    let command = Command::new(text.join(" "));
    let today = date.unwrap_or_else(|| Local::now().date_naive());

    let interpretation = interpreter.interpret(&command, &config, today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&interpretation)?);
        return Ok(());
    }

    match &interpretation {
        Interpretation::Plan {
            intent,
            entities,
            plan,
        } => output::display_plan(&command, *intent, entities, plan),
        Interpretation::NoPlan(reason) => output::display_no_plan(&command, reason),
    }
    Ok(())
}

pub fn config(config_path: Option<&Path>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        let rendered = toml::to_string_pretty(&config).context("rendering config as TOML")?;
        println!("{rendered}");
    }
    Ok(())
}

pub fn check(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    config.validate()?;
    output::display_ok(&format!(
        "configuration valid: {} website(s), {} intent rule(s)",
        config.websites.len(),
        config.intent_rules.len()
    ));

    HandlerRegistry::new().verify()?;
    output::display_ok("handler registry covers every intent");
    Ok(())
}
