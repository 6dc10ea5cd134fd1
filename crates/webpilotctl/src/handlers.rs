//! Action plan synthesis - one pure handler per intent
//!
//! Handlers are plain functions of (command, entities, context): same inputs,
//! same plan, no session state and no I/O. Missing required entities surface
//! as `PlanError::MissingRequiredEntity`; selector choices all come from the
//! configuration tables so sites can be retargeted without code changes.

use std::collections::BTreeMap;

use chrono::Duration;
use webpilot_common::action::{ActionPlan, ActionStep, Locator, Target};
use webpilot_common::config::AutomationConfig;
use webpilot_common::entity::{EntityKey, EntityMap, EntityValue};
use webpilot_common::error::PlanError;
use webpilot_common::intent::Intent;
use webpilot_common::Command;

/// Read-only inputs shared by every handler invocation.
pub struct PlanContext<'a> {
    pub config: &'a AutomationConfig,
    /// Reference date for relative-date fallbacks
    pub today: chrono::NaiveDate,
}

pub type Handler = for<'a> fn(&Command, &EntityMap, &PlanContext<'a>) -> Result<ActionPlan, PlanError>;

/// Intent-to-handler dispatch table.
pub struct HandlerRegistry {
    handlers: BTreeMap<Intent, Handler>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        let mut handlers: BTreeMap<Intent, Handler> = BTreeMap::new();
        handlers.insert(Intent::Navigate, handle_navigate);
        handlers.insert(Intent::Search, handle_search);
        handlers.insert(Intent::PlayMedia, handle_play_media);
        handlers.insert(Intent::FillField, handle_fill_field);
        handlers.insert(Intent::Click, handle_click);
        handlers.insert(Intent::PressKey, handle_press_key);
        handlers.insert(Intent::Wait, handle_wait);
        handlers.insert(Intent::Screenshot, handle_screenshot);
        handlers.insert(Intent::BookFlight, handle_book_flight);
        Self { handlers }
    }

    /// Wiring self-check: every handled intent must dispatch somewhere.
    pub fn verify(&self) -> Result<(), PlanError> {
        for intent in Intent::HANDLED {
            if !self.handlers.contains_key(&intent) {
                return Err(PlanError::UnhandledIntent(intent));
            }
        }
        Ok(())
    }

    pub fn handle(
        &self,
        intent: Intent,
        command: &Command,
        entities: &EntityMap,
        ctx: &PlanContext<'_>,
    ) -> Result<ActionPlan, PlanError> {
        let handler = self
            .handlers
            .get(&intent)
            .ok_or(PlanError::UnhandledIntent(intent))?;
        handler(command, entities, ctx)
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn require_text(
    entities: &EntityMap,
    intent: Intent,
    key: EntityKey,
) -> Result<String, PlanError> {
    entities
        .text(key)
        .map(str::to_string)
        .ok_or(PlanError::MissingRequiredEntity {
            intent,
            entity: key,
        })
}

/// Logical field name -> locator chain. Configured names get their CSS
/// candidates in table order; unknown names fall back to accessibility lookup
/// by the spoken name itself.
fn field_target(name: &str, config: &AutomationConfig) -> Target {
    match config.field_selectors.get(name) {
        Some(selectors) => Target::new(selectors.iter().cloned().map(Locator::Css).collect()),
        None => Target::label(name).or(Locator::Placeholder(name.to_string())),
    }
}

fn element_target(name: &str, config: &AutomationConfig) -> Target {
    match config.element_selectors.get(name) {
        Some(selectors) => Target::new(selectors.iter().cloned().map(Locator::Css).collect()),
        None => Target::new(vec![
            Locator::Role {
                role: "button".to_string(),
                name: name.to_string(),
            },
            Locator::Label(name.to_string()),
            Locator::Css(format!("[aria-label*='{name}']")),
        ]),
    }
}

/// Best-effort capture appended when the command asked for a screenshot
/// alongside its main action.
fn append_capture_if_requested(mut plan: ActionPlan, entities: &EntityMap) -> ActionPlan {
    if entities.flag(EntityKey::Screenshot) {
        plan.steps.push(ActionStep::capture("requested").best_effort());
    }
    plan
}

fn handle_navigate(
    _command: &Command,
    entities: &EntityMap,
    ctx: &PlanContext<'_>,
) -> Result<ActionPlan, PlanError> {
    let url = if let Some(site) = entities.text(EntityKey::Website) {
        ctx.config
            .website_url(site)
            .map(str::to_string)
            .ok_or(PlanError::MissingRequiredEntity {
                intent: Intent::Navigate,
                entity: EntityKey::Website,
            })?
    } else {
        // Unmapped destinations: explicit scheme passes through, bare
        // dotted hostnames get one prepended.
        match entities.text(EntityKey::Query) {
            Some(q) if q.starts_with("http://") || q.starts_with("https://") => q.to_string(),
            Some(q) if q.contains('.') && !q.contains(' ') => format!("https://www.{q}"),
            _ => {
                return Err(PlanError::MissingRequiredEntity {
                    intent: Intent::Navigate,
                    entity: EntityKey::Website,
                })
            }
        }
    };

    let plan = ActionPlan::new(vec![ActionStep::navigate(url)
        .with_timeout(ctx.config.engine.navigation_timeout_ms)]);
    Ok(append_capture_if_requested(plan, entities))
}

fn handle_search(
    _command: &Command,
    entities: &EntityMap,
    ctx: &PlanContext<'_>,
) -> Result<ActionPlan, PlanError> {
    let query = require_text(entities, Intent::Search, EntityKey::Query)?;

    let site = entities
        .text(EntityKey::Website)
        .filter(|s| ctx.config.site_profile(s).is_some())
        .unwrap_or("google");
    let profile = ctx
        .config
        .site_profile(site)
        .ok_or_else(|| PlanError::InvalidConfig(format!("no search profile for '{site}'")))?;
    let url = ctx
        .config
        .website_url(site)
        .ok_or_else(|| PlanError::InvalidConfig(format!("no url mapped for '{site}'")))?;

    let search_box = Target::css(profile.search_selector.clone());
    let plan = ActionPlan::new(vec![
        ActionStep::navigate(url).with_timeout(ctx.config.engine.navigation_timeout_ms),
        ActionStep::fill(search_box.clone(), query),
        ActionStep::press(search_box, "Enter"),
    ]);
    Ok(append_capture_if_requested(plan, entities))
}

fn handle_play_media(
    _command: &Command,
    entities: &EntityMap,
    ctx: &PlanContext<'_>,
) -> Result<ActionPlan, PlanError> {
    let query = require_text(entities, Intent::PlayMedia, EntityKey::Query)?;

    let profile = ctx
        .config
        .site_profile("youtube")
        .ok_or_else(|| PlanError::InvalidConfig("no search profile for 'youtube'".into()))?;
    let url = ctx
        .config
        .website_url("youtube")
        .ok_or_else(|| PlanError::InvalidConfig("no url mapped for 'youtube'".into()))?;

    let mut first_video = Vec::new();
    if let Some(selector) = &profile.first_video_selector {
        first_video.push(Locator::Css(selector.clone()));
    }
    if let Some(fallback) = &profile.first_video_fallback {
        first_video.push(Locator::Css(fallback.clone()));
    }
    if first_video.is_empty() {
        return Err(PlanError::InvalidConfig(
            "youtube profile has no playable-result selector".into(),
        ));
    }

    let search_box = Target::css(profile.search_selector.clone());
    let plan = ActionPlan::new(vec![
        ActionStep::navigate(url).with_timeout(ctx.config.engine.navigation_timeout_ms),
        ActionStep::fill(search_box.clone(), query),
        ActionStep::press(search_box, "Enter"),
        // Let the result list start rendering before the click's own
        // stability wait takes over
        ActionStep::wait(ctx.config.engine.settle_buffer_ms),
        ActionStep::click(Target::new(first_video)),
    ]);
    Ok(append_capture_if_requested(plan, entities))
}

fn handle_fill_field(
    _command: &Command,
    entities: &EntityMap,
    ctx: &PlanContext<'_>,
) -> Result<ActionPlan, PlanError> {
    let field = require_text(entities, Intent::FillField, EntityKey::Field)?;
    let value = require_text(entities, Intent::FillField, EntityKey::Value)?;
    Ok(ActionPlan::new(vec![ActionStep::fill(
        field_target(&field, ctx.config),
        value,
    )]))
}

fn handle_click(
    _command: &Command,
    entities: &EntityMap,
    ctx: &PlanContext<'_>,
) -> Result<ActionPlan, PlanError> {
    let element = require_text(entities, Intent::Click, EntityKey::Element)?;
    Ok(ActionPlan::new(vec![ActionStep::click(element_target(
        &element, ctx.config,
    ))]))
}

/// Spoken key names -> the names drivers understand.
fn canonical_key(raw: &str) -> String {
    match raw {
        "enter" | "return" => "Enter".to_string(),
        "tab" => "Tab".to_string(),
        "escape" | "esc" => "Escape".to_string(),
        "space" | "spacebar" => "Space".to_string(),
        "backspace" => "Backspace".to_string(),
        "delete" => "Delete".to_string(),
        other => {
            let mut chars = other.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        }
    }
}

fn handle_press_key(
    _command: &Command,
    entities: &EntityMap,
    ctx: &PlanContext<'_>,
) -> Result<ActionPlan, PlanError> {
    let key = require_text(entities, Intent::PressKey, EntityKey::Key)?;
    let field = require_text(entities, Intent::PressKey, EntityKey::Field)?;
    Ok(ActionPlan::new(vec![ActionStep::press(
        field_target(&field, ctx.config),
        canonical_key(&key),
    )]))
}

const DEFAULT_WAIT_MS: u64 = 1_000;

fn handle_wait(
    _command: &Command,
    entities: &EntityMap,
    _ctx: &PlanContext<'_>,
) -> Result<ActionPlan, PlanError> {
    let duration = entities
        .number(EntityKey::DurationMs)
        .unwrap_or(DEFAULT_WAIT_MS);
    Ok(ActionPlan::new(vec![ActionStep::wait(duration)]))
}

fn handle_screenshot(
    _command: &Command,
    _entities: &EntityMap,
    _ctx: &PlanContext<'_>,
) -> Result<ActionPlan, PlanError> {
    Ok(ActionPlan::new(vec![ActionStep::capture("requested")]))
}

fn handle_book_flight(
    _command: &Command,
    entities: &EntityMap,
    ctx: &PlanContext<'_>,
) -> Result<ActionPlan, PlanError> {
    let origin = require_text(entities, Intent::BookFlight, EntityKey::Origin)?;
    let destination = require_text(entities, Intent::BookFlight, EntityKey::Destination)?;

    // Unresolvable or absent dates fall back to a week out; the extractor
    // never guesses, so the substitution happens exactly here.
    let date = match entities.get(EntityKey::Date) {
        Some(EntityValue::Date(date)) => *date,
        _ => ctx.today + Duration::days(7),
    };
    let date_text = date.format("%Y-%m-%d").to_string();

    let flights = &ctx.config.flights;
    let engine = &ctx.config.engine;
    let suggestion = Target::new(flights.suggestion_option.clone());

    let plan = ActionPlan::new(vec![
        ActionStep::navigate(flights.url.clone()).with_timeout(engine.navigation_timeout_ms),
        ActionStep::click(Target::new(ctx.config.overlay_dismissors.clone())).best_effort(),
        ActionStep::fill(Target::new(flights.origin_field.clone()), origin),
        ActionStep::click(suggestion.clone()),
        ActionStep::fill(Target::new(flights.destination_field.clone()), destination),
        ActionStep::click(suggestion),
        ActionStep::fill(Target::new(flights.date_field.clone()), date_text),
        ActionStep::click(Target::new(flights.done_button.clone())).best_effort(),
        ActionStep::click(Target::new(flights.search_button.clone())),
        ActionStep::wait(engine.settle_buffer_ms),
        ActionStep::capture("flight-results").best_effort(),
    ]);
    Ok(append_capture_if_requested(plan, entities))
}
