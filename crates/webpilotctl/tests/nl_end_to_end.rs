//! End-to-end interpretation: command text in, action plan out.

use chrono::NaiveDate;
use webpilot_common::action::{ActionKind, Criticality};
use webpilot_common::config::AutomationConfig;
use webpilot_common::entity::EntityKey;
use webpilot_common::intent::Intent;
use webpilot_common::Command;
use webpilotctl::pipeline::{Interpretation, Interpreter, NoPlanReason};

/// A Wednesday, so "next monday" is five days out.
fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()
}

fn interpret(text: &str) -> Interpretation {
    let config = AutomationConfig::default();
    Interpreter::new()
        .unwrap()
        .interpret(&Command::new(text), &config, reference())
        .unwrap()
}

fn expect_plan(text: &str) -> (Intent, webpilot_common::action::ActionPlan) {
    match interpret(text) {
        Interpretation::Plan { intent, plan, .. } => (intent, plan),
        other => panic!("expected a plan for {text:?}, got {other:?}"),
    }
}

#[test]
fn navigate_to_known_site() {
    let (intent, plan) = expect_plan("Go to GitHub");
    assert_eq!(intent, Intent::Navigate);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.steps[0].action, ActionKind::Navigate);
    assert_eq!(plan.steps[0].value.as_deref(), Some("https://www.github.com"));
}

#[test]
fn search_flow_navigates_fills_and_presses_enter() {
    let (intent, plan) = expect_plan("search for python tutorials");
    assert_eq!(intent, Intent::Search);

    let kinds: Vec<_> = plan.steps.iter().map(|s| s.action.clone()).collect();
    assert_eq!(
        kinds,
        vec![ActionKind::Navigate, ActionKind::Fill, ActionKind::PressKey]
    );
    assert_eq!(
        plan.steps[0].value.as_deref(),
        Some("https://www.google.com")
    );
    assert_eq!(plan.steps[1].value.as_deref(), Some("python tutorials"));
    assert_eq!(plan.steps[2].key.as_deref(), Some("Enter"));
}

#[test]
fn flight_booking_resolves_cities_and_relative_date() {
    let (intent, plan) = expect_plan("search for flights from Mumbai to Delhi next Monday");
    assert_eq!(intent, Intent::BookFlight);
    plan.validate().unwrap();

    assert_eq!(plan.steps[0].action, ActionKind::Navigate);
    assert_eq!(
        plan.steps[0].value.as_deref(),
        Some("https://www.google.com/travel/flights")
    );

    let fills: Vec<&str> = plan
        .steps
        .iter()
        .filter(|s| s.action == ActionKind::Fill)
        .filter_map(|s| s.value.as_deref())
        .collect();
    assert_eq!(fills, vec!["Mumbai", "Delhi", "2024-06-17"]);
}

#[test]
fn flight_booking_normalizes_city_aliases() {
    let (intent, plan) = expect_plan("book a flight from nyc to london tomorrow");
    assert_eq!(intent, Intent::BookFlight);

    let fills: Vec<&str> = plan
        .steps
        .iter()
        .filter(|s| s.action == ActionKind::Fill)
        .filter_map(|s| s.value.as_deref())
        .collect();
    assert_eq!(fills, vec!["New York", "London", "2024-06-13"]);
}

#[test]
fn play_media_ends_with_a_video_click() {
    let (intent, plan) = expect_plan("play lofi beats on youtube");
    assert_eq!(intent, Intent::PlayMedia);

    let last = plan.steps.last().unwrap();
    assert_eq!(last.action, ActionKind::Click);
    assert!(last.selector.as_ref().unwrap().strategies.len() >= 2);
}

#[test]
fn unparseable_input_is_a_no_plan_value_not_an_error() {
    assert_eq!(
        interpret("please reticulate the splines"),
        Interpretation::NoPlan(NoPlanReason::Unrecognized)
    );
    assert_eq!(
        interpret("   "),
        Interpretation::NoPlan(NoPlanReason::EmptyCommand)
    );
}

#[test]
fn search_without_a_query_reports_the_missing_slot() {
    assert_eq!(
        interpret("search"),
        Interpretation::NoPlan(NoPlanReason::MissingEntity {
            intent: Intent::Search,
            entity: EntityKey::Query,
        })
    );
}

#[test]
fn plural_flight_phrasing_books_a_flight() {
    let (intent, plan) = expect_plan("find flights from nyc to london tomorrow");
    assert_eq!(intent, Intent::BookFlight);
    plan.validate().unwrap();
}

#[test]
fn flight_rule_outranks_generic_search() {
    // Carries both "search" and flight phrasing; rule order decides.
    let (intent, _) = expect_plan("search for flights from chennai to kolkata tomorrow");
    assert_eq!(intent, Intent::BookFlight);
}

#[test]
fn press_in_phrasing_beats_the_click_rule() {
    let (intent, plan) = expect_plan("press enter in the search box");
    assert_eq!(intent, Intent::PressKey);
    assert_eq!(plan.steps[0].key.as_deref(), Some("Enter"));
}

#[test]
fn screenshot_request_appends_a_best_effort_capture() {
    let (_, plan) = expect_plan("search for rust async and take a screenshot");
    let last = plan.steps.last().unwrap();
    assert_eq!(last.action, ActionKind::CaptureState);
    assert_eq!(last.criticality, Criticality::BestEffort);
}

#[test]
fn interpretation_is_deterministic() {
    let first = interpret("search for flights from Mumbai to Delhi next Monday");
    let second = interpret("search for flights from Mumbai to Delhi next Monday");
    assert_eq!(first, second);
}

#[test]
fn overridden_rule_order_changes_the_winner() {
    let mut config = AutomationConfig::default();
    // Move the generic search rule ahead of everything else
    let search_rule = config
        .intent_rules
        .iter()
        .position(|r| r.intent == Intent::Search)
        .unwrap();
    let rule = config.intent_rules.remove(search_rule);
    config.intent_rules.insert(0, rule);

    let interpreter = Interpreter::new().unwrap();
    let command = Command::new("search for flights from mumbai to delhi tomorrow");
    match interpreter.interpret(&command, &config, reference()).unwrap() {
        Interpretation::Plan { intent, .. } => assert_eq!(intent, Intent::Search),
        other => panic!("expected a plan, got {other:?}"),
    }
}
