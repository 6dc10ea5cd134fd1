//! Intent routing - ordered rule evaluation over normalized command text
//!
//! The rule list is configuration (see `AutomationConfig::intent_rules`);
//! rules are evaluated strictly in declared order and the first satisfied
//! rule wins. That total order is the conflict-resolution policy: a command
//! carrying both flight and generic search keywords resolves to book_flight
//! because the flight rules are declared earlier.

use webpilot_common::config::IntentRule;
use webpilot_common::{EntityMap, Intent};

/// Classify normalized command text. Returns `Intent::Unrecognized` when no
/// rule matches - a terminal outcome, not an error.
pub fn classify(normalized: &str, entities: &EntityMap, rules: &[IntentRule]) -> Intent {
    for rule in rules {
        if rule_matches(rule, normalized, entities) {
            return rule.intent;
        }
    }
    Intent::Unrecognized
}

fn rule_matches(rule: &IntentRule, text: &str, entities: &EntityMap) -> bool {
    let any_ok = rule.any_of.is_empty() || rule.any_of.iter().any(|p| contains_phrase(text, p));
    let all_ok = rule.all_of.iter().all(|p| contains_phrase(text, p));
    let needs_ok = rule.needs.iter().all(|key| entities.contains(*key));
    any_ok && all_ok && needs_ok
}

/// Word-boundary aware phrase containment: "in" matches "press enter in the
/// field" but not "main".
pub fn contains_phrase(text: &str, phrase: &str) -> bool {
    let padded = format!(" {} ", text);
    padded.contains(&format!(" {} ", phrase.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use webpilot_common::config::AutomationConfig;
    use webpilot_common::entity::{EntityKey, EntityValue};

    fn rules() -> Vec<IntentRule> {
        AutomationConfig::default().intent_rules
    }

    #[test]
    fn phrase_matching_respects_word_boundaries() {
        assert!(contains_phrase("press enter in the search box", "in"));
        assert!(!contains_phrase("open the main page", "in"));
        assert!(contains_phrase("go to github.com", "go to"));
        assert!(!contains_phrase("going to town", "go to"));
    }

    #[test]
    fn classification_is_deterministic() {
        let rules = rules();
        let entities = EntityMap::new();
        let first = classify("search for python tutorials", &entities, &rules);
        for _ in 0..5 {
            assert_eq!(
                classify("search for python tutorials", &entities, &rules),
                first
            );
        }
        assert_eq!(first, Intent::Search);
    }

    #[test]
    fn earlier_rule_wins_on_overlap() {
        // Declared order, not keyword specificity, resolves conflicts.
        let custom = vec![
            IntentRule {
                intent: Intent::Wait,
                any_of: vec!["hold".into()],
                all_of: vec![],
                needs: vec![],
            },
            IntentRule {
                intent: Intent::Click,
                any_of: vec!["hold".into()],
                all_of: vec![],
                needs: vec![],
            },
        ];
        assert_eq!(
            classify("hold everything", &EntityMap::new(), &custom),
            Intent::Wait
        );

        let reversed: Vec<_> = custom.into_iter().rev().collect();
        assert_eq!(
            classify("hold everything", &EntityMap::new(), &reversed),
            Intent::Click
        );
    }

    #[test]
    fn flight_booking_outranks_generic_search() {
        let got = classify(
            "search for flights from mumbai to delhi next monday",
            &EntityMap::new(),
            &rules(),
        );
        assert_eq!(got, Intent::BookFlight);
    }

    #[test]
    fn from_to_phrasing_needs_travel_keyword_and_endpoints() {
        let rules = rules();

        // "trip from ... to ..." with extracted endpoints -> flight
        let mut entities = EntityMap::new();
        entities.insert(EntityKey::Origin, EntityValue::Text("Mumbai".into()));
        entities.insert(EntityKey::Destination, EntityValue::Text("Delhi".into()));
        assert_eq!(
            classify("trip from mumbai to delhi on friday", &entities, &rules),
            Intent::BookFlight
        );

        // Same text without obtainable endpoints falls through
        assert_ne!(
            classify(
                "trip from mumbai to delhi on friday",
                &EntityMap::new(),
                &rules
            ),
            Intent::BookFlight
        );
    }

    #[test]
    fn press_in_routes_to_press_key_before_click() {
        assert_eq!(
            classify(
                "press enter in the search field",
                &EntityMap::new(),
                &rules()
            ),
            Intent::PressKey
        );
        assert_eq!(
            classify("press the submit button", &EntityMap::new(), &rules()),
            Intent::Click
        );
    }

    #[test]
    fn plural_flight_phrasing_matches() {
        let rules = rules();
        assert_eq!(
            classify(
                "find flights from nyc to london tomorrow",
                &EntityMap::new(),
                &rules
            ),
            Intent::BookFlight
        );
        assert_eq!(
            classify("book flights from mumbai to delhi", &EntityMap::new(), &rules),
            Intent::BookFlight
        );
    }

    #[test]
    fn field_names_do_not_hijack_fill_commands() {
        // "search" appears only as part of the field name
        assert_eq!(
            classify(
                "fill the search box with machine learning",
                &EntityMap::new(),
                &rules()
            ),
            Intent::FillField
        );
    }

    #[test]
    fn unmatched_text_is_unrecognized() {
        assert_eq!(
            classify("frobnicate the widget", &EntityMap::new(), &rules()),
            Intent::Unrecognized
        );
    }
}
