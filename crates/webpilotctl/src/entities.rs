//! Entity extraction - structured slots out of normalized command text
//!
//! Extraction is total: it never fails, and slots that do not match are
//! simply absent from the result. Pattern families run in declared order and
//! the first successful match per family wins. City surface forms are
//! normalized through the alias table; date phrases resolve against the
//! caller-supplied reference date or stay explicitly unresolved.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use webpilot_common::config::AutomationConfig;
use webpilot_common::entity::{EntityKey, EntityMap, EntityValue};
use webpilot_common::{dates, Command};

/// Ordered flight phrasing patterns, most specific first. Groups are
/// (origin, destination, date phrase); the last pattern has no date group so
/// undated bookings still yield their endpoints.
const FLIGHT_PATTERNS: &[&str] = &[
    r"(?:search|book|find)\s+(?:for\s+)?(?:a\s+)?flights?\s+from\s+(.+?)\s+to\s+(.+?)\s+(?:on\s+|for\s+)?(tomorrow|today|next\s+\w+|\d\S*.*|\w+\s+\d.*)$",
    r"(?:search|book|find)(?:\s+for)?(?:\s+a)?(?:\s+flights?)?\s+from\s+(.+?)\s+to\s+(.+?)(?:\s+on\s+|\s+for\s+|\s+date\s*:?\s*)(.+)$",
    r"(?:i\s+want\s+to\s+fly|i\s+need\s+a\s+flight|i\s+would\s+like\s+to\s+book)(?:\s+from)?\s+(.+?)\s+to\s+(.+?)(?:\s+on\s+|\s+for\s+|\s+date\s*:?\s*)(.+)$",
    r"(?:fly|flights?|trip)\s+from\s+(.+?)\s+to\s+(.+?)(?:\s+on\s+|\s+for\s+|\s+date\s*:?\s*)(.+)$",
    r"(?:flights?|fly|trip|book)\b.*?\bfrom\s+(.+?)\s+to\s+(.+)$",
];

const FILL_PATTERN: &str = r"(?:fill|enter|input|type\s+in)\s+(?:the\s+)?(.+?)\s+with\s+(.+)$";
const PRESS_PATTERN: &str = r"press\s+(.+?)\s+(?:in|on)\s+(?:the\s+)?(.+)$";
const WAIT_PATTERN: &str = r"(?:wait|pause|delay)(?:\s+for)?\s+(\d+)\s*(ms|milliseconds|seconds|sec|s)?\b";
const CLICK_PATTERN: &str = r"(?:click|press|tap)\s+(?:the\s+)?(.+)$";

/// Compiled extraction rules. Built once at startup; `extract` itself is a
/// pure function of its arguments.
pub struct Extractor {
    flight_patterns: Vec<Regex>,
    fill: Regex,
    press: Regex,
    wait: Regex,
    click: Regex,
}

impl Extractor {
    pub fn new() -> Result<Self> {
        let flight_patterns = FLIGHT_PATTERNS
            .iter()
            .map(|p| Regex::new(p).with_context(|| format!("compiling flight pattern {p}")))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            flight_patterns,
            fill: Regex::new(FILL_PATTERN).context("compiling fill pattern")?,
            press: Regex::new(PRESS_PATTERN).context("compiling press pattern")?,
            wait: Regex::new(WAIT_PATTERN).context("compiling wait pattern")?,
            click: Regex::new(CLICK_PATTERN).context("compiling click pattern")?,
        })
    }

    /// Pull every obtainable slot out of the command. Never fails; unmatched
    /// slots are absent.
    pub fn extract(
        &self,
        command: &Command,
        reference: NaiveDate,
        config: &AutomationConfig,
    ) -> EntityMap {
        let text = command.normalized.as_str();
        let mut entities = EntityMap::new();

        if let Some(website) = extract_website(text, config) {
            entities.insert(EntityKey::Website, EntityValue::Text(website));
        }

        if config
            .keywords
            .screenshot_phrases
            .iter()
            .any(|phrase| crate::intent_router::contains_phrase(text, phrase))
        {
            entities.insert(EntityKey::Screenshot, EntityValue::Flag(true));
        }

        self.extract_flight(text, reference, config, &mut entities);

        if let Some(caps) = self.fill.captures(text) {
            entities.insert(EntityKey::Field, EntityValue::Text(caps[1].trim().to_string()));
            entities.insert(EntityKey::Value, EntityValue::Text(caps[2].trim().to_string()));
        }

        if let Some(caps) = self.press.captures(text) {
            entities.insert(EntityKey::Key, EntityValue::Text(caps[1].trim().to_string()));
            // The field the key goes to, unless fill already claimed the slot
            if !entities.contains(EntityKey::Field) {
                entities.insert(EntityKey::Field, EntityValue::Text(caps[2].trim().to_string()));
            }
        }

        if let Some(caps) = self.wait.captures(text) {
            if let Ok(amount) = caps[1].parse::<u64>() {
                let ms = match caps.get(2).map(|m| m.as_str()) {
                    Some("ms") | Some("milliseconds") => amount,
                    Some(_) => amount * 1000,
                    // Bare numbers historically meant milliseconds
                    None => amount,
                };
                entities.insert(EntityKey::DurationMs, EntityValue::Number(ms));
            }
        }

        if let Some(caps) = self.click.captures(text) {
            entities.insert(
                EntityKey::Element,
                EntityValue::Text(caps[1].trim().to_string()),
            );
        }

        if let Some(query) = extract_query(text, config) {
            entities.insert(EntityKey::Query, EntityValue::Text(query));
        }

        entities
    }

    fn extract_flight(
        &self,
        text: &str,
        reference: NaiveDate,
        config: &AutomationConfig,
        entities: &mut EntityMap,
    ) {
        for pattern in &self.flight_patterns {
            let Some(caps) = pattern.captures(text) else {
                continue;
            };

            let origin = config.canonical_city(caps[1].trim());
            let destination = config.canonical_city(caps[2].trim());
            entities.insert(EntityKey::Origin, EntityValue::Text(origin));
            entities.insert(EntityKey::Destination, EntityValue::Text(destination));

            if let Some(date_phrase) = caps.get(3).map(|m| m.as_str().trim()) {
                let value = match dates::resolve(date_phrase, reference) {
                    Some(date) => EntityValue::Date(date),
                    None => EntityValue::Unresolved(date_phrase.to_string()),
                };
                entities.insert(EntityKey::Date, value);
            }
            return;
        }
    }
}

/// Longest configured website key occurring in the text wins, so
/// "github.com" beats "github".
fn extract_website(text: &str, config: &AutomationConfig) -> Option<String> {
    let mut keys: Vec<&String> = config.websites.keys().collect();
    keys.sort_by_key(|k| std::cmp::Reverse(k.len()));
    keys.into_iter()
        .find(|key| text.contains(key.as_str()))
        .cloned()
}

/// Remainder of the command after stripping matched keyword phrases, the
/// matched website name and screenshot phrases. Empty remainders stay absent.
fn extract_query(text: &str, config: &AutomationConfig) -> Option<String> {
    let keywords = &config.keywords;
    let mut phrases: Vec<&str> = keywords
        .navigate_strip
        .iter()
        .chain(&keywords.search_strip)
        .chain(&keywords.play_strip)
        .chain(&keywords.screenshot_phrases)
        .map(String::as_str)
        .collect();
    // Longer phrases first so "search for" goes before "search"
    phrases.sort_by_key(|p| std::cmp::Reverse(p.len()));

    let mut padded = format!(" {} ", text);
    for phrase in phrases {
        let needle = format!(" {} ", phrase);
        while let Some(pos) = padded.find(&needle) {
            padded.replace_range(pos..pos + needle.len(), " ");
        }
    }
    if let Some(site) = extract_website(text, config) {
        let needle = format!(" {} ", site);
        while let Some(pos) = padded.find(&needle) {
            padded.replace_range(pos..pos + needle.len(), " ");
        }
    }

    let query = padded.split_whitespace().collect::<Vec<_>>().join(" ");
    if query.is_empty() {
        None
    } else {
        Some(query)
    }
}
