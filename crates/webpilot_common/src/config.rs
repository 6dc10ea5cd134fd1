//! Automation configuration - read-only tables loaded once at process start
//!
//! Config file: `$WEBPILOT_CONFIG`, else `~/.config/webpilot/config.toml`,
//! else built-in defaults. Every table can be overridden independently; the
//! defaults carry the stock website map, selector tables, city aliases and
//! the ordered intent-rule list.
//!
//! Nothing here is consulted through ambient globals: the loaded value is
//! passed by reference into the interpreter and the execution engine, which
//! keeps unit tests free to inject alternate tables.

use crate::action::Locator;
use crate::entity::EntityKey;
use crate::error::PlanError;
use crate::intent::Intent;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One ordered classification rule. A rule fires when:
/// - any `any_of` phrase occurs in the normalized text (or the list is empty),
/// - every `all_of` phrase occurs, and
/// - every `needs` entity was obtainable by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRule {
    pub intent: Intent,
    #[serde(default)]
    pub any_of: Vec<String>,
    #[serde(default)]
    pub all_of: Vec<String>,
    #[serde(default)]
    pub needs: Vec<EntityKey>,
}

/// Per-site search configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteProfile {
    /// Selector of the site's search input
    pub search_selector: String,

    /// Selector of the first playable (non-shorts, non-ad) result title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_video_selector: Option<String>,

    /// Fallback selector when the title link is not clickable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_video_fallback: Option<String>,
}

/// Flight-search flow configuration. Locator lists are ordered strategy
/// chains: accessibility lookup first, attribute lookup last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightsProfile {
    pub url: String,
    pub origin_field: Vec<Locator>,
    pub destination_field: Vec<Locator>,
    pub date_field: Vec<Locator>,
    /// First entry of the autocomplete suggestion list
    pub suggestion_option: Vec<Locator>,
    pub done_button: Vec<Locator>,
    pub search_button: Vec<Locator>,
    pub results: Vec<Locator>,
}

/// Keyword phrase tables used to strip command verbs out of free-text slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordTables {
    pub navigate_strip: Vec<String>,
    pub search_strip: Vec<String>,
    pub play_strip: Vec<String>,
    pub screenshot_phrases: Vec<String>,
}

/// Engine wait budgets, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_stability_timeout")]
    pub stability_timeout_ms: u64,
    #[serde(default = "default_navigation_timeout")]
    pub navigation_timeout_ms: u64,
    #[serde(default = "default_interaction_timeout")]
    pub interaction_timeout_ms: u64,
    /// Fixed buffer after network idle for pending visual updates
    #[serde(default = "default_settle_buffer")]
    pub settle_buffer_ms: u64,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_stability_timeout() -> u64 {
    10_000
}
fn default_navigation_timeout() -> u64 {
    30_000
}
fn default_interaction_timeout() -> u64 {
    5_000
}
fn default_settle_buffer() -> u64 {
    500
}
fn default_poll_interval() -> u64 {
    100
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stability_timeout_ms: default_stability_timeout(),
            navigation_timeout_ms: default_navigation_timeout(),
            interaction_timeout_ms: default_interaction_timeout(),
            settle_buffer_ms: default_settle_buffer(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

/// The full read-only configuration surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationConfig {
    /// Website name -> URL
    #[serde(default = "default_websites")]
    pub websites: BTreeMap<String, String>,

    /// Logical field name -> CSS selector candidates, in order
    #[serde(default = "default_field_selectors")]
    pub field_selectors: BTreeMap<String, Vec<String>>,

    /// Logical element name -> CSS selector candidates, in order
    #[serde(default = "default_element_selectors")]
    pub element_selectors: BTreeMap<String, Vec<String>>,

    /// Surface city form -> canonical city name
    #[serde(default = "default_city_aliases")]
    pub city_aliases: BTreeMap<String, String>,

    /// Per-site search profiles, keyed by website name
    #[serde(default = "default_site_profiles")]
    pub site_profiles: BTreeMap<String, SiteProfile>,

    /// Well-known dismissible overlay close buttons, tried in order
    #[serde(default = "default_overlay_dismissors")]
    pub overlay_dismissors: Vec<Locator>,

    #[serde(default = "default_flights")]
    pub flights: FlightsProfile,

    #[serde(default = "default_keywords")]
    pub keywords: KeywordTables,

    /// Ordered classification rules; order is the conflict-resolution policy
    #[serde(default = "default_intent_rules")]
    pub intent_rules: Vec<IntentRule>,

    #[serde(default)]
    pub engine: EngineConfig,
}

impl Default for AutomationConfig {
    fn default() -> Self {
        Self {
            websites: default_websites(),
            field_selectors: default_field_selectors(),
            element_selectors: default_element_selectors(),
            city_aliases: default_city_aliases(),
            site_profiles: default_site_profiles(),
            overlay_dismissors: default_overlay_dismissors(),
            flights: default_flights(),
            keywords: default_keywords(),
            intent_rules: default_intent_rules(),
            engine: EngineConfig::default(),
        }
    }
}

impl AutomationConfig {
    /// Load configuration with the fallback chain:
    /// `$WEBPILOT_CONFIG` -> `~/.config/webpilot/config.toml` -> defaults.
    pub fn load() -> Result<Self> {
        if let Ok(path) = std::env::var("WEBPILOT_CONFIG") {
            return Self::load_from(Path::new(&path));
        }

        if let Some(path) = Self::user_config_path() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }

        debug!("no config file found, using built-in defaults");
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("validating config file {}", path.display()))?;
        info!(path = %path.display(), "loaded automation config");
        Ok(config)
    }

    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("webpilot").join("config.toml"))
    }

    /// Consistency checks run once at load time.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.websites.is_empty() {
            return Err(PlanError::InvalidConfig("website map is empty".into()));
        }
        if self.intent_rules.is_empty() {
            return Err(PlanError::InvalidConfig("intent rule list is empty".into()));
        }
        if self
            .intent_rules
            .iter()
            .any(|rule| rule.intent == Intent::Unrecognized)
        {
            return Err(PlanError::InvalidConfig(
                "intent rules must not target 'unrecognized'".into(),
            ));
        }
        for rule in &self.intent_rules {
            if rule.any_of.is_empty() && rule.all_of.is_empty() {
                return Err(PlanError::InvalidConfig(format!(
                    "rule for '{}' has no phrase condition",
                    rule.intent
                )));
            }
        }
        if self.engine.poll_interval_ms == 0 {
            return Err(PlanError::InvalidConfig("poll interval must be > 0".into()));
        }
        if self.engine.stability_timeout_ms == 0 || self.engine.navigation_timeout_ms == 0 {
            return Err(PlanError::InvalidConfig("wait budgets must be > 0".into()));
        }
        if !self.site_profiles.contains_key("google") {
            return Err(PlanError::InvalidConfig(
                "default search profile 'google' is missing".into(),
            ));
        }
        if self.flights.url.is_empty() {
            return Err(PlanError::InvalidConfig("flights url is empty".into()));
        }
        Ok(())
    }

    pub fn website_url(&self, name: &str) -> Option<&str> {
        self.websites.get(name).map(String::as_str)
    }

    pub fn site_profile(&self, name: &str) -> Option<&SiteProfile> {
        self.site_profiles.get(name)
    }

    /// Map a surface city form to its canonical name. Exact alias match wins;
    /// otherwise the longest alias occurring as whole words in the phrase
    /// wins; otherwise the phrase passes through with whitespace collapsed.
    /// Alias matching is token-bounded so "barcelona" never matches the
    /// "lon" alias.
    pub fn canonical_city(&self, raw: &str) -> String {
        let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        let lookup = cleaned.to_lowercase();

        if let Some(canonical) = self.city_aliases.get(&lookup) {
            return canonical.clone();
        }

        let padded = format!(" {lookup} ");
        let mut best: Option<(&String, &String)> = None;
        for (alias, canonical) in &self.city_aliases {
            if padded.contains(&format!(" {alias} ")) {
                match best {
                    Some((current, _)) if current.len() >= alias.len() => {}
                    _ => best = Some((alias, canonical)),
                }
            }
        }

        match best {
            Some((_, canonical)) => canonical.clone(),
            None => cleaned,
        }
    }
}

fn string_map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_websites() -> BTreeMap<String, String> {
    string_map(&[
        ("google", "https://www.google.com"),
        ("google.com", "https://www.google.com"),
        ("youtube", "https://www.youtube.com"),
        ("youtube.com", "https://www.youtube.com"),
        ("github", "https://www.github.com"),
        ("github.com", "https://www.github.com"),
        ("stackoverflow", "https://stackoverflow.com"),
        ("stackoverflow.com", "https://stackoverflow.com"),
        ("reddit", "https://www.reddit.com"),
        ("reddit.com", "https://www.reddit.com"),
        ("wikipedia", "https://www.wikipedia.org"),
        ("wikipedia.org", "https://www.wikipedia.org"),
        ("amazon", "https://www.amazon.in"),
        ("amazon.in", "https://www.amazon.in"),
        ("amazon.com", "https://www.amazon.com"),
        ("twitter", "https://www.twitter.com"),
        ("twitter.com", "https://www.twitter.com"),
        ("linkedin", "https://www.linkedin.com"),
        ("linkedin.com", "https://www.linkedin.com"),
        ("facebook", "https://www.facebook.com"),
        ("facebook.com", "https://www.facebook.com"),
    ])
}

fn default_field_selectors() -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    let search = strings(&[
        "input[name='q']",
        "textarea[name='q']",
        "input[type='search']",
    ]);
    map.insert("search box".to_string(), search.clone());
    map.insert("search field".to_string(), search);
    map.insert("email".to_string(), strings(&["input[type='email']"]));
    map.insert("password".to_string(), strings(&["input[type='password']"]));
    map.insert(
        "username".to_string(),
        strings(&["input[name='username']", "input[name='user']"]),
    );
    map.insert(
        "name".to_string(),
        strings(&["input[name='name']", "input[name='fullname']"]),
    );
    map
}

fn default_element_selectors() -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    map.insert(
        "submit button".to_string(),
        strings(&[
            "input[type='submit']",
            "button[type='submit']",
            "button.submit",
        ]),
    );
    map.insert(
        "search button".to_string(),
        strings(&[
            "input[type='submit']",
            "button[type='submit']",
            "button.search",
        ]),
    );
    map.insert(
        "login button".to_string(),
        strings(&[
            "input[type='submit']",
            "button[type='submit']",
            "button.login",
        ]),
    );
    map.insert("first result".to_string(), strings(&["div.g a"]));
    map.insert("first link".to_string(), strings(&["a:first-of-type"]));
    map.insert("button".to_string(), strings(&["button"]));
    map
}

fn default_city_aliases() -> BTreeMap<String, String> {
    string_map(&[
        ("nyc", "New York"),
        ("new york", "New York"),
        ("new york city", "New York"),
        ("sf", "San Francisco"),
        ("san fran", "San Francisco"),
        ("san francisco", "San Francisco"),
        ("sfo", "San Francisco"),
        ("la", "Los Angeles"),
        ("lax", "Los Angeles"),
        ("los angeles", "Los Angeles"),
        ("chi", "Chicago"),
        ("ord", "Chicago"),
        ("chicago", "Chicago"),
        ("dc", "Washington DC"),
        ("washington d.c.", "Washington DC"),
        ("mumbai", "Mumbai"),
        ("bombay", "Mumbai"),
        ("bom", "Mumbai"),
        ("delhi", "Delhi"),
        ("del", "Delhi"),
        ("new delhi", "Delhi"),
        ("bengaluru", "Bengaluru"),
        ("bangalore", "Bengaluru"),
        ("blr", "Bengaluru"),
        ("chennai", "Chennai"),
        ("madras", "Chennai"),
        ("maa", "Chennai"),
        ("kolkata", "Kolkata"),
        ("calcutta", "Kolkata"),
        ("ccu", "Kolkata"),
        ("london", "London"),
        ("lon", "London"),
        ("lhr", "London"),
        ("paris", "Paris"),
        ("cdg", "Paris"),
        ("miami", "Miami"),
        ("mia", "Miami"),
    ])
}

fn default_site_profiles() -> BTreeMap<String, SiteProfile> {
    let mut map = BTreeMap::new();
    map.insert(
        "google".to_string(),
        SiteProfile {
            search_selector: "textarea[name='q']".to_string(),
            first_video_selector: None,
            first_video_fallback: None,
        },
    );
    map.insert(
        "youtube".to_string(),
        SiteProfile {
            search_selector: "input[name='search_query']".to_string(),
            first_video_selector: Some(
                "ytd-video-renderer a#video-title[href*='watch']:not([href*='shorts'])".to_string(),
            ),
            first_video_fallback: Some(
                "ytd-thumbnail a[href*='watch']:not([href*='shorts'])".to_string(),
            ),
        },
    );
    map.insert(
        "wikipedia".to_string(),
        SiteProfile {
            search_selector: "#searchInput".to_string(),
            first_video_selector: None,
            first_video_fallback: None,
        },
    );
    map.insert(
        "amazon".to_string(),
        SiteProfile {
            search_selector: "input[name='field-keywords']".to_string(),
            first_video_selector: None,
            first_video_fallback: None,
        },
    );
    map
}

fn default_overlay_dismissors() -> Vec<Locator> {
    vec![
        Locator::Role {
            role: "button".to_string(),
            name: "Dismiss".to_string(),
        },
        Locator::Role {
            role: "button".to_string(),
            name: "Accept all".to_string(),
        },
        Locator::Role {
            role: "button".to_string(),
            name: "Got it".to_string(),
        },
        Locator::Css("button[aria-label*='Dismiss']".to_string()),
        Locator::Css("button[aria-label*='Close']".to_string()),
        Locator::Css(".modal-close".to_string()),
        Locator::Css(".overlay-close".to_string()),
        Locator::Css("[role='dialog'] button:last-child".to_string()),
    ]
}

fn default_flights() -> FlightsProfile {
    FlightsProfile {
        url: "https://www.google.com/travel/flights".to_string(),
        origin_field: vec![
            Locator::Label("Where from?".to_string()),
            Locator::Css("[aria-label*='Where from?'][role='combobox']".to_string()),
            Locator::Placeholder("Where from?".to_string()),
        ],
        destination_field: vec![
            Locator::Label("Where to?".to_string()),
            Locator::Css("[aria-label*='Where to?'][role='combobox']".to_string()),
            Locator::Placeholder("Where to?".to_string()),
        ],
        date_field: vec![
            Locator::Label("Departure".to_string()),
            Locator::Css("input[aria-label*='Departure']".to_string()),
            Locator::Placeholder("Departure".to_string()),
        ],
        suggestion_option: vec![Locator::Css(
            "[role='listbox'] [role='option']:first-of-type".to_string(),
        )],
        done_button: vec![
            Locator::Role {
                role: "button".to_string(),
                name: "Done".to_string(),
            },
            Locator::Css("button[aria-label*='Done']".to_string()),
        ],
        search_button: vec![
            Locator::Role {
                role: "button".to_string(),
                name: "Search".to_string(),
            },
            Locator::Css("button[aria-label*='Search']".to_string()),
        ],
        results: vec![
            Locator::Css("ul.Rk10dc li".to_string()),
            Locator::Css("[data-test-id='offer-listing']".to_string()),
        ],
    }
}

fn default_keywords() -> KeywordTables {
    KeywordTables {
        navigate_strip: strings(&["go to", "navigate to", "open", "visit"]),
        search_strip: strings(&[
            "search for",
            "search",
            "find",
            "look for",
            "look up",
            "on google",
            "google",
        ]),
        play_strip: strings(&[
            "search youtube for",
            "find on youtube",
            "on youtube",
            "listen to",
            "play",
            "watch",
        ]),
        screenshot_phrases: strings(&[
            "and take a screenshot",
            "take a screenshot",
            "take a picture",
            "screenshot",
        ]),
    }
}

fn rule(intent: Intent, any_of: &[&str], all_of: &[&str], needs: &[EntityKey]) -> IntentRule {
    IntentRule {
        intent,
        any_of: strings(any_of),
        all_of: strings(all_of),
        needs: needs.to_vec(),
    }
}

/// The ordered rule list. Earlier rules win: the flight rules sit first so a
/// command carrying both flight and generic search keywords classifies as
/// book_flight, and the fill/press rules sit before the search rule so a
/// field name like "search box" cannot hijack "press enter in the search
/// box" into a search.
fn default_intent_rules() -> Vec<IntentRule> {
    vec![
        rule(
            Intent::BookFlight,
            &[
                "book flight",
                "book flights",
                "book a flight",
                "search flight",
                "search flights",
                "search for flights",
                "find flight",
                "find flights",
                "fly from",
            ],
            &[],
            &[],
        ),
        // Generic "from ... to ..." phrasing names a flight only when paired
        // with a travel keyword and resolvable endpoints.
        rule(
            Intent::BookFlight,
            &["flight", "flights", "fly", "trip"],
            &["from", "to"],
            &[EntityKey::Origin, EntityKey::Destination],
        ),
        rule(Intent::PlayMedia, &["play", "watch", "listen to"], &[], &[]),
        rule(
            Intent::FillField,
            &["fill", "enter", "input", "type in"],
            &["with"],
            &[],
        ),
        rule(Intent::PressKey, &[], &["press", "in"], &[]),
        rule(
            Intent::Search,
            &["search", "find", "look for", "look up"],
            &[],
            &[],
        ),
        rule(
            Intent::Navigate,
            &["go to", "navigate to", "open", "visit"],
            &[],
            &[],
        ),
        rule(Intent::Click, &["click", "press", "tap"], &[], &[]),
        rule(Intent::Wait, &["wait", "pause", "delay"], &[], &[]),
        rule(
            Intent::Screenshot,
            &["screenshot", "capture", "take a picture", "snap"],
            &[],
            &[],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_pass_validation() {
        AutomationConfig::default().validate().unwrap();
    }

    #[test]
    fn city_aliases_normalize_variants() {
        let config = AutomationConfig::default();
        assert_eq!(config.canonical_city("bombay"), "Mumbai");
        assert_eq!(config.canonical_city("NYC"), "New York");
        assert_eq!(config.canonical_city("new   delhi"), "Delhi");
        // Longest alias wins over the embedded shorter one
        assert_eq!(config.canonical_city("new york city"), "New York");
        // Unknown cities pass through with whitespace collapsed
        assert_eq!(config.canonical_city("Port  Moresby"), "Port Moresby");
    }

    #[test]
    fn alias_matching_is_token_bounded() {
        let config = AutomationConfig::default();
        // "lon" and "del" are aliases but must not fire inside other words
        assert_eq!(config.canonical_city("barcelona"), "barcelona");
        assert_eq!(config.canonical_city("delray beach"), "delray beach");
        // A whole-word alias inside a longer phrase still normalizes
        assert_eq!(config.canonical_city("mumbai airport"), "Mumbai");
    }

    #[test]
    fn partial_toml_keeps_defaults_for_other_tables() {
        let toml_src = r#"
            [websites]
            intranet = "https://intranet.example.com"
        "#;
        let config: AutomationConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(
            config.website_url("intranet"),
            Some("https://intranet.example.com")
        );
        // Untouched tables fall back to defaults
        assert!(!config.intent_rules.is_empty());
        assert!(config.site_profiles.contains_key("google"));
        assert_eq!(config.engine.poll_interval_ms, 100);
    }

    #[test]
    fn load_from_rejects_invalid_rules() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [[intent_rules]]
            intent = "unrecognized"
            any_of = ["x"]
            "#
        )
        .unwrap();
        let err = AutomationConfig::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("validating"));
    }

    #[test]
    fn rule_order_resolves_keyword_overlaps() {
        let rules = default_intent_rules();
        let position = |intent: Intent| rules.iter().position(|r| r.intent == intent).unwrap();

        // Flight phrasing outranks generic search
        assert!(position(Intent::BookFlight) < position(Intent::Search));
        // Field names like "search box" must not hijack fill/press commands
        assert!(position(Intent::FillField) < position(Intent::Search));
        assert!(position(Intent::PressKey) < position(Intent::Search));
    }
}
