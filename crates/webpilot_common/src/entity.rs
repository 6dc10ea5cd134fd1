//! Entity model - named slots of structured data extracted from command text
//!
//! A slot is present in the map only when extraction succeeded; absence is
//! meaningful and is never represented by a placeholder value. Dates get a
//! dedicated `Unresolved` marker so callers can apply their own fallback
//! instead of the extractor guessing one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Names of the slots the extractor knows how to fill.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKey {
    Origin,
    Destination,
    Date,
    Query,
    Website,
    Field,
    Value,
    Element,
    Key,
    DurationMs,
    Screenshot,
}

impl EntityKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKey::Origin => "origin",
            EntityKey::Destination => "destination",
            EntityKey::Date => "date",
            EntityKey::Query => "query",
            EntityKey::Website => "website",
            EntityKey::Field => "field",
            EntityKey::Value => "value",
            EntityKey::Element => "element",
            EntityKey::Key => "key",
            EntityKey::DurationMs => "duration_ms",
            EntityKey::Screenshot => "screenshot",
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extracted slot value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityValue {
    Text(String),
    /// A date pattern matched and resolved against the reference date
    Date(NaiveDate),
    /// A date phrase was present but no pattern could resolve it.
    /// The raw phrase is kept so handlers can report or fall back explicitly.
    Unresolved(String),
    Number(u64),
    Flag(bool),
}

/// Slot name to value mapping for one command.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityMap(BTreeMap<EntityKey, EntityValue>);

impl EntityMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: EntityKey, value: EntityValue) {
        self.0.insert(key, value);
    }

    pub fn get(&self, key: EntityKey) -> Option<&EntityValue> {
        self.0.get(&key)
    }

    pub fn contains(&self, key: EntityKey) -> bool {
        self.0.contains_key(&key)
    }

    /// Text slot accessor; `None` for absent or non-text slots.
    pub fn text(&self, key: EntityKey) -> Option<&str> {
        match self.0.get(&key) {
            Some(EntityValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn date(&self, key: EntityKey) -> Option<NaiveDate> {
        match self.0.get(&key) {
            Some(EntityValue::Date(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn number(&self, key: EntityKey) -> Option<u64> {
        match self.0.get(&key) {
            Some(EntityValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Flag slots read as false when absent.
    pub fn flag(&self, key: EntityKey) -> bool {
        matches!(self.0.get(&key), Some(EntityValue::Flag(true)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityKey, &EntityValue)> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_slots_stay_absent() {
        let map = EntityMap::new();
        assert!(map.get(EntityKey::Origin).is_none());
        assert!(!map.flag(EntityKey::Screenshot));
        assert!(map.is_empty());
    }

    #[test]
    fn typed_accessors_reject_mismatched_variants() {
        let mut map = EntityMap::new();
        map.insert(EntityKey::Query, EntityValue::Text("python tutorials".into()));
        map.insert(EntityKey::DurationMs, EntityValue::Number(3000));

        assert_eq!(map.text(EntityKey::Query), Some("python tutorials"));
        assert_eq!(map.number(EntityKey::DurationMs), Some(3000));
        assert_eq!(map.date(EntityKey::Query), None);
        assert_eq!(map.number(EntityKey::Query), None);
    }
}
