//! Intent - the classified action category for a command
//!
//! Exactly one intent is assigned per command. `Unrecognized` is a normal
//! terminal outcome of classification, not an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of action categories the interpreter can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Navigate,
    Search,
    PlayMedia,
    FillField,
    Click,
    PressKey,
    Wait,
    Screenshot,
    BookFlight,
    Unrecognized,
}

impl Intent {
    /// Every intent a handler must be registered for.
    /// `Unrecognized` is excluded: it terminates the pipeline before the
    /// registry is consulted.
    pub const HANDLED: [Intent; 9] = [
        Intent::Navigate,
        Intent::Search,
        Intent::PlayMedia,
        Intent::FillField,
        Intent::Click,
        Intent::PressKey,
        Intent::Wait,
        Intent::Screenshot,
        Intent::BookFlight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Navigate => "navigate",
            Intent::Search => "search",
            Intent::PlayMedia => "play_media",
            Intent::FillField => "fill_field",
            Intent::Click => "click",
            Intent::PressKey => "press_key",
            Intent::Wait => "wait",
            Intent::Screenshot => "screenshot",
            Intent::BookFlight => "book_flight",
            Intent::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
