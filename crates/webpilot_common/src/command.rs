//! Command - raw user input plus its normalized form
//!
//! A `Command` is created once per request and never mutated afterwards.
//! All downstream matching (intent rules, entity patterns) runs against the
//! normalized form; the raw text is kept for diagnostics and echo output.

use serde::{Deserialize, Serialize};

/// One free-text user command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// The text exactly as the user supplied it
    pub raw: String,

    /// Trimmed, case-folded, whitespace-collapsed form
    pub normalized: String,
}

impl Command {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let normalized = normalize(&raw);
        Self { raw, normalized }
    }

    /// A command with nothing left after normalization cannot be interpreted.
    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }
}

/// Trim, lowercase and collapse internal whitespace runs to single spaces.
fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        let cmd = Command::new("  Go  TO \t GitHub.com \n");
        assert_eq!(cmd.normalized, "go to github.com");
        assert_eq!(cmd.raw, "  Go  TO \t GitHub.com \n");
    }

    #[test]
    fn blank_input_is_empty() {
        assert!(Command::new("   \t ").is_empty());
        assert!(!Command::new("wait 3 seconds").is_empty());
    }
}
