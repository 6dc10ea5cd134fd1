//! Date phrase resolution against a caller-supplied reference date
//!
//! Absolute formats are tried first, then relative phrases. A phrase no
//! pattern matches resolves to `None`; this module never guesses a forward
//! offset - that decision belongs to the handler that needs a date.

use chrono::{Datelike, Duration, NaiveDate};

/// Absolute formats, tried in order. Mirrors the formats the booking flow
/// has historically accepted: ISO, slash forms, and long/abbreviated
/// month-name forms in both orderings.
const ABSOLUTE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
];

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Resolve a date phrase. Returns `None` when no absolute or relative
/// pattern matches.
pub fn resolve(text: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let lowered = text.trim().to_lowercase();
    let text = lowered
        .strip_prefix("on ")
        .or_else(|| lowered.strip_prefix("for "))
        .unwrap_or(lowered.as_str())
        .trim();

    for format in ABSOLUTE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    match text {
        "today" => return Some(reference),
        "tomorrow" => return Some(reference + Duration::days(1)),
        _ => {}
    }

    if let Some(day_name) = text.strip_prefix("next ") {
        return next_weekday(day_name.trim(), reference);
    }

    None
}

/// "next monday" is always strictly after the reference date: asking for
/// "next <today's weekday>" lands a full week ahead.
fn next_weekday(day_name: &str, reference: NaiveDate) -> Option<NaiveDate> {
    let prefix = day_name.get(..3)?;
    let target = WEEKDAYS.iter().position(|day| day.starts_with(prefix))?;
    let current = reference.weekday().num_days_from_monday() as i64;

    let mut ahead = (target as i64 - current + 7) % 7;
    if ahead == 0 {
        ahead = 7;
    }

    Some(reference + Duration::days(ahead))
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-06-12 is a Wednesday
    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 12).unwrap()
    }

    #[test]
    fn absolute_iso_wins_first() {
        assert_eq!(
            resolve("2024-12-25", reference()),
            NaiveDate::from_ymd_opt(2024, 12, 25)
        );
        assert_eq!(
            resolve("on December 25, 2024", reference()),
            NaiveDate::from_ymd_opt(2024, 12, 25)
        );
        assert_eq!(
            resolve("25 Dec 2024", reference()),
            NaiveDate::from_ymd_opt(2024, 12, 25)
        );
    }

    #[test]
    fn tomorrow_is_reference_plus_one() {
        assert_eq!(
            resolve("tomorrow", reference()),
            NaiveDate::from_ymd_opt(2024, 6, 13)
        );
    }

    #[test]
    fn next_monday_lands_in_the_coming_week() {
        // Wednesday -> next Monday is 5 days out
        assert_eq!(
            resolve("next monday", reference()),
            NaiveDate::from_ymd_opt(2024, 6, 17)
        );
        // Prefix matching: "next mon"
        assert_eq!(
            resolve("next mon", reference()),
            NaiveDate::from_ymd_opt(2024, 6, 17)
        );
    }

    #[test]
    fn next_same_weekday_is_a_full_week_ahead() {
        assert_eq!(
            resolve("next wednesday", reference()),
            NaiveDate::from_ymd_opt(2024, 6, 19)
        );
    }

    #[test]
    fn unmatched_phrases_resolve_to_none() {
        assert_eq!(resolve("someday soon", reference()), None);
        assert_eq!(resolve("next", reference()), None);
        assert_eq!(resolve("next xy", reference()), None);
    }
}
