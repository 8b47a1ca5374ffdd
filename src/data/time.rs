use chrono::{Duration, NaiveDateTime};
use regex::Regex;

/// `YYYY-MM-DDTHH:MM:SS` anywhere in a line.
pub const TIMESTAMP_PATTERN: &str = r"\d\d\d\d-\d\d-\d\dT\d\d:\d\d:\d\d";

/// ISO timestamp layout written by the logger.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// ---------------------------------------------------------------------------
// Timestamp matcher
// ---------------------------------------------------------------------------

/// Finds and parses logger timestamps.
///
/// The regex is compiled once and shared by the sanitizer, the statistics
/// and the figure builders.
#[derive(Debug, Clone)]
pub struct TimestampMatcher {
    pattern: Regex,
}

impl Default for TimestampMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl TimestampMatcher {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(TIMESTAMP_PATTERN).expect("timestamp pattern is a valid regex"),
        }
    }

    /// Whether `text` contains a full `YYYY-MM-DDTHH:MM:SS` substring.
    pub fn contains_timestamp(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }

    /// Parse a cell into a timestamp.
    ///
    /// The whole cell is tried first; when it carries extra text (a zone
    /// suffix, fractional seconds) the first matching substring is used.
    pub fn parse(&self, text: &str) -> Option<NaiveDateTime> {
        let text = text.trim();
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT) {
            return Some(ts);
        }
        let found = self.pattern.find(text)?;
        NaiveDateTime::parse_from_str(found.as_str(), TIMESTAMP_FORMAT).ok()
    }
}

/// Render a duration the way the logger tooling always has: `H:MM:SS`,
/// prefixed with `N day(s), ` once it spans a day or more.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds();
    let days = total.div_euclid(86_400);
    let rest = total.rem_euclid(86_400);
    let clock = format!("{}:{:02}:{:02}", rest / 3600, (rest % 3600) / 60, rest % 60);
    match days {
        0 => clock,
        1 | -1 => format!("{days} day, {clock}"),
        _ => format!("{days} days, {clock}"),
    }
}

/// Make a timestamp cell safe for use in a file name.
pub fn file_safe_timestamp(text: &str) -> String {
    text.trim().replace(':', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_embedded_timestamps() {
        let m = TimestampMatcher::new();
        let expected = NaiveDateTime::parse_from_str("2023-01-01T12:30:05", TIMESTAMP_FORMAT).unwrap();
        assert_eq!(m.parse("2023-01-01T12:30:05"), Some(expected));
        assert_eq!(m.parse(" 2023-01-01T12:30:05Z"), Some(expected));
        assert_eq!(m.parse("2023-01-01T12:30"), None);
    }

    #[test]
    fn partial_timestamps_do_not_match() {
        let m = TimestampMatcher::new();
        assert!(m.contains_timestamp("L1\t2023-01-01T00:00:00\t20.0"));
        assert!(!m.contains_timestamp("L1\t2023-01-01T00:0"));
        assert!(!m.contains_timestamp("L1\t2023-1-01T00:00:00\t20.0"));
    }

    #[test]
    fn durations_render_like_clock_time() {
        assert_eq!(format_duration(Duration::seconds(60)), "0:01:00");
        assert_eq!(format_duration(Duration::seconds(3 * 3600 + 5)), "3:00:05");
        assert_eq!(format_duration(Duration::seconds(86_400 + 61)), "1 day, 0:01:01");
        assert_eq!(format_duration(Duration::seconds(2 * 86_400)), "2 days, 0:00:00");
        assert_eq!(format_duration(Duration::seconds(-60)), "-1 day, 23:59:00");
    }

    #[test]
    fn colons_become_underscores() {
        assert_eq!(file_safe_timestamp("2023-01-01T00:01:00"), "2023-01-01T00_01_00");
    }
}
