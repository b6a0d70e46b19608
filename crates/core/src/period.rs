use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_PERIOD_DAYS: u32 = 30;

/// Year-first, ISO and month-first forms. Tried before any day-first form.
const YEAR_OR_MONTH_FIRST: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%m-%d-%Y",
    "%B %d %Y",
    "%B %d, %Y",
];

const DATE_TIMES: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

const DAY_FIRST: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d %B %Y", "%d %B, %Y"];

/// Last-resort patterns, in the order users were told to type them.
const FALLBACK: &[&str] = &["%Y-%m-%d", "%d-%m-%Y", "%Y/%m/%d", "%d %B %Y", "%d %b %Y"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognised date '{0}' (try 2025-10-20 or 20-10-2025)")]
pub struct DateParseError(pub String);

/// Parse a user-typed as-of date.
///
/// Year-first and month-first forms win over day-first ones, so `10/12/2025`
/// is October 12th while `20/10/2025` falls through to day-first.
/// Month names accept both full and abbreviated English spellings.
pub fn parse_as_of(input: &str) -> Result<NaiveDate, DateParseError> {
    let text = input.trim();

    let date_only = YEAR_OR_MONTH_FIRST
        .iter()
        .chain(DAY_FIRST)
        .chain(FALLBACK)
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok());
    if let Some(date) = date_only {
        return Ok(date);
    }

    DATE_TIMES
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .map(|dt| dt.date())
        .ok_or_else(|| DateParseError(text.to_string()))
}

/// A fixed-length spending period that always ends on day `length_days` of
/// the month, whatever the real month length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    length_days: u32,
}

impl Default for Period {
    fn default() -> Self {
        Period::new(DEFAULT_PERIOD_DAYS)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-day period", self.length_days)
    }
}

impl Period {
    pub fn new(length_days: u32) -> Self {
        Period { length_days }
    }

    pub fn length_days(self) -> u32 {
        self.length_days
    }

    /// Days left until the period boundary. Zero or negative once the as-of
    /// date reaches the boundary (day 30 and 31 with the default length).
    pub fn remaining_days(self, as_of: NaiveDate) -> i64 {
        i64::from(self.length_days) - i64::from(as_of.day())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_iso() {
        assert_eq!(parse_as_of("2025-10-25").unwrap(), date(2025, 10, 25));
        assert_eq!(parse_as_of("  2025-10-25\n").unwrap(), date(2025, 10, 25));
    }

    #[test]
    fn parse_year_first_slash() {
        assert_eq!(parse_as_of("2025/10/25").unwrap(), date(2025, 10, 25));
    }

    #[test]
    fn parse_day_first_dash() {
        assert_eq!(parse_as_of("25-10-2025").unwrap(), date(2025, 10, 25));
        assert_eq!(parse_as_of("25/10/2025").unwrap(), date(2025, 10, 25));
        assert_eq!(parse_as_of("25.10.2025").unwrap(), date(2025, 10, 25));
    }

    #[test]
    fn ambiguous_slash_date_is_month_first() {
        assert_eq!(parse_as_of("10/12/2025").unwrap(), date(2025, 10, 12));
    }

    #[test]
    fn parse_month_names() {
        assert_eq!(parse_as_of("25 October 2025").unwrap(), date(2025, 10, 25));
        assert_eq!(parse_as_of("25 Oct 2025").unwrap(), date(2025, 10, 25));
        assert_eq!(parse_as_of("October 25, 2025").unwrap(), date(2025, 10, 25));
    }

    #[test]
    fn parse_date_time() {
        assert_eq!(parse_as_of("2025-10-25T08:30:00").unwrap(), date(2025, 10, 25));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_as_of("besok"), Err(DateParseError("besok".to_string())));
        assert!(parse_as_of("").is_err());
        assert!(parse_as_of("2025-02-30").is_err());
    }

    #[test]
    fn remaining_days_uses_fixed_length() {
        let p = Period::default();
        assert_eq!(p.remaining_days(date(2025, 10, 25)), 5);
        assert_eq!(p.remaining_days(date(2025, 2, 1)), 29);
        assert_eq!(p.remaining_days(date(2025, 10, 30)), 0);
        assert_eq!(p.remaining_days(date(2025, 10, 31)), -1);
    }

    #[test]
    fn period_display() {
        assert_eq!(Period::default().to_string(), "30-day period");
        assert_eq!(Period::new(28).length_days(), 28);
    }
}
