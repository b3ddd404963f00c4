//! Date-label normalization.
//!
//! The forecast page labels each day informally (`19日（今天）`, `20日（明天）`,
//! `22日（周四）`). Normalization happens in two steps:
//!
//! 1. `classify` turns the label into a `DateToken` (no clock involved)
//! 2. `DateToken::resolve` turns the token into a calendar date relative to an
//!    explicit `today`

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::domain::{DATE_FORMAT, add_days};
use crate::error::ForecastError;

const TODAY_MARKER: &str = "今天";
const TOMORROW_MARKER: &str = "明天";
const DAY_AFTER_TOMORROW_MARKER: &str = "后天";
const WEEK_MARKER: &str = "周";

/// Weekday characters in offset order (Monday = 0 … Sunday = 6).
const WEEKDAYS: [char; 7] = ['一', '二', '三', '四', '五', '六', '日'];

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").expect("invalid regex: iso date"));

/// Classified date label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateToken {
    Today,
    Tomorrow,
    DayAfterTomorrow,
    /// Days to add to today, taken from the weekday named in the label.
    ///
    /// This is a same-week offset (Monday = 0), not the next occurrence of
    /// that weekday.
    WeekdayOffset(u8),
    ExplicitIso(NaiveDate),
}

impl DateToken {
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            DateToken::Today => today,
            DateToken::Tomorrow => add_days(today, 1),
            DateToken::DayAfterTomorrow => add_days(today, 2),
            DateToken::WeekdayOffset(n) => add_days(today, u64::from(n)),
            DateToken::ExplicitIso(date) => date,
        }
    }
}

/// Classify a date label. Rules are checked in priority order.
pub fn classify(token: &str) -> Result<DateToken, ForecastError> {
    if token.contains(TODAY_MARKER) {
        return Ok(DateToken::Today);
    }
    if token.contains(TOMORROW_MARKER) {
        return Ok(DateToken::Tomorrow);
    }
    if token.contains(DAY_AFTER_TOMORROW_MARKER) {
        return Ok(DateToken::DayAfterTomorrow);
    }
    if token.contains(WEEK_MARKER) {
        // The weekday character sits just before the closing bracket: `22日（周四）`.
        let weekday = token.chars().rev().nth(1);
        return weekday
            .and_then(|c| WEEKDAYS.iter().position(|w| *w == c))
            .map(|offset| DateToken::WeekdayOffset(offset as u8))
            .ok_or_else(|| ForecastError::DateParse(token.to_string()));
    }
    if let Some(m) = ISO_DATE.find(token) {
        return NaiveDate::parse_from_str(m.as_str(), DATE_FORMAT)
            .map(DateToken::ExplicitIso)
            .map_err(|_| ForecastError::DateParse(token.to_string()));
    }
    Err(ForecastError::DateParse(token.to_string()))
}

/// Resolve a date label against `today`.
pub fn normalize(token: &str, today: NaiveDate) -> Result<NaiveDate, ForecastError> {
    classify(token).map(|t| t.resolve(today))
}
