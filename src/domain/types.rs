//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - passed by value through the scrape → normalize → reconcile pipeline
//! - exported to CSV/JSON/XLSX
//! - reloaded later for plotting

use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;

use chrono::{Days, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// Date format used for caller input and every output column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Column headers of a reconciled table, in output order.
pub const TABLE_COLUMNS: [&str; 4] = ["Date", "Weather", "Temperature", "Wind"];

/// One forecast entry as it appears on the page, before date normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawForecastRecord {
    /// Informal date label, e.g. `19日（今天）`.
    pub date_token: String,
    pub weather_text: String,
    pub temperature_low: String,
    /// Some entries (typically "tonight") publish only one temperature.
    pub temperature_high: Option<String>,
    pub wind_text: String,
}

impl RawForecastRecord {
    /// `low/high`, both keeping their unit suffix. A missing high repeats the low.
    pub fn temperature(&self) -> String {
        let high = self
            .temperature_high
            .as_deref()
            .unwrap_or(&self.temperature_low);
        format!("{}/{}", self.temperature_low, high)
    }

    pub fn into_values(self) -> ForecastValues {
        let temperature = self.temperature();
        ForecastValues {
            weather: self.weather_text,
            temperature,
            wind: self.wind_text,
        }
    }
}

/// The per-day payload carried through reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastValues {
    pub weather: String,
    /// `"<low>/<high>"`, unit suffix retained (e.g. `8℃/15℃`).
    pub temperature: String,
    pub wind: String,
}

impl ForecastValues {
    /// The high half of `low/high` as a whole number, unit suffix stripped.
    pub fn high_temperature(&self) -> Option<i32> {
        let high = self.temperature.split('/').nth(1)?;
        parse_degrees(high)
    }

    pub fn low_temperature(&self) -> Option<i32> {
        let low = self.temperature.split('/').next()?;
        parse_degrees(low)
    }
}

fn parse_degrees(raw: &str) -> Option<i32> {
    let digits: String = raw
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    digits.parse().ok()
}

/// A forecast entry whose date token has been resolved to a calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    pub date: NaiveDate,
    pub values: ForecastValues,
}

/// One row of the reconciled table.
///
/// `values` is `None` only for a leading gap: a requested date with no scraped
/// record and no earlier row to carry forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub values: Option<ForecastValues>,
}

impl TableRow {
    pub fn date_text(&self) -> String {
        self.date.format(DATE_FORMAT).to_string()
    }

    /// Cells in `TABLE_COLUMNS` order; missing values become empty strings.
    pub fn cells(&self) -> [String; 4] {
        match &self.values {
            Some(v) => [
                self.date_text(),
                v.weather.clone(),
                v.temperature.clone(),
                v.wind.clone(),
            ],
            None => [self.date_text(), String::new(), String::new(), String::new()],
        }
    }
}

/// Share of one weather category across a table.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherShare {
    pub weather: String,
    pub count: usize,
    pub fraction: f64,
}

/// Final output of a run: one row per requested date, ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledTable {
    pub rows: Vec<TableRow>,
}

impl ReconciledTable {
    /// Zero rows; same columns as any other table.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> [&'static str; 4] {
        TABLE_COLUMNS
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.rows.iter().map(|r| r.date).collect()
    }

    /// Rows whose values are still unresolved.
    pub fn missing_count(&self) -> usize {
        self.rows.iter().filter(|r| r.values.is_none()).count()
    }

    /// Re-apply forward-fill. A leading gap stays empty.
    pub fn forward_filled(&self) -> Self {
        let mut last: Option<ForecastValues> = None;
        let rows = self
            .rows
            .iter()
            .map(|row| {
                if row.values.is_some() {
                    last = row.values.clone();
                }
                TableRow {
                    date: row.date,
                    values: row.values.clone().or_else(|| last.clone()),
                }
            })
            .collect();
        Self { rows }
    }

    /// `(date, high)` pairs for rows with a parseable high temperature.
    pub fn high_temperatures(&self) -> Vec<(NaiveDate, i32)> {
        self.rows
            .iter()
            .filter_map(|r| {
                let high = r.values.as_ref()?.high_temperature()?;
                Some((r.date, high))
            })
            .collect()
    }

    /// Weather categories by frequency (descending, ties by name).
    pub fn weather_breakdown(&self) -> Vec<WeatherShare> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut total = 0usize;
        for row in &self.rows {
            if let Some(v) = &row.values {
                *counts.entry(v.weather.as_str()).or_default() += 1;
                total += 1;
            }
        }

        let mut shares: Vec<WeatherShare> = counts
            .into_iter()
            .map(|(weather, count)| WeatherShare {
                weather: weather.to_string(),
                count,
                fraction: count as f64 / total as f64,
            })
            .collect();
        shares.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.weather.cmp(&b.weather)));
        shares
    }
}

/// Validated inclusive date range requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ForecastError> {
        if start > end {
            return Err(ForecastError::InvertedWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parse two `YYYY-MM-DD` strings.
    pub fn parse(start_text: &str, end_text: &str) -> Result<Self, ForecastError> {
        Self::new(parse_input_date(start_text)?, parse_input_date(end_text)?)
    }

    /// Inclusive number of days.
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date from `start` to `end`, inclusive.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + use<> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Four-digit year; month and day may drop their leading zero.
static INPUT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{1,2}-\d{1,2}$").expect("invalid regex: input date"));

/// Parse caller-supplied `YYYY-MM-DD` text.
///
/// The shape is checked before chrono sees it: `%Y` alone would accept a sign,
/// more than four digits and surrounding whitespace.
pub fn parse_input_date(text: &str) -> Result<NaiveDate, ForecastError> {
    let invalid = || ForecastError::InvalidDateFormat {
        input: text.to_string(),
    };
    if !INPUT_DATE.is_match(text) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| invalid())
}

/// Add whole days, saturating at the calendar limit.
pub fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// HTTP fetch settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Page URL with an `{id}` placeholder for the city's source identifier.
    pub url_template: String,
    pub user_agent: String,
    pub timeout: Duration,
}

pub const DEFAULT_URL_TEMPLATE: &str = "http://www.weather.com.cn/weather/{id}.shtml";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl FetchConfig {
    /// Defaults overridden by `WX_URL_TEMPLATE`, `WX_USER_AGENT` and
    /// `WX_TIMEOUT_SECS` (a `.env` file is honored).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let mut config = Self::default();
        if let Ok(template) = std::env::var("WX_URL_TEMPLATE") {
            config.url_template = template;
        }
        if let Ok(agent) = std::env::var("WX_USER_AGENT") {
            config.user_agent = agent;
        }
        if let Some(secs) = std::env::var("WX_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        config
    }

    pub fn url_for(&self, source_id: &str) -> String {
        self.url_template.replace("{id}", source_id)
    }
}
