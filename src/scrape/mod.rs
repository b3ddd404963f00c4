//! Forecast page extraction.
//!
//! Page structure (weather.com.cn 7-day view):
//!
//! ```html
//! <ul class="t clearfix">
//!   <li>
//!     <h1>19日（今天）</h1>
//!     <p class="wea">多云</p>
//!     <p class="tem"><span>15℃</span>/<i>8℃</i></p>
//!     <p class="win"><em>...</em><i>&lt;3级</i><span title="北风">...</span></p>
//!   </li>
//!   ...
//! </ul>
//! ```
//!
//! The container is mandatory; individual entries may be incomplete and are
//! reported one by one instead of failing the whole page.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::domain::RawForecastRecord;
use crate::error::ForecastError;

static CONTAINER: LazyLock<Selector> = LazyLock::new(|| selector("ul.t.clearfix"));
static ENTRY: LazyLock<Selector> = LazyLock::new(|| selector("li"));
static DATE: LazyLock<Selector> = LazyLock::new(|| selector("h1"));
static WEATHER: LazyLock<Selector> = LazyLock::new(|| selector("p.wea"));
static TEMP_HIGH: LazyLock<Selector> = LazyLock::new(|| selector("p.tem span"));
static TEMP_LOW: LazyLock<Selector> = LazyLock::new(|| selector("p.tem i"));
static TEMP: LazyLock<Selector> = LazyLock::new(|| selector("p.tem"));
static WIND: LazyLock<Selector> = LazyLock::new(|| selector("p.win span"));

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("invalid selector")
}

/// Outcome of a single `li` entry.
pub type EntryResult = Result<RawForecastRecord, ForecastError>;

/// Counts for logging and debug bundles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractionReport {
    pub entries: usize,
    pub extracted: usize,
    pub skipped: usize,
}

impl ExtractionReport {
    pub fn from_results(results: &[EntryResult]) -> Self {
        let extracted = results.iter().filter(|r| r.is_ok()).count();
        Self {
            entries: results.len(),
            extracted,
            skipped: results.len() - extracted,
        }
    }
}

/// Parse a forecast page into per-entry results, in document order.
///
/// Fails with `ContainerNotFound` if the forecast list is absent.
pub fn extract(html: &str) -> Result<Vec<EntryResult>, ForecastError> {
    let document = Html::parse_document(html);
    let container = document
        .select(&CONTAINER)
        .next()
        .ok_or(ForecastError::ContainerNotFound)?;

    let results: Vec<EntryResult> = container
        .select(&ENTRY)
        .enumerate()
        .map(|(index, li)| extract_entry(index, li))
        .collect();

    debug!(
        entries = results.len(),
        extracted = results.iter().filter(|r| r.is_ok()).count(),
        "extracted forecast entries"
    );
    Ok(results)
}

fn extract_entry(index: usize, li: ElementRef<'_>) -> EntryResult {
    let missing = |field: &'static str| ForecastError::PartialEntry { index, field };

    let date_token = first_text(li, &DATE).ok_or_else(|| missing("date"))?;
    let weather_text = first_text(li, &WEATHER).ok_or_else(|| missing("weather"))?;
    if li.select(&TEMP).next().is_none() {
        return Err(missing("temperature"));
    }
    let temperature_low = first_text(li, &TEMP_LOW).ok_or_else(|| missing("low temperature"))?;
    let temperature_high = first_text(li, &TEMP_HIGH);
    let wind_text = li
        .select(&WIND)
        .next()
        .and_then(|span| span.value().attr("title"))
        .map(|t| t.trim().to_string())
        .ok_or_else(|| missing("wind"))?;

    Ok(RawForecastRecord {
        date_token,
        weather_text,
        temperature_low,
        temperature_high,
        wind_text,
    })
}

/// Trimmed text of the first match. An element that exists but is empty
/// still counts as present.
fn first_text(scope: ElementRef<'_>, sel: &Selector) -> Option<String> {
    scope
        .select(sel)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(date: &str, weather: &str, high: Option<&str>, low: &str, wind: &str) -> String {
        let high = high.map(|h| format!("<span>{h}</span>/")).unwrap_or_default();
        format!(
            r#"<li class="sky">
                <h1>{date}</h1>
                <p title="{weather}" class="wea">{weather}</p>
                <p class="tem">{high}<i>{low}</i></p>
                <p class="win"><em><span title="{wind}" class="N"></span></em><i>&lt;3级</i></p>
            </li>"#
        )
    }

    fn page(entries: &[String]) -> String {
        format!(
            r#"<html><body><div id="7d"><ul class="t clearfix">{}</ul></div></body></html>"#,
            entries.join("\n")
        )
    }

    #[test]
    fn extracts_entries_in_document_order() {
        let html = page(&[
            entry("19日（今天）", "多云", Some("15℃"), "8℃", "北风"),
            entry("20日（明天）", "晴", Some("17℃"), "9℃", "南风"),
        ]);
        let results = extract(&html).unwrap();
        assert_eq!(results.len(), 2);

        let first = results[0].as_ref().unwrap();
        assert_eq!(first.date_token, "19日（今天）");
        assert_eq!(first.weather_text, "多云");
        assert_eq!(first.temperature_high.as_deref(), Some("15℃"));
        assert_eq!(first.temperature_low, "8℃");
        assert_eq!(first.wind_text, "北风");
        assert_eq!(first.temperature(), "8℃/15℃");

        assert_eq!(results[1].as_ref().unwrap().date_token, "20日（明天）");
    }

    #[test]
    fn missing_high_temperature_is_not_an_error() {
        let html = page(&[entry("19日（今天）", "小雨", None, "6℃", "东风")]);
        let results = extract(&html).unwrap();
        let rec = results[0].as_ref().unwrap();
        assert_eq!(rec.temperature_high, None);
        assert_eq!(rec.temperature(), "6℃/6℃");
    }

    #[test]
    fn incomplete_entry_is_reported_and_siblings_survive() {
        let broken = r#"<li><h1>20日（明天）</h1><p class="wea">晴</p>
            <p class="tem"><span>17℃</span>/<i>9℃</i></p><p class="win"><i>3级</i></p></li>"#
            .to_string();
        let html = page(&[
            entry("19日（今天）", "多云", Some("15℃"), "8℃", "北风"),
            broken,
            entry("21日（后天）", "阴", Some("12℃"), "5℃", "西风"),
        ]);
        let results = extract(&html).unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1],
            Err(ForecastError::PartialEntry { index: 1, field: "wind" })
        );
        assert!(results[2].is_ok());

        let report = ExtractionReport::from_results(&results);
        assert_eq!(report, ExtractionReport { entries: 3, extracted: 2, skipped: 1 });
    }

    #[test]
    fn entry_without_temperature_block_is_partial() {
        let html = page(&[r#"<li><h1>19日（今天）</h1><p class="wea">晴</p>
            <p class="win"><span title="北风"></span></p></li>"#
            .to_string()]);
        let results = extract(&html).unwrap();
        assert_eq!(
            results[0],
            Err(ForecastError::PartialEntry { index: 0, field: "temperature" })
        );
    }

    #[test]
    fn missing_container_is_a_hard_failure() {
        let html = "<html><body><ul class=\"other\"><li>x</li></ul></body></html>";
        assert_eq!(extract(html), Err(ForecastError::ContainerNotFound));
        assert_eq!(extract(""), Err(ForecastError::ContainerNotFound));
    }

    #[test]
    fn empty_container_yields_no_entries() {
        let html = page(&[]);
        assert_eq!(extract(&html).unwrap(), Vec::new());
    }
}
