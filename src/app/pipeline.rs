//! Shared "forecast pipeline" logic used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! window parse -> city lookup -> fetch -> extract -> normalize -> reconcile
//!
//! The CLI and the TUI can then focus on presentation (printing vs widgets).

use chrono::{Local, NaiveDate};
use tracing::{debug, warn};

use crate::data::ForecastSource;
use crate::domain::{CityIndex, DateWindow, NormalizedRecord, ReconciledTable};
use crate::error::ForecastError;
use crate::normalize::normalize;
use crate::reconcile::reconcile;
use crate::scrape::{ExtractionReport, extract};

/// All outputs of a single successful run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub city: String,
    pub source_id: String,
    pub window: DateWindow,
    /// The date relative labels were resolved against.
    pub today: NaiveDate,
    pub table: ReconciledTable,
    pub report: ExtractionReport,
    /// Entries dropped during extraction or normalization.
    pub dropped: Vec<ForecastError>,
    /// The page the table was built from (kept for debug bundles).
    pub html: String,
}

/// Orchestrates one forecast run against a city index and a page source.
pub struct Pipeline<'a, S> {
    cities: &'a CityIndex,
    source: S,
    today: Option<NaiveDate>,
}

impl<'a, S: ForecastSource> Pipeline<'a, S> {
    pub fn new(cities: &'a CityIndex, source: S) -> Self {
        Self {
            cities,
            source,
            today: None,
        }
    }

    /// Pin the reference date for relative labels (defaults to the local date
    /// at call time).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    /// Execute the full pipeline.
    ///
    /// Per-entry problems are dropped and listed in `RunOutput::dropped`;
    /// anything that prevents producing a table is returned as an error.
    pub fn run(&self, start_text: &str, end_text: &str, city: &str) -> Result<RunOutput, ForecastError> {
        // 1) Validate caller input before touching the network.
        let window = DateWindow::parse(start_text, end_text)?;

        // 2) Resolve the city.
        let source_id = self
            .cities
            .source_id(city)
            .ok_or_else(|| ForecastError::UnknownCity(city.to_string()))?
            .to_string();

        // 3) Fetch + extract.
        let html = self.source.fetch_html(&source_id)?;
        let results = extract(&html)?;
        let report = ExtractionReport::from_results(&results);

        // 4) Normalize, dropping entries that cannot be used.
        let today = self.today.unwrap_or_else(|| Local::now().date_naive());
        let mut dropped = Vec::new();
        let mut records = Vec::with_capacity(results.len());
        for result in results {
            let raw = match result {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(%city, "skipping forecast entry: {err}");
                    dropped.push(err);
                    continue;
                }
            };
            let date = match normalize(&raw.date_token, today) {
                Ok(date) => date,
                Err(err) => {
                    warn!(%city, "skipping forecast entry: {err}");
                    dropped.push(err);
                    continue;
                }
            };
            records.push(NormalizedRecord {
                date,
                values: raw.into_values(),
            });
            // Entries are published chronologically; nothing after this matters.
            if date > window.end {
                debug!(%date, end = %window.end, "stopping at first entry past the window");
                break;
            }
        }

        // 5) Reconcile onto the window.
        let table = reconcile(records, window.start, window.end);

        Ok(RunOutput {
            city: city.to_string(),
            source_id,
            window,
            today,
            table,
            report,
            dropped,
            html,
        })
    }

    /// Like `run`, but every failure other than malformed caller input is
    /// logged and turned into an empty table.
    pub fn run_or_empty(
        &self,
        start_text: &str,
        end_text: &str,
        city: &str,
    ) -> Result<ReconciledTable, ForecastError> {
        match self.run(start_text, end_text, city) {
            Ok(output) => Ok(output.table),
            Err(err) if err.is_input_error() => Err(err),
            Err(err) => {
                warn!(%city, "forecast unavailable, returning empty table: {err}");
                Ok(ReconciledTable::empty())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    struct StaticPage {
        html: String,
        calls: Cell<usize>,
    }

    impl StaticPage {
        fn new(html: &str) -> Self {
            Self {
                html: html.to_string(),
                calls: Cell::new(0),
            }
        }
    }

    impl ForecastSource for StaticPage {
        fn fetch_html(&self, _source_id: &str) -> Result<String, ForecastError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.html.clone())
        }
    }

    const PAGE: &str = r#"<ul class="t clearfix">
        <li><h1>1日（今天）</h1><p class="wea">晴</p>
            <p class="tem"><span>12℃</span>/<i>2℃</i></p>
            <p class="win"><em><span title="北风"></span></em></p></li>
        <li><h1>2日（明天）</h1><p class="wea">多云</p>
            <p class="tem"><span>10℃</span>/<i>1℃</i></p>
            <p class="win"><em></em></p></li>
        <li><h1>3日（后天）</h1><p class="wea">小雨</p>
            <p class="tem"><i>4℃</i></p>
            <p class="win"><em><span title="东风"></span></em></p></li>
        <li><h1>下周</h1><p class="wea">阴</p>
            <p class="tem"><span>9℃</span>/<i>3℃</i></p>
            <p class="win"><em><span title="西风"></span></em></p></li>
    </ul>"#;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn partial_and_unparseable_entries_are_dropped_not_fatal() {
        let cities = CityIndex::builtin();
        let pipeline = Pipeline::new(&cities, StaticPage::new(PAGE)).with_today(today());
        let out = pipeline.run("2024-03-01", "2024-03-03", "北京").unwrap();

        assert_eq!(out.source_id, "101010100");
        assert_eq!(out.report.entries, 4);
        assert_eq!(out.report.skipped, 1);
        assert_eq!(out.dropped.len(), 2);
        assert!(out.dropped.iter().all(ForecastError::is_entry_error));

        // 03-02 lost its wind, so it carries 03-01 forward.
        let rows = &out.table.rows;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].values, rows[0].values);
        let third = rows[2].values.as_ref().unwrap();
        assert_eq!(third.temperature, "4℃/4℃");
        assert_eq!(third.wind, "东风");
    }

    #[test]
    fn malformed_dates_fail_before_fetch() {
        let cities = CityIndex::builtin();
        let source = StaticPage::new(PAGE);
        let pipeline = Pipeline::new(&cities, &source).with_today(today());
        let err = pipeline.run_or_empty("2024/03/01", "2024-03-03", "北京").unwrap_err();
        assert!(matches!(err, ForecastError::InvalidDateFormat { .. }));
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn unknown_city_degrades_to_empty_table() {
        let cities = CityIndex::builtin();
        let source = StaticPage::new(PAGE);
        let pipeline = Pipeline::new(&cities, &source).with_today(today());

        let err = pipeline.run("2024-03-01", "2024-03-03", "Atlantis").unwrap_err();
        assert_eq!(err, ForecastError::UnknownCity("Atlantis".to_string()));

        let table = pipeline.run_or_empty("2024-03-01", "2024-03-03", "Atlantis").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns(), ["Date", "Weather", "Temperature", "Wind"]);
        assert_eq!(source.calls.get(), 0);
    }

    #[test]
    fn missing_container_degrades_to_empty_table() {
        let cities = CityIndex::builtin();
        let pipeline =
            Pipeline::new(&cities, StaticPage::new("<html><body>maintenance</body></html>"))
                .with_today(today());
        assert_eq!(
            pipeline.run("2024-03-01", "2024-03-03", "上海").unwrap_err(),
            ForecastError::ContainerNotFound
        );
        assert!(pipeline.run_or_empty("2024-03-01", "2024-03-03", "上海").unwrap().is_empty());
    }

    #[test]
    fn fetch_failure_degrades_to_empty_table() {
        struct Down;
        impl ForecastSource for Down {
            fn fetch_html(&self, _: &str) -> Result<String, ForecastError> {
                Err(ForecastError::Fetch("connection refused".to_string()))
            }
        }
        let cities = CityIndex::builtin();
        let pipeline = Pipeline::new(&cities, Down).with_today(today());
        assert!(pipeline.run_or_empty("2024-03-01", "2024-03-02", "广州").unwrap().is_empty());
    }
}
