//! End-to-end runs against pages served from a temp directory.

use std::fs;

use chrono::NaiveDate;
use tempfile::TempDir;

use wx_forecast::app::pipeline::Pipeline;
use wx_forecast::data::LocalSource;
use wx_forecast::domain::CityIndex;
use wx_forecast::error::ForecastError;
use wx_forecast::io::{TableFile, read_table_json, write_table_csv, write_table_json};

const CITY: &str = "北京";
const CITY_ID: &str = "101010100";

// Relative labels resolve against 2024-03-01; nothing is published for 03-02.
const PAGE: &str = r#"<html><body><div id="7d"><ul class="t clearfix">
    <li><h1>1日（今天）</h1><p class="wea">晴</p>
        <p class="tem"><span>12℃</span>/<i>2℃</i></p>
        <p class="win"><em><span title="北风"></span></em></p></li>
    <li><h1>3日（后天）</h1><p class="wea">小雨</p>
        <p class="tem"><span>9℃</span>/<i>4℃</i></p>
        <p class="win"><em><span title="东风"></span></em></p></li>
</ul></div></body></html>"#;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
}

fn serve(page: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(format!("{CITY_ID}.html")), page).unwrap();
    dir
}

fn cities() -> CityIndex {
    CityIndex::from_pairs([(CITY, CITY_ID)])
}

#[test]
fn gap_is_forward_filled_from_previous_day() {
    let dir = serve(PAGE);
    let cities = cities();
    let pipeline = Pipeline::new(&cities, LocalSource::new(dir.path())).with_today(today());

    let run = pipeline.run("2024-03-01", "2024-03-03", CITY).unwrap();
    let table = &run.table;

    assert_eq!(table.len(), 3);
    assert_eq!(
        table.dates(),
        vec![
            today(),
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 3).unwrap(),
        ]
    );
    assert_eq!(table.rows[1].values, table.rows[0].values);
    assert_eq!(table.missing_count(), 0);

    let first = table.rows[0].values.as_ref().unwrap();
    assert_eq!(first.weather, "晴");
    assert_eq!(first.temperature, "2℃/12℃");
    assert_eq!(first.wind, "北风");
    assert_eq!(table.rows[2].values.as_ref().unwrap().weather, "小雨");
    assert_eq!(run.report.extracted, 2);
    assert!(run.dropped.is_empty());
}

#[test]
fn window_before_first_entry_leaves_a_leading_gap() {
    let dir = serve(PAGE);
    let cities = cities();
    let pipeline = Pipeline::new(&cities, LocalSource::new(dir.path())).with_today(today());

    let table = pipeline.run("2024-02-29", "2024-03-01", CITY).unwrap().table;
    assert_eq!(table.len(), 2);
    assert!(table.rows[0].values.is_none());
    assert_eq!(table.rows[1].values.as_ref().unwrap().weather, "晴");
}

#[test]
fn page_without_forecast_list_yields_empty_table() {
    let dir = serve("<html><body><p>maintenance</p></body></html>");
    let cities = cities();
    let pipeline = Pipeline::new(&cities, LocalSource::new(dir.path())).with_today(today());

    assert_eq!(
        pipeline.run("2024-03-01", "2024-03-03", CITY).unwrap_err(),
        ForecastError::ContainerNotFound
    );
    let table = pipeline.run_or_empty("2024-03-01", "2024-03-03", CITY).unwrap();
    assert!(table.is_empty());
    assert_eq!(table.columns(), ["Date", "Weather", "Temperature", "Wind"]);
}

#[test]
fn unknown_city_and_missing_page_degrade_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let cities = cities();
    let pipeline = Pipeline::new(&cities, LocalSource::new(dir.path())).with_today(today());

    assert!(pipeline.run_or_empty("2024-03-01", "2024-03-03", "Atlantis").unwrap().is_empty());
    // No page on disk for the known city either.
    assert!(pipeline.run_or_empty("2024-03-01", "2024-03-03", CITY).unwrap().is_empty());
}

#[test]
fn malformed_dates_are_reported_not_swallowed() {
    let dir = serve(PAGE);
    let cities = cities();
    let pipeline = Pipeline::new(&cities, LocalSource::new(dir.path())).with_today(today());

    let err = pipeline.run_or_empty("2024/03/01", "2024-03-03", CITY).unwrap_err();
    assert!(matches!(err, ForecastError::InvalidDateFormat { .. }));

    let err = pipeline.run_or_empty("2024-03-03", "2024-03-01", CITY).unwrap_err();
    assert!(matches!(err, ForecastError::InvertedWindow { .. }));
}

#[test]
fn exported_table_can_be_read_back_for_plotting() {
    let dir = serve(PAGE);
    let cities = cities();
    let pipeline = Pipeline::new(&cities, LocalSource::new(dir.path())).with_today(today());
    let run = pipeline.run("2024-03-01", "2024-03-03", CITY).unwrap();

    let json = dir.path().join("table.json");
    write_table_json(&json, &TableFile::from_run(&run)).unwrap();
    let file = read_table_json(&json).unwrap();
    assert_eq!(file.city, CITY);
    assert_eq!(file.table, run.table);

    let csv = dir.path().join("table.csv");
    write_table_csv(&csv, &run.table).unwrap();
    let text = fs::read_to_string(&csv).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Date,Weather,Temperature,Wind");
    assert_eq!(lines[2], "2024-03-02,晴,2℃/12℃,北风");
    assert_eq!(lines.len(), 4);
}
