//! Export a reconciled table to a spreadsheet or CSV.
//!
//! Both exporters forward-fill the table once more before writing; a leading
//! gap is written as empty cells.

use std::io;
use std::path::Path;

use rust_xlsxwriter::{Workbook, XlsxError};
use tracing::info;

use crate::domain::{ReconciledTable, TABLE_COLUMNS};
use crate::error::ForecastError;

/// Worksheet name used for spreadsheet exports.
pub const SHEET_NAME: &str = "Weather Data";

/// `<city>_weather_data.xlsx`
pub fn export_file_name(city: &str) -> String {
    format!("{city}_weather_data.xlsx")
}

/// Write the table as a single-sheet workbook with auto-sized columns.
pub fn write_table_xlsx(path: &Path, table: &ReconciledTable) -> Result<(), ForecastError> {
    let table = table.forward_filled();
    let buffer = build_workbook(&table).map_err(|e| ForecastError::Export(format!("failed to build workbook: {e}")))?;
    write_bytes(path, &buffer)?;
    info!(path = %path.display(), rows = table.len(), "wrote spreadsheet");
    Ok(())
}

fn build_workbook(table: &ReconciledTable) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, name) in TABLE_COLUMNS.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for (idx, row) in table.rows.iter().enumerate() {
        let r = (idx + 1) as u32;
        for (col, cell) in row.cells().iter().enumerate() {
            if !cell.is_empty() {
                sheet.write_string(r, col as u16, cell.as_str())?;
            }
        }
    }
    sheet.autofit();

    workbook.save_to_buffer()
}

/// Write the table as CSV with a header row.
pub fn write_table_csv(path: &Path, table: &ReconciledTable) -> Result<(), ForecastError> {
    let table = table.forward_filled();
    let mut buffer = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer
            .write_record(TABLE_COLUMNS)
            .map_err(|e| ForecastError::Export(format!("failed to write CSV header: {e}")))?;
        for row in &table.rows {
            writer
                .write_record(row.cells())
                .map_err(|e| ForecastError::Export(format!("failed to write CSV row: {e}")))?;
        }
        writer
            .flush()
            .map_err(|e| ForecastError::Export(format!("failed to flush CSV: {e}")))?;
    }
    write_bytes(path, &buffer)?;
    info!(path = %path.display(), rows = table.len(), "wrote CSV");
    Ok(())
}

pub(crate) fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), ForecastError> {
    std::fs::write(path, bytes).map_err(|e| export_error(path, e))
}

fn export_error(path: &Path, err: io::Error) -> ForecastError {
    match err.kind() {
        io::ErrorKind::PermissionDenied => ForecastError::ExportPermission {
            path: path.to_path_buf(),
        },
        _ => ForecastError::Export(format!("failed to write '{}': {err}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ForecastValues, TableRow};
    use crate::error::AppError;
    use chrono::NaiveDate;

    fn table() -> ReconciledTable {
        let d = |day| NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        let v = ForecastValues {
            weather: "晴".to_string(),
            temperature: "2℃/12℃".to_string(),
            wind: "北风".to_string(),
        };
        ReconciledTable {
            rows: vec![
                TableRow { date: d(1), values: None },
                TableRow { date: d(2), values: Some(v) },
                TableRow { date: d(3), values: None },
            ],
        }
    }

    #[test]
    fn export_file_name_uses_city() {
        assert_eq!(export_file_name("北京"), "北京_weather_data.xlsx");
    }

    #[test]
    fn csv_export_forward_fills_and_keeps_leading_gap_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_table_csv(&path, &table()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Date,Weather,Temperature,Wind",
                "2024-03-01,,,",
                "2024-03-02,晴,2℃/12℃,北风",
                "2024-03-03,晴,2℃/12℃,北风",
            ]
        );
    }

    #[test]
    fn xlsx_export_writes_a_zip_container() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(export_file_name("北京"));
        write_table_xlsx(&path, &table()).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn unwritable_target_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.xlsx");
        let err = write_table_xlsx(&path, &table()).unwrap_err();
        assert!(matches!(err, ForecastError::Export(_)));
    }

    #[test]
    fn permission_denied_maps_to_export_permission() {
        let path = Path::new("/locked/北京_weather_data.xlsx");
        assert_eq!(
            export_error(path, io::Error::from(io::ErrorKind::PermissionDenied)),
            ForecastError::ExportPermission {
                path: path.to_path_buf()
            }
        );
        assert!(matches!(
            export_error(path, io::Error::from(io::ErrorKind::NotFound)),
            ForecastError::Export(_)
        ));
        assert_eq!(
            AppError::from(export_error(path, io::Error::from(io::ErrorKind::PermissionDenied))).exit_code(),
            2
        );
    }

    #[test]
    fn empty_table_exports_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        write_table_csv(&path, &ReconciledTable::empty()).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap().trim(),
            "Date,Weather,Temperature,Wind"
        );
    }
}
