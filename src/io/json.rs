//! Read/write table JSON files.
//!
//! Table JSON is the "portable" representation of a run: the city, window and
//! reconciled rows. `wx plot --table` re-renders charts from it without
//! touching the network.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::app::pipeline::RunOutput;
use crate::domain::ReconciledTable;
use crate::error::{AppError, ForecastError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableFile {
    pub tool: String,
    pub city: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub table: ReconciledTable,
}

impl TableFile {
    pub fn from_run(run: &RunOutput) -> Self {
        Self {
            tool: "wx".to_string(),
            city: run.city.clone(),
            start: run.window.start,
            end: run.window.end,
            table: run.table.clone(),
        }
    }
}

/// Write a table JSON file.
pub fn write_table_json(path: &Path, file: &TableFile) -> Result<(), ForecastError> {
    let bytes = serde_json::to_vec_pretty(file)
        .map_err(|e| ForecastError::Export(format!("failed to encode table JSON: {e}")))?;
    crate::io::export::write_bytes(path, &bytes)
}

/// Read a table JSON file.
pub fn read_table_json(path: &Path) -> Result<TableFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open table JSON '{}': {e}", path.display())))?;
    let table: TableFile =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid table JSON: {e}")))?;
    Ok(table)
}
