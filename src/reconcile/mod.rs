//! Range reconciliation: align normalized records to the requested window.
//!
//! Output guarantees (for `start <= end`):
//! - exactly one row per date in `[start, end]`, ascending
//! - dates with a record keep that record's values (first occurrence wins)
//! - dates without one carry forward the nearest preceding row in the window
//! - a leading gap with nothing to carry stays `None`

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{DateWindow, ForecastValues, NormalizedRecord, ReconciledTable, TableRow};

/// Reconcile records onto `[start, end]`. `start > end` yields an empty table.
pub fn reconcile(records: Vec<NormalizedRecord>, start: NaiveDate, end: NaiveDate) -> ReconciledTable {
    let Ok(window) = DateWindow::new(start, end) else {
        return ReconciledTable::empty();
    };

    // Dedup (first occurrence per date) and sort in one pass; records
    // outside the window never reach the reindex step.
    let mut by_date: BTreeMap<NaiveDate, ForecastValues> = BTreeMap::new();
    let mut duplicates = 0usize;
    let mut out_of_window = 0usize;
    for record in records {
        if !window.contains(record.date) {
            out_of_window += 1;
            continue;
        }
        if by_date.contains_key(&record.date) {
            duplicates += 1;
            continue;
        }
        by_date.insert(record.date, record.values);
    }

    let mut rows = Vec::with_capacity(window.len());
    let mut last: Option<ForecastValues> = None;
    let mut filled = 0usize;
    for date in window.days() {
        let values = match by_date.remove(&date) {
            Some(values) => {
                last = Some(values.clone());
                Some(values)
            }
            None => {
                if last.is_some() {
                    filled += 1;
                }
                last.clone()
            }
        };
        rows.push(TableRow { date, values });
    }

    let table = ReconciledTable { rows };
    debug!(
        rows = table.len(),
        duplicates,
        out_of_window,
        filled,
        missing = table.missing_count(),
        "reconciled forecast window"
    );
    table
}
