//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the pipeline code stays clean and testable
//! - output changes are localized (important for snapshot tests)

use unicode_width::UnicodeWidthStr;

use crate::app::pipeline::RunOutput;
use crate::domain::{ReconciledTable, TABLE_COLUMNS};

/// Placeholder for unresolved cells.
const MISSING: &str = "-";

/// Format the run summary (city, window, extraction counts, drops).
pub fn format_run_summary(run: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== wx - forecast ===\n");
    out.push_str(&format!("City: {} (id {})\n", run.city, run.source_id));
    out.push_str(&format!(
        "Window: {} .. {} ({} days, today={})\n",
        run.window.start,
        run.window.end,
        run.window.len(),
        run.today
    ));
    out.push_str(&format!(
        "Entries: {} on page | {} extracted | {} skipped\n",
        run.report.entries, run.report.extracted, run.report.skipped
    ));

    let scraped = run.table.rows.len() - run.table.missing_count();
    out.push_str(&format!(
        "Rows: {} | with values {} | missing {}\n",
        run.table.len(),
        scraped,
        run.table.missing_count()
    ));

    if !run.dropped.is_empty() {
        out.push_str("\nDropped entries:\n");
        for err in &run.dropped {
            out.push_str(&format!("  - {err}\n"));
        }
    }
    out.push('\n');

    out
}

/// Format the table with aligned columns.
pub fn format_table(table: &ReconciledTable) -> String {
    if table.is_empty() {
        return "(no rows)\n".to_string();
    }

    let rows: Vec<[String; 4]> = table
        .rows
        .iter()
        .map(|r| {
            let mut cells = r.cells();
            for cell in cells.iter_mut().skip(1) {
                if cell.is_empty() {
                    *cell = MISSING.to_string();
                }
            }
            cells
        })
        .collect();

    let mut widths = TABLE_COLUMNS.map(display_width);
    for cells in &rows {
        for (w, cell) in widths.iter_mut().zip(cells) {
            *w = (*w).max(display_width(cell));
        }
    }

    let mut out = String::new();
    out.push_str(&format_line(&TABLE_COLUMNS.map(str::to_string), &widths));
    out.push_str(&format_line(&widths.map(|w| "-".repeat(w)), &widths));
    for cells in &rows {
        out.push_str(&format_line(cells, &widths));
    }
    out
}

fn format_line(cells: &[String; 4], widths: &[usize; 4]) -> String {
    let mut line = String::new();
    for (i, (cell, w)) in cells.iter().zip(widths).enumerate() {
        line.push_str(cell);
        if i + 1 < cells.len() {
            let pad = w.saturating_sub(display_width(cell)) + 2;
            line.push_str(&" ".repeat(pad));
        }
    }
    line.push('\n');
    line
}

/// Terminal column width: CJK and fullwidth characters take two cells.
pub fn display_width(s: &str) -> usize {
    s.width()
}
