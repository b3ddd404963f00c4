//! Debug bundle writer for inspecting a fetched page and what became of it.
//!
//! When the upstream layout shifts, the saved page plus the per-entry drop
//! list is usually enough to see which selector stopped matching.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::pipeline::RunOutput;
use crate::error::AppError;
use crate::report::format_table;

/// Write `<root>/wx_debug_<source_id>_<timestamp>/{page.html,report.md}` and
/// return the bundle directory.
pub fn write_debug_bundle(root: &Path, run: &RunOutput) -> Result<PathBuf, AppError> {
    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let dir = root.join(format!("wx_debug_{}_{ts}", run.source_id));
    create_dir_all(&dir).map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    std::fs::write(dir.join("page.html"), &run.html)
        .map_err(|e| AppError::new(4, format!("Failed to write debug page: {e}")))?;

    let mut file = File::create(dir.join("report.md"))
        .map_err(|e| AppError::new(4, format!("Failed to create debug report: {e}")))?;
    write_report(&mut file, run).map_err(|e| AppError::new(4, format!("Failed to write debug report: {e}")))?;

    Ok(dir)
}

fn write_report(out: &mut impl Write, run: &RunOutput) -> std::io::Result<()> {
    writeln!(out, "# wx debug bundle")?;
    writeln!(out, "- generated: {}", Local::now().to_rfc3339())?;
    writeln!(out, "- city: {} (id {})", run.city, run.source_id)?;
    writeln!(out, "- window: {} .. {}", run.window.start, run.window.end)?;
    writeln!(out, "- today: {}", run.today)?;
    writeln!(out, "- page_bytes: {}", run.html.len())?;

    writeln!(out, "\n## Extraction")?;
    writeln!(out, "| entries | extracted | skipped |")?;
    writeln!(out, "| - | - | - |")?;
    writeln!(
        out,
        "| {} | {} | {} |",
        run.report.entries, run.report.extracted, run.report.skipped
    )?;

    writeln!(out, "\n## Dropped entries")?;
    if run.dropped.is_empty() {
        writeln!(out, "(none)")?;
    }
    for err in &run.dropped {
        writeln!(out, "- {err}")?;
    }

    writeln!(out, "\n## Table")?;
    writeln!(out, "```")?;
    write!(out, "{}", format_table(&run.table))?;
    writeln!(out, "```")?;
    Ok(())
}
