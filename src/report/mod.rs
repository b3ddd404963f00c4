//! Reporting utilities: run summaries and text tables.

pub mod format;

pub use format::{display_width, format_run_summary, format_table};
