//! Error types.
//!
//! - `ForecastError`: everything the scrape/reconcile pipeline and its
//!   exporters can report, one variant per failure class
//! - `AppError`: what the `wx` binary exits with (exit code + message)

use std::path::PathBuf;

use chrono::NaiveDate;

/// Pipeline and export failures.
///
/// Per-entry variants (`DateParse`, `PartialEntry`) never abort a run; the
/// orchestrator logs and drops the entry. Whole-run variants are returned to
/// the caller, which may degrade them to an empty table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForecastError {
    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDateFormat { input: String },

    #[error("start date {start} is after end date {end}")]
    InvertedWindow { start: NaiveDate, end: NaiveDate },

    #[error("unknown city '{0}'")]
    UnknownCity(String),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("forecast list container not found (page layout unavailable or changed)")]
    ContainerNotFound,

    #[error("cannot parse date token '{0}'")]
    DateParse(String),

    #[error("forecast entry {index} is missing its {field}")]
    PartialEntry { index: usize, field: &'static str },

    #[error("no permission to write '{}'", path.display())]
    ExportPermission { path: PathBuf },

    #[error("export failed: {0}")]
    Export(String),
}

impl ForecastError {
    /// Errors caused by malformed caller input. These are always surfaced,
    /// never downgraded to an empty table.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ForecastError::InvalidDateFormat { .. } | ForecastError::InvertedWindow { .. }
        )
    }

    /// Errors that only affect a single forecast entry.
    pub fn is_entry_error(&self) -> bool {
        matches!(
            self,
            ForecastError::DateParse(_) | ForecastError::PartialEntry { .. }
        )
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        let exit_code = match &err {
            e if e.is_input_error() => 2,
            ForecastError::ExportPermission { .. } | ForecastError::Export(_) => 2,
            ForecastError::UnknownCity(_) => 2,
            _ => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
