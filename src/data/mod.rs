//! Data acquisition: where forecast pages come from.

pub mod source;

pub use source::{ForecastSource, HttpSource, LocalSource};
