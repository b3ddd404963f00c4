//! Input/output helpers.
//!
//! - spreadsheet and CSV exports (`export`)
//! - table JSON read/write (`json`)

pub mod export;
pub mod json;

pub use export::*;
pub use json::*;
