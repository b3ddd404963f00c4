//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - forecast records at each pipeline stage (`RawForecastRecord`, `NormalizedRecord`)
//! - the reconciled output (`ReconciledTable`, `TableRow`)
//! - the requested window (`DateWindow`) and fetch settings (`FetchConfig`)
//! - the city index (`CityIndex`)

pub mod cities;
pub mod types;

pub use cities::CityIndex;
pub use types::*;
