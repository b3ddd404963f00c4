//! `wx-forecast` library crate.
//!
//! The binary (`wx`) is a thin wrapper around this library so that:
//!
//! - the scrape → normalize → reconcile pipeline is testable without spawning processes
//! - the table, chart and export code can be reused by other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod debug;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod normalize;
pub mod plot;
pub mod reconcile;
pub mod report;
pub mod scrape;
pub mod tui;
