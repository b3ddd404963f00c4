//! Command-line parsing for the forecast scraper.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the scraping/reconciliation code.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "wx", version, about = "Multi-day city forecast scraper")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a forecast, print the reconciled table and charts, optionally export.
    Fetch(FetchArgs),
    /// List the known cities and their source identifiers.
    Cities,
    /// Plot a previously exported table JSON.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same underlying pipeline as `wx fetch`, but renders results
    /// in a terminal UI using Ratatui.
    Tui(TuiArgs),
}

/// Options for a single forecast run.
#[derive(Debug, Parser, Clone)]
pub struct FetchArgs {
    /// First date of the window (YYYY-MM-DD). Defaults to today.
    #[arg(short, long)]
    pub start: Option<String>,

    /// Last date of the window (YYYY-MM-DD). Defaults to start + 6 days.
    #[arg(short, long)]
    pub end: Option<String>,

    /// City name, exactly as listed by `wx cities`. Prompts when omitted.
    #[arg(short, long)]
    pub city: Option<String>,

    /// Write `<city>_weather_data.xlsx` in the current directory.
    #[arg(long)]
    pub export: bool,

    /// Export the table to CSV.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,

    /// Export the table (plus city/window) to JSON.
    #[arg(long, value_name = "PATH")]
    pub json: Option<PathBuf>,

    /// Disable the terminal charts.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 12)]
    pub height: usize,

    /// Read pages from `<DIR>/<id>.html` instead of the network.
    #[arg(long, value_name = "DIR")]
    pub html_dir: Option<PathBuf>,

    /// Write a debug bundle (page + extraction report) under ./debug.
    #[arg(long)]
    pub debug: bool,
}

/// Options for plotting a saved table.
#[derive(Debug, Parser)]
pub struct PlotArgs {
    /// Table JSON file produced by `wx fetch --json`.
    #[arg(long, value_name = "JSON")]
    pub table: PathBuf,

    /// Plot width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 12)]
    pub height: usize,
}

/// Options for the TUI.
#[derive(Debug, Parser, Clone, Default)]
pub struct TuiArgs {
    /// Pre-filled city.
    #[arg(short, long)]
    pub city: Option<String>,

    /// Read pages from `<DIR>/<id>.html` instead of the network.
    #[arg(long, value_name = "DIR")]
    pub html_dir: Option<PathBuf>,
}
