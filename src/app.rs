//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - loads the city index and fetch settings
//! - runs the forecast pipeline
//! - prints tables/plots
//! - writes optional exports

use std::path::Path;

use chrono::{Local, NaiveDate};
use clap::Parser;
use tracing::error;

use crate::cli::{Command, FetchArgs, PlotArgs, TuiArgs};
use crate::data::{ForecastSource, HttpSource, LocalSource};
use crate::domain::{CityIndex, DATE_FORMAT, add_days, parse_input_date};
use crate::error::{AppError, ForecastError};

pub mod pipeline;

use pipeline::{Pipeline, RunOutput};

/// Days shown when only a start date is given (the page's 7-day view).
pub const DEFAULT_WINDOW_DAYS: u64 = 7;

/// Entry point for the `wx` binary.
pub fn run() -> Result<(), AppError> {
    // We want `wx` and `wx -c 北京` to behave like `wx tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    // The TUI owns the terminal; its diagnostics go to the status line instead.
    if !matches!(cli.command, Command::Tui(_)) {
        crate::logging::init(cli.verbose);
    }

    match cli.command {
        Command::Fetch(args) => handle_fetch(args),
        Command::Cities => handle_cities(),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_fetch(args: FetchArgs) -> Result<(), AppError> {
    let cities = CityIndex::from_env()?;
    let city = match &args.city {
        Some(city) => city.clone(),
        None => crate::cli::picker::prompt_for_city(&cities)?,
    };

    let today = Local::now().date_naive();
    let (start_text, end_text) = window_text(args.start.as_deref(), args.end.as_deref(), today);

    let source = make_source(args.html_dir.as_deref())?;
    let pipeline = Pipeline::new(&cities, source).with_today(today);

    let run = match pipeline.run(&start_text, &end_text, &city) {
        Ok(run) => run,
        Err(err @ ForecastError::UnknownCity(_)) => return Err(err.into()),
        Err(err) if err.is_input_error() => return Err(err.into()),
        Err(err) => {
            return Err(AppError::new(3, format!("No forecast data for {city}: {err}")));
        }
    };

    print!("{}", crate::report::format_run_summary(&run));
    println!("{}", crate::report::format_table(&run.table));

    if !args.no_plot {
        println!(
            "{}",
            crate::plot::render_temperature_plot(&run.table, args.width, args.height)
        );
        println!("{}", crate::plot::render_weather_breakdown(&run.table, args.width));
    }

    if args.debug {
        let dir = crate::debug::write_debug_bundle(Path::new("debug"), &run)?;
        println!("Wrote debug bundle: {}", dir.display());
    }

    write_exports(&args, &run)
}

/// Run every requested export; report each failure and return the first one.
///
/// A failed export never discards the table already printed.
fn write_exports(args: &FetchArgs, run: &RunOutput) -> Result<(), AppError> {
    let mut first_err: Option<ForecastError> = None;
    let mut record = |result: Result<String, ForecastError>| match result {
        Ok(path) => println!("Saved weather data to {path}"),
        Err(err) => {
            error!("{err}");
            first_err.get_or_insert(err);
        }
    };

    if args.export {
        let name = crate::io::export_file_name(&run.city);
        record(crate::io::write_table_xlsx(Path::new(&name), &run.table).map(|_| name));
    }
    if let Some(path) = &args.csv {
        record(crate::io::write_table_csv(path, &run.table).map(|_| path.display().to_string()));
    }
    if let Some(path) = &args.json {
        let file = crate::io::TableFile::from_run(run);
        record(crate::io::write_table_json(path, &file).map(|_| path.display().to_string()));
    }

    match first_err {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn handle_cities() -> Result<(), AppError> {
    let cities = CityIndex::from_env()?;
    let width = cities
        .iter()
        .map(|(name, _)| crate::report::display_width(name))
        .max()
        .unwrap_or(0);
    for (name, id) in cities.iter() {
        let pad = width - crate::report::display_width(name);
        println!("{name}{}  {id}", " ".repeat(pad));
    }
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_table_json(&args.table)?;
    println!("{} {} .. {}", file.city, file.start, file.end);
    println!(
        "{}",
        crate::plot::render_temperature_plot(&file.table, args.width, args.height)
    );
    println!("{}", crate::plot::render_weather_breakdown(&file.table, args.width));
    Ok(())
}

fn handle_tui(args: TuiArgs) -> Result<(), AppError> {
    crate::tui::run(args)
}

/// HTTP by default; a local page directory when given.
pub fn make_source(html_dir: Option<&Path>) -> Result<Box<dyn ForecastSource>, AppError> {
    Ok(match html_dir {
        Some(dir) => Box::new(LocalSource::new(dir)),
        None => Box::new(HttpSource::from_env()?),
    })
}

/// Fill in missing window bounds: start defaults to today, end to
/// start + 6 days. Unparseable text is passed through untouched so the
/// pipeline reports it.
pub fn window_text(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> (String, String) {
    let start_text = start
        .map(str::to_string)
        .unwrap_or_else(|| today.format(DATE_FORMAT).to_string());
    let end_text = match end {
        Some(end) => end.to_string(),
        None => match parse_input_date(&start_text) {
            Ok(start) => add_days(start, DEFAULT_WINDOW_DAYS - 1)
                .format(DATE_FORMAT)
                .to_string(),
            Err(_) => start_text.clone(),
        },
    };
    (start_text, end_text)
}

/// Rewrite argv so `wx` defaults to `wx tui`.
///
/// Rules:
/// - `wx`                      -> `wx tui`
/// - `wx -c 北京 ...`          -> `wx tui -c 北京 ...`
/// - `wx --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fetch" | "cities" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // Verbosity flags are global; anything else that looks like a flag is a TUI flag.
    if arg1.starts_with('-') && !arg1.starts_with("-v") && arg1 != "--verbose" {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
