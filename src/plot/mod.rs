//! Terminal charts.

pub mod ascii;

pub use ascii::{render_temperature_plot, render_weather_breakdown};
