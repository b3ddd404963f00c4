//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - daily high temperature: `o`, joined by a `-` line
//! - weather breakdown: one `#` bar per category, scaled to its share

use crate::domain::ReconciledTable;
use crate::report::display_width;

/// Render the daily-high time series of a table.
pub fn render_temperature_plot(table: &ReconciledTable, width: usize, height: usize) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (Some(first), Some(last)) = (table.rows.first(), table.rows.last()) else {
        return "Plot: no temperature data\n".to_string();
    };

    // x = day offset from the first row, so gaps without a high stay visible.
    let points: Vec<(f64, f64)> = table
        .high_temperatures()
        .into_iter()
        .map(|(date, high)| ((date - first.date).num_days() as f64, f64::from(high)))
        .collect();
    if points.is_empty() {
        return "Plot: no temperature data\n".to_string();
    }

    let t_min = 0.0;
    let t_max = ((last.date - first.date).num_days() as f64).max(1.0);
    let (y_min, y_max) = y_range(&points);
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    draw_curve(&mut grid, &points, t_min, t_max, y_min, y_max);
    for &(t, y) in &points {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        grid[yy][x] = 'o';
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: {}..{} | high=[{y_min:.2}, {y_max:.2}]℃\n",
        first.date, last.date
    ));
    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }
    out
}

/// Render weather categories as proportion bars, largest first.
pub fn render_weather_breakdown(table: &ReconciledTable, width: usize) -> String {
    let shares = table.weather_breakdown();
    if shares.is_empty() {
        return "Weather breakdown: no data\n".to_string();
    }

    let total: usize = shares.iter().map(|s| s.count).sum();
    let label_width = shares
        .iter()
        .map(|s| display_width(&s.weather))
        .max()
        .unwrap_or(0);
    let bar_width = width.saturating_sub(label_width + 20).max(10);

    let mut out = format!("Weather breakdown ({total} days):\n");
    for share in &shares {
        let filled = ((share.fraction * bar_width as f64).round() as usize).min(bar_width);
        let pad = label_width - display_width(&share.weather);
        out.push_str(&format!(
            "{}{} |{}{}| {:>5.1}% ({})\n",
            share.weather,
            " ".repeat(pad),
            "#".repeat(filled),
            " ".repeat(bar_width - filled),
            share.fraction * 100.0,
            share.count,
        ));
    }
    out
}

fn y_range(points: &[(f64, f64)]) -> (f64, f64) {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for &(_, y) in points {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    if max_y > min_y {
        (min_y, max_y)
    } else {
        // Flat series: give it a band so it lands mid-plot.
        (min_y - 1.0, max_y + 1.0)
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(t: f64, t_min: f64, t_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((t - t_min) / (t_max - t_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(grid: &mut [Vec<char>], curve: &[(f64, f64)], t_min: f64, t_max: f64, y_min: f64, y_max: f64) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(t, y) in curve {
        let x = map_x(t, t_min, t_max, width);
        let yy = map_y(y, y_min, y_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, yy, '-');
        } else {
            grid[yy][x] = '-';
        }
        prev = Some((x, yy));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
