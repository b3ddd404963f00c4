//! Plotters-powered temperature chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A lightweight, render-only chart description.
///
/// All series and bounds are computed outside the render call, which keeps
/// `render()` focused on drawing.
pub struct TemperatureChart<'a> {
    /// Daily highs, x = day offset from the first row.
    pub highs: &'a [(f64, f64)],
    /// Daily lows on the same x axis.
    pub lows: &'a [(f64, f64)],
    pub x_bounds: [f64; 2],
    /// Y bounds (℃).
    pub y_bounds: [f64; 2],
    /// `MM-DD` label per day offset.
    pub x_labels: &'a [String],
    pub y_label: &'a str,
}

impl<'a> Widget for TemperatureChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // When the available area is too small, Plotters may fail to build a chart.
        // In that case, we render a small hint rather than panicking.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        if !(x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite()) || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 6)
                .set_label_area_size(LabelAreaPosition::Bottom, 2)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .y_desc(self.y_label)
                .x_labels(self.x_labels.len().clamp(2, 7))
                .y_labels(5)
                .x_label_formatter(&|v| day_label(self.x_labels, *v))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let high_color = RGBColor(255, 128, 0);
            let low_color = RGBColor(0, 255, 255);

            chart.draw_series(LineSeries::new(self.highs.iter().copied(), &high_color))?;
            chart.draw_series(LineSeries::new(self.lows.iter().copied(), &low_color))?;

            // Pixels rather than circles: the backend maps circle radii poorly.
            chart.draw_series(self.highs.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

/// Label for the nearest whole day offset; blank between days.
fn day_label(labels: &[String], v: f64) -> String {
    let idx = v.round();
    if (v - idx).abs() > 0.25 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}
