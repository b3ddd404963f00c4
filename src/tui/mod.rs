//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for the window and city, then renders the
//! reconciled table next to a temperature chart and a weather breakdown.

use std::io;
use std::path::Path;
use std::time::Duration;

use chrono::{Days, Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{BarChart, Block, Borders, Cell, Clear, List, ListItem, Paragraph, Row, Table},
};

use crate::app::pipeline::{Pipeline, RunOutput};
use crate::cli::TuiArgs;
use crate::data::ForecastSource;
use crate::domain::{CityIndex, DATE_FORMAT, ReconciledTable, TABLE_COLUMNS, parse_input_date};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::TemperatureChart;

const START: usize = 0;
const END: usize = 1;
const CITY: usize = 2;
const FIELD_NAMES: [&str; 3] = ["Start", "End", "City"];

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    let mut app = App::new(args)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    inputs: [String; 3],
    selected_field: usize,
    editing: bool,
    edit_buffer: String,
    status: String,
    cities: CityIndex,
    source: Box<dyn ForecastSource>,
    run: Option<RunOutput>,
    table: ReconciledTable,
}

impl App {
    fn new(args: TuiArgs) -> Result<Self, AppError> {
        let cities = CityIndex::from_env()?;
        let source = crate::app::make_source(args.html_dir.as_deref())?;
        let today = Local::now().date_naive();
        let (start, end) = crate::app::window_text(None, None, today);

        let prefilled = args.city.is_some();
        let city = args
            .city
            .or_else(|| cities.names().first().map(|name| name.to_string()))
            .unwrap_or_default();

        let mut app = Self {
            inputs: [start, end, city],
            selected_field: CITY,
            editing: false,
            edit_buffer: String::new(),
            status: "Pick a city and press r to fetch.".to_string(),
            cities,
            source,
            run: None,
            table: ReconciledTable::empty(),
        };
        if prefilled {
            app.run_forecast();
        }
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.editing {
            self.handle_edit(code);
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field < CITY {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Enter => {
                self.editing = true;
                self.edit_buffer = self.inputs[self.selected_field].clone();
                self.status = format!(
                    "Editing {}. Enter to apply, Esc to cancel.",
                    FIELD_NAMES[self.selected_field].to_lowercase()
                );
            }
            KeyCode::Char('r') => self.run_forecast(),
            KeyCode::Char('e') => self.export(),
            KeyCode::Char('d') => self.write_debug(),
            _ => {}
        }
        false
    }

    fn handle_edit(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.editing = false;
                self.status = "Edit canceled.".to_string();
            }
            KeyCode::Enter => {
                self.editing = false;
                self.inputs[self.selected_field] = self.edit_buffer.trim().to_string();
                self.status = format!(
                    "{}: {}",
                    FIELD_NAMES[self.selected_field],
                    self.inputs[self.selected_field]
                );
            }
            KeyCode::Backspace => {
                self.edit_buffer.pop();
            }
            KeyCode::Char(c) => {
                if accepts_char(self.selected_field, c) {
                    self.edit_buffer.push(c);
                }
            }
            _ => {}
        }
    }

    /// ←/→ step dates by one day and cycle through known cities.
    fn adjust_field(&mut self, delta: i32) {
        let field = self.selected_field;
        if field == CITY {
            let names = self.cities.names();
            if let Some(next) = cycle_name(&names, &self.inputs[CITY], delta) {
                self.inputs[CITY] = next.to_string();
            }
            return;
        }

        match parse_input_date(&self.inputs[field]) {
            Ok(date) => {
                if let Some(next) = step_date(date, delta) {
                    self.inputs[field] = next.format(DATE_FORMAT).to_string();
                }
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn run_forecast(&mut self) {
        let today = Local::now().date_naive();
        let [start, end, city] = &self.inputs;
        let result = Pipeline::new(&self.cities, &self.source)
            .with_today(today)
            .run(start, end, city);

        match result {
            Ok(run) => {
                self.status = format!(
                    "{} rows for {} ({} entries dropped)",
                    run.table.len(),
                    run.city,
                    run.dropped.len()
                );
                self.table = run.table.clone();
                self.run = Some(run);
            }
            // Bad input leaves the previous result on screen.
            Err(err) if err.is_input_error() => {
                self.status = format!("Invalid input: {err}");
            }
            Err(err) => {
                self.status = format!("No forecast data: {err}");
                self.table = ReconciledTable::empty();
                self.run = None;
            }
        }
    }

    fn export(&mut self) {
        let Some(run) = &self.run else {
            self.status = "Nothing to export; press r first.".to_string();
            return;
        };
        let name = crate::io::export_file_name(&run.city);
        self.status = match crate::io::write_table_xlsx(Path::new(&name), &self.table) {
            Ok(()) => format!("Saved weather data to {name}"),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn write_debug(&mut self) {
        let Some(run) = &self.run else {
            self.status = "No run to debug; press r first.".to_string();
            return;
        };
        self.status = match crate::debug::write_debug_bundle(Path::new("debug"), run) {
            Ok(path) => format!("Wrote debug bundle: {}", path.display()),
            Err(err) => format!("Debug write failed: {err}"),
        };
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(5),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
        self.draw_body(frame, chunks[2]);
        self.draw_footer(frame, chunks[3]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("wx", Style::default().fg(Color::Cyan)),
            Span::raw("  multi-day city forecast"),
        ]));

        let summary = match &self.run {
            Some(run) => format!(
                "city: {} ({}) | window: {} .. {} | rows: {} | missing: {} | extracted {}/{}",
                run.city,
                run.source_id,
                run.window.start,
                run.window.end,
                run.table.len(),
                run.table.missing_count(),
                run.report.extracted,
                run.report.entries,
            ),
            None => "no data".to_string(),
        };
        lines.push(Line::from(Span::styled(summary, Style::default().fg(Color::Gray))));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = FIELD_NAMES
            .iter()
            .enumerate()
            .map(|(idx, name)| {
                let value = if self.editing && idx == self.selected_field {
                    format!("{}_", self.edit_buffer)
                } else {
                    self.inputs[idx].clone()
                };
                ListItem::new(format!("{name}: {value}"))
            })
            .collect();

        let title = if self.editing { "Settings (editing)" } else { "Settings" };
        let list = List::new(items)
            .block(Block::default().title(title).borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(8)])
            .split(columns[1]);

        self.draw_table(frame, columns[0]);
        self.draw_chart(frame, right[0]);
        self.draw_breakdown(frame, right[1]);
    }

    fn draw_table(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Forecast").borders(Borders::ALL);
        if self.table.is_empty() {
            let msg = Paragraph::new("(no rows)")
                .style(Style::default().fg(Color::Yellow))
                .block(block);
            frame.render_widget(msg, area);
            return;
        }

        let header = Row::new(TABLE_COLUMNS.iter().map(|c| Cell::from(*c)))
            .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
        let rows = self.table.rows.iter().map(|row| {
            let style = if row.values.is_none() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new(row.cells().into_iter().map(Cell::from)).style(style)
        });
        let widths = [
            Constraint::Length(10),
            Constraint::Min(6),
            Constraint::Length(10),
            Constraint::Min(6),
        ];

        frame.render_widget(Table::new(rows, widths).header(header).block(block), area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Temperature (high/low)").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(series) = temperature_series(&self.table) else {
            let msg = Paragraph::new("No temperatures to plot.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let widget = TemperatureChart {
            highs: &series.highs,
            lows: &series.lows,
            x_bounds: series.x_bounds,
            y_bounds: series.y_bounds,
            x_labels: &series.labels,
            y_label: "℃",
        };
        frame.render_widget(widget, inner);
    }

    fn draw_breakdown(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Weather").borders(Borders::ALL);
        let shares = self.table.weather_breakdown();
        if shares.is_empty() {
            frame.render_widget(block, area);
            return;
        }

        let data: Vec<(&str, u64)> = shares
            .iter()
            .map(|s| (s.weather.as_str(), s.count as u64))
            .collect();
        let chart = BarChart::default()
            .block(block)
            .data(data.as_slice())
            .bar_width(8)
            .bar_gap(1)
            .bar_style(Style::default().fg(Color::Cyan))
            .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
        frame.render_widget(chart, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  Enter edit  r run  e export  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Date fields take digits and dashes; the city field takes anything printable.
fn accepts_char(field: usize, c: char) -> bool {
    match field {
        START | END => c.is_ascii_digit() || c == '-',
        _ => !c.is_control(),
    }
}

fn step_date(date: NaiveDate, delta: i32) -> Option<NaiveDate> {
    if delta >= 0 {
        date.checked_add_days(Days::new(1))
    } else {
        date.checked_sub_days(Days::new(1))
    }
}

/// Next/previous name in index order, wrapping. Unknown input jumps to the first name.
fn cycle_name<'a>(names: &[&'a str], current: &str, delta: i32) -> Option<&'a str> {
    if names.is_empty() {
        return None;
    }
    let Some(pos) = names.iter().position(|n| *n == current) else {
        return Some(names[0]);
    };
    let next = if delta >= 0 {
        (pos + 1) % names.len()
    } else {
        (pos + names.len() - 1) % names.len()
    };
    Some(names[next])
}

/// Chart data for the temperature widget.
struct TemperatureSeries {
    highs: Vec<(f64, f64)>,
    lows: Vec<(f64, f64)>,
    labels: Vec<String>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

/// Build chart series; x is the row index, so gaps keep their slot.
fn temperature_series(table: &ReconciledTable) -> Option<TemperatureSeries> {
    let mut highs = Vec::new();
    let mut lows = Vec::new();
    for (idx, row) in table.rows.iter().enumerate() {
        let Some(values) = &row.values else { continue };
        let x = idx as f64;
        if let Some(high) = values.high_temperature() {
            highs.push((x, high as f64));
        }
        if let Some(low) = values.low_temperature() {
            lows.push((x, low as f64));
        }
    }
    if highs.is_empty() && lows.is_empty() {
        return None;
    }

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in highs.iter().chain(&lows) {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    let pad = ((y_max - y_min) * 0.1).max(1.0);

    let labels = table.rows.iter().map(|r| r.date.format("%m-%d").to_string()).collect();
    let x_max = (table.len().saturating_sub(1)).max(1) as f64;

    Some(TemperatureSeries {
        highs,
        lows,
        labels,
        x_bounds: [0.0, x_max],
        y_bounds: [y_min - pad, y_max + pad],
    })
}
