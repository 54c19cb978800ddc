//! History view rendering.
//!
//! Lists the selected channel's buffered readings, newest first.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    widgets::{Block, Borders, Cell, Row, Table},
    Frame,
};

use super::common::{format_trend, format_value};
use crate::app::App;

/// Render the History view for the selected channel.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let channel = app.selected_channel;
    let entries = app.session.snapshot(channel).unwrap_or_default();

    let header = Row::new(vec![
        Cell::from("Tick"),
        Cell::from("Value"),
        Cell::from("Δ"),
        Cell::from("Condition"),
        Cell::from("Status"),
        Cell::from("Event"),
    ])
    .height(1)
    .style(app.theme.header);

    // Pair each entry with its predecessor to show the step change
    let rows: Vec<Row> = entries
        .iter()
        .enumerate()
        .rev()
        .map(|(i, (reading, diagnosis))| {
            let delta = i
                .checked_sub(1)
                .and_then(|p| entries.get(p))
                .map(|(prev, _)| reading.value - prev.value);
            let style = app.theme.severity_style(diagnosis.severity);
            Row::new(vec![
                Cell::from(reading.tick.to_string()),
                Cell::from(format_value(channel, reading.value)).style(style),
                Cell::from(format_trend(channel, delta)),
                Cell::from(diagnosis.condition.name()).style(style),
                Cell::from(diagnosis.severity.symbol()).style(style),
                Cell::from(reading.anomaly.map(|kind| kind.name()).unwrap_or("")),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(7),
        Constraint::Fill(1),
        Constraint::Length(6),
        Constraint::Length(18),
    ];

    let title = format!(
        " {} history ({}/{}) [↑↓:channel] ",
        channel.label(),
        entries.len(),
        app.session.window()
    );

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );

    frame.render_widget(table, area);
}
