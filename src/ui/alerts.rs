//! Alerts view rendering.
//!
//! Every abnormal reading still in the window, most severe first.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use super::common::format_value;
use crate::app::App;

/// Render the Alerts view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let alerts = app.session.alerts();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if alerts.is_empty() {
        let message = Paragraph::new(vec![
            Line::from(""),
            Line::from(" All channels within normal range"),
        ])
        .style(Style::default().fg(app.theme.good))
        .block(block.title(" Alerts (0) "));
        frame.render_widget(message, area);
        return;
    }

    let header = Row::new(vec![
        Cell::from("Tick"),
        Cell::from("Channel"),
        Cell::from("Value"),
        Cell::from("Condition"),
        Cell::from("Severity"),
    ])
    .height(1)
    .style(app.theme.header);

    let rows: Vec<Row> = alerts
        .iter()
        .map(|(reading, diagnosis)| {
            let style = app.theme.severity_style(diagnosis.severity);
            Row::new(vec![
                Cell::from(reading.tick.to_string()),
                Cell::from(reading.channel.label()),
                Cell::from(format!(
                    "{} {}",
                    format_value(reading.channel, reading.value),
                    reading.channel.unit()
                )),
                Cell::from(diagnosis.condition.name()).style(style),
                Cell::from(diagnosis.severity.to_string()).style(style),
            ])
        })
        .collect();

    let widths = [
        Constraint::Length(8),
        Constraint::Fill(2),
        Constraint::Length(11),
        Constraint::Fill(3),
        Constraint::Min(9),
    ];

    let selected = app.selected_alert_index.min(alerts.len() - 1);
    let title = format!(" Alerts ({}) [{}/{}] ", alerts.len(), selected + 1, alerts.len());

    let table = Table::new(rows, widths)
        .header(header)
        .block(block.title(title))
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}
