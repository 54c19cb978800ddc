//! Monitor view rendering.
//!
//! A table with the latest reading of every channel, followed by a line
//! chart of the selected channel's window.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, TableState},
    Frame,
};

use super::common::{format_trend, format_value, render_sparkline};
use crate::app::App;

const SPARKLINE_WIDTH: usize = 16;

/// Render the Monitor view.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let channel_count = app.session.channels().count() as u16;
    let chunks = Layout::vertical([
        Constraint::Length(channel_count + 3),
        Constraint::Min(6),
    ])
    .split(area);

    render_channels(frame, app, chunks[0]);
    render_chart(frame, app, chunks[1]);
}

fn render_channels(frame: &mut Frame, app: &App, area: Rect) {
    let header = Row::new(vec![
        Cell::from("Channel"),
        Cell::from("Value"),
        Cell::from("Unit"),
        Cell::from("Δ"),
        Cell::from("Condition"),
        Cell::from("Trend"),
        Cell::from("Status"),
    ])
    .height(1)
    .style(app.theme.header);

    let channels: Vec<_> = app.session.channels().collect();
    let rows: Vec<Row> = channels
        .iter()
        .map(|&channel| {
            let sparkline = render_sparkline(&app.session.sparkline(channel), SPARKLINE_WIDTH);
            let trend = format_trend(channel, app.session.trend(channel));

            match app.session.latest(channel) {
                Some((reading, diagnosis)) => {
                    let style = app.theme.severity_style(diagnosis.severity);
                    Row::new(vec![
                        Cell::from(channel.label()),
                        Cell::from(format_value(channel, reading.value)).style(style),
                        Cell::from(channel.unit()),
                        Cell::from(trend),
                        Cell::from(diagnosis.condition.name()).style(style),
                        Cell::from(sparkline).style(Style::default().fg(app.theme.trace)),
                        Cell::from(diagnosis.severity.symbol()).style(style),
                    ])
                }
                None => Row::new(vec![
                    Cell::from(channel.label()),
                    Cell::from("-"),
                    Cell::from(channel.unit()),
                    Cell::from(trend),
                    Cell::from("-"),
                    Cell::from(sparkline),
                    Cell::from("-"),
                ]),
            }
        })
        .collect();

    let widths = [
        Constraint::Fill(2),
        Constraint::Length(7),
        Constraint::Length(5),
        Constraint::Length(6),
        Constraint::Fill(3),
        Constraint::Min(SPARKLINE_WIDTH as u16),
        Constraint::Min(6),
    ];

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(" Vital Signs ")
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(channels.iter().position(|&c| c == app.selected_channel));

    frame.render_stateful_widget(table, area, &mut state);
}

fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let channel = app.selected_channel;
    let title = format!(" {} ({}) ", channel.label(), channel.unit());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let points: Vec<(f64, f64)> = app
        .session
        .buffer(channel)
        .map(|b| b.iter().map(|(r, _)| (r.tick as f64, r.value)).collect())
        .unwrap_or_default();

    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        frame.render_widget(Paragraph::new(" No readings yet").block(block), area);
        return;
    };

    let (lo, hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, v)| (lo.min(v), hi.max(v)));
    let pad = ((hi - lo) * 0.1).max(0.5);
    let (y_min, y_max) = (lo - pad, hi + pad);
    let (x_min, x_max) = (first.0, last.0.max(first.0 + 1.0));

    let color = app
        .session
        .latest(channel)
        .map(|(_, d)| app.theme.severity_color(d.severity))
        .unwrap_or(app.theme.trace);

    let dataset = Dataset::default()
        .name(channel.label())
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(&points);

    let axis_style = Style::default().fg(app.theme.border);
    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .title("Tick")
                .style(axis_style)
                .bounds([x_min, x_max])
                .labels(vec![
                    Span::raw(format!("{}", x_min)),
                    Span::raw(format!("{}", x_max)),
                ]),
        )
        .y_axis(
            Axis::default()
                .style(axis_style)
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::raw(format_value(channel, y_min)),
                    Span::raw(format_value(channel, (y_min + y_max) / 2.0)),
                    Span::raw(format_value(channel, y_max)),
                ]),
        );

    frame.render_widget(chart, area);
}
