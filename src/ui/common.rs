//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_duration;
use crate::data::{Channel, Severity};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the header bar with the patient overview.
///
/// Displays: overall severity, channel counts per tier, tick and window.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let session = &app.session;
    if session.ticks() == 0 {
        let line = Line::from(vec![
            Span::styled(" VITALWATCH ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("| Waiting for first reading..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let mut counts = [0usize; 4];
    for channel in session.channels() {
        if let Some((_, d)) = session.latest(channel) {
            counts[d.severity as usize] += 1;
        }
    }

    let overall = session.overall_severity();
    let tier = |severity: Severity, label: &'static str| -> Vec<Span<'static>> {
        let n = counts[severity as usize];
        let count = if n > 0 || severity == Severity::Good {
            Span::styled(n.to_string(), app.theme.severity_style(severity))
        } else {
            Span::styled("0", Style::default().add_modifier(Modifier::DIM))
        };
        vec![count, Span::raw(label)]
    };

    let mut spans = vec![
        Span::styled(" ● ", app.theme.severity_style(overall)),
        Span::styled("VITALWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(overall.to_string(), app.theme.severity_style(overall)),
        Span::raw(" │ "),
    ];
    spans.extend(tier(Severity::Good, " ok "));
    spans.extend(tier(Severity::Caution, " caut "));
    spans.extend(tier(Severity::Concern, " conc "));
    spans.extend(tier(Severity::Critical, " crit │ "));
    spans.push(Span::raw(format!(
        "tick {} │ window {}",
        session.ticks(),
        session.window()
    )));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
///
/// Highlights the currently active view.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let views = [View::Monitor, View::History, View::Alerts];
    let titles: Vec<Line> = views
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let label = if *v == View::Alerts {
                format!(" {}:{} ({}) ", i + 1, v.label(), app.session.alerts().len())
            } else {
                format!(" {}:{} ", i + 1, v.label())
            };
            Line::from(label)
        })
        .collect();

    let selected = views.iter().position(|v| *v == app.current_view).unwrap_or(0);

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the tick rate, run state, and available controls. Temporary status
/// messages and tick errors take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(ref err) = app.tick_error {
        let paragraph = Paragraph::new(format!(" Error: {} | q:quit", err))
            .style(app.theme.severity_style(Severity::Critical));
        frame.render_widget(paragraph, area);
        return;
    }

    let state = if app.paused { "PAUSED" } else { "running" };
    let controls = match app.current_view {
        View::Monitor | View::History => {
            "space:pause n:step ↑↓:channel +/-:window [/]:speed ?:help q:quit"
        }
        View::Alerts => "space:pause ↑↓:select e:export ?:help q:quit",
    };

    let status = format!(
        " {} | every {} | {}",
        state,
        format_duration(app.tick_interval),
        controls
    );
    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Simulation"),
        Line::from("  space/p     Pause or resume"),
        Line::from("  n           Single tick while paused"),
        Line::from("  + / -       Grow or shrink window"),
        Line::from("  ] / [       Tick faster or slower"),
        Line::from(""),
        section(" Navigation"),
        Line::from("  Tab 1-3     Switch views"),
        Line::from("  ←/→ h/l     Switch views"),
        Line::from("  ↑/↓ j/k     Select channel or alert"),
        Line::from(""),
        section(" General"),
        Line::from("  e           Export to JSON"),
        Line::from("  q Esc       Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    // Center the help overlay - responsive to terminal size
    let help_width = 44u16.min(area.width.saturating_sub(4));
    let help_height = 21u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Render sparkline levels (0-7) as block characters, last `width` values.
pub fn render_sparkline(data: &[u8], width: usize) -> String {
    if data.is_empty() {
        return " ".repeat(width);
    }

    let skip = data.len().saturating_sub(width);
    data[skip..].iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}

/// Format a reading with the precision that suits its channel.
pub fn format_value(channel: Channel, value: f64) -> String {
    match channel {
        Channel::HeartRate | Channel::SystolicBP | Channel::DiastolicBP => format!("{:.0}", value),
        Channel::SpO2 | Channel::Temperature => format!("{:.1}", value),
    }
}

/// Arrow and signed delta for the last change.
pub fn format_trend(channel: Channel, delta: Option<f64>) -> String {
    match delta {
        None => "-".to_string(),
        Some(d) if d.abs() < 0.05 => "→".to_string(),
        Some(d) if d > 0.0 => format!("↑{}", format_value(channel, d)),
        Some(d) => format!("↓{}", format_value(channel, d.abs())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparkline_takes_last_values() {
        assert_eq!(render_sparkline(&[0, 1, 2, 7, 9], 3), "▃██");
        assert_eq!(render_sparkline(&[], 4), "    ");
        assert_eq!(render_sparkline(&[3, 3], 8), "▄▄");
    }

    #[test]
    fn test_value_precision() {
        assert_eq!(format_value(Channel::HeartRate, 72.4), "72");
        assert_eq!(format_value(Channel::Temperature, 36.84), "36.8");
        assert_eq!(format_value(Channel::SpO2, 97.0), "97.0");
    }

    #[test]
    fn test_trend_arrows() {
        assert_eq!(format_trend(Channel::HeartRate, None), "-");
        assert_eq!(format_trend(Channel::HeartRate, Some(0.01)), "→");
        assert_eq!(format_trend(Channel::HeartRate, Some(3.2)), "↑3");
        assert_eq!(format_trend(Channel::Temperature, Some(-0.26)), "↓0.3");
    }
}
