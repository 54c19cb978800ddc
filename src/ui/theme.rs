//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::Severity;

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for readings in the normal range.
    pub good: Color,
    /// Color for mildly abnormal readings.
    pub caution: Color,
    /// Color for clearly abnormal readings.
    pub concern: Color,
    /// Color for critical readings.
    pub critical: Color,
    /// Color for chart lines and sparklines.
    pub trace: Color,
    /// Color for borders and separators.
    pub border: Color,
    /// Style for header rows in tables.
    pub header: Style,
    /// Style for selected/highlighted rows.
    pub selected: Style,
    /// Style for the active tab.
    pub tab_active: Style,
    /// Style for inactive tabs.
    pub tab_inactive: Style,
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            good: Color::Green,
            caution: Color::Yellow,
            concern: Color::LightRed,
            critical: Color::Red,
            trace: Color::LightCyan,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            good: Color::Green,
            caution: Color::Yellow,
            concern: Color::Magenta,
            critical: Color::Red,
            trace: Color::Blue,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            tab_active: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn severity_color(&self, severity: Severity) -> Color {
        match severity {
            Severity::Good => self.good,
            Severity::Caution => self.caution,
            Severity::Concern => self.concern,
            Severity::Critical => self.critical,
        }
    }

    /// Get style for a severity tier
    pub fn severity_style(&self, severity: Severity) -> Style {
        let style = Style::default().fg(self.severity_color(severity));
        if severity == Severity::Critical {
            style.add_modifier(Modifier::BOLD)
        } else {
            style
        }
    }
}
