//! Terminal UI rendering using ratatui.
//!
//! Each view is implemented in its own submodule with a `render` function.
//!
//! ## Submodules
//!
//! - [`monitor`]: Latest value of every channel plus a chart of the selected one
//! - [`history`]: Buffered readings of the selected channel
//! - [`alerts`]: Abnormal readings across all channels, most severe first
//! - [`common`]: Shared components (header, tabs, status bar, help overlay)
//! - [`theme`]: Light/dark theme support with terminal auto-detection
//!
//! ## Rendering Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │ Header (common::render_header)       │
//! ├──────────────────────────────────────┤
//! │ Tabs (common::render_tabs)           │
//! ├──────────────────────────────────────┤
//! │                                      │
//! │ View Content                         │
//! │ (monitor/history/alerts::render)     │
//! │                                      │
//! ├──────────────────────────────────────┤
//! │ Status Bar (common::render_status)   │
//! └──────────────────────────────────────┘
//!         ↑
//!    Overlay rendered on top:
//!    - common::render_help
//! ```

pub mod alerts;
pub mod common;
pub mod history;
pub mod monitor;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, View};

/// Minimum terminal size for usable display
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 14;

/// Draw one full frame for the current app state.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let top = (area.height / 2).saturating_sub(2);
        let centered = Rect::new(0, top, area.width, 5u16.min(area.height - top));
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Length(1), // Tabs
        Constraint::Min(10),   // Content
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    common::render_tabs(frame, app, chunks[1]);

    match app.current_view {
        View::Monitor => monitor::render(frame, app, chunks[2]),
        View::History => history::render(frame, app, chunks[2]),
        View::Alerts => alerts::render(frame, app, chunks[2]),
    }

    common::render_status_bar(frame, app, chunks[3]);

    if app.show_help {
        common::render_help(frame, app, area);
    }
}
