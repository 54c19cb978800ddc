//! Dashboard state and user controls.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::warn;

use crate::data::{export, Channel, MonitoringSession};
use crate::ui::Theme;

/// Window size change per key press.
pub const WINDOW_STEP: usize = 10;

/// Slowest and fastest tick intervals reachable from the keyboard.
pub const MIN_INTERVAL: Duration = Duration::from_millis(500);
pub const MAX_INTERVAL: Duration = Duration::from_millis(3000);
const INTERVAL_STEP: Duration = Duration::from_millis(500);

/// The current view/tab in the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Live values and charts for every channel.
    Monitor,
    /// Buffered readings for the selected channel.
    History,
    /// Every non-normal reading in the window, most severe first.
    Alerts,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Monitor => View::History,
            View::History => View::Alerts,
            View::Alerts => View::Monitor,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Monitor => View::Alerts,
            View::History => View::Monitor,
            View::Alerts => View::History,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Monitor => "Monitor",
            View::History => "History",
            View::Alerts => "Alerts",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub paused: bool,
    pub current_view: View,
    pub show_help: bool,

    pub session: MonitoringSession,
    pub tick_interval: Duration,
    pub last_tick: Option<Instant>,
    pub tick_error: Option<String>,

    // Navigation state
    pub selected_channel: Channel,
    pub selected_alert_index: usize,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create a new App driving the given session.
    pub fn new(session: MonitoringSession, tick_interval: Duration, theme: Theme) -> Self {
        Self {
            running: true,
            paused: false,
            current_view: View::Monitor,
            show_help: false,
            session,
            tick_interval,
            last_tick: None,
            tick_error: None,
            selected_channel: Channel::HeartRate,
            selected_alert_index: 0,
            theme,
            status_message: None,
        }
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// True when the next tick is due.
    pub fn tick_due(&self) -> bool {
        !self.paused && self.last_tick.map_or(true, |t| t.elapsed() >= self.tick_interval)
    }

    /// Advance the session by one tick.
    ///
    /// Errors are kept for display rather than propagated so one bad tick
    /// does not take the dashboard down.
    pub fn advance(&mut self) -> bool {
        self.last_tick = Some(Instant::now());
        match self.session.tick() {
            Ok(_) => {
                self.tick_error = None;
                self.clamp_alert_selection();
                true
            }
            Err(e) => {
                warn!(error = %e, "tick failed");
                self.tick_error = Some(e.to_string());
                false
            }
        }
    }

    /// Pause or resume automatic ticking.
    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        let state = if self.paused { "Paused" } else { "Resumed" };
        self.set_status_message(state.to_string());
    }

    /// Single tick while paused.
    pub fn step(&mut self) {
        if self.paused {
            self.advance();
        }
    }

    /// Show more readings per channel.
    pub fn grow_window(&mut self) {
        self.resize_window(self.session.window() + WINDOW_STEP);
    }

    /// Show fewer readings per channel.
    pub fn shrink_window(&mut self) {
        self.resize_window(self.session.window().saturating_sub(WINDOW_STEP));
    }

    fn resize_window(&mut self, capacity: usize) {
        match self.session.resize_window(capacity) {
            Ok(()) => self.set_status_message(format!("Window: {} readings", capacity)),
            Err(e) => self.set_status_message(e.to_string()),
        }
        self.clamp_alert_selection();
    }

    /// Tick more often.
    pub fn faster(&mut self) {
        self.tick_interval = self.tick_interval.saturating_sub(INTERVAL_STEP).max(MIN_INTERVAL);
    }

    /// Tick less often.
    pub fn slower(&mut self) {
        self.tick_interval = (self.tick_interval + INTERVAL_STEP).min(MAX_INTERVAL);
    }

    /// Switch to the next view (cycles through Monitor → History → Alerts).
    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    /// Switch to a specific view.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    /// Move selection down by one item.
    pub fn select_next(&mut self) {
        match self.current_view {
            View::Monitor | View::History => self.selected_channel = self.selected_channel.next(),
            View::Alerts => {
                let max = self.session.alerts().len().saturating_sub(1);
                self.selected_alert_index = (self.selected_alert_index + 1).min(max);
            }
        }
    }

    /// Move selection up by one item.
    pub fn select_prev(&mut self) {
        match self.current_view {
            View::Monitor | View::History => self.selected_channel = self.selected_channel.prev(),
            View::Alerts => {
                self.selected_alert_index = self.selected_alert_index.saturating_sub(1);
            }
        }
    }

    fn clamp_alert_selection(&mut self) {
        let count = self.session.alerts().len();
        if self.selected_alert_index >= count {
            self.selected_alert_index = count.saturating_sub(1);
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current window to a JSON file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        if self.session.ticks() == 0 {
            anyhow::bail!("No readings to export");
        }
        export::write_json(&self.session, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{GeneratorConfig, Severity};

    fn app() -> App {
        let session = MonitoringSession::clinical(GeneratorConfig::default(), Some(9), 30).unwrap();
        App::new(session, Duration::from_secs(1), Theme::dark())
    }

    #[test]
    fn test_view_cycle() {
        let mut app = app();
        app.next_view();
        assert_eq!(app.current_view, View::History);
        app.next_view();
        app.next_view();
        assert_eq!(app.current_view, View::Monitor);
        app.prev_view();
        assert_eq!(app.current_view, View::Alerts);
    }

    #[test]
    fn test_advance_ticks_session() {
        let mut app = app();
        assert!(app.tick_due());
        assert!(app.advance());
        assert_eq!(app.session.ticks(), 1);
        assert!(app.last_tick.is_some());
        assert!(!app.tick_due());
    }

    #[test]
    fn test_pause_and_step() {
        let mut app = app();
        app.toggle_pause();
        assert!(app.paused);
        assert!(!app.tick_due());
        app.step();
        assert_eq!(app.session.ticks(), 1);
        app.toggle_pause();
        app.step();
        assert_eq!(app.session.ticks(), 1);
    }

    #[test]
    fn test_window_controls_respect_bounds() {
        let mut app = app();
        for _ in 0..10 {
            app.grow_window();
        }
        assert_eq!(app.session.window(), 100);
        assert_eq!(
            app.get_status_message(),
            Some("Window size 110 out of range (expected 10..=100)")
        );

        for _ in 0..12 {
            app.shrink_window();
        }
        assert_eq!(app.session.window(), 10);
    }

    #[test]
    fn test_speed_controls_clamp() {
        let mut app = app();
        for _ in 0..10 {
            app.faster();
        }
        assert_eq!(app.tick_interval, MIN_INTERVAL);
        for _ in 0..10 {
            app.slower();
        }
        assert_eq!(app.tick_interval, MAX_INTERVAL);
    }

    #[test]
    fn test_channel_selection_wraps() {
        let mut app = app();
        app.select_prev();
        assert_eq!(app.selected_channel, Channel::Temperature);
        app.select_next();
        assert_eq!(app.selected_channel, Channel::HeartRate);
    }

    #[test]
    fn test_alert_selection_clamped() {
        let mut app = app();
        app.set_view(View::Alerts);
        app.select_next();
        assert_eq!(app.selected_alert_index, 0);

        for _ in 0..50 {
            app.advance();
        }
        let count = app.session.alerts().len();
        for _ in 0..count + 5 {
            app.select_next();
        }
        assert_eq!(app.selected_alert_index, count.saturating_sub(1));
        assert!(app
            .session
            .alerts()
            .iter()
            .all(|(_, d)| d.severity != Severity::Good));
    }

    #[test]
    fn test_export_requires_data() {
        let mut app = app();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");
        assert!(app.export_state(&path).is_err());

        app.advance();
        app.export_state(&path).unwrap();
        assert!(path.exists());
    }
}
