//! # vitalwatch
//!
//! A simulated bedside monitor for a single patient, with a terminal
//! dashboard and a library core.
//!
//! The core generates temporally correlated readings for five vital-sign
//! channels (heart rate, SpO2, systolic and diastolic blood pressure, body
//! temperature), classifies each reading against a table of clinical
//! threshold bands, and keeps a rolling window per channel for display.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐  │
//! │  │ events  │───▶│   app    │───▶│   ui    │───▶│ Terminal│  │
//! │  │ (keys)  │    │ (state)  │    │(render) │    │         │  │
//! │  └─────────┘    └────┬─────┘    └─────────┘    └─────────┘  │
//! │                      │ tick()                               │
//! │                      ▼                                      │
//! │  ┌───────────────────────────────────────────────────────┐  │
//! │  │ data::MonitoringSession                               │  │
//! │  │  generator ──▶ classifier ──▶ SeriesBuffer (window)   │  │
//! │  │      └──── RangeTable ───┘                            │  │
//! │  └───────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`data`]**: Channels, range tables, the generator, the classifier,
//!   rolling history, and the [`MonitoringSession`] that ties them together
//! - **[`app`]**: Dashboard state and the controls behind each key
//! - **[`events`]**: Terminal event polling and key dispatch
//! - **[`ui`]**: Rendering with ratatui and theme support
//! - **[`config`]**: Layered [`Settings`] (defaults, TOML file, environment)
//! - **[`error`]**: [`MonitorError`], returned by every core operation
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Live dashboard, one tick per second
//! vitalwatch
//!
//! # Reproducible headless run, exported for analysis
//! vitalwatch --seed 42 --ticks 300 --export vitals.json --csv vitals.csv
//! ```
//!
//! ### As a library
//!
//! ```
//! use vitalwatch::{Channel, GeneratorConfig, MonitoringSession};
//!
//! let mut session = MonitoringSession::clinical(GeneratorConfig::default(), Some(42), 30)?;
//! for _ in 0..60 {
//!     session.tick()?;
//! }
//!
//! let heart_rate = session.snapshot(Channel::HeartRate)?;
//! assert_eq!(heart_rate.len(), 30);
//! # Ok::<(), vitalwatch::MonitorError>(())
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod events;
pub mod ui;

// Re-export main types for convenience
pub use app::{App, View};
pub use config::Settings;
pub use data::{
    Channel, Condition, Diagnosis, DiagnosticClassifier, EpisodeKind, GeneratorConfig,
    MonitoringSession, RangeTable, Reading, SeriesBuffer, Severity, VitalSignGenerator,
};
pub use error::MonitorError;
