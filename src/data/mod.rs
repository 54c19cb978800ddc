//! Simulation core: generation, classification, and rolling history.
//!
//! ## Submodules
//!
//! - [`channel`]: Channels, severity tiers, readings, and diagnoses
//! - [`ranges`]: Hard bounds and validated threshold band tables ([`RangeTable`])
//! - [`generator`]: Seeded random-walk vital sign generator ([`VitalSignGenerator`])
//! - [`classifier`]: Band lookup and joint blood pressure triage ([`DiagnosticClassifier`])
//! - [`history`]: Fixed-capacity ring buffer per channel ([`SeriesBuffer`])
//! - [`session`]: Tick orchestration and snapshots ([`MonitoringSession`])
//! - [`export`]: JSON and CSV export of a session window
//! - [`duration`]: Parsing and formatting of tick interval strings
//!
//! ## Data Flow
//!
//! ```text
//! MonitoringSession::tick()
//!        │
//!        ├──▶ VitalSignGenerator::next() / next_blood_pressure()
//!        │          (clamped to RangeTable::hard_bounds)
//!        │
//!        ├──▶ DiagnosticClassifier::classify() / classify_blood_pressure()
//!        │
//!        └──▶ SeriesBuffer::push()  ──▶  snapshot() for display and export
//! ```

pub mod channel;
pub mod classifier;
pub mod duration;
pub mod export;
pub mod generator;
pub mod history;
pub mod ranges;
pub mod session;

pub use channel::{Channel, Condition, Diagnosis, Reading, Severity};
pub use classifier::DiagnosticClassifier;
pub use generator::{
    ChannelDynamics, EpisodeKind, GeneratorConfig, GeneratorState, VitalSignGenerator,
};
pub use history::{Entry, SeriesBuffer, DEFAULT_WINDOW, MAX_WINDOW, MIN_WINDOW};
pub use ranges::{ChannelRange, RangeTable, ThresholdBand};
pub use session::MonitoringSession;
