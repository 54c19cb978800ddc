//! Error types for the simulation core.

use thiserror::Error;

use crate::data::Channel;

/// Errors raised by the range table, generator, classifier, and session.
///
/// None of these are transient: each one points at a configuration or
/// programming defect and is never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MonitorError {
    /// The band table or settings are malformed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A channel was requested that the range table does not know about.
    #[error("Channel not registered: {0}")]
    InvalidChannel(Channel),

    /// A window size outside the accepted range was requested.
    #[error("Window size {0} out of range (expected {min}..={max})", min = crate::data::MIN_WINDOW, max = crate::data::MAX_WINDOW)]
    InvalidCapacity(usize),
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
