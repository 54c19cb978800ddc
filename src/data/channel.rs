//! Channels, severity tiers, and the values that flow between the
//! generator, classifier, and session.

use std::fmt;

use serde::Serialize;

use super::generator::EpisodeKind;

/// A monitored physiological signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    HeartRate,
    SpO2,
    SystolicBP,
    DiastolicBP,
    Temperature,
}

impl Channel {
    /// Every channel, in display order.
    pub const ALL: [Channel; 5] = [
        Channel::HeartRate,
        Channel::SpO2,
        Channel::SystolicBP,
        Channel::DiastolicBP,
        Channel::Temperature,
    ];

    /// Returns the display label for this channel.
    pub fn label(&self) -> &'static str {
        match self {
            Channel::HeartRate => "Heart Rate",
            Channel::SpO2 => "SpO2",
            Channel::SystolicBP => "Systolic BP",
            Channel::DiastolicBP => "Diastolic BP",
            Channel::Temperature => "Temperature",
        }
    }

    /// Returns the measurement unit.
    pub fn unit(&self) -> &'static str {
        match self {
            Channel::HeartRate => "bpm",
            Channel::SpO2 => "%",
            Channel::SystolicBP | Channel::DiastolicBP => "mmHg",
            Channel::Temperature => "°C",
        }
    }

    /// True for the two blood pressure channels.
    pub fn is_blood_pressure(&self) -> bool {
        matches!(self, Channel::SystolicBP | Channel::DiastolicBP)
    }

    /// Cycle to the next channel.
    pub fn next(self) -> Self {
        match self {
            Channel::HeartRate => Channel::SpO2,
            Channel::SpO2 => Channel::SystolicBP,
            Channel::SystolicBP => Channel::DiastolicBP,
            Channel::DiastolicBP => Channel::Temperature,
            Channel::Temperature => Channel::HeartRate,
        }
    }

    /// Cycle to the previous channel.
    pub fn prev(self) -> Self {
        match self {
            Channel::HeartRate => Channel::Temperature,
            Channel::SpO2 => Channel::HeartRate,
            Channel::SystolicBP => Channel::SpO2,
            Channel::DiastolicBP => Channel::SystolicBP,
            Channel::Temperature => Channel::DiastolicBP,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Clinical urgency, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Good,
    Caution,
    Concern,
    Critical,
}

impl Severity {
    /// Returns a short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Good => "OK",
            Severity::Caution => "CAUT",
            Severity::Concern => "CONC",
            Severity::Critical => "CRIT",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Good => "Good",
            Severity::Caution => "Caution",
            Severity::Concern => "Concern",
            Severity::Critical => "Critical",
        };
        f.write_str(name)
    }
}

/// Named clinical condition a band maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    SevereBradycardia,
    Bradycardia,
    NormalSinusRhythm,
    MildTachycardia,
    Tachycardia,
    SevereTachycardia,

    SevereHypoxemia,
    Hypoxemia,
    MildHypoxemia,
    NormalOxygenation,

    Hypotension,
    NormalBloodPressure,
    Prehypertension,
    Elevated,
    Hypertension,
    HypertensiveCrisis,

    Hypothermia,
    MildHypothermia,
    NormalTemperature,
    LowGradeFever,
    Fever,
    Hyperpyrexia,
}

impl Condition {
    /// Returns the clinical name shown to users.
    pub fn name(&self) -> &'static str {
        match self {
            Condition::SevereBradycardia => "Severe Bradycardia",
            Condition::Bradycardia => "Bradycardia",
            Condition::NormalSinusRhythm => "Normal Sinus Rhythm",
            Condition::MildTachycardia => "Mild Tachycardia",
            Condition::Tachycardia => "Tachycardia",
            Condition::SevereTachycardia => "Severe Tachycardia",
            Condition::SevereHypoxemia => "Severe Hypoxemia",
            Condition::Hypoxemia => "Hypoxemia",
            Condition::MildHypoxemia => "Mild Hypoxemia",
            Condition::NormalOxygenation => "Normal Oxygenation",
            Condition::Hypotension => "Hypotension",
            Condition::NormalBloodPressure => "Normal",
            Condition::Prehypertension => "Prehypertension",
            Condition::Elevated => "Elevated",
            Condition::Hypertension => "Hypertension",
            Condition::HypertensiveCrisis => "Hypertensive Crisis",
            Condition::Hypothermia => "Hypothermia",
            Condition::MildHypothermia => "Mild Hypothermia",
            Condition::NormalTemperature => "Normal Temperature",
            Condition::LowGradeFever => "Low-Grade Fever",
            Condition::Fever => "Fever",
            Condition::Hyperpyrexia => "Hyperpyrexia",
        }
    }

    /// Tie-break rank for joint blood pressure triage (higher wins).
    ///
    /// Non-BP conditions rank zero.
    pub fn blood_pressure_priority(&self) -> u8 {
        match self {
            Condition::HypertensiveCrisis => 6,
            Condition::Hypotension => 5,
            Condition::Hypertension => 4,
            Condition::Elevated => 3,
            Condition::Prehypertension => 2,
            Condition::NormalBloodPressure => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single generated value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub channel: Channel,
    /// Session tick the value was generated on.
    pub tick: u64,
    pub value: f64,
    /// Injected event active when the value was drawn.
    pub anomaly: Option<EpisodeKind>,
}

/// Classification result attached to a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnosis {
    pub condition: Condition,
    pub severity: Severity,
}

impl Diagnosis {
    pub fn new(condition: Condition, severity: Severity) -> Self {
        Self {
            condition,
            severity,
        }
    }
}
