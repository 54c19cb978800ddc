//! Rule-based triage of individual readings.

use std::sync::Arc;

use super::channel::{Channel, Diagnosis, Reading};
use super::ranges::RangeTable;
use crate::error::{MonitorError, Result};

/// Maps readings to a [`Diagnosis`] using a validated [`RangeTable`].
///
/// Classification is pure: the same value always yields the same result.
#[derive(Debug, Clone)]
pub struct DiagnosticClassifier {
    table: Arc<RangeTable>,
}

impl DiagnosticClassifier {
    pub fn new(table: Arc<RangeTable>) -> Self {
        Self { table }
    }

    /// Classify a single reading by the first band containing its value.
    pub fn classify(&self, reading: &Reading) -> Result<Diagnosis> {
        self.classify_value(reading.channel, reading.value)
    }

    /// Classify a raw value for a channel.
    pub fn classify_value(&self, channel: Channel, value: f64) -> Result<Diagnosis> {
        let bands = self.table.bands_for(channel)?;

        // A validated table covers the whole real line, so only NaN can miss.
        bands
            .iter()
            .find(|band| band.contains(value))
            .map(|band| Diagnosis::new(band.condition, band.severity))
            .ok_or_else(|| {
                MonitorError::Config(format!("{channel}: no band contains value {value}"))
            })
    }

    /// Joint blood pressure triage.
    ///
    /// The worse of the two single-channel results wins; equal severities
    /// are broken by [`Condition::blood_pressure_priority`].
    ///
    /// [`Condition::blood_pressure_priority`]: super::channel::Condition::blood_pressure_priority
    pub fn classify_blood_pressure(&self, systolic: f64, diastolic: f64) -> Result<Diagnosis> {
        let sys = self.classify_value(Channel::SystolicBP, systolic)?;
        let dia = self.classify_value(Channel::DiastolicBP, diastolic)?;

        let rank = |d: &Diagnosis| (d.severity, d.condition.blood_pressure_priority());
        Ok(if rank(&dia) > rank(&sys) { dia } else { sys })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::channel::{Condition, Severity};
    use proptest::prelude::*;

    fn classifier() -> DiagnosticClassifier {
        DiagnosticClassifier::new(Arc::new(RangeTable::clinical().unwrap()))
    }

    fn hr(value: f64) -> Reading {
        Reading {
            channel: Channel::HeartRate,
            tick: 0,
            value,
            anomaly: None,
        }
    }

    #[test]
    fn test_heart_rate_boundary_at_50() {
        let c = classifier();
        assert_eq!(c.classify(&hr(49.999)).unwrap().condition, Condition::Bradycardia);
        assert_eq!(c.classify(&hr(50.0)).unwrap().condition, Condition::Bradycardia);
        assert_eq!(c.classify(&hr(50.001)).unwrap().condition, Condition::NormalSinusRhythm);
    }

    #[test]
    fn test_lower_bound_inclusive_elsewhere() {
        let c = classifier();
        assert_eq!(c.classify(&hr(100.0)).unwrap().condition, Condition::MildTachycardia);
        assert_eq!(c.classify(&hr(99.999)).unwrap().condition, Condition::NormalSinusRhythm);
        assert_eq!(
            c.classify_value(Channel::SpO2, 95.0).unwrap(),
            Diagnosis::new(Condition::NormalOxygenation, Severity::Good)
        );
        assert_eq!(
            c.classify_value(Channel::Temperature, 38.0).unwrap().condition,
            Condition::Fever
        );
    }

    #[test]
    fn test_hard_bounds_classify() {
        let c = classifier();
        let table = RangeTable::clinical().unwrap();
        for channel in Channel::ALL {
            let (min, max) = table.hard_bounds(channel).unwrap();
            assert!(c.classify_value(channel, min).is_ok());
            assert!(c.classify_value(channel, max).is_ok());
        }
        assert_eq!(
            c.classify(&hr(220.0)).unwrap(),
            Diagnosis::new(Condition::SevereTachycardia, Severity::Critical)
        );
        assert_eq!(
            c.classify_value(Channel::SpO2, 100.0).unwrap().condition,
            Condition::NormalOxygenation
        );
    }

    #[test]
    fn test_exhaustive_sweep_matches_exactly_one_band() {
        let table = RangeTable::clinical().unwrap();
        for channel in Channel::ALL {
            let (min, max) = table.hard_bounds(channel).unwrap();
            let bands = table.bands_for(channel).unwrap();
            let steps = 20_000;
            for i in 0..=steps {
                let value = min + (max - min) * i as f64 / steps as f64;
                let matches = bands.iter().filter(|b| b.contains(value)).count();
                assert_eq!(matches, 1, "{channel} value {value} matched {matches} bands");
            }
        }
    }

    #[test]
    fn test_blood_pressure_systolic_dominates() {
        let d = classifier().classify_blood_pressure(185.0, 70.0).unwrap();
        assert_eq!(d.condition, Condition::HypertensiveCrisis);
        assert_eq!(d.severity, Severity::Critical);
    }

    #[test]
    fn test_blood_pressure_diastolic_dominates() {
        let d = classifier().classify_blood_pressure(115.0, 125.0).unwrap();
        assert_eq!(d.condition, Condition::HypertensiveCrisis);
    }

    #[test]
    fn test_blood_pressure_tie_break() {
        let c = classifier();
        // Both Concern: hypotension outranks hypertension.
        let d = c.classify_blood_pressure(150.0, 55.0).unwrap();
        assert_eq!(d, Diagnosis::new(Condition::Hypotension, Severity::Concern));

        // Both Caution: elevated outranks prehypertension.
        let d = c.classify_blood_pressure(125.0, 87.0).unwrap();
        assert_eq!(d.condition, Condition::Elevated);
        let d = c.classify_blood_pressure(135.0, 82.0).unwrap();
        assert_eq!(d.condition, Condition::Elevated);
    }

    #[test]
    fn test_blood_pressure_normal() {
        let d = classifier().classify_blood_pressure(118.0, 76.0).unwrap();
        assert_eq!(d, Diagnosis::new(Condition::NormalBloodPressure, Severity::Good));
    }

    #[test]
    fn test_unregistered_channel_fails() {
        let table = RangeTable::new(Vec::new()).unwrap();
        let c = DiagnosticClassifier::new(Arc::new(table));
        assert_eq!(
            c.classify(&hr(80.0)),
            Err(MonitorError::InvalidChannel(Channel::HeartRate))
        );
    }

    proptest! {
        #[test]
        fn prop_every_in_domain_value_classifies(channel_idx in 0usize..5, t in 0.0f64..=1.0) {
            let table = RangeTable::clinical().unwrap();
            let channel = Channel::ALL[channel_idx];
            let (min, max) = table.hard_bounds(channel).unwrap();
            let value = min + (max - min) * t;

            let matches = table.bands_for(channel).unwrap().iter().filter(|b| b.contains(value)).count();
            prop_assert_eq!(matches, 1);
            prop_assert!(classifier().classify_value(channel, value).is_ok());
        }
    }
}
