//! A monitoring session: one simulated patient, ticked on demand.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::channel::{Channel, Diagnosis, Reading, Severity};
use super::classifier::DiagnosticClassifier;
use super::generator::{GeneratorConfig, GeneratorState, VitalSignGenerator};
use super::history::{check_window, Entry, SeriesBuffer};
use super::ranges::RangeTable;
use crate::error::{MonitorError, Result};

/// Owns generator state and history for every channel in a range table.
///
/// Sessions share nothing with each other, so several can run side by side.
#[derive(Debug, Clone)]
pub struct MonitoringSession {
    generator: VitalSignGenerator,
    classifier: DiagnosticClassifier,
    states: BTreeMap<Channel, GeneratorState>,
    buffers: BTreeMap<Channel, SeriesBuffer>,
    ticks: u64,
    window: usize,
}

impl MonitoringSession {
    /// Create a session over every channel registered in `table`.
    ///
    /// Fails with [`MonitorError::InvalidCapacity`] for a bad window and with
    /// [`MonitorError::InvalidChannel`] if the generator has no dynamics for
    /// a registered channel.
    pub fn new(table: Arc<RangeTable>, generator: VitalSignGenerator, window: usize) -> Result<Self> {
        let window = check_window(window)?;

        let mut states = BTreeMap::new();
        let mut buffers = BTreeMap::new();
        for channel in table.channels() {
            states.insert(channel, generator.initial_state(channel)?);
            buffers.insert(channel, SeriesBuffer::new(window)?);
        }

        info!(channels = states.len(), window, "monitoring session created");

        Ok(Self {
            generator,
            classifier: DiagnosticClassifier::new(table),
            states,
            buffers,
            ticks: 0,
            window,
        })
    }

    /// Session over the built-in clinical table.
    ///
    /// A `seed` makes the run reproducible; without one the generator is
    /// seeded from OS entropy.
    pub fn clinical(config: GeneratorConfig, seed: Option<u64>, window: usize) -> Result<Self> {
        let table = Arc::new(RangeTable::clinical()?);
        let generator = match seed {
            Some(seed) => VitalSignGenerator::with_seed(table.clone(), config, seed)?,
            None => VitalSignGenerator::from_entropy(table.clone(), config)?,
        };
        Self::new(table, generator, window)
    }

    /// Advance every channel by one tick.
    ///
    /// Returns the new reading and diagnosis per channel. Both blood
    /// pressure channels carry the joint blood pressure diagnosis.
    pub fn tick(&mut self) -> Result<BTreeMap<Channel, Entry>> {
        let tick = self.ticks;
        let mut values = BTreeMap::new();
        let mut systolic = None;
        let mut diastolic = None;

        for (&channel, state) in self.states.iter_mut() {
            match channel {
                Channel::SystolicBP => systolic = Some(state),
                Channel::DiastolicBP => diastolic = Some(state),
                _ => {
                    values.insert(channel, self.generator.next(state)?);
                }
            }
        }

        let joint_bp = match (systolic, diastolic) {
            (Some(sys), Some(dia)) => {
                let (s, d) = self.generator.next_blood_pressure(sys, dia)?;
                values.insert(Channel::SystolicBP, s);
                values.insert(Channel::DiastolicBP, d);
                Some(self.classifier.classify_blood_pressure(s, d)?)
            }
            (Some(state), None) | (None, Some(state)) => {
                values.insert(state.channel, self.generator.next(state)?);
                None
            }
            (None, None) => None,
        };

        let mut entries = BTreeMap::new();
        for (channel, value) in values {
            let reading = Reading {
                channel,
                tick,
                value,
                anomaly: self.states.get(&channel).and_then(|s| s.last_anomaly),
            };
            let diagnosis = match joint_bp {
                Some(joint) if channel.is_blood_pressure() => joint,
                _ => self.classifier.classify(&reading)?,
            };

            let buffer = self
                .buffers
                .get_mut(&channel)
                .ok_or(MonitorError::InvalidChannel(channel))?;
            log_transition(buffer.latest().map(|(_, d)| d), &reading, &diagnosis);
            buffer.push((reading, diagnosis));
            entries.insert(channel, (reading, diagnosis));
        }

        self.ticks += 1;
        debug!(tick, "tick complete");
        Ok(entries)
    }

    /// Buffered entries for a channel, oldest to newest.
    pub fn snapshot(&self, channel: Channel) -> Result<Vec<Entry>> {
        Ok(self.buffer(channel)?.iter().copied().collect())
    }

    /// Change the number of readings retained per channel.
    ///
    /// Out-of-range requests fail with [`MonitorError::InvalidCapacity`]
    /// and leave the session untouched.
    pub fn resize_window(&mut self, capacity: usize) -> Result<()> {
        let capacity = check_window(capacity)?;
        for buffer in self.buffers.values_mut() {
            buffer.resize(capacity)?;
        }
        info!(from = self.window, to = capacity, "window resized");
        self.window = capacity;
        Ok(())
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Number of ticks processed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Channels tracked by this session, in display order.
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.buffers.keys().copied()
    }

    pub fn buffer(&self, channel: Channel) -> Result<&SeriesBuffer> {
        self.buffers.get(&channel).ok_or(MonitorError::InvalidChannel(channel))
    }

    /// Most recent entry for a channel.
    pub fn latest(&self, channel: Channel) -> Option<Entry> {
        self.buffers.get(&channel)?.latest().copied()
    }

    /// Worst severity among the latest readings.
    pub fn overall_severity(&self) -> Severity {
        self.buffers
            .values()
            .filter_map(|b| b.latest())
            .map(|(_, d)| d.severity)
            .max()
            .unwrap_or(Severity::Good)
    }

    /// Every non-Good entry in the window, most severe first, then newest.
    pub fn alerts(&self) -> Vec<Entry> {
        let mut alerts: Vec<Entry> = self
            .buffers
            .values()
            .flat_map(|b| b.iter())
            .filter(|(_, d)| d.severity != Severity::Good)
            .copied()
            .collect();

        alerts.sort_by(|a, b| {
            b.1.severity
                .cmp(&a.1.severity)
                .then_with(|| b.0.tick.cmp(&a.0.tick))
                .then_with(|| a.0.channel.cmp(&b.0.channel))
        });
        alerts
    }

    /// Sparkline levels (0-7) for a channel's window.
    pub fn sparkline(&self, channel: Channel) -> Vec<u8> {
        self.buffers.get(&channel).map(SeriesBuffer::sparkline).unwrap_or_default()
    }

    /// Change over the last tick for a channel.
    pub fn trend(&self, channel: Channel) -> Option<f64> {
        self.buffers.get(&channel)?.trend()
    }
}

fn log_transition(previous: Option<&Diagnosis>, reading: &Reading, diagnosis: &Diagnosis) {
    if previous.map(|p| p.condition) == Some(diagnosis.condition) {
        return;
    }

    if diagnosis.severity == Severity::Critical {
        warn!(
            channel = %reading.channel,
            tick = reading.tick,
            value = reading.value,
            condition = %diagnosis.condition,
            "channel entered critical range"
        );
    } else {
        info!(
            channel = %reading.channel,
            tick = reading.tick,
            value = reading.value,
            condition = %diagnosis.condition,
            severity = %diagnosis.severity,
            "condition changed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::channel::Condition;
    use crate::data::generator::EpisodeKind;
    use crate::data::ranges::{ladder, ChannelRange, Cut};

    fn session(seed: u64, window: usize) -> MonitoringSession {
        MonitoringSession::clinical(GeneratorConfig::default(), Some(seed), window).unwrap()
    }

    #[test]
    fn test_tick_covers_every_channel() {
        let mut s = session(1, 30);
        let entries = s.tick().unwrap();
        assert_eq!(entries.len(), Channel::ALL.len());
        for channel in Channel::ALL {
            let (reading, _) = entries[&channel];
            assert_eq!(reading.channel, channel);
            assert_eq!(reading.tick, 0);
        }
        assert_eq!(s.ticks(), 1);
    }

    #[test]
    fn test_buffer_keeps_most_recent_window() {
        let window = 10;
        let extra = 7;
        let mut s = session(2, window);
        for _ in 0..window + extra {
            s.tick().unwrap();
        }
        for channel in Channel::ALL {
            let snapshot = s.snapshot(channel).unwrap();
            assert_eq!(snapshot.len(), window);
            let ticks: Vec<u64> = snapshot.iter().map(|(r, _)| r.tick).collect();
            let expected: Vec<u64> = (extra as u64..(window + extra) as u64).collect();
            assert_eq!(ticks, expected);
        }
    }

    #[test]
    fn test_snapshot_matches_tick_results() {
        let mut s = session(3, 10);
        let mut returned = Vec::new();
        for _ in 0..4 {
            returned.push(s.tick().unwrap()[&Channel::HeartRate]);
        }
        assert_eq!(s.snapshot(Channel::HeartRate).unwrap(), returned);
    }

    #[test]
    fn test_blood_pressure_channels_share_joint_diagnosis() {
        let mut s = session(4, 10);
        for _ in 0..500 {
            let entries = s.tick().unwrap();
            let (sys, sys_dx) = entries[&Channel::SystolicBP];
            let (dia, dia_dx) = entries[&Channel::DiastolicBP];
            assert_eq!(sys_dx, dia_dx);
            assert!(sys.value - dia.value >= 10.0);
        }
    }

    #[test]
    fn test_resize_window() {
        let mut s = session(5, 50);
        for _ in 0..40 {
            s.tick().unwrap();
        }
        s.resize_window(20).unwrap();
        assert_eq!(s.window(), 20);
        let snapshot = s.snapshot(Channel::SpO2).unwrap();
        assert_eq!(snapshot.len(), 20);
        assert_eq!(snapshot.first().map(|(r, _)| r.tick), Some(20));

        s.resize_window(100).unwrap();
        assert_eq!(s.snapshot(Channel::SpO2).unwrap().len(), 20);
    }

    #[test]
    fn test_invalid_resize_leaves_state_untouched() {
        let mut s = session(6, 30);
        for _ in 0..35 {
            s.tick().unwrap();
        }
        let before = s.snapshot(Channel::Temperature).unwrap();
        assert_eq!(s.resize_window(9), Err(MonitorError::InvalidCapacity(9)));
        assert_eq!(s.resize_window(101), Err(MonitorError::InvalidCapacity(101)));
        assert_eq!(s.window(), 30);
        assert_eq!(s.snapshot(Channel::Temperature).unwrap(), before);
    }

    #[test]
    fn test_invalid_initial_window() {
        let err = MonitoringSession::clinical(GeneratorConfig::default(), Some(0), 5).unwrap_err();
        assert_eq!(err, MonitorError::InvalidCapacity(5));
    }

    #[test]
    fn test_sessions_are_independent_and_reproducible() {
        let mut a = session(77, 20);
        let mut b = session(77, 20);
        for _ in 0..100 {
            a.tick().unwrap();
        }
        for _ in 0..100 {
            b.tick().unwrap();
        }
        for channel in Channel::ALL {
            assert_eq!(a.snapshot(channel).unwrap(), b.snapshot(channel).unwrap());
        }
    }

    #[test]
    fn test_partial_table_session() {
        let table = Arc::new(
            RangeTable::new(vec![ChannelRange::new(
                Channel::HeartRate,
                (30.0, 220.0),
                ladder(
                    Channel::HeartRate,
                    &[Cut::Above(100.0)],
                    &[
                        (Condition::NormalSinusRhythm, Severity::Good),
                        (Condition::Tachycardia, Severity::Concern),
                    ],
                ),
            )])
            .unwrap(),
        );
        let generator =
            VitalSignGenerator::with_seed(table.clone(), GeneratorConfig::default(), 8).unwrap();
        let mut s = MonitoringSession::new(table, generator, 10).unwrap();

        assert_eq!(s.tick().unwrap().len(), 1);
        assert_eq!(
            s.snapshot(Channel::SpO2),
            Err(MonitorError::InvalidChannel(Channel::SpO2))
        );
        assert!(s.latest(Channel::SpO2).is_none());
    }

    #[test]
    fn test_alerts_sorted_by_severity() {
        let config = GeneratorConfig {
            anomaly_rate: 0.1,
            ..GeneratorConfig::default()
        };
        let mut s = MonitoringSession::clinical(config, Some(11), 100).unwrap();
        for _ in 0..300 {
            s.tick().unwrap();
        }

        let alerts = s.alerts();
        assert!(alerts.iter().all(|(_, d)| d.severity != Severity::Good));
        for pair in alerts.windows(2) {
            assert!(pair[0].1.severity >= pair[1].1.severity);
        }

        let worst_latest = Channel::ALL
            .iter()
            .filter_map(|&c| s.latest(c))
            .map(|(_, d)| d.severity)
            .max()
            .unwrap();
        assert_eq!(s.overall_severity(), worst_latest);
    }

    #[test]
    fn test_readings_carry_active_anomaly() {
        let config = GeneratorConfig {
            anomaly_rate: 0.1,
            ..GeneratorConfig::default()
        };
        let mut s = MonitoringSession::clinical(config, Some(11), 100).unwrap();
        let mut labelled = 0;
        for _ in 0..100 {
            let entries = s.tick().unwrap();
            for (channel, (reading, _)) in entries {
                let state = &s.states[&channel];
                assert_eq!(reading.anomaly, state.last_anomaly);
                if let Some(kind) = reading.anomaly {
                    assert!(EpisodeKind::candidates(channel).contains(&kind));
                    labelled += 1;
                }
            }
        }
        assert!(labelled > 0);

        let buffered = s.snapshot(Channel::HeartRate).unwrap();
        assert_eq!(buffered.len(), 100);
        assert!(buffered.iter().any(|(r, _)| r.anomaly.is_some()));
        assert!(buffered.iter().any(|(r, _)| r.anomaly.is_none()));
    }

    #[test]
    fn test_no_anomaly_labels_without_episodes() {
        let config = GeneratorConfig {
            anomaly_rate: 0.0,
            ..GeneratorConfig::default()
        };
        let mut s = MonitoringSession::clinical(config, Some(11), 50).unwrap();
        for _ in 0..60 {
            s.tick().unwrap();
        }
        for channel in Channel::ALL {
            let snapshot = s.snapshot(channel).unwrap();
            assert!(snapshot.iter().all(|(r, _)| r.anomaly.is_none()));
        }
    }

    #[test]
    fn test_overall_severity_empty_session_is_good() {
        let s = session(12, 10);
        assert_eq!(s.overall_severity(), Severity::Good);
        assert!(s.alerts().is_empty());
        assert!(s.sparkline(Channel::HeartRate).is_empty());
        assert!(s.trend(Channel::HeartRate).is_none());
    }
}
