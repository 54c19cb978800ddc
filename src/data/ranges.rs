//! Reference ranges: hard physiological bounds and threshold bands.
//!
//! Each channel owns an ordered list of [`ThresholdBand`]s that must
//! partition the whole real line. [`RangeTable::new`] rejects any table
//! with a gap or overlap, so a constructed table always classifies every
//! finite value into exactly one band.

use std::collections::BTreeMap;
use std::ops::Bound;

use super::channel::{Channel, Condition, Severity};
use crate::error::{MonitorError, Result};

/// A contiguous value interval mapped to one condition.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdBand {
    pub channel: Channel,
    pub lower: Bound<f64>,
    pub upper: Bound<f64>,
    pub condition: Condition,
    pub severity: Severity,
}

impl ThresholdBand {
    /// Returns true if `value` lies inside this band.
    pub fn contains(&self, value: f64) -> bool {
        let above_lower = match self.lower {
            Bound::Included(l) => value >= l,
            Bound::Excluded(l) => value > l,
            Bound::Unbounded => true,
        };
        let below_upper = match self.upper {
            Bound::Included(u) => value <= u,
            Bound::Excluded(u) => value < u,
            Bound::Unbounded => true,
        };
        above_lower && below_upper
    }
}

/// A cut point between two adjacent bands.
#[derive(Debug, Clone, Copy)]
pub enum Cut {
    /// The value belongs to the band above (the usual convention).
    Above(f64),
    /// The value belongs to the band below.
    Below(f64),
}

/// Build an ordered band list from cut points.
///
/// `bands[i]` spans from `cuts[i - 1]` to `cuts[i]`; the first band starts
/// at -inf and the last ends at +inf.
pub fn ladder(channel: Channel, cuts: &[Cut], bands: &[(Condition, Severity)]) -> Vec<ThresholdBand> {
    let mut lower = Bound::Unbounded;
    let mut result = Vec::with_capacity(bands.len());

    for (i, &(condition, severity)) in bands.iter().enumerate() {
        let (upper, next_lower) = match cuts.get(i) {
            Some(Cut::Above(v)) => (Bound::Excluded(*v), Bound::Included(*v)),
            Some(Cut::Below(v)) => (Bound::Included(*v), Bound::Excluded(*v)),
            None => (Bound::Unbounded, Bound::Unbounded),
        };
        result.push(ThresholdBand {
            channel,
            lower,
            upper,
            condition,
            severity,
        });
        lower = next_lower;
    }

    result
}

/// Hard bounds and bands for one channel.
#[derive(Debug, Clone)]
pub struct ChannelRange {
    pub channel: Channel,
    pub hard_min: f64,
    pub hard_max: f64,
    pub bands: Vec<ThresholdBand>,
}

impl ChannelRange {
    pub fn new(channel: Channel, hard_bounds: (f64, f64), bands: Vec<ThresholdBand>) -> Self {
        Self {
            channel,
            hard_min: hard_bounds.0,
            hard_max: hard_bounds.1,
            bands,
        }
    }

    fn validate(&self) -> Result<()> {
        let channel = self.channel;

        if !self.hard_min.is_finite() || !self.hard_max.is_finite() || self.hard_min >= self.hard_max
        {
            return Err(MonitorError::Config(format!(
                "{channel}: hard bounds ({}, {}) are not a finite increasing pair",
                self.hard_min, self.hard_max
            )));
        }

        let (Some(first), Some(last)) = (self.bands.first(), self.bands.last()) else {
            return Err(MonitorError::Config(format!("{channel}: no bands defined")));
        };

        if let Some(band) = self.bands.iter().find(|b| b.channel != channel) {
            return Err(MonitorError::Config(format!(
                "{channel}: band {} is registered for {}",
                band.condition, band.channel
            )));
        }
        if first.lower != Bound::Unbounded {
            return Err(MonitorError::Config(format!(
                "{channel}: lowest band {} must extend to -inf",
                first.condition
            )));
        }
        if last.upper != Bound::Unbounded {
            return Err(MonitorError::Config(format!(
                "{channel}: highest band {} must extend to +inf",
                last.condition
            )));
        }

        let mut previous_cut = f64::NEG_INFINITY;
        for pair in self.bands.windows(2) {
            let (below, above) = (&pair[0], &pair[1]);
            let cut = match (below.upper, above.lower) {
                (Bound::Excluded(u), Bound::Included(l)) | (Bound::Included(u), Bound::Excluded(l))
                    if u == l =>
                {
                    u
                }
                (Bound::Included(u), Bound::Included(l)) if u == l => {
                    return Err(MonitorError::Config(format!(
                        "{channel}: {} and {} overlap at {u}",
                        below.condition, above.condition
                    )));
                }
                (Bound::Excluded(u), Bound::Excluded(l)) if u == l => {
                    return Err(MonitorError::Config(format!(
                        "{channel}: gap at {u} between {} and {}",
                        below.condition, above.condition
                    )));
                }
                _ => {
                    return Err(MonitorError::Config(format!(
                        "{channel}: {} and {} are not contiguous",
                        below.condition, above.condition
                    )));
                }
            };

            if !cut.is_finite() || cut <= previous_cut {
                return Err(MonitorError::Config(format!(
                    "{channel}: cut {cut} at {} is not strictly increasing",
                    above.condition
                )));
            }
            previous_cut = cut;
        }

        Ok(())
    }
}

/// Immutable per-channel reference ranges.
#[derive(Debug, Clone)]
pub struct RangeTable {
    channels: BTreeMap<Channel, ChannelRange>,
}

impl RangeTable {
    /// Validate and build a table.
    ///
    /// Fails with [`MonitorError::Config`] if any channel's bands do not
    /// cover the real line exactly once, or a channel appears twice.
    pub fn new(entries: Vec<ChannelRange>) -> Result<Self> {
        let mut channels = BTreeMap::new();
        for entry in entries {
            entry.validate()?;
            let channel = entry.channel;
            if channels.insert(channel, entry).is_some() {
                return Err(MonitorError::Config(format!("{channel}: registered twice")));
            }
        }
        Ok(Self { channels })
    }

    /// The built-in adult clinical reference table.
    pub fn clinical() -> Result<Self> {
        use Condition::*;
        use Severity::*;

        Self::new(vec![
            ChannelRange::new(
                Channel::HeartRate,
                (30.0, 220.0),
                ladder(
                    Channel::HeartRate,
                    &[
                        Cut::Above(40.0),
                        // 50 bpm is the top of bradycardia, not the bottom of normal.
                        Cut::Below(50.0),
                        Cut::Above(100.0),
                        Cut::Above(120.0),
                        Cut::Above(150.0),
                    ],
                    &[
                        (SevereBradycardia, Critical),
                        (Bradycardia, Concern),
                        (NormalSinusRhythm, Good),
                        (MildTachycardia, Caution),
                        (Tachycardia, Concern),
                        (SevereTachycardia, Critical),
                    ],
                ),
            ),
            ChannelRange::new(
                Channel::SpO2,
                (60.0, 100.0),
                ladder(
                    Channel::SpO2,
                    &[Cut::Above(85.0), Cut::Above(90.0), Cut::Above(95.0)],
                    &[
                        (SevereHypoxemia, Critical),
                        (Hypoxemia, Concern),
                        (MildHypoxemia, Caution),
                        (NormalOxygenation, Good),
                    ],
                ),
            ),
            ChannelRange::new(
                Channel::SystolicBP,
                (60.0, 250.0),
                ladder(
                    Channel::SystolicBP,
                    &[
                        Cut::Above(90.0),
                        Cut::Above(120.0),
                        Cut::Above(130.0),
                        Cut::Above(140.0),
                        Cut::Above(180.0),
                    ],
                    &[
                        (Hypotension, Concern),
                        (NormalBloodPressure, Good),
                        (Prehypertension, Caution),
                        (Elevated, Caution),
                        (Hypertension, Concern),
                        (HypertensiveCrisis, Critical),
                    ],
                ),
            ),
            ChannelRange::new(
                Channel::DiastolicBP,
                (30.0, 150.0),
                ladder(
                    Channel::DiastolicBP,
                    &[
                        Cut::Above(60.0),
                        Cut::Above(80.0),
                        Cut::Above(85.0),
                        Cut::Above(90.0),
                        Cut::Above(120.0),
                    ],
                    &[
                        (Hypotension, Concern),
                        (NormalBloodPressure, Good),
                        (Prehypertension, Caution),
                        (Elevated, Caution),
                        (Hypertension, Concern),
                        (HypertensiveCrisis, Critical),
                    ],
                ),
            ),
            ChannelRange::new(
                Channel::Temperature,
                (34.0, 42.0),
                ladder(
                    Channel::Temperature,
                    &[
                        Cut::Above(35.0),
                        Cut::Above(36.0),
                        Cut::Above(37.5),
                        Cut::Above(38.0),
                        Cut::Above(39.5),
                    ],
                    &[
                        (Hypothermia, Critical),
                        (MildHypothermia, Caution),
                        (NormalTemperature, Good),
                        (LowGradeFever, Caution),
                        (Fever, Concern),
                        (Hyperpyrexia, Critical),
                    ],
                ),
            ),
        ])
    }

    /// Ordered bands for a channel, lowest values first.
    pub fn bands_for(&self, channel: Channel) -> Result<&[ThresholdBand]> {
        self.range(channel).map(|r| r.bands.as_slice())
    }

    /// `(min, max)` physiological envelope used for clamping.
    pub fn hard_bounds(&self, channel: Channel) -> Result<(f64, f64)> {
        self.range(channel).map(|r| (r.hard_min, r.hard_max))
    }

    /// Channels registered in this table.
    pub fn channels(&self) -> impl Iterator<Item = Channel> + '_ {
        self.channels.keys().copied()
    }

    pub fn contains(&self, channel: Channel) -> bool {
        self.channels.contains_key(&channel)
    }

    fn range(&self, channel: Channel) -> Result<&ChannelRange> {
        self.channels.get(&channel).ok_or(MonitorError::InvalidChannel(channel))
    }
}
