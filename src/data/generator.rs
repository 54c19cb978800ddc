//! Vital sign generation.
//!
//! Each channel follows a mean-reverting random walk around a slowly
//! drifting target. Occasional anomaly episodes shift the target into an
//! abnormal range for a while so the classifier sees trending clinical
//! events instead of isolated spikes.
//!
//! ```text
//! target = baseline + drift_amplitude * sin(2πt / drift_period) + episode_offset
//! delta  = reversion * (target - value) + Normal(0, noise_std)
//! value' = clamp(value + delta, hard_bounds)
//! ```

use std::collections::BTreeMap;
use std::f64::consts::TAU;
use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::Serialize;
use tracing::debug;

use super::channel::Channel;
use super::ranges::RangeTable;
use crate::error::{MonitorError, Result};

/// Reversion rate used while an episode is active, so events ramp in
/// over a handful of ticks.
const EPISODE_PULL: f64 = 0.15;

/// Diastolic draws attempted before pinning to the pulse-pressure ceiling.
const MAX_REDRAWS: usize = 8;

/// Random-walk parameters for one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelDynamics {
    /// Resting value the walk reverts to.
    pub baseline: f64,
    /// Standard deviation of the per-tick noise.
    pub noise_std: f64,
    /// Fraction of the distance to the target closed each tick (0..=1).
    pub reversion: f64,
    /// Amplitude of the slow sinusoidal drift of the target.
    pub drift_amplitude: f64,
    /// Period of the drift, in ticks.
    pub drift_period: f64,
}

impl ChannelDynamics {
    /// Default adult resting dynamics for a channel.
    pub fn resting(channel: Channel) -> Self {
        let (baseline, noise_std, reversion, drift_amplitude, drift_period) = match channel {
            Channel::HeartRate => (75.0, 1.5, 0.05, 3.0, 120.0),
            Channel::SpO2 => (97.5, 0.3, 0.10, 0.5, 300.0),
            Channel::SystolicBP => (118.0, 1.5, 0.05, 4.0, 180.0),
            Channel::DiastolicBP => (76.0, 1.0, 0.05, 3.0, 180.0),
            Channel::Temperature => (36.8, 0.03, 0.02, 0.1, 600.0),
        };
        Self {
            baseline,
            noise_std,
            reversion,
            drift_amplitude,
            drift_period,
        }
    }

    fn validate(&self, channel: Channel) -> Result<()> {
        let finite = [
            self.baseline,
            self.noise_std,
            self.reversion,
            self.drift_amplitude,
            self.drift_period,
        ]
        .iter()
        .all(|v| v.is_finite());

        if !finite
            || self.noise_std < 0.0
            || !(0.0..=1.0).contains(&self.reversion)
            || self.drift_period <= 0.0
        {
            return Err(MonitorError::Config(format!(
                "{channel}: invalid dynamics {self:?}"
            )));
        }
        Ok(())
    }

    fn target(&self, tick: u64, episode: Option<&Episode>) -> f64 {
        let phase = TAU * tick as f64 / self.drift_period;
        let offset = episode.map_or(0.0, |e| e.offset);
        self.baseline + self.drift_amplitude * phase.sin() + offset
    }
}

/// Generator-wide tuning.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Minimum systolic minus diastolic, in mmHg.
    pub pulse_pressure_margin: f64,
    /// Probability per tick that an idle channel starts an anomaly episode.
    pub anomaly_rate: f64,
    pub dynamics: BTreeMap<Channel, ChannelDynamics>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            pulse_pressure_margin: 10.0,
            anomaly_rate: 0.02,
            dynamics: Channel::ALL
                .iter()
                .map(|&c| (c, ChannelDynamics::resting(c)))
                .collect(),
        }
    }
}

impl GeneratorConfig {
    fn validate(&self) -> Result<()> {
        if !self.pulse_pressure_margin.is_finite() || self.pulse_pressure_margin < 0.0 {
            return Err(MonitorError::Config(format!(
                "pulse pressure margin {} must be a non-negative number",
                self.pulse_pressure_margin
            )));
        }
        if !(0.0..=1.0).contains(&self.anomaly_rate) {
            return Err(MonitorError::Config(format!(
                "anomaly rate {} must be within 0..=1",
                self.anomaly_rate
            )));
        }
        for (channel, dynamics) in &self.dynamics {
            dynamics.validate(*channel)?;
        }
        Ok(())
    }
}

/// Kind of injected clinical event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EpisodeKind {
    Tachycardia,
    Bradycardia,
    Desaturation,
    Fever,
    #[serde(rename = "Hypertensive Surge")]
    HypertensiveSurge,
    #[serde(rename = "Hypotensive Drop")]
    HypotensiveDrop,
}

impl EpisodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            EpisodeKind::Tachycardia => "Tachycardia",
            EpisodeKind::Bradycardia => "Bradycardia",
            EpisodeKind::Desaturation => "Desaturation",
            EpisodeKind::Fever => "Fever",
            EpisodeKind::HypertensiveSurge => "Hypertensive Surge",
            EpisodeKind::HypotensiveDrop => "Hypotensive Drop",
        }
    }

    /// Events that can occur on a channel.
    pub fn candidates(channel: Channel) -> &'static [EpisodeKind] {
        match channel {
            Channel::HeartRate => &[EpisodeKind::Tachycardia, EpisodeKind::Bradycardia],
            Channel::SpO2 => &[EpisodeKind::Desaturation],
            Channel::SystolicBP | Channel::DiastolicBP => {
                &[EpisodeKind::HypertensiveSurge, EpisodeKind::HypotensiveDrop]
            }
            Channel::Temperature => &[EpisodeKind::Fever],
        }
    }

    /// Target offset range and duration range (ticks) on a channel.
    fn envelope(&self, channel: Channel) -> ((f64, f64), (u32, u32)) {
        match (self, channel) {
            (EpisodeKind::Tachycardia, _) => ((20.0, 40.0), (10, 30)),
            (EpisodeKind::Bradycardia, _) => ((-30.0, -15.0), (10, 25)),
            (EpisodeKind::Desaturation, _) => ((-8.0, -4.0), (10, 30)),
            (EpisodeKind::Fever, _) => ((0.7, 1.5), (30, 120)),
            (EpisodeKind::HypertensiveSurge, Channel::DiastolicBP) => ((15.0, 40.0), (10, 40)),
            (EpisodeKind::HypertensiveSurge, _) => ((25.0, 60.0), (10, 40)),
            (EpisodeKind::HypotensiveDrop, Channel::DiastolicBP) => ((-25.0, -15.0), (10, 30)),
            (EpisodeKind::HypotensiveDrop, _) => ((-40.0, -25.0), (10, 30)),
        }
    }
}

impl fmt::Display for EpisodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An active anomaly episode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Episode {
    pub kind: EpisodeKind,
    /// Shift applied to the channel's target.
    pub offset: f64,
    /// Ticks left before the episode ends.
    pub remaining: u32,
}

/// Per-channel random-walk memory.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorState {
    pub channel: Channel,
    pub current_value: f64,
    /// Steps taken so far; drives the drift phase.
    pub ticks: u64,
    pub episode: Option<Episode>,
    /// Episode that shaped the most recent value, even if it ended with it.
    pub last_anomaly: Option<EpisodeKind>,
}

impl GeneratorState {
    pub fn new(channel: Channel, current_value: f64) -> Self {
        Self {
            channel,
            current_value,
            ticks: 0,
            episode: None,
            last_anomaly: None,
        }
    }

    fn advance(&mut self, value: f64) {
        self.current_value = value;
        self.ticks += 1;
        self.last_anomaly = self.episode.map(|e| e.kind);
        let ended = match self.episode.as_mut() {
            Some(episode) => {
                episode.remaining = episode.remaining.saturating_sub(1);
                episode.remaining == 0
            }
            None => false,
        };
        if let Some(episode) = self.episode.take_if(|_| ended) {
            debug!(channel = %self.channel, kind = ?episode.kind, "anomaly episode ended");
        }
    }
}

/// Produces the next value of each channel from its previous state.
///
/// All randomness comes from the injected RNG, so a seeded generator is
/// fully reproducible.
#[derive(Debug, Clone)]
pub struct VitalSignGenerator {
    table: Arc<RangeTable>,
    config: GeneratorConfig,
    rng: StdRng,
}

impl VitalSignGenerator {
    /// Create a generator with an explicit RNG.
    pub fn new(table: Arc<RangeTable>, config: GeneratorConfig, rng: StdRng) -> Result<Self> {
        config.validate()?;

        if let (Ok((sys_min, _)), Ok((dia_min, _))) = (
            table.hard_bounds(Channel::SystolicBP),
            table.hard_bounds(Channel::DiastolicBP),
        ) {
            if sys_min - config.pulse_pressure_margin < dia_min {
                return Err(MonitorError::Config(format!(
                    "pulse pressure margin {} unreachable: systolic floor {sys_min}, diastolic floor {dia_min}",
                    config.pulse_pressure_margin
                )));
            }
        }

        Ok(Self { table, config, rng })
    }

    /// Reproducible generator for tests and replays.
    pub fn with_seed(table: Arc<RangeTable>, config: GeneratorConfig, seed: u64) -> Result<Self> {
        Self::new(table, config, StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from OS entropy.
    pub fn from_entropy(table: Arc<RangeTable>, config: GeneratorConfig) -> Result<Self> {
        Self::new(table, config, StdRng::from_entropy())
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Starting state for a channel: its baseline, clamped to hard bounds.
    pub fn initial_state(&self, channel: Channel) -> Result<GeneratorState> {
        let (min, max) = self.table.hard_bounds(channel)?;
        let dynamics = self.dynamics(channel)?;
        Ok(GeneratorState::new(channel, dynamics.baseline.clamp(min, max)))
    }

    /// Advance one channel by one tick and return the new value.
    pub fn next(&mut self, state: &mut GeneratorState) -> Result<f64> {
        let (min, max) = self.table.hard_bounds(state.channel)?;
        let dynamics = self.dynamics(state.channel)?;

        self.maybe_start_episode(state);
        let value = (state.current_value + self.draw_delta(&dynamics, state)?).clamp(min, max);

        state.advance(value);
        Ok(value)
    }

    /// Advance both blood pressure channels, keeping the pulse pressure.
    ///
    /// Systolic steps freely. A diastolic draw that would come within the
    /// margin of systolic is re-drawn, and pinned below systolic if no draw
    /// fits.
    pub fn next_blood_pressure(
        &mut self,
        systolic: &mut GeneratorState,
        diastolic: &mut GeneratorState,
    ) -> Result<(f64, f64)> {
        if systolic.channel != Channel::SystolicBP {
            return Err(MonitorError::InvalidChannel(systolic.channel));
        }
        if diastolic.channel != Channel::DiastolicBP {
            return Err(MonitorError::InvalidChannel(diastolic.channel));
        }

        let (min, max) = self.table.hard_bounds(Channel::DiastolicBP)?;
        let dynamics = self.dynamics(Channel::DiastolicBP)?;
        let sys = self.next(systolic)?;
        let ceiling = sys - self.config.pulse_pressure_margin;

        self.maybe_start_episode(diastolic);
        let mut candidate = diastolic.current_value + self.draw_delta(&dynamics, diastolic)?;
        let mut attempts = 1;
        while candidate.clamp(min, max) > ceiling && attempts < MAX_REDRAWS {
            candidate = diastolic.current_value + self.draw_delta(&dynamics, diastolic)?;
            attempts += 1;
        }
        // The constructor guarantees ceiling >= min.
        let dia = candidate.clamp(min, max).min(ceiling);

        diastolic.advance(dia);
        Ok((sys, dia))
    }

    fn dynamics(&self, channel: Channel) -> Result<ChannelDynamics> {
        self.config
            .dynamics
            .get(&channel)
            .copied()
            .ok_or(MonitorError::InvalidChannel(channel))
    }

    fn draw_delta(&mut self, dynamics: &ChannelDynamics, state: &GeneratorState) -> Result<f64> {
        let noise = Normal::new(0.0, dynamics.noise_std).map_err(|e| {
            MonitorError::Config(format!("{}: noise distribution: {e}", state.channel))
        })?;

        let target = dynamics.target(state.ticks, state.episode.as_ref());
        let pull = if state.episode.is_some() {
            dynamics.reversion.max(EPISODE_PULL)
        } else {
            dynamics.reversion
        };

        Ok(pull * (target - state.current_value) + noise.sample(&mut self.rng))
    }

    fn maybe_start_episode(&mut self, state: &mut GeneratorState) {
        if state.episode.is_some() || self.config.anomaly_rate <= 0.0 {
            return;
        }
        if !self.rng.gen_bool(self.config.anomaly_rate) {
            return;
        }

        let kinds = EpisodeKind::candidates(state.channel);
        let kind = kinds[self.rng.gen_range(0..kinds.len())];
        let ((lo, hi), (min_ticks, max_ticks)) = kind.envelope(state.channel);
        let episode = Episode {
            kind,
            offset: self.rng.gen_range(lo..=hi),
            remaining: self.rng.gen_range(min_ticks..=max_ticks),
        };

        debug!(
            channel = %state.channel,
            kind = ?episode.kind,
            offset = episode.offset,
            ticks = episode.remaining,
            "anomaly episode started"
        );
        state.episode = Some(episode);
    }
}
