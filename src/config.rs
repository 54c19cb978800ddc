//! Runtime settings.
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then `VITALWATCH_*` environment variables. Command-line flags are
//! applied on top by the binary.
//!
//! ```toml
//! window = 30
//! interval = "1s"
//! seed = 42
//! anomaly_rate = 0.02
//! pulse_pressure_margin = 10.0
//! log_file = "vitalwatch.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File, Map};
use serde::Deserialize;

use crate::data::duration::parse_duration;
use crate::data::history::check_window;
use crate::data::{GeneratorConfig, DEFAULT_WINDOW};

/// Fully resolved settings for a run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    /// Readings retained per channel.
    pub window: usize,
    /// Time between ticks, e.g. "1s".
    pub interval: String,
    /// Fixed RNG seed; random when absent.
    pub seed: Option<u64>,
    /// Probability per tick that an anomaly episode starts on a channel.
    pub anomaly_rate: f64,
    /// Minimum systolic minus diastolic, in mmHg.
    pub pulse_pressure_margin: f64,
    /// Where to write tracing output.
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        let generator = GeneratorConfig::default();
        Self {
            window: DEFAULT_WINDOW,
            interval: "1s".to_string(),
            seed: None,
            anomaly_rate: generator.anomaly_rate,
            pulse_pressure_margin: generator.pulse_pressure_margin,
            log_file: None,
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional file, and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_from(path, None)
    }

    /// Load with an explicit variable map in place of the process
    /// environment when `env` is given.
    fn load_from(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let defaults = Settings::default();

        let mut builder = Config::builder()
            .set_default("window", defaults.window as u64)?
            .set_default("interval", defaults.interval)?
            .set_default("anomaly_rate", defaults.anomaly_rate)?
            .set_default("pulse_pressure_margin", defaults.pulse_pressure_margin)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix("VITALWATCH")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .context("failed to load settings")?
            .try_deserialize()
            .context("invalid settings")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Check values that would otherwise fail later, deep in the session.
    pub fn validate(&self) -> Result<()> {
        check_window(self.window)?;
        self.tick_interval()?;
        Ok(())
    }

    /// Parsed tick interval.
    pub fn tick_interval(&self) -> Result<Duration> {
        parse_duration(&self.interval)
    }

    /// Generator tuning derived from these settings.
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            anomaly_rate: self.anomaly_rate,
            pulse_pressure_margin: self.pulse_pressure_margin,
            ..GeneratorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn toml_file() -> NamedTempFile {
        Builder::new().suffix(".toml").tempfile().unwrap()
    }

    #[test]
    fn test_defaults_without_file() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.window, DEFAULT_WINDOW);
        assert_eq!(settings.tick_interval().unwrap(), Duration::from_secs(1));
        assert_eq!(settings.seed, None);
    }

    #[test]
    fn test_load_from_toml_file() {
        let mut file = toml_file();
        writeln!(file, "window = 50").unwrap();
        writeln!(file, "interval = \"500ms\"").unwrap();
        writeln!(file, "seed = 7").unwrap();
        writeln!(file, "anomaly_rate = 0.1").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.window, 50);
        assert_eq!(settings.tick_interval().unwrap(), Duration::from_millis(500));
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.generator_config().anomaly_rate, 0.1);
        assert_eq!(settings.generator_config().pulse_pressure_margin, 10.0);
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = toml_file();
        writeln!(file, "window = 50").unwrap();
        writeln!(file, "seed = 7").unwrap();

        let env = Map::from_iter([
            ("VITALWATCH_WINDOW".to_string(), "70".to_string()),
            ("VITALWATCH_SEED".to_string(), "9".to_string()),
            ("VITALWATCH_ANOMALY_RATE".to_string(), "0.05".to_string()),
        ]);
        let settings = Settings::load_from(Some(file.path()), Some(env)).unwrap();
        assert_eq!(settings.window, 70);
        assert_eq!(settings.seed, Some(9));
        assert_eq!(settings.anomaly_rate, 0.05);
        assert_eq!(settings.interval, "1s");
    }

    #[test]
    fn test_environment_window_is_validated() {
        let env = Map::from_iter([("VITALWATCH_WINDOW".to_string(), "5".to_string())]);
        assert!(Settings::load_from(None, Some(env)).is_err());
    }

    #[test]
    fn test_out_of_range_window_rejected() {
        let mut file = toml_file();
        writeln!(file, "window = 500").unwrap();
        assert!(Settings::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_bad_interval_rejected() {
        let settings = Settings {
            interval: "soon".to_string(),
            ..Settings::default()
        };
        assert!(settings.validate().is_err());
    }
}
