//! Tick interval strings such as "500ms" or "1.5s".

use std::time::Duration;

use anyhow::{bail, Result};

/// Suffix to milliseconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[("ms", 1.0), ("s", 1_000.0), ("m", 60_000.0)];

/// Parse an interval like "500ms", "1.5s", or "2m".
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.trim().parse()?;
            if !val.is_finite() || val < 0.0 {
                bail!("Interval must be a non-negative number: {}", s);
            }
            return match Duration::try_from_secs_f64(val * multiplier / 1_000.0) {
                Ok(d) => Ok(d),
                Err(_) => bail!("Interval too large: {}", s),
            };
        }
    }

    bail!("Unknown interval format: {} (expected e.g. \"500ms\" or \"1s\")", s)
}

/// Format an interval for the status bar.
pub fn format_duration(d: Duration) -> String {
    if d < Duration::from_secs(1) {
        format!("{}ms", d.as_millis())
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}
