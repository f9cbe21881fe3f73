//! Core data types for the live chart
//!
//! A chart is a bounded history of [`Sample`]s produced in one of two
//! generation [`Mode`]s and refreshed once per [`UpdateInterval`].

use crate::error::{LiveChartError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One `(x, y)` data point
///
/// `x` is the step counter of the sample: 0 for the first sample generated,
/// incremented by one for every following sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Step counter
    pub x: u64,
    /// Sample value
    pub y: f64,
}

impl Sample {
    /// Create a new sample
    pub fn new(x: u64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Data generation strategy
///
/// On the wire the modes are `"random"` and `"sine"`. Any other value,
/// including non-strings and `null`, decodes as [`Mode::RandomWalk`] instead
/// of being rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "serde_json::Value")]
pub enum Mode {
    /// Unbounded random walk starting somewhere in `[0, 10]`
    #[default]
    #[serde(rename = "random")]
    RandomWalk,

    /// `5 * sin(x / 5) + 5`
    #[serde(rename = "sine")]
    Sine,
}

impl Mode {
    /// Wire name of the mode
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::RandomWalk => "random",
            Mode::Sine => "sine",
        }
    }

    /// Decode a control value, degrading anything unrecognised to random-walk
    pub fn from_control_value(value: &str) -> Self {
        match value {
            "sine" => Mode::Sine,
            _ => Mode::RandomWalk,
        }
    }
}

impl From<&str> for Mode {
    fn from(value: &str) -> Self {
        Mode::from_control_value(value)
    }
}

impl From<String> for Mode {
    fn from(value: String) -> Self {
        Mode::from_control_value(&value)
    }
}

impl From<serde_json::Value> for Mode {
    fn from(value: serde_json::Value) -> Self {
        value
            .as_str()
            .map_or(Mode::RandomWalk, Mode::from_control_value)
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timer period of the browser refresh, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UpdateInterval(u64);

impl UpdateInterval {
    /// Shortest period offered by the interval control
    pub const MIN_MS: u64 = 500;
    /// Longest period offered by the interval control
    pub const MAX_MS: u64 = 5_000;
    /// Granularity of the interval control
    pub const STEP_MS: u64 = 500;
    /// Period used until the user picks another one
    pub const DEFAULT_MS: u64 = 1_000;

    /// Validate a period against the bounds of the interval control
    pub fn new(millis: u64) -> Result<Self> {
        if !(Self::MIN_MS..=Self::MAX_MS).contains(&millis) || millis % Self::STEP_MS != 0 {
            return Err(LiveChartError::InvalidInterval(millis));
        }
        Ok(Self(millis))
    }

    /// Period in milliseconds
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Period as a [`Duration`]
    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Default for UpdateInterval {
    fn default() -> Self {
        Self(Self::DEFAULT_MS)
    }
}

impl std::fmt::Display for UpdateInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_wire_names() {
        assert_eq!(serde_json::to_string(&Mode::RandomWalk).unwrap(), "\"random\"");
        assert_eq!(serde_json::to_string(&Mode::Sine).unwrap(), "\"sine\"");

        let mode: Mode = serde_json::from_str("\"sine\"").unwrap();
        assert_eq!(mode, Mode::Sine);
    }

    #[test]
    fn test_unknown_mode_falls_back_to_random_walk() {
        assert_eq!(Mode::from_control_value("square"), Mode::RandomWalk);
        assert_eq!(Mode::from_control_value(""), Mode::RandomWalk);
        assert_eq!(Mode::from_control_value("SINE"), Mode::RandomWalk);

        let mode: Mode = serde_json::from_str("\"triangle\"").unwrap();
        assert_eq!(mode, Mode::RandomWalk);
    }

    #[test]
    fn test_non_string_mode_falls_back_to_random_walk() {
        for raw in ["null", "3", "true", "[\"sine\"]", "{\"mode\":\"sine\"}"] {
            let mode: Mode = serde_json::from_str(raw).unwrap();
            assert_eq!(mode, Mode::RandomWalk, "decoding {}", raw);
        }
    }

    #[test]
    fn test_interval_bounds() {
        assert_eq!(UpdateInterval::new(500).unwrap().as_millis(), 500);
        assert_eq!(UpdateInterval::new(5_000).unwrap().as_millis(), 5_000);
        assert_eq!(
            UpdateInterval::new(2_500).unwrap().as_duration(),
            Duration::from_millis(2_500)
        );

        assert!(matches!(
            UpdateInterval::new(0),
            Err(LiveChartError::InvalidInterval(0))
        ));
        assert!(UpdateInterval::new(5_500).is_err());
        assert!(UpdateInterval::new(750).is_err());
    }

    #[test]
    fn test_interval_default() {
        assert_eq!(UpdateInterval::default().as_millis(), 1_000);
        assert_eq!(UpdateInterval::default().to_string(), "1000ms");
    }
}
