//! Server configuration
//!
//! Settings are layered, lowest priority first:
//! 1. Built-in defaults
//! 2. Optional TOML file (`--config`)
//! 3. `LIVECHART_*` environment variables
//! 4. Command-line flags, applied by the caller

use crate::error::{LiveChartError, Result};
use crate::series::MAX_LENGTH;
use crate::types::UpdateInterval;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use tracing::debug;

/// Prefix of the environment variables read by [`Settings::load`]
const ENV_PREFIX: &str = "LIVECHART";

/// Live chart settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Listen address
    pub addr: SocketAddr,
    /// Samples kept on screen
    pub max_points: usize,
    /// Initial refresh period in milliseconds
    pub interval_ms: u64,
    /// Event channel capacity
    pub event_capacity: usize,
    /// Seed for the random walk; random when unset
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addr: ([127, 0, 0, 1], 8050).into(),
            max_points: MAX_LENGTH,
            interval_ms: UpdateInterval::DEFAULT_MS,
            event_capacity: 1000,
            seed: None,
        }
    }
}

impl Settings {
    /// Load defaults, then the optional file, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!("Loading settings from {}", path.display());
            builder = builder.add_source(config::File::from(path));
        }

        let settings: Settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the dashboard cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_points == 0 {
            return Err(LiveChartError::Config(config::ConfigError::Message(
                "max_points must be at least 1".to_string(),
            )));
        }
        if self.event_capacity == 0 {
            return Err(LiveChartError::Config(config::ConfigError::Message(
                "event_capacity must be at least 1".to_string(),
            )));
        }
        self.interval()?;
        Ok(())
    }

    /// Initial refresh period
    pub fn interval(&self) -> Result<UpdateInterval> {
        UpdateInterval::new(self.interval_ms)
    }
}
