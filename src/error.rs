//! Error types for the live chart server
//!
//! This module provides error handling using thiserror for structured error
//! definitions and anyhow for error propagation. The chart core (series,
//! generator, renderer, dashboard) is total and never produces these; they
//! come from configuration, the control surface and the server runtime.

use thiserror::Error;

/// Main error type for live chart operations
#[derive(Error, Debug)]
pub enum LiveChartError {
    /// Update interval outside the range the control surface allows
    #[error("Invalid update interval: {0} ms (expected 500-5000 in steps of 500)")]
    InvalidInterval(u64),

    /// The task owning the dashboard is no longer running
    #[error("Dashboard unavailable: {0}")]
    DashboardUnavailable(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Result type alias for live chart operations
pub type Result<T> = std::result::Result<T, LiveChartError>;

/// Convert anyhow::Error to LiveChartError
impl From<anyhow::Error> for LiveChartError {
    fn from(err: anyhow::Error) -> Self {
        LiveChartError::Other(err.to_string())
    }
}
