//! Livechart - a browser-based live chart of synthetic data
//!
//! Once per interval the browser asks for a tick; the server appends one
//! sample (random walk or sine wave) to a bounded series and answers with a
//! chart description that the page draws.
//!
//! # Architecture
//!
//! - **Types**: samples, generation modes and refresh intervals
//! - **Series**: the bounded sample history
//! - **Generator**: produces the next sample
//! - **Chart**: renders a series into a chart description
//! - **Dashboard**: owned state and event dispatch
//! - **API**: HTTP control surface, dashboard task and event streaming
//!
//! # Example
//!
//! ```
//! use livechart_core::{ControlEvent, Dashboard, Mode};
//!
//! let mut dashboard = Dashboard::default();
//! dashboard.dispatch(ControlEvent::ModeChanged(Mode::Sine));
//! let outcome = dashboard.dispatch(ControlEvent::Tick { n_intervals: 0 });
//! assert_eq!(outcome.chart.trace().unwrap().y, vec![5.0]);
//! ```

pub mod api;
pub mod chart;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod generator;
pub mod series;
pub mod types;

// Re-export commonly used types
pub use chart::{render, ChartDescription};
pub use config::Settings;
pub use dashboard::{ControlEvent, ControlState, Dashboard, DashboardSnapshot, DispatchOutcome};
pub use error::{LiveChartError, Result};
pub use generator::SampleGenerator;
pub use series::{SeriesBuffer, MAX_LENGTH};
pub use types::{Mode, Sample, UpdateInterval};
