//! Dashboard state and event dispatch
//!
//! A [`Dashboard`] owns everything that changes while the chart runs: the
//! series, the selected mode, the refresh interval and the random source.
//! All changes go through [`Dashboard::dispatch`], one event at a time.
//!
//! # Transitions
//!
//! - `Tick`: generate the next sample, append it, render
//! - `ModeChanged`: remember the mode for later ticks; the series is untouched
//! - `IntervalChanged`: remember the period and hand it back to the caller,
//!   who owns the timer; the series is untouched

use crate::chart::{render, ChartDescription};
use crate::generator::SampleGenerator;
use crate::series::SeriesBuffer;
use crate::types::{Mode, Sample, UpdateInterval};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Event delivered by the control surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlEvent {
    /// Timer fired; `n_intervals` is an opaque counter from the caller
    Tick { n_intervals: u64 },
    /// Generation mode selected
    ModeChanged(Mode),
    /// Refresh period selected
    IntervalChanged(UpdateInterval),
}

/// Result of handling one [`ControlEvent`]
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// Chart after the event
    pub chart: ChartDescription,
    /// New timer period, only for `IntervalChanged`
    pub interval: Option<UpdateInterval>,
}

/// Current control values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub mode: Mode,
    pub interval_ms: u64,
    pub points: usize,
}

/// Control values and chart read together
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSnapshot {
    pub controls: ControlState,
    pub chart: ChartDescription,
}

/// Whether any sample has been generated yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Streaming,
}

/// Owned chart state
#[derive(Debug, Clone)]
pub struct Dashboard {
    series: SeriesBuffer,
    generator: SampleGenerator,
    mode: Mode,
    interval: UpdateInterval,
}

impl Dashboard {
    /// Create an empty dashboard
    pub fn new(capacity: usize, interval: UpdateInterval, generator: SampleGenerator) -> Self {
        Self {
            series: SeriesBuffer::new(capacity),
            generator,
            mode: Mode::default(),
            interval,
        }
    }

    /// Handle one event to completion
    pub fn dispatch(&mut self, event: ControlEvent) -> DispatchOutcome {
        match event {
            ControlEvent::Tick { n_intervals } => {
                let sample = self.tick();
                debug!(
                    "Tick {}: appended x={} y={:.4} ({})",
                    n_intervals, sample.x, sample.y, self.mode
                );
                DispatchOutcome {
                    chart: self.chart(),
                    interval: None,
                }
            }
            ControlEvent::ModeChanged(mode) => {
                if mode != self.mode {
                    info!("Mode changed: {} -> {}", self.mode, mode);
                }
                self.mode = mode;
                DispatchOutcome {
                    chart: self.chart(),
                    interval: None,
                }
            }
            ControlEvent::IntervalChanged(interval) => {
                if interval != self.interval {
                    info!("Update interval changed: {} -> {}", self.interval, interval);
                }
                self.interval = interval;
                DispatchOutcome {
                    chart: self.chart(),
                    interval: Some(interval),
                }
            }
        }
    }

    fn tick(&mut self) -> Sample {
        let sample = self.generator.next(&self.series, self.mode);
        self.series.append(sample);
        sample
    }

    /// Render the current series
    pub fn chart(&self) -> ChartDescription {
        render(&self.series)
    }

    /// Read-only view of the series
    pub fn series(&self) -> &SeriesBuffer {
        &self.series
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn interval(&self) -> UpdateInterval {
        self.interval
    }

    pub fn phase(&self) -> Phase {
        if self.series.is_empty() {
            Phase::Idle
        } else {
            Phase::Streaming
        }
    }

    /// Current control values
    pub fn controls(&self) -> ControlState {
        ControlState {
            mode: self.mode,
            interval_ms: self.interval.as_millis(),
            points: self.series.len(),
        }
    }

    /// Control values and the chart they belong to
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            controls: self.controls(),
            chart: self.chart(),
        }
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(
            crate::series::MAX_LENGTH,
            UpdateInterval::default(),
            SampleGenerator::new(),
        )
    }
}
