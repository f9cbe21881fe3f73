//! Synthetic sample generation
//!
//! The next sample depends only on the last sample held by the series and the
//! selected [`Mode`]:
//! - `x` continues from the last sample (0 when the series is empty)
//! - random-walk draws the first value from `[0, 10]` and then moves by a
//!   uniform step in `[-1, 1]`, without clamping
//! - sine is `5 * sin(x / 5) + 5`, so switching modes keeps the phase of the
//!   step counter

use crate::series::SeriesBuffer;
use crate::types::{Mode, Sample};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Amplitude and vertical offset of the sine wave
const SINE_AMPLITUDE: f64 = 5.0;
/// Steps per radian of the sine wave
const SINE_PERIOD_DIVISOR: f64 = 5.0;
/// Upper bound of the first random-walk value
const WALK_START_MAX: f64 = 10.0;
/// Largest single random-walk step
const WALK_STEP: f64 = 1.0;

/// Sine value at step `x`
pub fn sine_value(x: u64) -> f64 {
    SINE_AMPLITUDE * (x as f64 / SINE_PERIOD_DIVISOR).sin() + SINE_AMPLITUDE
}

/// Compute the sample that follows `last` in the given mode
pub fn next_sample<R: Rng>(last: Option<&Sample>, mode: Mode, rng: &mut R) -> Sample {
    let x = last.map_or(0, |s| s.x + 1);
    let y = match mode {
        Mode::Sine => sine_value(x),
        Mode::RandomWalk => match last {
            None => rng.gen_range(0.0..=WALK_START_MAX),
            Some(prev) => prev.y + rng.gen_range(-WALK_STEP..=WALK_STEP),
        },
    };
    Sample::new(x, y)
}

/// Sample generator owning its random source
#[derive(Debug, Clone)]
pub struct SampleGenerator {
    rng: StdRng,
}

impl SampleGenerator {
    /// Generator seeded from the operating system
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Generator with a fixed seed, for reproducible random walks
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Next sample for `series` in `mode`
    pub fn next(&mut self, series: &SeriesBuffer, mode: Mode) -> Sample {
        next_sample(series.last(), mode, &mut self.rng)
    }
}

impl Default for SampleGenerator {
    fn default() -> Self {
        Self::new()
    }
}
