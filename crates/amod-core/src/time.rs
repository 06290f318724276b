//! Simulation time model.
//!
//! # Design
//!
//! Simulated time is a continuous `f64` count of seconds.  The simulator
//! advances it by a fixed `resolution` per tick (0.1 s by default), so the
//! tick index and the clock are related by
//!
//!   time = start_time + tick * resolution
//!
//! Stochastic completion times (pickups, drop-offs, teleports) fall between
//! ticks and are keyed in ordered maps through [`TimeKey`].

pub use ordered_float::OrderedFloat;

use crate::{AmodError, AmodResult};

/// Seconds in one simulated day.  Demand histograms are binned over this span.
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Seconds since midnight for an absolute simulated time.
#[inline]
pub fn time_of_day(t: f64) -> f64 {
    t.rem_euclid(SECONDS_PER_DAY)
}

/// Zero-based calendar day index for an absolute simulated time.
#[inline]
pub fn day_index(t: f64) -> i64 {
    (t / SECONDS_PER_DAY).floor() as i64
}

// ── TimeKey ───────────────────────────────────────────────────────────────────

/// A totally ordered `f64` time, usable as a `BTreeMap` key.
///
/// `-0.0` and `0.0` are the same key; NaN sorts after every number.
pub type TimeKey = OrderedFloat<f64>;

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration.
///
/// Typically loaded from a JSON file by the application crate and passed to
/// the context builder.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Simulated time of tick 0, in seconds.
    pub start_time: f64,

    /// Seconds advanced per simulator tick.  Default: 0.1.
    pub resolution: f64,

    /// Run stops once the clock reaches this time (exclusive).
    pub end_time: f64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Call the snapshot hook every N ticks.  0 disables snapshots.
    pub output_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_time:            0.0,
            resolution:            0.1,
            end_time:              SECONDS_PER_DAY,
            seed:                  42,
            output_interval_ticks: 0,
        }
    }
}

impl SimConfig {
    /// Number of ticks between `start_time` and `end_time`.
    pub fn total_ticks(&self) -> u64 {
        ((self.end_time - self.start_time) / self.resolution).ceil().max(0.0) as u64
    }

    /// Reject non-positive resolutions and inverted time ranges.
    pub fn validate(&self) -> AmodResult<()> {
        if !(self.resolution > 0.0) || !self.resolution.is_finite() {
            return Err(AmodError::Config(format!(
                "resolution must be a positive number of seconds, got {}",
                self.resolution
            )));
        }
        if self.end_time < self.start_time {
            return Err(AmodError::Config(format!(
                "end_time {} precedes start_time {}",
                self.end_time, self.start_time
            )));
        }
        Ok(())
    }
}
