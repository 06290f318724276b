//! Stochastic parameters of the basic simulator.

use amod_core::DistParams;

use crate::{MotionError, MotionResult};

/// Truncated-normal parameters for every sampled quantity.
///
/// | Field      | Unit | Default `(mean, sd, min, max)` |
/// |------------|------|--------------------------------|
/// | `speed`    | m/s  | `(10, 1, 5, 15)`               |
/// | `pickup`   | s    | `(20, 10, 0, 60)`              |
/// | `dropoff`  | s    | `(10, 1, 0, 30)`               |
/// | `teleport` | s    | `(10, 2, 0, 60)`               |
///
/// Speed is redrawn for every vehicle on every tick; the three durations are
/// drawn once when the task is scheduled.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MotionParams {
    pub speed:    DistParams,
    pub pickup:   DistParams,
    pub dropoff:  DistParams,
    pub teleport: DistParams,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            speed:    DistParams::new(10.0, 1.0, 5.0, 15.0),
            pickup:   DistParams::new(20.0, 10.0, 0.0, 60.0),
            dropoff:  DistParams::new(10.0, 1.0, 0.0, 30.0),
            teleport: DistParams::new(10.0, 2.0, 0.0, 60.0),
        }
    }
}

impl MotionParams {
    /// Reject negative bounds, inverted ranges and speeds that can never move
    /// a vehicle.
    pub fn validate(&self) -> MotionResult<()> {
        for (what, p) in [
            ("speed", &self.speed),
            ("pickup", &self.pickup),
            ("dropoff", &self.dropoff),
            ("teleport", &self.teleport),
        ] {
            p.validate(what).map_err(|e| MotionError::Config(e.to_string()))?;
        }
        if self.speed.max <= 0.0 {
            return Err(MotionError::Config(format!(
                "speed: max must be > 0, got {}",
                self.speed.max
            )));
        }
        Ok(())
    }
}
