//! Fleet manager configuration.

use crate::{FleetError, FleetResult};

/// Which [`FleetManager`](crate::FleetManager) implementation to run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ManagerKind {
    /// First come, first served: each due booking takes the closest idle
    /// vehicle.
    Basic,
    /// Periodic batch matching plus LP rebalancing between stations.
    #[default]
    MatchRebalance,
}

/// Matching policy used by `ManagerMatchRebalance`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MatchMethod {
    /// Bookings in id order each take their nearest available vehicle.
    #[default]
    Greedy,
    /// Maximum-score bipartite assignment over the whole batch.
    Assignment,
}

/// Manager selection and tuning.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FleetConfig {
    pub manager:      ManagerKind,
    pub match_method: MatchMethod,

    /// Seconds between matching passes.  Default: 60.
    pub matching_interval: f64,

    /// Seconds between rebalancing passes.  Default: 300.
    pub rebalancing_interval: f64,

    /// Weight of pickup distance in the assignment score.
    pub distance_cost_factor: f64,

    /// Weight of time already waited in the assignment score.
    pub waiting_time_cost_factor: f64,

    /// Rebalance towards the customers currently queued at each station
    /// instead of the estimator's prediction.
    pub use_current_queue: bool,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            manager:                  ManagerKind::MatchRebalance,
            match_method:             MatchMethod::Greedy,
            matching_interval:        60.0,
            rebalancing_interval:     300.0,
            distance_cost_factor:     1.0,
            waiting_time_cost_factor: 1.0,
            use_current_queue:        false,
        }
    }
}

impl FleetConfig {
    /// Reject non-positive intervals and negative cost factors.
    pub fn validate(&self) -> FleetResult<()> {
        for (what, v) in [
            ("matching_interval", self.matching_interval),
            ("rebalancing_interval", self.rebalancing_interval),
        ] {
            if !(v > 0.0) || !v.is_finite() {
                return Err(FleetError::Config(format!(
                    "{what} must be a positive number of seconds, got {v}"
                )));
            }
        }
        for (what, v) in [
            ("distance_cost_factor", self.distance_cost_factor),
            ("waiting_time_cost_factor", self.waiting_time_cost_factor),
        ] {
            if !(v >= 0.0) || !v.is_finite() {
                return Err(FleetError::Config(format!("{what} must be >= 0, got {v}")));
            }
        }
        Ok(())
    }
}
