//! Driving-distance oracle.
//!
//! # Pluggability
//!
//! The simulator and the fleet manager never compute routes.  They ask a
//! [`DistanceOracle`], so applications can plug in a road-network router, a
//! precomputed distance table, or a behavioural model without touching the
//! core.  [`EuclideanOracle`] (straight-line distance) is the default.
//!
//! `None` means "no path": the manager discards bookings whose trip has no
//! path, and matching never assigns a vehicle over an unavailable distance.

use amod_core::{LocationId, Position};

/// Pluggable distance source.
///
/// # Thread safety
///
/// Implementations must be `Send + Sync` so a context holding one can be
/// moved to a worker thread.
pub trait DistanceOracle: Send + Sync {
    /// Driving distance between two raw positions, or `None` if unreachable.
    fn distance(&self, from: Position, to: Position) -> Option<f64>;

    /// Driving distance between two known locations.
    ///
    /// The default falls back to [`distance`](Self::distance) on the
    /// locations' coordinates; table-driven oracles override it to key on ids.
    fn location_distance(
        &self,
        _from:    LocationId,
        from_pos: Position,
        _to:      LocationId,
        to_pos:   Position,
    ) -> Option<f64> {
        self.distance(from_pos, to_pos)
    }
}

/// Straight-line distance; every pair of points is reachable.
#[derive(Copy, Clone, Debug, Default)]
pub struct EuclideanOracle;

impl DistanceOracle for EuclideanOracle {
    #[inline]
    fn distance(&self, from: Position, to: Position) -> Option<f64> {
        Some(from.distance(to))
    }
}

impl<O: DistanceOracle + ?Sized> DistanceOracle for Box<O> {
    fn distance(&self, from: Position, to: Position) -> Option<f64> {
        (**self).distance(from, to)
    }

    fn location_distance(
        &self,
        from:     LocationId,
        from_pos: Position,
        to:       LocationId,
        to_pos:   Position,
    ) -> Option<f64> {
        (**self).location_distance(from, from_pos, to, to_pos)
    }
}
