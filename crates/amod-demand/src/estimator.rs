//! The `DemandEstimator` trait.

use amod_core::{LocationId, Position};
use amod_world::World;

/// Predicts how many bookings a location will see around a given time.
///
/// The fleet manager's rebalancing pass calls [`predict`](Self::predict)
/// once per station; any model (histogram, regression, oracle replay) can
/// sit behind this interface.
pub trait DemandEstimator {
    /// `(mean, variance)` of the booking count at `location` for the
    /// time-of-day bin containing `time`.
    fn predict(&self, location: LocationId, world: &World, time: f64) -> (f64, f64);

    /// Like [`predict`](Self::predict) for a raw position, snapped to the
    /// nearest location in `world`.
    ///
    /// The default performs a linear scan; implementations holding a spatial
    /// index should override it.
    fn predict_at(&self, position: Position, world: &World, time: f64) -> (f64, f64) {
        let nearest = world
            .locations()
            .min_by(|a, b| {
                a.position
                    .sq_distance(position)
                    .total_cmp(&b.position.sq_distance(position))
            })
            .map(|l| l.id)
            .unwrap_or(LocationId::NONE);
        self.predict(nearest, world, time)
    }
}
