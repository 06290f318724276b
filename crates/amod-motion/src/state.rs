//! In-flight task records.

use amod_core::{BookingId, CustomerId, LocationId, Position, VehicleId};
use amod_world::{CustomerStatus, VehicleStatus};

/// A vehicle travelling in a straight line towards a target.
///
/// `booking_id` is `NONE` for manual dispatches and rebalancing moves.
#[derive(Clone, Debug, PartialEq)]
pub struct Dispatch {
    pub booking_id:    BookingId,
    pub vehicle_id:    VehicleId,
    pub from_location: LocationId,
    pub to_location:   LocationId,
    pub from:          Position,
    pub to:            Position,
    /// Unit vector from `from` to `to`, or `(1, 1)` when they coincide.
    pub direction:     Position,
    pub current:       Position,
    pub end_status:    VehicleStatus,
}

impl Dispatch {
    /// The vehicle has covered at least the straight-line distance to the
    /// target.  A zero-length dispatch arrives on its first step.
    #[inline]
    pub fn has_arrived(&self) -> bool {
        self.from.distance(self.current) >= self.from.distance(self.to)
    }

    /// Move `distance` metres along the dispatch direction.
    #[inline]
    pub fn advance(&mut self, distance: f64) {
        self.current = self.current + self.direction * distance;
    }
}

/// A pickup or drop-off that completes at `due`.
#[derive(Clone, Debug, PartialEq)]
pub struct Handover {
    pub booking_id:  BookingId,
    pub vehicle_id:  VehicleId,
    pub customer_id: CustomerId,
    pub location_id: LocationId,
    pub due:         f64,
    pub end_status:  VehicleStatus,
}

/// A customer travelling outside the fleet.
#[derive(Clone, Debug, PartialEq)]
pub struct Teleport {
    pub booking_id:  BookingId,
    pub customer_id: CustomerId,
    pub location_id: LocationId,
    /// Landing position; the location's coordinate when one is known.
    pub to:          Position,
    pub due:         f64,
    pub end_status:  CustomerStatus,
}
