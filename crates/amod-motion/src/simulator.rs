//! The `VehicleMotionSimulator` trait.

use amod_core::{BookingId, CustomerId, LocationId, Position, ReturnCode, VehicleId};
use amod_world::{Booking, CustomerStatus, VehicleStatus, World};

use crate::MotionResult;

/// Moves vehicles and customers through simulated time.
///
/// Commands (`dispatch_vehicle`, `pickup_customer`, ...) validate their
/// arguments, take effect on `world` immediately and schedule the task's
/// completion.  Completions happen inside [`update`](Self::update), which
/// also advances the clock by one tick.
///
/// Command failures are local: they return the [`ReturnCode`] and leave the
/// world unchanged.  `update` failures are not; they mean a task the
/// simulator had already accepted could not complete.
pub trait VehicleMotionSimulator {
    /// Snap vehicles and customers onto locations and take the initial
    /// snapshot of `world`.
    fn init(&mut self, world: &mut World) -> MotionResult<()>;

    /// Advance `world` by one tick.  After an error the simulator must not
    /// be stepped again.
    fn update(&mut self, world: &mut World) -> MotionResult<()>;

    /// Send a vehicle towards `to`.  `booking` is `NONE` for manual moves.
    fn dispatch_vehicle(
        &mut self,
        world:   &mut World,
        vehicle: VehicleId,
        to:      Position,
        start:   VehicleStatus,
        end:     VehicleStatus,
        booking: BookingId,
    ) -> Result<(), ReturnCode>;

    fn pickup_customer(
        &mut self,
        world:    &mut World,
        vehicle:  VehicleId,
        customer: CustomerId,
        booking:  BookingId,
        start:    VehicleStatus,
        end:      VehicleStatus,
    ) -> Result<(), ReturnCode>;

    fn dropoff_customer(
        &mut self,
        world:    &mut World,
        vehicle:  VehicleId,
        customer: CustomerId,
        booking:  BookingId,
        start:    VehicleStatus,
        end:      VehicleStatus,
    ) -> Result<(), ReturnCode>;

    /// Move a FREE customer to the location nearest `to` without a vehicle.
    fn teleport_customer(
        &mut self,
        world:    &mut World,
        customer: CustomerId,
        to:       Position,
        start:    CustomerStatus,
        end:      CustomerStatus,
    ) -> Result<(), ReturnCode>;

    fn set_customer_status(
        &mut self,
        world:    &mut World,
        customer: CustomerId,
        status:   CustomerStatus,
    ) -> Result<(), ReturnCode>;

    /// Carry out a booking end to end: teleport for `Teleport` mode,
    /// otherwise dispatch `booking.vehicle_id` to the customer, pick them up,
    /// drive to the destination and drop them off.
    ///
    /// A rejected booking emits `BookingCannotBeServiced` before the code is
    /// returned.
    fn service_booking(&mut self, world: &mut World, booking: &Booking) -> Result<(), ReturnCode>;

    /// Driving distance between raw positions; `None` if there is no path.
    fn driving_distance(&self, from: Position, to: Position) -> Option<f64>;

    /// Driving distance between two locations of `world`.
    fn driving_distance_between(
        &self,
        world: &World,
        from:  LocationId,
        to:    LocationId,
    ) -> Option<f64>;

    /// Straight-line distance.
    fn distance(&self, from: Position, to: Position) -> f64 {
        from.distance(to)
    }

    /// The vehicle has a dispatch in flight.
    fn is_dispatched(&self, vehicle: VehicleId) -> bool;

    /// Tasks of any kind not yet completed.
    fn pending_tasks(&self) -> usize;

    /// Seconds of simulated time per [`update`](Self::update).
    fn resolution(&self) -> f64;
}
