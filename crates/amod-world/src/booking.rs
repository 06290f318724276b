//! Trip requests.

use amod_core::{BookingId, CustomerId, Position, VehicleId};

/// How a booked trip is carried out.
///
/// The numeric values are the ones used in bookings files.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TravelMode {
    /// The customer is moved by an external mode (e.g. transit) after a
    /// stochastic delay; no vehicle is involved.
    Teleport = 0,
    /// A fleet vehicle picks the customer up and drives them.
    #[default]
    FleetTravel = 1,
}

impl TryFrom<i64> for TravelMode {
    type Error = i64;

    fn try_from(v: i64) -> Result<Self, i64> {
        match v {
            0 => Ok(TravelMode::Teleport),
            1 => Ok(TravelMode::FleetTravel),
            other => Err(other),
        }
    }
}

/// A customer's request to travel from `source` to `destination`.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Booking {
    pub id:          BookingId,
    pub customer_id: CustomerId,
    /// Filled in by the fleet manager when a vehicle is assigned.
    pub vehicle_id:  VehicleId,
    pub source:      Position,
    pub destination: Position,
    /// Simulated time at which the request is issued, in seconds.
    pub time:        f64,
    pub mode:        TravelMode,
}
