//! Append-only event records.

use std::fmt;

use amod_core::EventId;

/// What happened.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    /// `[vehicle, booking]`.
    Dispatch,
    /// `[vehicle]` or `[vehicle, customer]` when a passenger is aboard.
    Move,
    /// `[vehicle]`, `[vehicle, customer]`, plus the booking id if any.
    Arrival,
    /// `[vehicle, customer]`, plus the booking id if any.
    Pickup,
    /// `[vehicle, customer]`, plus the booking id if any.
    Dropoff,
    /// `[location]`: the parked-vehicle set changed.
    LocationVehiclesSizeChange,
    /// `[location]`: the waiting-customer set changed.
    LocationCustomersSizeChange,
    /// `[booking, customer]`.
    BookingReceived,
    /// `[booking]`: the trip has been completed.
    BookingServiced,
    /// The booking was dropped: `[booking, customer]` when the simulator
    /// rejects it, `[booking, reason]` when the fleet manager discards it.
    BookingCannotBeServiced,
    /// `[from station, to station, vehicle count]`.
    Rebalance,
    /// `[customer, from location]`.
    Teleport,
    /// `[customer]`.
    TeleportArrival,
}

impl EventKind {
    /// Stable name used in output files.
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Dispatch                    => "DISPATCH",
            EventKind::Move                        => "MOVE",
            EventKind::Arrival                     => "ARRIVAL",
            EventKind::Pickup                      => "PICKUP",
            EventKind::Dropoff                     => "DROPOFF",
            EventKind::LocationVehiclesSizeChange  => "LOCATION_VEHS_SIZE_CHANGE",
            EventKind::LocationCustomersSizeChange => "LOCATION_CUSTS_SIZE_CHANGE",
            EventKind::BookingReceived             => "BOOKING_RECEIVED",
            EventKind::BookingServiced             => "BOOKING_SERVICED",
            EventKind::BookingCannotBeServiced     => "BOOKING_CANNOT_BE_SERVICED",
            EventKind::Rebalance                   => "REBALANCE",
            EventKind::Teleport                    => "TELEPORT",
            EventKind::TeleportArrival             => "TELEPORT_ARRIVAL",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One write-once log record.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    pub id:         EventId,
    pub kind:       EventKind,
    /// Simulated time at which the event was emitted.
    pub time:       f64,
    pub message:    String,
    /// Ids of the entities involved, in the order documented on [`EventKind`].
    pub entity_ids: Vec<u64>,
}
