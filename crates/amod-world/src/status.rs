//! Vehicle and customer state enums.

/// Operational state of a vehicle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleStatus {
    Free,
    Busy,
    Hired,
    MovingToPickup,
    MovingToDropoff,
    PickingUp,
    DroppingOff,
    Parked,
    MovingToRebalance,
    #[default]
    Unknown,
}

impl VehicleStatus {
    /// States in which the vehicle is committed to a customer.  The vehicle's
    /// `customer_id` is non-zero exactly in these states.
    #[inline]
    pub fn carries_customer(self) -> bool {
        matches!(
            self,
            VehicleStatus::Hired
                | VehicleStatus::PickingUp
                | VehicleStatus::DroppingOff
                | VehicleStatus::MovingToPickup
                | VehicleStatus::MovingToDropoff
        )
    }

    /// Idle states from which the manager may assign or rebalance the vehicle.
    #[inline]
    pub fn is_idle(self) -> bool {
        matches!(self, VehicleStatus::Free | VehicleStatus::Parked)
    }

    /// Stable name used in output files.
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleStatus::Free              => "FREE",
            VehicleStatus::Busy              => "BUSY",
            VehicleStatus::Hired             => "HIRED",
            VehicleStatus::MovingToPickup    => "MOVING_TO_PICKUP",
            VehicleStatus::MovingToDropoff   => "MOVING_TO_DROPOFF",
            VehicleStatus::PickingUp         => "PICKING_UP",
            VehicleStatus::DroppingOff       => "DROPPING_OFF",
            VehicleStatus::Parked            => "PARKED",
            VehicleStatus::MovingToRebalance => "MOVING_TO_REBALANCE",
            VehicleStatus::Unknown           => "UNKNOWN",
        }
    }
}

/// Lifecycle state of a customer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CustomerStatus {
    #[default]
    Free,
    WaitingForAssignment,
    WaitingForPickup,
    InVehicle,
    WaitingForDropoff,
    Teleporting,
}

impl CustomerStatus {
    /// States in which a new booking for this customer may be accepted.
    #[inline]
    pub fn is_matchable(self) -> bool {
        matches!(self, CustomerStatus::Free | CustomerStatus::WaitingForAssignment)
    }

    /// The customer is physically inside a vehicle.
    #[inline]
    pub fn is_aboard(self) -> bool {
        matches!(self, CustomerStatus::InVehicle | CustomerStatus::WaitingForDropoff)
    }
}
