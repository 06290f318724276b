//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.  Identifier `0` is reserved: it means
//! "no entity" (a vehicle with `customer_id == CustomerId::NONE` carries
//! nobody, a vehicle with `location_id == LocationId::NONE` is in transit).

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no entity".
            pub const NONE: $name = $name(0);

            /// `true` for the `NONE` sentinel.
            #[inline(always)]
            pub fn is_none(self) -> bool {
                self.0 == 0
            }

            /// `true` for any real id.
            #[inline(always)]
            pub fn is_some(self) -> bool {
                self.0 != 0
            }

            /// `None` for the sentinel, `Some(self)` otherwise.
            #[inline]
            pub fn get(self) -> Option<$name> {
                if self.is_some() { Some(self) } else { None }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for u64 {
            #[inline(always)]
            fn from(id: $name) -> u64 {
                id.0 as u64
            }
        }
    };
}

typed_id! {
    /// Identifier of a fleet vehicle.
    pub struct VehicleId(u32);
}

typed_id! {
    /// Identifier of a customer (trip requester).
    pub struct CustomerId(u32);
}

typed_id! {
    /// Identifier of a location.  Stations share this id space.
    pub struct LocationId(u32);
}

typed_id! {
    /// Identifier of a booking.
    pub struct BookingId(u32);
}

typed_id! {
    /// Monotonically assigned event identifier.  Never reused within a run.
    pub struct EventId(u64);
}
