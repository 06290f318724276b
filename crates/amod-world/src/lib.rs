//! `amod-world`: entity types and the shared `World` store.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`status`]    | `VehicleStatus`, `CustomerStatus`                        |
//! | [`entity`]    | `Entity` trait, `Vehicle`, `Customer`, `Location`        |
//! | [`booking`]   | `Booking`, `TravelMode`                                  |
//! | [`event`]     | `Event`, `EventKind`                                     |
//! | [`world`]     | `World`: id-keyed collections, clock, event log         |
//!
//! # Invariants maintained by the simulator
//!
//! - `vehicle.customer_id` is non-zero iff `vehicle.status.carries_customer()`.
//! - A customer that is aboard (`InVehicle`, `WaitingForDropoff`) has a
//!   non-zero `vehicle_id`.
//! - Each vehicle/customer id appears in at most one location's id set.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on entities and events.  |

pub mod booking;
pub mod entity;
pub mod event;
pub mod status;
pub mod world;

#[cfg(test)]
mod tests;

pub use booking::{Booking, TravelMode};
pub use entity::{Customer, Entity, Location, Vehicle};
pub use event::{Event, EventKind};
pub use status::{CustomerStatus, VehicleStatus};
pub use world::World;
