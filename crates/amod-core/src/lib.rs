//! `amod-core`: foundational types for the amod fleet simulator.
//!
//! Every other `amod-*` crate depends on this one.  It has no `amod-*`
//! dependencies and only a few external ones (`rand`, `rand_distr`,
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `VehicleId`, `CustomerId`, `LocationId`, `BookingId`, `EventId` |
//! | [`geo`]         | `Position` (planar x/y) and vector helpers                 |
//! | [`time`]        | `SimConfig`, `TimeKey`, time-of-day helpers                |
//! | [`rng`]         | `SimRng`, `DistParams` (truncated normal)                  |
//! | [`error`]       | `ReturnCode`, `AmodError`, `AmodResult`                    |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to ids, positions, configs. |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{AmodError, AmodResult, ReturnCode};
pub use geo::Position;
pub use ids::{BookingId, CustomerId, EventId, LocationId, VehicleId};
pub use rng::{DistParams, SimRng};
pub use time::{OrderedFloat, SimConfig, TimeKey, SECONDS_PER_DAY};
