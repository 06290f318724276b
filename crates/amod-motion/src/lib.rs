//! `amod-motion`: vehicle movement and trip task simulation.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`simulator`] | `VehicleMotionSimulator` trait                                |
//! | [`basic`]     | `SimulatorBasic<O>`: straight-line motion, sampled timings   |
//! | [`params`]    | `MotionParams`: truncated-normal speed and durations         |
//! | [`state`]     | `Dispatch`, `Handover`, `Teleport` task records               |
//! | [`store`]     | `TaskStore`, `TimedQueue`: slotmap arenas and time index     |
//! | [`error`]     | `MotionError`, `MotionResult<T>`                              |
//!
//! # Trip lifecycle
//!
//! A fleet booking walks a vehicle through
//!
//! ```text
//! MOVING_TO_PICKUP → PICKING_UP → MOVING_TO_DROPOFF → DROPPING_OFF → FREE
//! ```
//!
//! emitting DISPATCH, ARRIVAL, PICKUP, DISPATCH, ARRIVAL, DROPOFF and finally
//! BOOKING_SERVICED.  The vehicle holds the customer's id from the first
//! dispatch until the drop-off completes.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                               |
//! |---------|------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `MotionParams`. |

pub mod basic;
pub mod error;
pub mod params;
pub mod simulator;
pub mod state;
pub mod store;


pub use basic::SimulatorBasic;
pub use error::{MotionError, MotionResult};
pub use params::MotionParams;
pub use simulator::VehicleMotionSimulator;
pub use state::{Dispatch, Handover, Teleport};
pub use store::{TaskStore, TimedQueue};
