//! `amod-sim`: the simulation context and its tick loop.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks():
//!   ① Manager  : FleetManager::update. Vehicles freed by last tick's
//!                 ARRIVAL/DROPOFF events rejoin the pool, due bookings are
//!                 received, matching and rebalancing run on their timers.
//!   ② Events   : the event log goes to SimObserver::on_events and is cleared.
//!   ③ Simulator: VehicleMotionSimulator::update advances the clock by one
//!                 resolution step and completes due tasks.
//! ```
//!
//! There is no global state: an [`AmodContext`] owns its `World`, simulator
//! and manager, and several can run side by side.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use amod_sim::{AmodContextBuilder, NoopObserver};
//!
//! let mut ctx = AmodContextBuilder::new(config)
//!     .world(world)
//!     .fleet_config(fleet)
//!     .bookings(bookings)
//!     .build()?;
//! ctx.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod context;
pub mod error;
pub mod observer;

#[cfg(test)]
mod tests;

pub use builder::AmodContextBuilder;
pub use context::AmodContext;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickStats};
