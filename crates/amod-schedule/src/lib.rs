//! `amod-schedule`: booking intake plumbing.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`loader`] | `load_bookings_path`, `load_bookings_reader`, `BookingFeed` |
//! | [`queue`]  | `BookingQueue`: bookings not yet due, ordered by time     |
//! | [`error`]  | `ScheduleError`, `ScheduleResult<T>`                       |

pub mod error;
pub mod loader;
pub mod queue;

#[cfg(test)]
mod tests;

pub use error::{ScheduleError, ScheduleResult};
pub use loader::{BookingFeed, load_bookings_path, load_bookings_reader};
pub use queue::BookingQueue;
