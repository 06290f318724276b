//! `amod-demand`: booking demand estimation for rebalancing.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`estimator`] | `DemandEstimator` trait                                   |
//! | [`histogram`] | `SimpleDemandEstimator`: per-location time-of-day counts |
//! | [`io`]        | Histogram table load/save                                 |
//! | [`error`]     | `DemandError`, `DemandResult<T>`                          |

pub mod error;
pub mod estimator;
pub mod histogram;
pub mod io;

#[cfg(test)]
mod tests;

pub use error::{DemandError, DemandResult};
pub use estimator::DemandEstimator;
pub use histogram::{DEFAULT_BIN_WIDTH, SimpleDemandEstimator};
pub use io::{load_hist_path, load_hist_reader, save_hist_path, save_hist_writer};
