//! `amod-spatial`: nearest-neighbour snapping and distance queries.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`kdtree`]  | `KdPoint` trait, `KdTree<T>` (quickselect build, exact/ε NN) |
//! | [`oracle`]  | `DistanceOracle` trait, `EuclideanOracle`                   |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.           |

pub mod error;
pub mod kdtree;
pub mod oracle;

#[cfg(test)]
mod tests;

pub use error::{SpatialError, SpatialResult};
pub use kdtree::{KdPoint, KdTree};
pub use oracle::{DistanceOracle, EuclideanOracle};
