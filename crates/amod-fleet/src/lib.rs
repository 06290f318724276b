//! `amod-fleet`: fleet managers: who serves which booking, and where idle
//! vehicles wait.
//!
//! # Crate layout
//!
//! | Module              | Contents                                                  |
//! |---------------------|-----------------------------------------------------------|
//! | [`manager`]         | `FleetManager` trait, `DiscardReason`                     |
//! | [`basic`]           | `ManagerBasic`: FIFO, closest idle vehicle               |
//! | [`match_rebalance`] | `ManagerMatchRebalance`: batch matching, LP rebalancing  |
//! | [`lp`]              | `LinearProgram`: dense two-phase simplex                 |
//! | [`config`]          | `FleetConfig`, `ManagerKind`, `MatchMethod`               |
//! | [`error`]           | `FleetError`, `FleetResult<T>`                            |
//!
//! # Events emitted by managers
//!
//! | Event                        | Entity ids                     |
//! |------------------------------|--------------------------------|
//! | `BOOKING_RECEIVED`           | `[booking, customer]`          |
//! | `BOOKING_CANNOT_BE_SERVICED` | `[booking, DiscardReason]`     |
//! | `REBALANCE`                  | `[from station, to station, n]`|
//!
//! Everything else (dispatches, pickups, `BOOKING_SERVICED`, ...) comes from
//! the simulator as it carries out the manager's commands.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                   |
//! |---------|----------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on the config types.   |

pub mod basic;
pub mod config;
pub mod error;
pub mod lp;
pub mod manager;
pub mod match_rebalance;


pub use basic::ManagerBasic;
pub use config::{FleetConfig, ManagerKind, MatchMethod};
pub use error::{FleetError, FleetResult};
pub use lp::{LinearProgram, LpError, Relation, Solution};
pub use manager::{DiscardReason, FleetManager};
pub use match_rebalance::{ManagerMatchRebalance, UNREACHABLE_COST};
