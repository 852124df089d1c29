//! `agv-core`: foundational types for the guided-vehicle fleet simulator.
//!
//! This crate is a dependency of every other `agv-*` crate.  It has no
//! `agv-*` dependencies and only `thiserror` (plus optional `serde`) from the
//! ecosystem.
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `RobotId`, `ObstacleId`, `CellId`, `IntersectionId`   |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`kinematics`]  | `Kinematics`: cell width, speeds, scheduler scales    |
//! | [`code`]        | `NavCode`, `MovementStatus`, `ControlCommand`         |
//! | [`token`]       | `SpeedStep`, `TokenStream`                            |
//! | [`error`]       | `AgvError`, `AgvResult`                               |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod code;
pub mod error;
pub mod ids;
pub mod kinematics;
pub mod time;
pub mod token;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use code::{ControlCommand, Decoded, MovementStatus, NavCode};
pub use error::{AgvError, AgvResult};
pub use ids::{CellId, IntersectionId, ObstacleId, RobotId};
pub use kinematics::Kinematics;
pub use time::{SimClock, SimConfig, Tick};
pub use token::{SpeedStep, TokenStream};
