//! `agv-coord`: the coordination engine.
//!
//! Owns one record per robot and one admission queue per intersection cell.
//! Robots report movement status; the engine answers with control codes and,
//! when an intersection's queue changes, streams speed tokens so robots
//! arrive at the cell one after another instead of all at once.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`state`]     | `CoordStatus`, `RobotRecord`                              |
//! | [`admission`] | `AdmissionEntry`, `AdmissionQueue`, `Admission`           |
//! | [`scheduler`] | `target_speed`, `schedule`, `restore_cruise`              |
//! | [`engine`]    | `CoordEngine`: reports, supervision, handoffs, `Endpoint` |
//! | [`error`]     | `CoordError`, `CoordResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `fx-hash` | Uses `FxHashMap` for the cell → intersection index.      |

pub mod admission;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod state;

#[cfg(test)]
mod tests;

pub use admission::{Admission, AdmissionEntry, AdmissionQueue};
pub use engine::{CoordEngine, CoordTick};
pub use error::{CoordError, CoordResult};
pub use scheduler::{restore_cruise, schedule, target_speed};
pub use state::{CoordStatus, RobotRecord};
