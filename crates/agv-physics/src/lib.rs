//! `agv-physics`: the physical engine.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                     |
//! |-------------|--------------------------------------------------------------|
//! | [`body`]    | `Body` (position, cells, speed), `Heading`                   |
//! | [`motion`]  | `step`, `walk_to_center`: the movement shared by all agents  |
//! | [`state`]   | `PhysStatus`, `ObstaclePhase`, `RobotState`, `ObstacleState` |
//! | [`engine`]  | `PhysicsEngine`: per-tick update, `Endpoint` impl            |
//! | [`error`]   | `PhysicsError`, `PhysicsResult<T>`                           |
//!
//! # Tick order
//!
//! 1. Apply the one inbound control code each robot may have received.
//! 2. Record which cells obstacles occupy, then move every obstacle.
//! 3. Every `speed_step_interval_ms`, apply one pending speed token per robot.
//! 4. Move every robot against the occupancy from step 2 and post the
//!    resulting movement status.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                            |
//! |------------|---------------------------------------------------|
//! | `parallel` | Moves obstacles on Rayon's thread pool.           |

pub mod body;
pub mod engine;
pub mod error;
pub mod motion;
pub mod state;

#[cfg(test)]
mod tests;

pub use body::{Body, Heading};
pub use engine::{PhysicsEngine, PhysicsTick};
pub use error::{PhysicsError, PhysicsResult};
pub use motion::{step, walk_to_center, Move};
pub use state::{ObstaclePhase, ObstacleState, PhysStatus, RobotState};
