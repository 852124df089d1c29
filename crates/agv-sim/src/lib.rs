//! `agv-sim`: tick loop orchestrator for the agv fleet simulator.
//!
//! # Lock-step tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Physics       inbound commands, obstacles, speed tokens, robots
//!   ② Uplink        movement reports: physics → relay → coordination
//!   ③ Coordination  reports, supervision, route handoffs
//!   ④ Downlink      control codes: coordination → relay → physics
//!   ⑤ Snapshot      every snapshot_interval_ticks
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Moves obstacles on Rayon's thread pool.                 |
//! | `fx-hash`  | FxHash for the coordination engine's intersection index.|
//! | `serde`    | Serde derives on snapshots and every embedded type.     |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use agv_core::SimConfig;
//! use agv_layout::reference_layout;
//! use agv_sim::{NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig::default(), reference_layout()?).build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;
pub mod snapshot;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, TickStats};
pub use sim::Sim;
pub use snapshot::{FleetSnapshot, ObstacleView, QueueView, RobotView};
