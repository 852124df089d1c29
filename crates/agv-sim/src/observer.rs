//! Simulation observer trait for progress reporting and data collection.

use agv_coord::CoordTick;
use agv_core::Tick;
use agv_physics::PhysicsTick;
use agv_transport::ExchangeStats;

use crate::FleetSnapshot;

/// Counters for one pass through the tick pipeline.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub physics:  PhysicsTick,
    pub uplink:   ExchangeStats,
    pub coord:    CoordTick,
    pub downlink: ExchangeStats,
}

impl TickStats {
    /// Codes acknowledged on any link this tick.
    pub fn delivered(&self) -> u32 {
        self.uplink.delivered + self.downlink.delivered
    }

    /// Handshakes that timed out this tick.
    pub fn nacks(&self) -> u32 {
        self.uplink.nacks + self.downlink.nacks
    }
}

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct Progress { interval: u64 }
///
/// impl SimObserver for Progress {
///     fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
///         if tick.0 % self.interval == 0 {
///             println!("{tick}: {} codes delivered", stats.delivered());
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called after the downlink pass.
    fn on_tick_end(&mut self, _tick: Tick, _stats: &TickStats) {}

    /// Called every `config.snapshot_interval_ticks` ticks, after
    /// `on_tick_end`.
    fn on_snapshot(&mut self, _tick: Tick, _snapshot: &FleetSnapshot) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
