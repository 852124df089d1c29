//! The `Sim` struct and its tick loop.

use tracing::debug;

use agv_coord::CoordEngine;
use agv_core::{SimClock, SimConfig, Tick};
use agv_layout::FleetLayout;
use agv_physics::PhysicsEngine;
use agv_transport::Fabric;

use crate::{FleetSnapshot, SimObserver, SimResult, TickStats};

/// The main simulation runner.
///
/// Every tick runs the same lock-step pipeline:
///
/// 1. **Physics**: apply inbound commands, move obstacles and robots, post
///    movement reports.
/// 2. **Uplink**: physical engine → relay → coordination engine.
/// 3. **Coordination**: handle reports, supervise robots, hand off routes.
/// 4. **Downlink**: coordination engine → relay → physical engine.
///
/// A code posted in step 1 or 3 is therefore acted on by the other engine
/// in the same tick (reports) or the next one (commands).
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub config:  SimConfig,
    pub clock:   SimClock,
    pub layout:  FleetLayout,
    pub physics: PhysicsEngine,
    pub coord:   CoordEngine,
    pub fabric:  Fabric,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run from the current tick to `config.end_tick()`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        loop {
            let now = self.clock.current_tick;
            if now >= self.config.end_tick() {
                break;
            }
            self.step(now, observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            let now = self.clock.current_tick;
            self.step(now, observer)?;
        }
        Ok(())
    }

    /// Capture the current state of every agent.
    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot::capture(self.clock.current_tick, &self.physics, &self.coord)
    }

    fn step<O: SimObserver>(&mut self, now: Tick, observer: &mut O) -> SimResult<()> {
        observer.on_tick_start(now);
        let stats = self.process_tick(now)?;
        observer.on_tick_end(now, &stats);
        if self.config.snapshot_interval_ticks > 0
            && now.0.is_multiple_of(self.config.snapshot_interval_ticks)
        {
            let snapshot = FleetSnapshot::capture(now, &self.physics, &self.coord);
            observer.on_snapshot(now, &snapshot);
        }
        self.clock.advance();
        Ok(())
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick(&mut self, now: Tick) -> SimResult<TickStats> {
        let physics = self.physics.tick(now);
        let uplink = self.fabric.uplink(now, &mut self.physics, &mut self.coord)?;
        let coord = self.coord.tick(now)?;
        let downlink = self.fabric.downlink(now, &mut self.coord, &mut self.physics)?;

        let stats = TickStats { physics, uplink, coord, downlink };
        if stats.nacks() > 0 {
            debug!(tick = %now, nacks = stats.nacks(), "handshake timeouts");
        }
        Ok(stats)
    }
}
