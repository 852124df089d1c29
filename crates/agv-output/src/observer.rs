//! `SimOutputObserver<W>`: feeds an `OutputWriter` from the tick loop.

use agv_core::{SimConfig, Tick};
use agv_sim::{FleetSnapshot, SimObserver, TickStats};

use crate::row::{ObstacleSnapshotRow, RobotSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes one summary row per tick and one row per
/// agent at every snapshot.
///
/// Observer callbacks cannot fail, so the first writer error is parked here;
/// read it with [`take_error`][Self::take_error] after `sim.run()` returns.
pub struct SimOutputObserver<W: OutputWriter> {
    writer:           W,
    tick_duration_ms: u32,
    last_error:       Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            tick_duration_ms: config.tick_duration_ms,
            last_error:       None,
        }
    }

    /// The stored write error, if any write failed.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // First error wins.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, stats: &TickStats) {
        let row = TickSummaryRow {
            tick:       tick.0,
            elapsed_ms: tick.0 * u64::from(self.tick_duration_ms),
            commands:   stats.physics.commands,
            steps:      stats.physics.steps,
            notices:    stats.physics.notices,
            reports:    stats.coord.reports,
            profiles:   stats.coord.profiles,
            handoffs:   stats.coord.handoffs,
            delivered:  stats.delivered(),
            nacks:      stats.nacks(),
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, snapshot: &FleetSnapshot) {
        let robots: Vec<RobotSnapshotRow> = snapshot
            .robots
            .iter()
            .map(|r| RobotSnapshotRow {
                robot_id:     r.robot.0,
                tick:         tick.0,
                x:            r.x,
                y:            r.y,
                speed:        r.speed,
                current_cell: r.current.0,
                next_cell:    r.next.0,
                phys_status:  r.phys_status.as_str(),
                coord_status: r.coord_status.as_str(),
                coord_speed:  r.coord_speed,
            })
            .collect();

        let obstacles: Vec<ObstacleSnapshotRow> = snapshot
            .obstacles
            .iter()
            .map(|o| ObstacleSnapshotRow {
                obstacle_id:  o.obstacle.0,
                tick:         tick.0,
                x:            o.x,
                y:            o.y,
                current_cell: o.current.0,
                next_cell:    o.next.0,
                phase:        o.phase.as_str(),
            })
            .collect();

        if !robots.is_empty() {
            let result = self.writer.write_robot_snapshots(&robots);
            self.store_err(result);
        }
        if !obstacles.is_empty() {
            let result = self.writer.write_obstacle_snapshots(&obstacles);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
