//! The physical engine: moves every agent once per tick.

use tracing::{debug, info, warn};

use agv_core::{
    CellId, ControlCommand, Kinematics, MovementStatus, NavCode, ObstacleId, RobotId,
    SimConfig, Tick,
};
use agv_layout::{FleetLayout, GridMap, Path};
use agv_transport::{BulkReceiver, Endpoint, Handshake};

use crate::{Body, ObstacleState, PhysStatus, PhysicsError, PhysicsResult, RobotState};

/// Counters for one [`PhysicsEngine::tick`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PhysicsTick {
    /// Control codes applied from the inbound slots.
    pub commands: u32,
    /// Speed tokens applied.
    pub steps:    u32,
    /// Movement status notices posted.
    pub notices:  u32,
}

/// Robots and obstacles on the grid.
///
/// Robots are addressed by `RobotId`, obstacles by `ObstacleId`; both index
/// straight into the record vectors.
pub struct PhysicsEngine {
    kinematics:          Kinematics,
    grid:                GridMap,
    robots:              Vec<RobotState>,
    obstacles:           Vec<ObstacleState>,
    /// Ticks between two speed tokens.
    step_interval_ticks: u64,
}

impl PhysicsEngine {
    /// Place every obstacle at the center of its first cell and every robot
    /// in `AwaitingRoute`.  `bulk` holds one receiver per robot.
    pub fn new(
        layout:     &FleetLayout,
        kinematics: Kinematics,
        config:     &SimConfig,
        bulk:       Vec<BulkReceiver>,
    ) -> PhysicsResult<Self> {
        if bulk.len() != layout.robot_count() {
            return Err(PhysicsError::BulkReceivers {
                expected: layout.robot_count(),
                got:      bulk.len(),
            });
        }

        let mut obstacles = Vec::with_capacity(layout.obstacle_count());
        for (o, path) in layout.obstacle_paths.iter().enumerate() {
            if path.len() < 2 {
                return Err(PhysicsError::ObstaclePath(ObstacleId(o as u32)));
            }
            obstacles.push(ObstacleState::new(path.clone(), &kinematics));
        }

        let robots = bulk
            .into_iter()
            .map(|rx| RobotState::new(rx, &kinematics))
            .collect();

        let step_interval_ticks = config.make_clock().ticks_for_ms(kinematics.speed_step_interval_ms);

        Ok(Self {
            kinematics,
            grid: layout.grid.clone(),
            robots,
            obstacles,
            step_interval_ticks,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn robots(&self) -> &[RobotState] {
        &self.robots
    }

    pub fn robot(&self, robot: RobotId) -> Option<&RobotState> {
        self.robots.get(robot.index())
    }

    #[cfg(test)]
    pub(crate) fn robot_mut(&mut self, robot: RobotId) -> &mut RobotState {
        &mut self.robots[robot.index()]
    }

    pub fn obstacles(&self) -> &[ObstacleState] {
        &self.obstacles
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    /// Cells currently held by obstacles.
    pub fn obstacle_cells(&self) -> Vec<CellId> {
        self.obstacles.iter().map(|o| o.body.current).collect()
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    pub fn tick(&mut self, now: Tick) -> PhysicsTick {
        let mut stats = PhysicsTick::default();

        // ── Phase 1: inbound control codes ────────────────────────────────
        for r in 0..self.robots.len() {
            if let Some(code) = self.robots[r].inbound.take() {
                self.apply_command(RobotId(r as u32), code);
                stats.commands += 1;
            }
        }

        // ── Phase 2: obstacles ────────────────────────────────────────────
        let occupied = self.obstacle_cells();
        self.advance_obstacles();

        // ── Phase 3: speed tokens ─────────────────────────────────────────
        if now.0.is_multiple_of(self.step_interval_ticks) {
            let k = &self.kinematics;
            for robot in &mut self.robots {
                if let Some(token) = robot.tokens.pop() {
                    robot.body.speed = (robot.body.speed + token.delta(k)).max(0);
                    stats.steps += 1;
                }
            }
        }

        // ── Phase 4: robots ───────────────────────────────────────────────
        for r in 0..self.robots.len() {
            if self.update_robot(RobotId(r as u32), &occupied) {
                stats.notices += 1;
            }
        }

        stats
    }

    fn advance_obstacles(&mut self) {
        let grid = &self.grid;
        let k = &self.kinematics;

        #[cfg(not(feature = "parallel"))]
        {
            for obstacle in &mut self.obstacles {
                obstacle.advance(grid, k);
            }
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            self.obstacles
                .par_iter_mut()
                .for_each(|obstacle| obstacle.advance(grid, k));
        }
    }

    fn apply_command(&mut self, id: RobotId, code: NavCode) {
        let center = self.kinematics.center();
        let robot = &mut self.robots[id.index()];
        let command = match ControlCommand::try_from(code) {
            Ok(c) => c,
            Err(e) => {
                warn!(robot = %id, error = %e, "ignoring inbound code");
                return;
            }
        };
        debug!(robot = %id, code = %code, status = %robot.status, "apply command");

        match command {
            ControlCommand::ClearToCross => robot.set_status(PhysStatus::Crossing),
            ControlCommand::Activate => robot.set_status(PhysStatus::Resume),
            ControlCommand::Halt | ControlCommand::Hold => robot.halt(),
            ControlCommand::Resume => {
                robot.status = robot.prev_status;
                robot.crossing_reported = false;
            }
            ControlCommand::SpeedProfile => {
                let frame = robot.bulk.drain_frame();
                robot.tokens.extend(frame.steps());
            }
            ControlCommand::Route => {
                let frame = robot.bulk.drain_frame();
                let route: Path = frame.cells().collect();
                if route.len() < 2 || !frame.terminated {
                    warn!(robot = %id, cells = route.len(), "ignoring incomplete route frame");
                    return;
                }
                info!(robot = %id, cells = route.len(), first = %route.first(), "route received");
                robot.body = Body {
                    x:       center,
                    y:       center,
                    current: route.first(),
                    next:    route.second(),
                    speed:   0,
                };
                robot.route = route;
                robot.tokens.clear();
                robot.cell_advanced = false;
                robot.crossing_reported = false;
                robot.status = PhysStatus::Resume;
                robot.prev_status = PhysStatus::Stopped;
            }
        }
    }

    /// Move one robot and apply the status table.  Returns `true` if a
    /// notice was posted.
    fn update_robot(&mut self, id: RobotId, occupied: &[CellId]) -> bool {
        let k = &self.kinematics;
        let robot = &mut self.robots[id.index()];
        if robot.status == PhysStatus::AwaitingRoute {
            return false;
        }

        let blocked = occupied
            .iter()
            .any(|&c| c == robot.body.current || c == robot.body.next);
        let moved = robot.try_move(blocked, &self.grid, k).moved();

        let notice = match (robot.status, moved) {
            (PhysStatus::Resume, true) => {
                if robot.body.near_edge(k) && !robot.crossing_reported {
                    robot.crossing_reported = true;
                    Some(MovementStatus::CrossingBegin)
                } else {
                    None
                }
            }
            (PhysStatus::Crossing, true) => {
                if robot.cell_advanced {
                    robot.cell_advanced = false;
                    robot.set_status(PhysStatus::Crossed);
                    Some(MovementStatus::Crossed)
                } else {
                    None
                }
            }
            (PhysStatus::Crossed, true) => {
                if robot.body.near_center(k) {
                    robot.set_status(PhysStatus::Resume);
                }
                None
            }
            (PhysStatus::Resume | PhysStatus::Crossing | PhysStatus::Crossed, false) => {
                robot.halt();
                Some(MovementStatus::Stopped)
            }
            (PhysStatus::Stopped, true) => Some(MovementStatus::RestartRequest),
            (PhysStatus::Stopped, false) => {
                robot.tokens.clear();
                None
            }
            (PhysStatus::AwaitingRoute, _) => None,
        };

        match notice {
            Some(status) => {
                debug!(robot = %id, notice = %NavCode::from(status), cell = %robot.body.current, "post");
                robot.post(status);
                true
            }
            None => false,
        }
    }
}

// ── Endpoint ──────────────────────────────────────────────────────────────────

impl Endpoint for PhysicsEngine {
    fn poll_outbound(&mut self, robot: RobotId) -> Option<NavCode> {
        self.robots.get_mut(robot.index())?.outbox.poll()
    }

    fn outbound_settled(&mut self, robot: RobotId, outcome: Handshake) {
        if let Some(r) = self.robots.get_mut(robot.index()) {
            if let Handshake::Nacked(code) = outcome {
                warn!(robot = %robot, code = %code, "movement status nacked, retrying");
            }
            r.outbox.settle(outcome);
        }
    }

    fn accept_inbound(&mut self, robot: RobotId, code: NavCode) -> bool {
        match self.robots.get_mut(robot.index()) {
            Some(r) if r.inbound.is_none() => {
                r.inbound = Some(code);
                true
            }
            _ => false,
        }
    }
}
