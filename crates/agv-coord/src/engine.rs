//! The coordination engine: answers reports, supervises robots and hands
//! out routes.

use tracing::{debug, info, warn};

use agv_core::{
    CellId, ControlCommand, Kinematics, MovementStatus, NavCode, RobotId, Tick,
};
use agv_layout::{FleetLayout, Handoff};
use agv_transport::{BulkSender, Endpoint, Handshake};

use crate::{
    restore_cruise, schedule, Admission, CoordError, CoordResult, CoordStatus, RobotRecord,
};

/// Counters for one [`CoordEngine::tick`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CoordTick {
    /// Movement reports handled.
    pub reports:  u32,
    /// Speed profiles streamed.
    pub profiles: u32,
    /// Routes handed off.
    pub handoffs: u32,
}

pub struct CoordEngine {
    kinematics:   Kinematics,
    robots:       Vec<RobotRecord>,
    admission:    Admission,
    /// Sorted by tick.
    handoffs:     Vec<Handoff>,
    next_handoff: usize,
}

impl CoordEngine {
    /// One record per route, all `Dormant`.  `bulk` holds one sender per
    /// robot.
    pub fn new(
        layout:     &FleetLayout,
        kinematics: Kinematics,
        bulk:       Vec<BulkSender>,
    ) -> CoordResult<Self> {
        if bulk.len() != layout.robot_count() {
            return Err(CoordError::BulkSenders {
                expected: layout.robot_count(),
                got:      bulk.len(),
            });
        }
        if let Some(h) = layout.handoffs.iter().find(|h| h.robot.index() >= layout.robot_count()) {
            return Err(CoordError::UnknownRobot(h.robot));
        }

        let robots = layout
            .robot_routes
            .iter()
            .zip(bulk)
            .enumerate()
            .map(|(r, (route, tx))| {
                let crossings = layout.robot_crossings.get(r).cloned().unwrap_or_default();
                RobotRecord::new(RobotId(r as u32), route.clone(), crossings, tx)
            })
            .collect();

        let mut handoffs = layout.handoffs.clone();
        handoffs.sort_by_key(|h| (h.tick, h.robot));

        Ok(Self {
            kinematics,
            robots,
            admission: Admission::from_seeds(&layout.intersections),
            handoffs,
            next_handoff: 0,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn robots(&self) -> &[RobotRecord] {
        &self.robots
    }

    pub fn robot(&self, robot: RobotId) -> Option<&RobotRecord> {
        self.robots.get(robot.index())
    }

    pub fn admission(&self) -> &Admission {
        &self.admission
    }

    /// Robot currently allowed into the intersection at `cell`.
    pub fn queue_head(&self, cell: CellId) -> Option<RobotId> {
        self.admission.head_at(cell)
    }

    pub fn kinematics(&self) -> &Kinematics {
        &self.kinematics
    }

    /// `true` once every robot has finished its route.
    pub fn all_finished(&self) -> bool {
        self.robots.iter().all(|r| r.status == CoordStatus::Finished)
    }

    /// May `robot` move into its next cell?
    ///
    /// No if another active robot occupies that cell, or if the cell is the
    /// robot's pending intersection and someone else heads its queue.
    pub fn may_enter(&self, robot: RobotId) -> bool {
        let Some(rec) = self.robot(robot) else {
            return false;
        };
        let occupied = self
            .robots
            .iter()
            .any(|o| o.id != robot && o.status.occupies_cell() && o.current == rec.next);
        if occupied {
            return false;
        }
        let pending = rec.pending_crossing();
        if pending.is_valid() && rec.next == pending {
            return self.admission.head_at(pending) == Some(robot);
        }
        true
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    pub fn tick(&mut self, now: Tick) -> CoordResult<CoordTick> {
        let mut stats = CoordTick::default();

        // ── Reports ───────────────────────────────────────────────────────
        for r in 0..self.robots.len() {
            let id = RobotId(r as u32);
            let Some(code) = self.robots[r].inbound.take() else {
                continue;
            };
            stats.reports += 1;
            match MovementStatus::try_from(code) {
                Ok(status) => stats.profiles += self.handle_report(id, status)?,
                Err(e) => warn!(robot = %id, error = %e, "ignoring report"),
            }
        }

        // ── Supervision ───────────────────────────────────────────────────
        for r in 0..self.robots.len() {
            stats.profiles += self.supervise(RobotId(r as u32))?;
        }

        // ── Route handoffs ────────────────────────────────────────────────
        while let Some(&h) = self.handoffs.get(self.next_handoff) {
            if h.tick > now {
                break;
            }
            self.next_handoff += 1;
            self.hand_off(h.robot)?;
            stats.handoffs += 1;
        }

        Ok(stats)
    }

    fn handle_report(&mut self, id: RobotId, report: MovementStatus) -> CoordResult<u32> {
        let status = self.robots[id.index()].status;
        if matches!(status, CoordStatus::Dormant | CoordStatus::Finished) {
            debug!(robot = %id, %status, report = %NavCode::from(report), "report ignored");
            return Ok(0);
        }
        debug!(robot = %id, %status, report = %NavCode::from(report), "report");

        match report {
            MovementStatus::Stopped | MovementStatus::RelayStopped => {
                self.stop(id, CoordStatus::Held)
            }
            MovementStatus::RestartRequest => {
                if self.may_enter(id) {
                    let rec = &mut self.robots[id.index()];
                    rec.status = CoordStatus::Moving;
                    rec.post(ControlCommand::Resume);
                    Ok(0)
                } else {
                    let sent = self.stop(id, CoordStatus::Blocked)?;
                    self.robots[id.index()].post(ControlCommand::Hold);
                    Ok(sent)
                }
            }
            MovementStatus::CrossingBegin => {
                let permitted = self.may_enter(id);
                let rec = &mut self.robots[id.index()];
                if permitted {
                    rec.status = CoordStatus::Moving;
                    rec.post(ControlCommand::ClearToCross);
                } else {
                    rec.status = CoordStatus::Blocked;
                    rec.post(ControlCommand::Halt);
                }
                Ok(0)
            }
            MovementStatus::Crossed => self.crossed(id),
        }
    }

    /// Record a stop and re-plan the robot's pending intersection around it.
    /// Every report grows the estimate by one unit, repeats included.
    fn stop(&mut self, id: RobotId, status: CoordStatus) -> CoordResult<u32> {
        let rec = &mut self.robots[id.index()];
        let pending = rec.pending_crossing();
        if let Some(queue) = self.admission.queue_at_mut(pending) {
            queue.bump(id);
        }
        rec.status = status;
        rec.speed = 0;

        match self.admission.queue_at(pending) {
            Some(queue) => schedule(&mut self.robots, queue, &self.kinematics, Some(id)),
            None => Ok(0),
        }
    }

    fn crossed(&mut self, id: RobotId) -> CoordResult<u32> {
        let rec = &mut self.robots[id.index()];
        rec.status = CoordStatus::Crossed;
        rec.current = rec.next;
        rec.next = rec.route.after(rec.next);

        let pending = rec.pending_crossing();
        if let Some(queue) = self.admission.queue_at_mut(pending) {
            queue.step_down(id);
        }

        if !rec.next.is_valid() {
            rec.status = CoordStatus::Finished;
            rec.post(ControlCommand::Halt);
            info!(robot = %id, cell = %rec.current, "route complete");
        }

        if !pending.is_valid() || rec.current != pending {
            return Ok(0);
        }
        rec.cursor += 1;
        debug!(robot = %id, cell = %pending, "left admission queue");
        match self.admission.queue_at_mut(pending) {
            Some(queue) => {
                queue.remove(id);
            }
            None => return Ok(0),
        }
        match self.admission.queue_at(pending) {
            Some(queue) => schedule(&mut self.robots, queue, &self.kinematics, None),
            None => Ok(0),
        }
    }

    /// Per-tick check of a robot whose port is idle.
    fn supervise(&mut self, id: RobotId) -> CoordResult<u32> {
        if !self.robots[id.index()].port_idle() {
            return Ok(0);
        }
        let permitted = self.may_enter(id);
        let rec = &mut self.robots[id.index()];
        let status = rec.status;

        match status {
            CoordStatus::Moving | CoordStatus::Crossed => {
                if !permitted {
                    rec.status = CoordStatus::Blocked;
                    rec.post(ControlCommand::Hold);
                } else if rec.speed == 0 {
                    return self.replan(id);
                }
            }
            CoordStatus::Blocked | CoordStatus::Standby => {
                if !permitted {
                    rec.speed = 0;
                } else if rec.speed == 0 {
                    return self.replan(id);
                } else {
                    rec.status = CoordStatus::Moving;
                    rec.post(ControlCommand::Resume);
                }
            }
            CoordStatus::Starting => {
                if permitted {
                    rec.status = CoordStatus::Standby;
                    rec.post(ControlCommand::Activate);
                }
            }
            CoordStatus::Dormant | CoordStatus::Held | CoordStatus::Finished => {}
        }
        Ok(0)
    }

    /// Schedule the robot's pending intersection, or return it to cruise
    /// speed when none is left.
    fn replan(&mut self, id: RobotId) -> CoordResult<u32> {
        let pending = self.robots[id.index()].pending_crossing();
        match self.admission.queue_at(pending) {
            Some(queue) => schedule(&mut self.robots, queue, &self.kinematics, None),
            None => {
                let sent = restore_cruise(&mut self.robots[id.index()], &self.kinematics)?;
                Ok(u32::from(sent))
            }
        }
    }

    fn hand_off(&mut self, id: RobotId) -> CoordResult<()> {
        let rec = self
            .robots
            .get_mut(id.index())
            .ok_or(CoordError::UnknownRobot(id))?;
        rec.bulk.send_cells(rec.route.iter())?;
        rec.current = rec.route.first();
        rec.next = rec.route.second();
        rec.status = CoordStatus::Starting;
        rec.post(ControlCommand::Route);
        info!(robot = %id, cells = rec.route.len(), start = %rec.current, "route handed off");
        Ok(())
    }
}

// ── Endpoint ──────────────────────────────────────────────────────────────────

impl Endpoint for CoordEngine {
    fn poll_outbound(&mut self, robot: RobotId) -> Option<NavCode> {
        self.robots.get_mut(robot.index())?.outbox.poll()
    }

    fn outbound_settled(&mut self, robot: RobotId, outcome: Handshake) {
        if let Some(r) = self.robots.get_mut(robot.index()) {
            if let Handshake::Nacked(code) = outcome {
                warn!(robot = %robot, code = %code, "control code nacked, retrying");
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
