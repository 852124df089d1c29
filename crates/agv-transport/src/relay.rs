//! Per-robot forwarder between the two engines.
//!
//! The relay never interprets a code.  It holds one outbox per direction and
//! refuses a new code from one side while the outbox toward the other side
//! still has a code waiting, which makes the sender retry.
//!
//! When one of its own sends is nacked the relay gives up on that code and
//! instead tells both sides the robot has stopped: `Halt` toward the
//! physical engine and `RelayStopped` toward the coordination engine.

use tracing::{debug, warn};

use agv_core::{ControlCommand, MovementStatus, NavCode, RobotId};

use crate::{Handshake, Outbox};

#[derive(Clone, Debug)]
pub struct Relay {
    robot:        RobotId,
    to_coord:     Outbox,
    to_phys:      Outbox,
    relayed:      u64,
    stop_pairs:   u64,
}

impl Relay {
    pub fn new(robot: RobotId) -> Self {
        Self {
            robot,
            to_coord:   Outbox::new(),
            to_phys:    Outbox::new(),
            relayed:    0,
            stop_pairs: 0,
        }
    }

    pub fn robot(&self) -> RobotId {
        self.robot
    }

    // ── Uplink (physical → coordination) ─────────────────────────────────

    pub fn can_accept_uplink(&self) -> bool {
        !self.to_coord.has_queued()
    }

    pub fn accept_uplink(&mut self, code: NavCode) {
        debug!(robot = %self.robot, code = %code, "relay uplink");
        self.to_coord.post(code);
        self.relayed += 1;
    }

    pub fn poll_uplink(&mut self) -> Option<NavCode> {
        self.to_coord.poll()
    }

    pub fn uplink_settled(&mut self, outcome: Handshake) {
        self.settle(outcome, Direction::Up);
    }

    // ── Downlink (coordination → physical) ───────────────────────────────

    pub fn can_accept_downlink(&self) -> bool {
        !self.to_phys.has_queued()
    }

    pub fn accept_downlink(&mut self, code: NavCode) {
        debug!(robot = %self.robot, code = %code, "relay downlink");
        self.to_phys.post(code);
        self.relayed += 1;
    }

    pub fn poll_downlink(&mut self) -> Option<NavCode> {
        self.to_phys.poll()
    }

    pub fn downlink_settled(&mut self, outcome: Handshake) {
        self.settle(outcome, Direction::Down);
    }

    // ── Counters ─────────────────────────────────────────────────────────

    /// Codes accepted from either side.
    pub fn relayed(&self) -> u64 {
        self.relayed
    }

    /// Nacks turned into stop pairs.
    pub fn stop_pairs(&self) -> u64 {
        self.stop_pairs
    }

    pub fn is_idle(&self) -> bool {
        !self.to_coord.is_busy() && !self.to_phys.is_busy()
    }

    fn settle(&mut self, outcome: Handshake, dir: Direction) {
        let outbox = match dir {
            Direction::Up => &mut self.to_coord,
            Direction::Down => &mut self.to_phys,
        };
        match outcome {
            Handshake::Nacked(code) => {
                outbox.abandon();
                warn!(robot = %self.robot, code = %code, ?dir, "relay send nacked, stopping robot");
                self.to_phys.post(ControlCommand::Halt);
                self.to_coord.post(MovementStatus::RelayStopped);
                self.stop_pairs += 1;
            }
            other => outbox.settle(other),
        }
    }
}

#[derive(Copy, Clone, Debug)]
enum Direction {
    Up,
    Down,
}
