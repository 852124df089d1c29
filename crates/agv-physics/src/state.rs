//! Per-agent records owned by the physical engine.

use agv_core::{Kinematics, MovementStatus, NavCode, TokenStream};
use agv_layout::{GridMap, Path};
use agv_transport::{BulkReceiver, Outbox};

use crate::{step, walk_to_center, Body, Move};

// ── Robots ────────────────────────────────────────────────────────────────────

/// Navigation status of a robot as the physical engine sees it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PhysStatus {
    Resume,
    Crossing,
    Crossed,
    Stopped,
    /// No route received yet.
    AwaitingRoute,
}

impl PhysStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PhysStatus::Resume        => "resume",
            PhysStatus::Crossing      => "crossing",
            PhysStatus::Crossed       => "crossed",
            PhysStatus::Stopped       => "stopped",
            PhysStatus::AwaitingRoute => "awaiting_route",
        }
    }
}

impl std::fmt::Display for PhysStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug)]
pub struct RobotState {
    pub status:            PhysStatus,
    pub prev_status:       PhysStatus,
    pub body:              Body,
    pub route:             Path,
    /// Speed tokens not yet applied.
    pub tokens:            TokenStream,
    /// Set when the cursor advances; consumed by Crossing → Crossed.
    pub cell_advanced:     bool,
    /// A crossing request was posted since the last status change.
    pub crossing_reported: bool,
    pub(crate) inbound:    Option<NavCode>,
    pub(crate) outbox:     Outbox,
    pub(crate) bulk:       BulkReceiver,
}

impl RobotState {
    pub fn new(bulk: BulkReceiver, k: &Kinematics) -> Self {
        Self {
            status:            PhysStatus::AwaitingRoute,
            prev_status:       PhysStatus::Stopped,
            body:              Body::centered(Default::default(), Default::default(), 0, k),
            route:             Path::default(),
            tokens:            TokenStream::new(),
            cell_advanced:     false,
            crossing_reported: false,
            inbound:           None,
            outbox:            Outbox::new(),
            bulk,
        }
    }

    /// Change status, remembering the old one.
    pub(crate) fn set_status(&mut self, status: PhysStatus) {
        self.prev_status = self.status;
        self.status = status;
        self.crossing_reported = false;
    }

    /// Stop in place and forget any pending speed changes.
    pub(crate) fn halt(&mut self) {
        if self.status != PhysStatus::Stopped {
            self.prev_status = self.status;
        }
        self.status = PhysStatus::Stopped;
        self.crossing_reported = false;
        self.body.speed = 0;
        self.tokens.clear();
    }

    pub(crate) fn post(&mut self, status: MovementStatus) {
        self.outbox.post(status);
    }

    /// The code currently waiting to go out, if any.
    pub fn outbound(&self) -> Option<NavCode> {
        self.outbox.queued().or(self.outbox.in_flight())
    }

    /// Attempt this tick's move.  `blocked` is true when an obstacle holds
    /// the current or next cell.
    pub(crate) fn try_move(&mut self, blocked: bool, grid: &GridMap, k: &Kinematics) -> Move {
        if blocked {
            return Move::Refused;
        }
        if self.status == PhysStatus::Crossed {
            walk_to_center(&mut self.body, k, k.center_tolerance, k.center_tolerance);
            if !self.body.next.is_valid() && self.body.near_center(k) {
                return Move::Refused;
            }
            return Move::Moved { advanced: false };
        }
        let crossing = self.status == PhysStatus::Crossing;
        let mv = step(&mut self.body, &self.route, grid, k, crossing);
        if crossing && mv.advanced() {
            self.cell_advanced = true;
        }
        mv
    }
}

// ── Obstacles ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObstaclePhase {
    /// Travelling toward the next cell.
    Resume,
    /// Just entered a cell, heading for its center.
    Crossed,
}

impl ObstaclePhase {
    pub fn as_str(self) -> &'static str {
        match self {
            ObstaclePhase::Resume  => "resume",
            ObstaclePhase::Crossed => "crossed",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ObstacleState {
    pub phase: ObstaclePhase,
    pub body:  Body,
    pub path:  Path,
}

impl ObstacleState {
    pub fn new(path: Path, k: &Kinematics) -> Self {
        Self {
            phase: ObstaclePhase::Resume,
            body:  Body::centered(path.first(), path.second(), k.obstacle_speed, k),
            path,
        }
    }

    /// Advance one tick along the loop.
    pub fn advance(&mut self, grid: &GridMap, k: &Kinematics) {
        match self.phase {
            ObstaclePhase::Resume => {
                if step(&mut self.body, &self.path, grid, k, true).advanced() {
                    self.phase = ObstaclePhase::Crossed;
                }
            }
            ObstaclePhase::Crossed => {
                let stride = self.body.speed;
                walk_to_center(&mut self.body, k, stride, 0);
                let c = k.center();
                if self.body.x == c && self.body.y == c {
                    self.phase = ObstaclePhase::Resume;
                }
            }
        }
    }
}
