//! Per-robot records owned by the coordination engine.

use agv_core::{CellId, ControlCommand, NavCode, RobotId};
use agv_layout::Path;
use agv_transport::{BulkSender, Outbox};

/// Where a robot stands from the coordination engine's point of view.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CoordStatus {
    /// Route not handed off yet.
    Dormant,
    /// Route sent, waiting for permission to activate.
    Starting,
    /// Activated, not yet moving at a scheduled speed.
    Standby,
    Moving,
    /// Just entered a new cell.
    Crossed,
    /// Denied entry by the engine.
    Blocked,
    /// Stopped on its own (obstacle, edge or relay failure).
    Held,
    /// Route exhausted.
    Finished,
}

impl CoordStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CoordStatus::Dormant  => "dormant",
            CoordStatus::Starting => "starting",
            CoordStatus::Standby  => "standby",
            CoordStatus::Moving   => "moving",
            CoordStatus::Crossed  => "crossed",
            CoordStatus::Blocked  => "blocked",
            CoordStatus::Held     => "held",
            CoordStatus::Finished => "finished",
        }
    }

    /// Whether the robot's current cell counts as occupied.
    #[inline]
    pub fn occupies_cell(self) -> bool {
        !matches!(self, CoordStatus::Dormant | CoordStatus::Starting | CoordStatus::Finished)
    }

    /// Whether the robot's estimate adds to an intersection's cumulative time.
    #[inline]
    pub fn is_scheduled(self) -> bool {
        !matches!(
            self,
            CoordStatus::Dormant | CoordStatus::Starting | CoordStatus::Held | CoordStatus::Finished
        )
    }

    /// Whether a speed profile may be streamed to the robot.
    #[inline]
    pub fn accepts_profile(self) -> bool {
        matches!(self, CoordStatus::Moving | CoordStatus::Crossed | CoordStatus::Standby)
    }
}

impl std::fmt::Display for CoordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the engine tracks about one robot.
#[derive(Debug)]
pub struct RobotRecord {
    pub id:        RobotId,
    pub status:    CoordStatus,
    pub route:     Path,
    pub current:   CellId,
    pub next:      CellId,
    /// Last speed the engine assigned.
    pub speed:     i64,
    /// Intersection cells in route order.
    pub crossings: Vec<CellId>,
    /// Index into `crossings` of the next one to pass.
    pub cursor:    usize,
    pub(crate) inbound: Option<NavCode>,
    pub(crate) outbox:  Outbox,
    pub(crate) bulk:    BulkSender,
}

impl RobotRecord {
    pub fn new(id: RobotId, route: Path, crossings: Vec<CellId>, bulk: BulkSender) -> Self {
        Self {
            id,
            status:    CoordStatus::Dormant,
            route,
            current:   CellId::INVALID,
            next:      CellId::INVALID,
            speed:     0,
            crossings,
            cursor:    0,
            inbound:   None,
            outbox:    Outbox::new(),
            bulk,
        }
    }

    /// The intersection cell this robot must be admitted into next, or
    /// `CellId::INVALID` once it has passed them all.
    pub fn pending_crossing(&self) -> CellId {
        self.crossings
            .get(self.cursor)
            .copied()
            .unwrap_or(CellId::INVALID)
    }

    /// Nothing queued or in flight, and no unhandled report.
    #[inline]
    pub fn port_idle(&self) -> bool {
        !self.outbox.is_busy() && self.inbound.is_none()
    }

    /// The code currently waiting to go out, if any.
    pub fn outbound(&self) -> Option<NavCode> {
        self.outbox.queued().or(self.outbox.in_flight())
    }

    pub(crate) fn post(&mut self, command: ControlCommand) {
        if matches!(command, ControlCommand::Halt | ControlCommand::Hold) {
            self.speed = 0;
        }
        self.outbox.post(command);
    }
}
