//! Read-only views of the fleet handed to observers.

use agv_coord::{CoordEngine, CoordStatus};
use agv_core::{CellId, ObstacleId, RobotId, Tick};
use agv_physics::{ObstaclePhase, PhysStatus, PhysicsEngine};

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RobotView {
    pub robot:        RobotId,
    pub x:            i64,
    pub y:            i64,
    /// Physical speed, in position units per tick.
    pub speed:        i64,
    pub current:      CellId,
    pub next:         CellId,
    pub phys_status:  PhysStatus,
    pub coord_status: CoordStatus,
    /// Speed last assigned by the coordination engine.
    pub coord_speed:  i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObstacleView {
    pub obstacle: ObstacleId,
    pub x:        i64,
    pub y:        i64,
    pub current:  CellId,
    pub next:     CellId,
    pub phase:    ObstaclePhase,
}

/// One intersection's admission state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QueueView {
    pub cell: CellId,
    pub head: Option<RobotId>,
    pub len:  usize,
}

/// Every agent's state at the end of a tick.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FleetSnapshot {
    pub tick:      Tick,
    pub robots:    Vec<RobotView>,
    pub obstacles: Vec<ObstacleView>,
    pub queues:    Vec<QueueView>,
}

impl FleetSnapshot {
    pub fn capture(tick: Tick, physics: &PhysicsEngine, coord: &CoordEngine) -> Self {
        let robots = physics
            .robots()
            .iter()
            .zip(coord.robots())
            .map(|(p, c)| RobotView {
                robot:        c.id,
                x:            p.body.x,
                y:            p.body.y,
                speed:        p.body.speed,
                current:      p.body.current,
                next:         p.body.next,
                phys_status:  p.status,
                coord_status: c.status,
                coord_speed:  c.speed,
            })
            .collect();

        let obstacles = physics
            .obstacles()
            .iter()
            .enumerate()
            .map(|(o, ob)| ObstacleView {
                obstacle: ObstacleId(o as u32),
                x:        ob.body.x,
                y:        ob.body.y,
                current:  ob.body.current,
                next:     ob.body.next,
                phase:    ob.phase,
            })
            .collect();

        let queues = coord
            .admission()
            .queues()
            .iter()
            .map(|q| QueueView { cell: q.cell(), head: q.head(), len: q.len() })
            .collect();

        Self { tick, robots, obstacles, queues }
    }

    pub fn robot(&self, robot: RobotId) -> Option<&RobotView> {
        self.robots.get(robot.index())
    }

    /// Head of the queue at `cell`, if `cell` is an intersection.
    pub fn queue_head(&self, cell: CellId) -> Option<RobotId> {
        self.queues.iter().find(|q| q.cell == cell).and_then(|q| q.head)
    }

    pub fn is_intersection(&self, cell: CellId) -> bool {
        self.queues.iter().any(|q| q.cell == cell)
    }

    /// Robots whose coordination record has reached the end of its route.
    pub fn finished(&self) -> usize {
        self.robots
            .iter()
            .filter(|r| r.coord_status == CoordStatus::Finished)
            .count()
    }
}
