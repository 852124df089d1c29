//! The complete static input of a run.

use std::collections::HashSet;

use agv_core::{CellId, ObstacleId, RobotId, Tick};

use crate::{GridMap, LayoutError, LayoutResult, Path};

// ── Intersections ─────────────────────────────────────────────────────────────

/// One robot's seeded place in an intersection queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SeedEntry {
    pub robot:         RobotId,
    /// Cells from the robot's previous crossing (or route start).
    pub distance:      u32,
    /// Unobstructed travel estimate, in scheduler time units.
    pub expected_time: u32,
}

/// A contested cell and its admission order (head first).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntersectionSeed {
    pub cell:    CellId,
    pub entries: Vec<SeedEntry>,
}

impl IntersectionSeed {
    pub fn contains(&self, robot: RobotId) -> bool {
        self.entries.iter().any(|e| e.robot == robot)
    }
}

/// "Stream robot `robot`'s route at tick `tick`."
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Handoff {
    pub tick:  Tick,
    pub robot: RobotId,
}

// ── FleetLayout ───────────────────────────────────────────────────────────────

/// Grid, routes, obstacle loops, intersection seeds and handoff schedule.
///
/// Robots and obstacles are identified by their index in `robot_routes` and
/// `obstacle_paths`.  `robot_crossings[r]` lists, in route order, the
/// intersection cells robot `r` must be admitted into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FleetLayout {
    pub grid:            GridMap,
    pub robot_routes:    Vec<Path>,
    pub obstacle_paths:  Vec<Path>,
    pub intersections:   Vec<IntersectionSeed>,
    pub robot_crossings: Vec<Vec<CellId>>,
    pub handoffs:        Vec<Handoff>,
}

impl FleetLayout {
    pub fn robot_count(&self) -> usize {
        self.robot_routes.len()
    }

    pub fn obstacle_count(&self) -> usize {
        self.obstacle_paths.len()
    }

    pub fn route(&self, robot: RobotId) -> Option<&Path> {
        self.robot_routes.get(robot.index())
    }

    pub fn intersection_at(&self, cell: CellId) -> Option<&IntersectionSeed> {
        self.intersections.iter().find(|s| s.cell == cell)
    }

    /// Fill `robot_crossings` from the routes: every intersection cell a
    /// robot is queued at, in the order its route reaches them.
    pub fn derive_crossings(&mut self) {
        self.robot_crossings = (0..self.robot_count())
            .map(|r| {
                let robot = RobotId(r as u32);
                let mut seen = HashSet::new();
                self.robot_routes[r]
                    .iter()
                    .filter(|&cell| {
                        self.intersection_at(cell).is_some_and(|s| s.contains(robot))
                    })
                    .filter(|&cell| seen.insert(cell))
                    .collect()
            })
            .collect();
    }

    /// Check the layout is internally consistent.
    ///
    /// `bulk_capacity` is the side-channel depth; a route plus its
    /// terminator must fit in one frame.
    pub fn validate(&self, bulk_capacity: usize) -> LayoutResult<()> {
        for (r, route) in self.robot_routes.iter().enumerate() {
            let owner = format!("robot {} route", RobotId(r as u32));
            self.check_path(&owner, route)?;
            if route.len() + 1 > bulk_capacity {
                return Err(LayoutError::PathTooLong {
                    owner,
                    len: route.len(),
                    capacity: bulk_capacity,
                });
            }
        }

        for (o, path) in self.obstacle_paths.iter().enumerate() {
            let id = ObstacleId(o as u32);
            self.check_path(&format!("obstacle {id} path"), path)?;
            if !path.is_cyclic() {
                return Err(LayoutError::NotCyclic(id));
            }
        }

        let mut cells = HashSet::new();
        for seed in &self.intersections {
            if !self.grid.contains(seed.cell) {
                return Err(LayoutError::UnknownCell {
                    owner: "intersection".into(),
                    cell:  seed.cell,
                });
            }
            if !cells.insert(seed.cell) {
                return Err(LayoutError::Intersection {
                    cell:   seed.cell,
                    reason: "declared twice".into(),
                });
            }
            let mut robots = HashSet::new();
            for entry in &seed.entries {
                let route = self
                    .route(entry.robot)
                    .ok_or(LayoutError::UnknownRobot(entry.robot))?;
                if !route.contains(seed.cell) {
                    return Err(LayoutError::QueueMembership { cell: seed.cell, robot: entry.robot });
                }
                if !robots.insert(entry.robot) {
                    return Err(LayoutError::Intersection {
                        cell:   seed.cell,
                        reason: format!("robot {} queued twice", entry.robot),
                    });
                }
                if entry.distance == 0 || entry.expected_time == 0 {
                    return Err(LayoutError::Intersection {
                        cell:   seed.cell,
                        reason: format!("robot {} has a zero estimate", entry.robot),
                    });
                }
            }
        }

        if self.robot_crossings.len() != self.robot_count() {
            return Err(LayoutError::Parse(format!(
                "{} crossing lists for {} robots",
                self.robot_crossings.len(),
                self.robot_count()
            )));
        }
        for (r, crossings) in self.robot_crossings.iter().enumerate() {
            let robot = RobotId(r as u32);
            let route = &self.robot_routes[r];
            let mut last = None;
            for &cell in crossings {
                let queued = self.intersection_at(cell).is_some_and(|s| s.contains(robot));
                if !queued {
                    return Err(LayoutError::QueueMembership { cell, robot });
                }
                let at = route.position(cell);
                if at.is_none() || at <= last {
                    return Err(LayoutError::CrossingOrder { robot, cell });
                }
                last = at;
            }
        }

        let mut handed = HashSet::new();
        for handoff in &self.handoffs {
            if handoff.robot.index() >= self.robot_count() {
                return Err(LayoutError::UnknownRobot(handoff.robot));
            }
            if !handed.insert(handoff.robot) {
                return Err(LayoutError::DuplicateHandoff(handoff.robot));
            }
        }

        Ok(())
    }

    fn check_path(&self, owner: &str, path: &Path) -> LayoutResult<()> {
        if path.len() < 2 {
            return Err(LayoutError::PathTooShort { owner: owner.to_owned() });
        }
        if let Some(cell) = path.iter().find(|&c| !self.grid.contains(c)) {
            return Err(LayoutError::UnknownCell { owner: owner.to_owned(), cell });
        }
        for pair in path.cells().windows(2) {
            if !self.grid.adjacent(pair[0], pair[1]) {
                return Err(LayoutError::NotAdjacent {
                    owner: owner.to_owned(),
                    from:  pair[0],
                    to:    pair[1],
                });
            }
        }
        Ok(())
    }
}
