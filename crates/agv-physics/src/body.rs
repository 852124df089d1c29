//! Position and heading of a single agent.

use agv_core::{CellId, Kinematics};
use agv_layout::GridMap;

/// An agent's place on the grid.
///
/// `x` and `y` are offsets inside `current`, kept in `[0, cell_width)`.
/// `next == CellId::INVALID` once the path is exhausted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Body {
    pub x:       i64,
    pub y:       i64,
    pub current: CellId,
    pub next:    CellId,
    /// Position units per tick.
    pub speed:   i64,
}

impl Body {
    /// A body resting at the center of `current`.
    pub fn centered(current: CellId, next: CellId, speed: i64, k: &Kinematics) -> Self {
        Self {
            x: k.center(),
            y: k.center(),
            current,
            next,
            speed,
        }
    }

    #[inline]
    pub fn near_edge(&self, k: &Kinematics) -> bool {
        k.near_edge(self.x) || k.near_edge(self.y)
    }

    #[inline]
    pub fn near_center(&self, k: &Kinematics) -> bool {
        k.near_center(self.x, self.y)
    }

    /// `true` if both offsets lie inside the cell.
    #[inline]
    pub fn in_bounds(&self, k: &Kinematics) -> bool {
        (0..k.cell_width).contains(&self.x) && (0..k.cell_width).contains(&self.y)
    }
}

/// Direction of travel from `current` toward `next`.
///
/// `y` grows down the map rows, so `South` is `+y`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Heading {
    West,
    East,
    North,
    South,
}

impl Heading {
    /// Compare grid coordinates, `x` first.  `None` if either cell is
    /// unknown (including the sentinel) or both share a slot.
    pub fn between(grid: &GridMap, from: CellId, to: CellId) -> Option<Heading> {
        let a = grid.coord(from)?;
        let b = grid.coord(to)?;
        if b.x < a.x {
            Some(Heading::West)
        } else if b.x > a.x {
            Some(Heading::East)
        } else if b.y < a.y {
            Some(Heading::North)
        } else if b.y > a.y {
            Some(Heading::South)
        } else {
            None
        }
    }
}
