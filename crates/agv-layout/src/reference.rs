//! The reference warehouse: a 10 × 9 map, four robots, six obstacle loops
//! and six contested cells.

use agv_core::{CellId, RobotId, Tick};

use crate::{FleetLayout, GridMap, Handoff, IntersectionSeed, LayoutResult, Path, SeedEntry};

const W: i64 = -1;

#[rustfmt::skip]
const MAP: [[i64; 10]; 9] = [
    [ 1,  2,  3,  4,  5,  6,  7,  8,  9, 10],
    [11,  W,  W,  W,  W,  W,  W,  W,  W, 12],
    [13, 14, 15, 16, 17, 18, 19, 20, 21, 22],
    [23,  W,  W,  W,  W, 24,  W,  W,  W, 25],
    [26, 27, 28, 29, 30, 31, 32, 33, 34, 35],
    [36,  W,  W,  W,  W,  W, 37,  W,  W, 38],
    [39, 40, 41, 42, 43, 44, 45, 46, 47, 48],
    [49,  W,  W,  W,  W,  W,  W,  W,  W, 50],
    [51, 52, 53, 54, 55, 56, 57, 58, 59, 60],
];

const ROBOT_ROUTES: [&[u32]; 4] = [
    &[1, 11, 13, 14, 15, 16, 17, 18, 24, 31, 30, 29, 28, 27, 26, 36, 39, 49, 51, 52, 53],
    &[10, 12, 22, 21, 20, 19, 18, 24, 31, 32, 33, 34, 35, 25],
    &[51, 49, 39, 36, 26, 27, 28, 29, 30, 31, 32, 37, 45, 46, 47, 48, 38],
    &[60, 50, 48, 47, 46, 45, 44, 43, 42, 41, 40, 39, 36, 26, 23],
];

const OBSTACLE_PATHS: [&[u32]; 6] = [
    &[6, 5, 4, 3, 2, 1, 11, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 12, 10, 9, 8, 7, 6],
    &[18, 17, 16, 15, 14, 13, 23, 26, 27, 28, 29, 30, 31, 24, 18],
    &[22, 21, 20, 19, 18, 24, 31, 32, 33, 34, 35, 25, 22],
    &[32, 31, 30, 29, 28, 27, 26, 36, 39, 40, 41, 42, 43, 44, 45, 37, 32],
    &[35, 34, 33, 32, 37, 45, 46, 47, 48, 38, 35],
    &[45, 46, 47, 48, 50, 60, 59, 58, 57, 56, 55, 54, 53, 52, 51, 49, 39, 40, 41, 42, 43, 44, 45],
];

/// `(cell, [(robot, distance, expected_time)])`, head of queue first.
const INTERSECTIONS: [(u32, &[(u32, u32, u32)]); 6] = [
    (18, &[(1, 6, 6), (0, 7, 7)]),
    (26, &[(2, 2, 2), (3, 2, 2), (0, 5, 5)]),
    (31, &[(1, 2, 2), (2, 5, 5), (0, 2, 2)]),
    (39, &[(2, 2, 2), (3, 6, 6), (0, 2, 2)]),
    (45, &[(3, 3, 3), (2, 3, 3)]),
    (48, &[(3, 2, 2), (2, 3, 3)]),
];

/// `(tick, robot)`.
const HANDOFFS: [(u64, u32); 4] = [(101, 0), (201, 3), (501, 1), (701, 2)];

fn path(cells: &[u32]) -> Path {
    cells.iter().map(|&c| CellId(c)).collect()
}

/// Build the reference layout, crossing lists derived from route order.
pub fn reference_layout() -> LayoutResult<FleetLayout> {
    let mut layout = FleetLayout {
        grid:           GridMap::from_rows(&MAP[..])?,
        robot_routes:   ROBOT_ROUTES.iter().map(|r| path(r)).collect(),
        obstacle_paths: OBSTACLE_PATHS.iter().map(|p| path(p)).collect(),
        intersections:  INTERSECTIONS
            .iter()
            .map(|&(cell, entries)| IntersectionSeed {
                cell:    CellId(cell),
                entries: entries
                    .iter()
                    .map(|&(robot, distance, expected_time)| SeedEntry {
                        robot: RobotId(robot),
                        distance,
                        expected_time,
                    })
                    .collect(),
            })
            .collect(),
        robot_crossings: Vec::new(),
        handoffs:        HANDOFFS
            .iter()
            .map(|&(tick, robot)| Handoff { tick: Tick(tick), robot: RobotId(robot) })
            .collect(),
    };
    layout.derive_crossings();
    Ok(layout)
}
