//! Flat row types written by the backends.
//!
//! Cell columns carry the raw cell number; `u32::MAX` marks an exhausted path.
//! Status columns carry the lowercase names from `as_str`.

/// One robot at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotSnapshotRow {
    pub robot_id:     u32,
    pub tick:         u64,
    pub x:            i64,
    pub y:            i64,
    pub speed:        i64,
    pub current_cell: u32,
    pub next_cell:    u32,
    pub phys_status:  &'static str,
    pub coord_status: &'static str,
    pub coord_speed:  i64,
}

/// One obstacle at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObstacleSnapshotRow {
    pub obstacle_id:  u32,
    pub tick:         u64,
    pub x:            i64,
    pub y:            i64,
    pub current_cell: u32,
    pub next_cell:    u32,
    pub phase:        &'static str,
}

/// Pipeline counters for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:       u64,
    pub elapsed_ms: u64,
    pub commands:   u32,
    pub steps:      u32,
    pub notices:    u32,
    pub reports:    u32,
    pub profiles:   u32,
    pub handoffs:   u32,
    pub delivered:  u32,
    pub nacks:      u32,
}
