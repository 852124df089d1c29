use agv_core::{CellId, ObstacleId, RobotId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cell {0} appears more than once in the grid")]
    DuplicateCell(CellId),

    #[error("{owner} references cell {cell}, which is not on the grid")]
    UnknownCell { owner: String, cell: CellId },

    #[error("{owner} steps from {from} to {to}, which are not neighbours")]
    NotAdjacent { owner: String, from: CellId, to: CellId },

    #[error("{owner} needs at least two cells")]
    PathTooShort { owner: String },

    #[error("{owner} has {len} cells; the bulk channel holds {capacity} words")]
    PathTooLong { owner: String, len: usize, capacity: usize },

    #[error("obstacle {0} path does not end where it starts")]
    NotCyclic(ObstacleId),

    #[error("robot {0} is not part of the fleet")]
    UnknownRobot(RobotId),

    #[error("robot {robot} is queued at cell {cell} but its route never enters it")]
    QueueMembership { cell: CellId, robot: RobotId },

    #[error("robot {robot} crossing list does not follow its route order at cell {cell}")]
    CrossingOrder { robot: RobotId, cell: CellId },

    #[error("intersection {cell}: {reason}")]
    Intersection { cell: CellId, reason: String },

    #[error("robot {0} has more than one route handoff")]
    DuplicateHandoff(RobotId),
}

pub type LayoutResult<T> = Result<T, LayoutError>;
