//! The `OutputWriter` trait shared by every backend.

use crate::{ObstacleSnapshotRow, OutputResult, RobotSnapshotRow, TickSummaryRow};

/// Sink for snapshot and summary rows.
///
/// [`SimOutputObserver`][crate::SimOutputObserver] keeps the first error any
/// of these return and hands it back through `take_error`.
pub trait OutputWriter {
    fn write_robot_snapshots(&mut self, rows: &[RobotSnapshotRow]) -> OutputResult<()>;

    fn write_obstacle_snapshots(&mut self, rows: &[ObstacleSnapshotRow]) -> OutputResult<()>;

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close the underlying files.  Calling it twice is a no-op.
    fn finish(&mut self) -> OutputResult<()>;
}
