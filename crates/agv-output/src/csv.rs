//! CSV backend: `robot_snapshots.csv`, `obstacle_snapshots.csv` and
//! `tick_summaries.csv` in the output directory.

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{ObstacleSnapshotRow, OutputError, OutputResult, RobotSnapshotRow, Table, TickSummaryRow};

pub const ROBOT_HEADER: [&str; 10] = [
    "robot_id", "tick", "x", "y", "speed", "current_cell", "next_cell",
    "phys_status", "coord_status", "coord_speed",
];

pub const OBSTACLE_HEADER: [&str; 7] = [
    "obstacle_id", "tick", "x", "y", "current_cell", "next_cell", "phase",
];

pub const SUMMARY_HEADER: [&str; 10] = [
    "tick", "elapsed_ms", "commands", "steps", "notices", "reports",
    "profiles", "handoffs", "delivered", "nacks",
];

fn open(dir: &Path, table: Table, header: &[&str]) -> OutputResult<Writer<File>> {
    let mut writer = Writer::from_path(dir.join(table.file_name("csv")))
        .map_err(OutputError::csv(table))?;
    writer.write_record(header).map_err(OutputError::csv(table))?;
    Ok(writer)
}

pub struct CsvWriter {
    robots:    Writer<File>,
    obstacles: Writer<File>,
    summaries: Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the three files in `dir` and write their header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let robots = open(dir, Table::RobotSnapshots, &ROBOT_HEADER)?;
        let obstacles = open(dir, Table::ObstacleSnapshots, &OBSTACLE_HEADER)?;
        let summaries = open(dir, Table::TickSummaries, &SUMMARY_HEADER)?;
        Ok(Self { robots, obstacles, summaries, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_robot_snapshots(&mut self, rows: &[RobotSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.robots.write_record(&[
                row.robot_id.to_string(),
                row.tick.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.speed.to_string(),
                row.current_cell.to_string(),
                row.next_cell.to_string(),
                row.phys_status.to_owned(),
                row.coord_status.to_owned(),
                row.coord_speed.to_string(),
            ]).map_err(OutputError::csv(Table::RobotSnapshots))?;
        }
        Ok(())
    }

    fn write_obstacle_snapshots(&mut self, rows: &[ObstacleSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.obstacles.write_record(&[
                row.obstacle_id.to_string(),
                row.tick.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.current_cell.to_string(),
                row.next_cell.to_string(),
                row.phase.to_owned(),
            ]).map_err(OutputError::csv(Table::ObstacleSnapshots))?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.elapsed_ms.to_string(),
            row.commands.to_string(),
            row.steps.to_string(),
            row.notices.to_string(),
            row.reports.to_string(),
            row.profiles.to_string(),
            row.handoffs.to_string(),
            row.delivered.to_string(),
            row.nacks.to_string(),
        ]).map_err(OutputError::csv(Table::TickSummaries))?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.robots.flush()?;
        self.obstacles.flush()?;
        self.summaries.flush()?;
        Ok(())
    }
}
