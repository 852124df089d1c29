//! SQLite backend (feature `sqlite`): one `output.db` with the tables
//! `robot_snapshots`, `obstacle_snapshots` and `tick_summaries`.

use std::path::Path;

use rusqlite::{params, Connection};

use crate::writer::OutputWriter;
use crate::{ObstacleSnapshotRow, OutputError, OutputResult, RobotSnapshotRow, Table, TickSummaryRow};

pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and create the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db")).map_err(OutputError::Database)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS robot_snapshots (
                 robot_id     INTEGER NOT NULL,
                 tick         INTEGER NOT NULL,
                 x            INTEGER NOT NULL,
                 y            INTEGER NOT NULL,
                 speed        INTEGER NOT NULL,
                 current_cell INTEGER NOT NULL,
                 next_cell    INTEGER NOT NULL,
                 phys_status  TEXT    NOT NULL,
                 coord_status TEXT    NOT NULL,
                 coord_speed  INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS obstacle_snapshots (
                 obstacle_id  INTEGER NOT NULL,
                 tick         INTEGER NOT NULL,
                 x            INTEGER NOT NULL,
                 y            INTEGER NOT NULL,
                 current_cell INTEGER NOT NULL,
                 next_cell    INTEGER NOT NULL,
                 phase        TEXT    NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick       INTEGER PRIMARY KEY,
                 elapsed_ms INTEGER NOT NULL,
                 commands   INTEGER NOT NULL,
                 steps      INTEGER NOT NULL,
                 notices    INTEGER NOT NULL,
                 reports    INTEGER NOT NULL,
                 profiles   INTEGER NOT NULL,
                 handoffs   INTEGER NOT NULL,
                 delivered  INTEGER NOT NULL,
                 nacks      INTEGER NOT NULL
             );",
        )
        .map_err(OutputError::Database)?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_robot_snapshots(&mut self, rows: &[RobotSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let insert = OutputError::insert(Table::RobotSnapshots);
        let tx = self.conn.unchecked_transaction().map_err(insert)?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO robot_snapshots \
                 (robot_id, tick, x, y, speed, current_cell, next_cell, phys_status, coord_status, coord_speed) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .map_err(insert)?;
            for row in rows {
                stmt.execute(params![
                    row.robot_id,
                    row.tick as i64,
                    row.x,
                    row.y,
                    row.speed,
                    row.current_cell,
                    row.next_cell,
                    row.phys_status,
                    row.coord_status,
                    row.coord_speed,
                ])
                .map_err(insert)?;
            }
        }
        tx.commit().map_err(insert)?;
        Ok(())
    }

    fn write_obstacle_snapshots(&mut self, rows: &[ObstacleSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let insert = OutputError::insert(Table::ObstacleSnapshots);
        let tx = self.conn.unchecked_transaction().map_err(insert)?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO obstacle_snapshots \
                 (obstacle_id, tick, x, y, current_cell, next_cell, phase) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .map_err(insert)?;
            for row in rows {
                stmt.execute(params![
                    row.obstacle_id,
                    row.tick as i64,
                    row.x,
                    row.y,
                    row.current_cell,
                    row.next_cell,
                    row.phase,
                ])
                .map_err(insert)?;
            }
        }
        tx.commit().map_err(insert)?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, elapsed_ms, commands, steps, notices, reports, profiles, handoffs, delivered, nacks) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                row.tick as i64,
                row.elapsed_ms as i64,
                row.commands,
                row.steps,
                row.notices,
                row.reports,
                row.profiles,
                row.handoffs,
                row.delivered,
                row.nacks,
            ],
        )
        .map_err(OutputError::insert(Table::TickSummaries))?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn
            .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
            .map_err(OutputError::Database)?;
        Ok(())
    }
}
