//! Parquet backend (feature `parquet`): `robot_snapshots.parquet`,
//! `obstacle_snapshots.parquet` and `tick_summaries.parquet`.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Int64Builder, StringBuilder, UInt32Builder, UInt64Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use crate::writer::OutputWriter;
use crate::{ObstacleSnapshotRow, OutputError, OutputResult, RobotSnapshotRow, Table, TickSummaryRow};

fn robot_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("robot_id",     DataType::UInt32, false),
        Field::new("tick",         DataType::UInt64, false),
        Field::new("x",            DataType::Int64,  false),
        Field::new("y",            DataType::Int64,  false),
        Field::new("speed",        DataType::Int64,  false),
        Field::new("current_cell", DataType::UInt32, false),
        Field::new("next_cell",    DataType::UInt32, false),
        Field::new("phys_status",  DataType::Utf8,   false),
        Field::new("coord_status", DataType::Utf8,   false),
        Field::new("coord_speed",  DataType::Int64,  false),
    ]))
}

fn obstacle_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("obstacle_id",  DataType::UInt32, false),
        Field::new("tick",         DataType::UInt64, false),
        Field::new("x",            DataType::Int64,  false),
        Field::new("y",            DataType::Int64,  false),
        Field::new("current_cell", DataType::UInt32, false),
        Field::new("next_cell",    DataType::UInt32, false),
        Field::new("phase",        DataType::Utf8,   false),
    ]))
}

fn summary_schema() -> Arc<Schema> {
    let counter = |name: &str| Field::new(name, DataType::UInt32, false);
    Arc::new(Schema::new(vec![
        Field::new("tick",       DataType::UInt64, false),
        Field::new("elapsed_ms", DataType::UInt64, false),
        counter("commands"),
        counter("steps"),
        counter("notices"),
        counter("reports"),
        counter("profiles"),
        counter("handoffs"),
        counter("delivered"),
        counter("nacks"),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

fn open(dir: &Path, table: Table, schema: &Arc<Schema>) -> OutputResult<ArrowWriter<File>> {
    let file = File::create(dir.join(table.file_name("parquet")))?;
    ArrowWriter::try_new(file, Arc::clone(schema), Some(snappy_props()))
        .map_err(OutputError::parquet(table))
}

fn write(
    writer: &mut ArrowWriter<File>,
    table: Table,
    schema: &Arc<Schema>,
    columns: Vec<ArrayRef>,
) -> OutputResult<()> {
    let batch = RecordBatch::try_new(Arc::clone(schema), columns).map_err(OutputError::batch(table))?;
    writer.write(&batch).map_err(OutputError::parquet(table))
}

/// Writes simulation output to three Parquet files.
///
/// `finish()` writes the file footers; a file that was never finished cannot
/// be opened by Parquet readers.
pub struct ParquetWriter {
    robots:          Option<ArrowWriter<File>>,
    obstacles:       Option<ArrowWriter<File>>,
    summaries:       Option<ArrowWriter<File>>,
    robot_schema:    Arc<Schema>,
    obstacle_schema: Arc<Schema>,
    summary_schema:  Arc<Schema>,
}

impl ParquetWriter {
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let robot_schema    = robot_schema();
        let obstacle_schema = obstacle_schema();
        let summary_schema  = summary_schema();

        Ok(Self {
            robots:    Some(open(dir, Table::RobotSnapshots, &robot_schema)?),
            obstacles: Some(open(dir, Table::ObstacleSnapshots, &obstacle_schema)?),
            summaries: Some(open(dir, Table::TickSummaries, &summary_schema)?),
            robot_schema,
            obstacle_schema,
            summary_schema,
        })
    }
}

impl OutputWriter for ParquetWriter {
    fn write_robot_snapshots(&mut self, rows: &[RobotSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.robots.as_mut() else {
            return Ok(());
        };

        let mut ids          = UInt32Builder::new();
        let mut ticks        = UInt64Builder::new();
        let mut xs           = Int64Builder::new();
        let mut ys           = Int64Builder::new();
        let mut speeds       = Int64Builder::new();
        let mut currents     = UInt32Builder::new();
        let mut nexts        = UInt32Builder::new();
        let mut phys         = StringBuilder::new();
        let mut coord        = StringBuilder::new();
        let mut coord_speeds = Int64Builder::new();

        for row in rows {
            ids.append_value(row.robot_id);
            ticks.append_value(row.tick);
            xs.append_value(row.x);
            ys.append_value(row.y);
            speeds.append_value(row.speed);
            currents.append_value(row.current_cell);
            nexts.append_value(row.next_cell);
            phys.append_value(row.phys_status);
            coord.append_value(row.coord_status);
            coord_speeds.append_value(row.coord_speed);
        }

        let columns: Vec<ArrayRef> = vec![
            Arc::new(ids.finish()),
            Arc::new(ticks.finish()),
            Arc::new(xs.finish()),
            Arc::new(ys.finish()),
            Arc::new(speeds.finish()),
            Arc::new(currents.finish()),
            Arc::new(nexts.finish()),
            Arc::new(phys.finish()),
            Arc::new(coord.finish()),
            Arc::new(coord_speeds.finish()),
        ];
        write(writer, Table::RobotSnapshots, &self.robot_schema, columns)
    }

    fn write_obstacle_snapshots(&mut self, rows: &[ObstacleSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let Some(writer) = self.obstacles.as_mut() else {
            return Ok(());
        };

        let mut ids      = UInt32Builder::new();
        let mut ticks    = UInt64Builder::new();
        let mut xs       = Int64Builder::new();
        let mut ys       = Int64Builder::new();
        let mut currents = UInt32Builder::new();
        let mut nexts    = UInt32Builder::new();
        let mut phases   = StringBuilder::new();

        for row in rows {
            ids.append_value(row.obstacle_id);
            ticks.append_value(row.tick);
            xs.append_value(row.x);
            ys.append_value(row.y);
            currents.append_value(row.current_cell);
            nexts.append_value(row.next_cell);
            phases.append_value(row.phase);
        }

        let columns: Vec<ArrayRef> = vec![
            Arc::new(ids.finish()),
            Arc::new(ticks.finish()),
            Arc::new(xs.finish()),
            Arc::new(ys.finish()),
            Arc::new(currents.finish()),
            Arc::new(nexts.finish()),
            Arc::new(phases.finish()),
        ];
        write(writer, Table::ObstacleSnapshots, &self.obstacle_schema, columns)
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        let Some(writer) = self.summaries.as_mut() else {
            return Ok(());
        };

        let mut ticks   = UInt64Builder::new();
        let mut elapsed = UInt64Builder::new();
        ticks.append_value(row.tick);
        elapsed.append_value(row.elapsed_ms);

        let mut columns: Vec<ArrayRef> = vec![Arc::new(ticks.finish()), Arc::new(elapsed.finish())];
        for value in [
            row.commands, row.steps, row.notices, row.reports,
            row.profiles, row.handoffs, row.delivered, row.nacks,
        ] {
            let mut b = UInt32Builder::new();
            b.append_value(value);
            columns.push(Arc::new(b.finish()));
        }

        write(writer, Table::TickSummaries, &self.summary_schema, columns)
    }

    fn finish(&mut self) -> OutputResult<()> {
        let slots = [&mut self.robots, &mut self.obstacles, &mut self.summaries];
        for (table, slot) in Table::ALL.into_iter().zip(slots) {
            if let Some(w) = slot.take() {
                w.close().map_err(OutputError::parquet(table))?;
            }
        }
        Ok(())
    }
}
