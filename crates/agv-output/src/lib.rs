//! `agv-output`: writers that persist fleet snapshots and per-tick counters.
//!
//! | Feature   | Backend | Files created                                                                   |
//! |-----------|---------|---------------------------------------------------------------------------------|
//! | *(none)*  | CSV     | `robot_snapshots.csv`, `obstacle_snapshots.csv`, `tick_summaries.csv`           |
//! | `sqlite`  | SQLite  | `output.db`                                                                     |
//! | `parquet` | Parquet | `robot_snapshots.parquet`, `obstacle_snapshots.parquet`, `tick_summaries.parquet` |
//!
//! Every backend implements [`OutputWriter`].  [`SimOutputObserver`] plugs a
//! writer into `agv_sim::Sim::run`.
//!
//! ```rust,ignore
//! use agv_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer, &config);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "parquet")]
pub mod parquet;


pub use self::csv::CsvWriter;
pub use error::{OutputError, OutputResult, Table};
pub use observer::SimOutputObserver;
pub use row::{ObstacleSnapshotRow, RobotSnapshotRow, TickSummaryRow};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;

#[cfg(feature = "parquet")]
pub use self::parquet::ParquetWriter;
