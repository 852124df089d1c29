use std::fmt;

use thiserror::Error;

/// The three record sets every backend produces.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Table {
    RobotSnapshots,
    ObstacleSnapshots,
    TickSummaries,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::RobotSnapshots, Table::ObstacleSnapshots, Table::TickSummaries];

    /// Table name in SQLite, and file stem for the file backends.
    pub fn as_str(self) -> &'static str {
        match self {
            Table::RobotSnapshots    => "robot_snapshots",
            Table::ObstacleSnapshots => "obstacle_snapshots",
            Table::TickSummaries     => "tick_summaries",
        }
    }

    pub fn file_name(self, extension: &str) -> String {
        format!("{}.{extension}", self.as_str())
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A snapshot or summary that could not be persisted.
///
/// Backend failures carry the [`Table`] they hit so a report names the file
/// or SQLite table that is now incomplete.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{table}: csv record rejected: {source}")]
    Csv {
        table:  Table,
        #[source]
        source: csv::Error,
    },

    /// Opening the database or running a statement not tied to one table.
    #[cfg(feature = "sqlite")]
    #[error("output database: {0}")]
    Database(#[source] rusqlite::Error),

    #[cfg(feature = "sqlite")]
    #[error("{table}: insert failed: {source}")]
    Insert {
        table:  Table,
        #[source]
        source: rusqlite::Error,
    },

    #[cfg(feature = "parquet")]
    #[error("{table}: record batch does not fit the schema: {source}")]
    Batch {
        table:  Table,
        #[source]
        source: arrow::error::ArrowError,
    },

    #[cfg(feature = "parquet")]
    #[error("{table}: parquet write failed: {source}")]
    Parquet {
        table:  Table,
        #[source]
        source: parquet::errors::ParquetError,
    },
}

impl OutputError {
    pub(crate) fn csv(table: Table) -> impl Fn(csv::Error) -> Self + Copy {
        move |source| Self::Csv { table, source }
    }

    #[cfg(feature = "sqlite")]
    pub(crate) fn insert(table: Table) -> impl Fn(rusqlite::Error) -> Self + Copy {
        move |source| Self::Insert { table, source }
    }

    #[cfg(feature = "parquet")]
    pub(crate) fn batch(table: Table) -> impl Fn(arrow::error::ArrowError) -> Self + Copy {
        move |source| Self::Batch { table, source }
    }

    #[cfg(feature = "parquet")]
    pub(crate) fn parquet(table: Table) -> impl Fn(parquet::errors::ParquetError) -> Self + Copy {
        move |source| Self::Parquet { table, source }
    }

    /// The table left incomplete, if the failure was tied to one.
    pub fn table(&self) -> Option<Table> {
        match self {
            Self::Csv { table, .. } => Some(*table),
            #[cfg(feature = "sqlite")]
            Self::Insert { table, .. } => Some(*table),
            #[cfg(feature = "parquet")]
            Self::Batch { table, .. } | Self::Parquet { table, .. } => Some(*table),
            _ => None,
        }
    }
}

pub type OutputResult<T> = Result<T, OutputError>;
