#![warn(missing_docs)]
//! Empirica Observation Table
//!
//! Typed, validated view of raw repeated-measurement results. Two CSV tables
//! feed the engine:
//! - `data`: columns `Algorithm`, `Problem`, `MetricName`, `ExecutionId`,
//!   `MetricValue`
//! - `metrics`: columns `MetricName`, `Maximize`
//!
//! Validation happens entirely at this boundary: missing columns, unknown or
//! duplicate metric names, and non-finite values are rejected before anything
//! reaches the statistical core.

mod loader;
mod table;

pub use loader::{load_data_csv, load_metrics_csv, read_data_csv, read_metrics_csv};
pub use table::{AggregatedMetric, MetricSpec, Observation, ObservationTable};

use thiserror::Error;

/// Errors produced while loading or validating observation tables
#[derive(Debug, Error)]
pub enum TableError {
    /// Underlying I/O failure
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV content
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row
    #[error("{table} table is missing column '{column}'")]
    MissingColumn {
        /// Which table ("data" or "metrics")
        table: &'static str,
        /// Name of the absent column
        column: String,
    },

    /// The data table references a metric the metrics table does not declare
    #[error("unknown metric '{0}' in data table")]
    UnknownMetric(String),

    /// The metrics table declares the same metric twice
    #[error("duplicate metric '{0}' in metrics table")]
    DuplicateMetric(String),

    /// A measurement is NaN or infinite
    #[error("non-finite value for ({algorithm}, {problem}, {metric}, execution {execution_id})")]
    NonFiniteValue {
        /// Algorithm of the offending row
        algorithm: String,
        /// Problem of the offending row
        problem: String,
        /// Metric of the offending row
        metric: String,
        /// Execution id of the offending row
        execution_id: u32,
    },

    /// An input table contains no rows
    #[error("{0} table is empty")]
    EmptyTable(&'static str),

    /// A (metric, problem, algorithm) cell has no observations
    #[error("no observations for ({algorithm}, {problem}, {metric})")]
    MissingSample {
        /// Algorithm of the empty cell
        algorithm: String,
        /// Problem of the empty cell
        problem: String,
        /// Metric of the empty cell
        metric: String,
    },

    /// Error raised by the statistical core while shaping derived matrices
    #[error(transparent)]
    Stat(#[from] empirica_stats::StatError),
}
