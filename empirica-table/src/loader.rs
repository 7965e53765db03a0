//! CSV Loading
//!
//! Reads the `data` and `metrics` tables from CSV. Header presence is checked
//! up front so a missing column surfaces as a named error instead of a serde
//! deserialization failure halfway through the file. The `Maximize` column
//! accepts the boolean spellings common in exported result sheets
//! (`true`/`True`/`TRUE`/`1` and their negative counterparts).

use crate::table::{MetricSpec, Observation};
use crate::TableError;
use serde::Deserialize;
use std::io::Read;
use std::path::Path;

const DATA_COLUMNS: [&str; 5] = [
    "Algorithm",
    "Problem",
    "MetricName",
    "ExecutionId",
    "MetricValue",
];
const METRIC_COLUMNS: [&str; 2] = ["MetricName", "Maximize"];

#[derive(Debug, Deserialize)]
struct DataRow {
    #[serde(rename = "Algorithm")]
    algorithm: String,
    #[serde(rename = "Problem")]
    problem: String,
    #[serde(rename = "MetricName")]
    metric: String,
    #[serde(rename = "ExecutionId")]
    execution_id: u32,
    #[serde(rename = "MetricValue")]
    value: f64,
}

#[derive(Debug, Deserialize)]
struct MetricRow {
    #[serde(rename = "MetricName")]
    metric: String,
    #[serde(rename = "Maximize", deserialize_with = "flexible_bool")]
    maximize: bool,
}

fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean, got '{}'",
            other
        ))),
    }
}

/// Load observation rows from a data CSV file
pub fn load_data_csv(path: &Path) -> Result<Vec<Observation>, TableError> {
    let file = std::fs::File::open(path)?;
    read_data_csv(file)
}

/// Load metric specs from a metrics CSV file
pub fn load_metrics_csv(path: &Path) -> Result<Vec<MetricSpec>, TableError> {
    let file = std::fs::File::open(path)?;
    read_metrics_csv(file)
}

/// Read observation rows from any CSV source
pub fn read_data_csv<R: Read>(reader: R) -> Result<Vec<Observation>, TableError> {
    let mut reader = csv::Reader::from_reader(reader);
    check_columns(&mut reader, "data", &DATA_COLUMNS)?;

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: DataRow = record?;
        rows.push(Observation {
            algorithm: row.algorithm,
            problem: row.problem,
            metric: row.metric,
            execution_id: row.execution_id,
            value: row.value,
        });
    }
    Ok(rows)
}

/// Read metric specs from any CSV source
pub fn read_metrics_csv<R: Read>(reader: R) -> Result<Vec<MetricSpec>, TableError> {
    let mut reader = csv::Reader::from_reader(reader);
    check_columns(&mut reader, "metrics", &METRIC_COLUMNS)?;

    let mut specs = Vec::new();
    for record in reader.deserialize() {
        let row: MetricRow = record?;
        specs.push(MetricSpec {
            metric: row.metric,
            maximize: row.maximize,
        });
    }
    Ok(specs)
}

fn check_columns<R: Read>(
    reader: &mut csv::Reader<R>,
    table: &'static str,
    required: &[&str],
) -> Result<(), TableError> {
    let headers = reader.headers()?.clone();
    for column in required {
        if !headers.iter().any(|h| h == *column) {
            return Err(TableError::MissingColumn {
                table,
                column: column.to_string(),
            });
        }
    }
    Ok(())
}
