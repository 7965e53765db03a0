#![warn(missing_docs)]
//! Empirica Report - Result Consumers
//!
//! Turns typed statistical results into artifacts:
//! - LaTeX tables (summary, Friedman column, Wilcoxon pivot, Wilcoxon 1-vs-1)
//! - Critical-distance diagram layout (geometry only; rasterization is out of
//!   scope and left to external tooling)
//! - JSON report (machine-readable, schema-versioned)

mod cd_diagram;
mod json;
mod latex;
mod report;

pub use cd_diagram::{CdDiagram, CdEntry, CdSegment, layout_cd_diagram};
pub use json::generate_json_report;
pub use latex::{
    SignMarker, latex_friedman_table, latex_summary_table, latex_wilcoxon_grid,
    latex_wilcoxon_pivot_table,
};
pub use report::{
    BayesianComparison, FailureInfo, MetricReport, PairwiseEntry, PivotComparison, Report,
    ReportMeta, SCHEMA_VERSION,
};
