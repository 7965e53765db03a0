#![warn(missing_docs)]
//! # Empirica
//!
//! Statistical comparison of stochastic algorithms across problem instances.
//!
//! Empirica takes repeated measurements of several algorithms on several
//! problems and answers "which algorithm is better, and how sure are we":
//! - **Fractional ranking**: tie-averaged ranks per problem, direction-aware
//! - **Friedman omnibus test**: do the algorithms differ at all?
//! - **Wilcoxon signed-rank**: pivot-vs-rest and all-pairs comparisons with
//!   Holm/Bonferroni family correction and exact small-sample p-values
//! - **Nemenyi post-hoc**: critical distance with full pairwise adjacency,
//!   plus critical-distance diagram geometry
//! - **Bayesian sign and signed-rank tests**: posterior win/rope/loss
//!   probabilities from seeded, reproducible Monte-Carlo sampling
//! - **Artifacts**: LaTeX tables (summary, Friedman, Wilcoxon pivot, 1-vs-1)
//!   and a schema-versioned JSON report
//!
//! ## Quick Start
//!
//! ```ignore
//! use empirica::prelude::*;
//!
//! let observations = load_data_csv("data.csv")?;
//! let specs = load_metrics_csv("metrics.csv")?;
//! let table = ObservationTable::new(observations, specs)?;
//!
//! let config = AnalysisConfig {
//!     seed: Some(42),
//!     ..AnalysisConfig::default()
//! };
//! let report = analyze(&table, table.metrics(), &config);
//! println!("{}", format_human_output(&report));
//! ```

// Re-export the statistical engine
pub use empirica_stats::{
    Aggregation, BayesianConfig, BayesianResult, Correction, CriticalDistanceResult, Direction,
    FriedmanResult, MatchedMatrix, PValueMethod, PosteriorSamples, RankTable, SampleSummary,
    StatError, WilcoxonConfig, WilcoxonResult, bayesian_sign_test, bayesian_signed_rank_test,
    critical_distance, friedman, rank_table, rank_values, summarize, wilcoxon_pairwise,
    wilcoxon_pivot, wilcoxon_signed_rank,
};

// Re-export the table layer
pub use empirica_table::{
    AggregatedMetric, MetricSpec, Observation, ObservationTable, TableError, load_data_csv,
    load_metrics_csv, read_data_csv, read_metrics_csv,
};

// Re-export the report layer
pub use empirica_report::{
    BayesianComparison, CdDiagram, FailureInfo, MetricReport, PivotComparison, Report, ReportMeta,
    SignMarker, generate_json_report, latex_friedman_table, latex_summary_table,
    latex_wilcoxon_grid, latex_wilcoxon_pivot_table, layout_cd_diagram,
};

// Re-export the orchestration layer
pub use empirica_cli::{AnalysisConfig, analyze, format_human_output, write_artifacts};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AnalysisConfig, Correction, ObservationTable, Report, analyze, format_human_output,
        load_data_csv, load_metrics_csv, write_artifacts,
    };
}

/// Run the Empirica CLI.
///
/// Call this from a binary's `main()`:
/// ```ignore
/// fn main() -> anyhow::Result<()> {
///     empirica::run()
/// }
/// ```
pub use empirica_cli::run;
