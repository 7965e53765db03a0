//! Report Data Structures

use chrono::{DateTime, Utc};
use empirica_stats::{
    Aggregation, BayesianResult, Correction, CriticalDistanceResult, FriedmanResult,
    WilcoxonResult,
};
use serde::{Deserialize, Serialize};

/// Version of the JSON report schema
pub const SCHEMA_VERSION: u32 = 1;

/// Complete analysis report across all metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Run metadata
    pub meta: ReportMeta,
    /// Per-metric results, one entry per metric that completed
    pub metrics: Vec<MetricReport>,
    /// Metrics whose analysis aborted, with the error that stopped them
    pub failures: Vec<FailureInfo>,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// JSON schema version
    pub schema_version: u32,
    /// Crate version that produced the report
    pub version: String,
    /// When the analysis ran
    pub timestamp: DateTime<Utc>,
    /// Path of the data CSV, when loaded from disk
    pub data_path: Option<String>,
    /// Path of the metrics CSV, when loaded from disk
    pub metrics_path: Option<String>,
    /// Significance level used throughout
    pub alpha: f64,
    /// Multiple-comparison correction used for the Wilcoxon families
    pub correction: Correction,
    /// Seed of the Bayesian tests, absent for opt-in unseeded runs
    pub seed: Option<u64>,
}

/// All results computed for one metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricReport {
    /// Metric name
    pub metric: String,
    /// Whether larger values are better
    pub maximize: bool,
    /// Aggregation used to collapse executions per (problem, algorithm)
    pub aggregation: Aggregation,
    /// Algorithms compared, in column order
    pub algorithms: Vec<String>,
    /// Problems covered, in row order
    pub problems: Vec<String>,
    /// Average rank per algorithm over all problems
    pub average_ranks: Vec<f64>,
    /// Friedman omnibus result; absent with fewer than 3 algorithms
    pub friedman: Option<FriedmanResult>,
    /// Pivot-vs-rest Wilcoxon results
    pub wilcoxon_pivot: Option<PivotComparison>,
    /// All-pairs Wilcoxon results
    pub wilcoxon_pairwise: Vec<PairwiseEntry>,
    /// Nemenyi critical distance over the average ranks
    pub critical_distance: Option<CriticalDistanceResult>,
    /// Bayesian posterior comparisons against the pivot
    pub bayesian: Vec<BayesianComparison>,
}

/// Wilcoxon pivot-mode family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotComparison {
    /// Reference algorithm every other algorithm is compared against
    pub pivot: String,
    /// Per-opponent results, pivot first in each underlying pair
    pub results: Vec<(String, WilcoxonResult)>,
}

/// One entry of the pairwise Wilcoxon family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PairwiseEntry {
    /// First algorithm of the pair
    pub first: String,
    /// Second algorithm of the pair
    pub second: String,
    /// Test result, with `first` as the first element of each value pair
    pub result: WilcoxonResult,
}

/// Bayesian posterior triple for one algorithm pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BayesianComparison {
    /// First algorithm of the pair
    pub first: String,
    /// Second algorithm of the pair
    pub second: String,
    /// Sign-test posterior
    pub sign: BayesianResult,
    /// Signed-rank-test posterior
    pub signed_rank: BayesianResult,
}

/// A metric whose analysis aborted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureInfo {
    /// Metric name
    pub metric: String,
    /// Rendered error message
    pub error: String,
}
