#![warn(missing_docs)]
//! Empirica Statistical Engine
//!
//! Non-parametric significance testing for repeated-measurement results of
//! stochastic algorithms across problem instances:
//! - Fractional (tie-averaged) ranking of algorithms per problem
//! - Friedman omnibus rank test with chi-square p-value
//! - Wilcoxon signed-rank test (pivot and pairwise) with Holm/Bonferroni
//!   correction and exact small-sample p-values
//! - Nemenyi post-hoc critical distance with pairwise adjacency
//! - Bayesian sign and signed-rank tests via seeded Dirichlet posterior sampling
//!
//! Every function is a pure computation over its inputs. The Bayesian tests
//! construct their own pseudo-random generator from an explicit caller seed;
//! no process-wide random state is ever touched.

mod bayesian;
mod correction;
mod distributions;
mod friedman;
mod matrix;
mod nemenyi;
mod ranking;
mod summary;
mod wilcoxon;

pub use bayesian::{
    BayesianConfig, BayesianResult, PosteriorSamples, bayesian_sign_test,
    bayesian_signed_rank_test,
};
pub use correction::{Correction, adjust_p_values};
pub use distributions::{chi_square_sf, normal_cdf, normal_quantile};
pub use friedman::{FriedmanResult, friedman};
pub use matrix::MatchedMatrix;
pub use nemenyi::{CriticalDistanceResult, critical_distance};
pub use ranking::{RankTable, rank_table, rank_values};
pub use summary::{Aggregation, SampleSummary, is_normal, summarize};
pub use wilcoxon::{
    Direction, PValueMethod, WilcoxonConfig, WilcoxonResult, wilcoxon_pairwise, wilcoxon_pivot,
    wilcoxon_signed_rank,
};

use thiserror::Error;

/// Absolute tolerance below which two metric values are considered tied
pub const DEFAULT_TIE_TOLERANCE: f64 = 1e-10;

/// Default number of Monte-Carlo draws for the Bayesian tests
pub const DEFAULT_SAMPLE_SIZE: usize = 10_000;

/// Largest paired-sample size for which the exact Wilcoxon null distribution is enumerated
pub const DEFAULT_EXACT_THRESHOLD: usize = 25;

/// Minimum number of non-zero paired differences for a meaningful Wilcoxon test
pub const MIN_WILCOXON_PAIRS: usize = 6;

/// Errors produced by the statistical engine
#[derive(Debug, Error)]
pub enum StatError {
    /// Sample size below the statistical minimum for the requested test
    #[error("{test}: insufficient data, got {got}, need at least {min}")]
    InsufficientData {
        /// Name of the test that was requested
        test: &'static str,
        /// Number of usable observations found
        got: usize,
        /// Minimum required by the test
        min: usize,
    },

    /// Zero-variance or otherwise degenerate input producing undefined statistics
    #[error("degenerate input: {reason}")]
    DegenerateInput {
        /// What made the statistic undefined
        reason: String,
    },

    /// Significance level outside the supported set
    #[error("unsupported significance level {0} (supported: 0.01, 0.05, 0.10)")]
    InvalidAlpha(f64),

    /// More algorithms than the critical-value table covers
    #[error("critical values unavailable for {k} algorithms (max {max})")]
    UnsupportedGroupCount {
        /// Number of algorithms requested
        k: usize,
        /// Largest supported number of algorithms
        max: usize,
    },

    /// Bayesian test invoked without a seed while reproducibility is required
    #[error("no seed given; set a seed or opt in to non-reproducible sampling")]
    SeedRequired,

    /// Monte-Carlo sample size of zero
    #[error("posterior sample size must be positive")]
    InvalidSampleSize,

    /// Non-positive Dirichlet prior strength
    #[error("prior strength must be positive, got {0}")]
    InvalidPriorStrength(f64),

    /// Algorithm name not present in the input matrix
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),
}
