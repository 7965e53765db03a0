//! Nemenyi Post-Hoc / Critical Distance
//!
//! Computes the minimum average-rank gap two algorithms must show, after a
//! Friedman test, to be declared significantly different:
//! `CD = q_alpha * sqrt(K(K+1) / 6N)`.
//!
//! The "not significantly different" relation is NOT transitive, so the result
//! reports the full pairwise adjacency matrix instead of flattening it into
//! exclusive groups; critical-distance diagrams must draw the relation as
//! overlapping segments.

use crate::StatError;
use serde::{Deserialize, Serialize};

/// Largest algorithm count covered by the critical-value table
pub const MAX_ALGORITHMS: usize = 10;

/// Nemenyi critical values q_alpha for K = 2..=10, derived from the
/// Studentized range distribution at infinite degrees of freedom
/// (q_studentized / sqrt(2)); Demsar (2006), Table 5.
const Q_ALPHA_001: [f64; 9] = [
    2.575829, 2.913494, 3.113250, 3.254686, 3.363601, 3.452213, 3.526471, 3.590339, 3.646292,
];
const Q_ALPHA_005: [f64; 9] = [
    1.959964, 2.343701, 2.569032, 2.727774, 2.849705, 2.948319, 3.030879, 3.101730, 3.163684,
];
const Q_ALPHA_010: [f64; 9] = [
    1.644854, 2.052293, 2.291341, 2.459516, 2.588521, 2.692732, 2.779884, 2.854606, 2.919889,
];

/// Result of the critical-distance procedure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriticalDistanceResult {
    /// Critical distance: the minimum significant average-rank difference
    pub cd: f64,
    /// Average rank per algorithm, in the caller's order
    pub average_ranks: Vec<f64>,
    /// `adjacency[i][j]` is true when algorithms i and j are NOT
    /// significantly different (`|R_i - R_j| < cd`); symmetric, true on the
    /// diagonal, and not necessarily transitive
    pub adjacency: Vec<Vec<bool>>,
}

/// Critical distance for `average_ranks` over `n_problems` at level `alpha`.
///
/// Supported levels are 0.01, 0.05 and 0.10; supported group sizes run up to
/// [`MAX_ALGORITHMS`]. Anything outside the table is an error rather than an
/// extrapolation.
pub fn critical_distance(
    average_ranks: &[f64],
    n_problems: usize,
    alpha: f64,
) -> Result<CriticalDistanceResult, StatError> {
    let k = average_ranks.len();
    if k < 2 {
        return Err(StatError::InsufficientData {
            test: "critical_distance",
            got: k,
            min: 2,
        });
    }
    if n_problems < 2 {
        return Err(StatError::InsufficientData {
            test: "critical_distance",
            got: n_problems,
            min: 2,
        });
    }

    let q = q_alpha(alpha, k)?;
    let kf = k as f64;
    let nf = n_problems as f64;
    let cd = q * (kf * (kf + 1.0) / (6.0 * nf)).sqrt();

    let adjacency = (0..k)
        .map(|i| {
            (0..k)
                .map(|j| (average_ranks[i] - average_ranks[j]).abs() < cd)
                .collect()
        })
        .collect();

    Ok(CriticalDistanceResult {
        cd,
        average_ranks: average_ranks.to_vec(),
        adjacency,
    })
}

fn q_alpha(alpha: f64, k: usize) -> Result<f64, StatError> {
    if k > MAX_ALGORITHMS {
        return Err(StatError::UnsupportedGroupCount {
            k,
            max: MAX_ALGORITHMS,
        });
    }

    let table = if (alpha - 0.01).abs() < 1e-9 {
        &Q_ALPHA_001
    } else if (alpha - 0.05).abs() < 1e-9 {
        &Q_ALPHA_005
    } else if (alpha - 0.10).abs() < 1e-9 {
        &Q_ALPHA_010
    } else {
        return Err(StatError::InvalidAlpha(alpha));
    };

    Ok(table[k - 2])
}
