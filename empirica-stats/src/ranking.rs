//! Ranking Engine
//!
//! Converts raw metric values into per-problem fractional ranks. Rank 1 is the
//! best value under the metric direction; tied values (equal within tolerance)
//! receive the mean of the rank positions they jointly occupy, so the ranks of
//! a problem always sum to K(K+1)/2.

use crate::matrix::MatchedMatrix;
use crate::{DEFAULT_TIE_TOLERANCE, StatError};
use serde::{Deserialize, Serialize};

/// Per-problem fractional ranks of algorithms for one metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankTable {
    /// Algorithm names, in column order
    pub algorithms: Vec<String>,
    /// Problem names, in row order
    pub problems: Vec<String>,
    /// `ranks[problem_idx][algorithm_idx]`, each row a tie-averaged permutation of 1..K
    pub ranks: Vec<Vec<f64>>,
}

impl RankTable {
    /// Average rank per algorithm across all problems, in column order
    pub fn average_ranks(&self) -> Vec<f64> {
        let k = self.algorithms.len();
        let n = self.problems.len() as f64;
        let mut avg = vec![0.0; k];
        for row in &self.ranks {
            for (j, r) in row.iter().enumerate() {
                avg[j] += r;
            }
        }
        for a in &mut avg {
            *a /= n;
        }
        avg
    }
}

/// Fractional ranks of one problem row.
///
/// Descending order when `maximize` is set, so the largest value gets rank 1;
/// ascending otherwise. Values within `DEFAULT_TIE_TOLERANCE` of each other
/// share the mean of their contested positions.
pub fn rank_values(values: &[f64], maximize: bool) -> Vec<f64> {
    rank_values_with_tolerance(values, maximize, DEFAULT_TIE_TOLERANCE)
}

/// [`rank_values`] with an explicit tie tolerance
pub fn rank_values_with_tolerance(values: &[f64], maximize: bool, tolerance: f64) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| {
        let cmp = values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal);
        if maximize { cmp.reverse() } else { cmp }
    });

    let mut ranks = vec![0.0; n];
    let mut i = 0;
    while i < n {
        // Extend the tie group while consecutive sorted values stay within tolerance
        let mut j = i + 1;
        while j < n && (values[order[j]] - values[order[j - 1]]).abs() <= tolerance {
            j += 1;
        }
        // Positions i..j (0-based) share the mean of ranks i+1..j
        let shared = (i + j + 1) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = shared;
        }
        i = j;
    }
    ranks
}

/// Rank every problem row of a matched matrix.
///
/// Fails with [`StatError::InsufficientData`] when fewer than two algorithms
/// are present; a single column cannot be ranked against anything.
pub fn rank_table(matrix: &MatchedMatrix, maximize: bool) -> Result<RankTable, StatError> {
    if matrix.n_algorithms() < 2 {
        return Err(StatError::InsufficientData {
            test: "ranking",
            got: matrix.n_algorithms(),
            min: 2,
        });
    }

    let ranks = matrix
        .values
        .iter()
        .map(|row| rank_values(row, maximize))
        .collect();

    Ok(RankTable {
        algorithms: matrix.algorithms.clone(),
        problems: matrix.problems.clone(),
        ranks,
    })
}
