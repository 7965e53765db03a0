//! Friedman Test
//!
//! Omnibus rank-based test for differences among K >= 3 algorithms over N
//! matched problems. The null hypothesis is that all algorithms are
//! equivalent, i.e. their average ranks are equal.

use crate::distributions::chi_square_sf;
use crate::ranking::RankTable;
use crate::StatError;
use serde::{Deserialize, Serialize};

/// Result of the Friedman omnibus test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriedmanResult {
    /// Friedman chi-square statistic
    pub statistic: f64,
    /// Asymptotic p-value from the chi-square distribution
    pub p_value: f64,
    /// Degrees of freedom (K - 1)
    pub df: usize,
    /// Average rank per algorithm, in the rank table's column order
    pub average_ranks: Vec<f64>,
}

/// Run the Friedman test over the rank tables of all problems for one metric.
///
/// Requires at least 3 algorithms and 2 problems. When every problem ranks all
/// algorithms as tied, the statistic is 0 and the p-value is 1; this is a
/// well-defined outcome, not an error.
pub fn friedman(ranks: &RankTable) -> Result<FriedmanResult, StatError> {
    let k = ranks.algorithms.len();
    let n = ranks.problems.len();

    if k < 3 {
        return Err(StatError::InsufficientData {
            test: "friedman",
            got: k,
            min: 3,
        });
    }
    if n < 2 {
        return Err(StatError::InsufficientData {
            test: "friedman",
            got: n,
            min: 2,
        });
    }

    let average_ranks = ranks.average_ranks();

    // chi2 = 12N / (K(K+1)) * (sum R_j^2 - K(K+1)^2 / 4), R_j = average ranks
    let kf = k as f64;
    let nf = n as f64;
    let rank_sum_squared: f64 = average_ranks.iter().map(|r| r * r).sum();
    let statistic = (12.0 * nf) / (kf * (kf + 1.0))
        * (rank_sum_squared - kf * (kf + 1.0).powi(2) / 4.0);
    // Rounding can push an all-tied statistic a hair below zero
    let statistic = statistic.max(0.0);

    let p_value = chi_square_sf(statistic, k - 1);

    Ok(FriedmanResult {
        statistic,
        p_value,
        df: k - 1,
        average_ranks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::MatchedMatrix;
    use crate::ranking::rank_table;

    fn table(rows: Vec<Vec<f64>>, maximize: bool) -> RankTable {
        let k = rows[0].len();
        let m = MatchedMatrix::new(
            (0..k).map(|i| format!("alg{i}")).collect(),
            (0..rows.len()).map(|i| format!("p{i}")).collect(),
            rows,
        )
        .unwrap();
        rank_table(&m, maximize).unwrap()
    }

    #[test]
    fn test_all_tied_gives_zero_statistic() {
        let rt = table(vec![vec![1.0, 1.0, 1.0]; 4], true);
        let r = friedman(&rt).unwrap();
        assert_eq!(r.statistic, 0.0);
        assert!((r.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_dominant_algorithm() {
        // One algorithm strictly dominating on all 10 problems
        let rows: Vec<Vec<f64>> = (0..10)
            .map(|i| vec![0.9 + (i as f64) * 1e-3, 0.5, 0.4])
            .collect();
        let rt = table(rows, true);
        let r = friedman(&rt).unwrap();
        assert!(r.p_value < 0.05, "p = {}", r.p_value);
        assert_eq!(r.average_ranks[0], 1.0);
    }

    #[test]
    fn test_requires_three_algorithms() {
        let rt = table(vec![vec![1.0, 2.0]; 5], false);
        assert!(matches!(
            friedman(&rt),
            Err(StatError::InsufficientData { min: 3, .. })
        ));
    }

    #[test]
    fn test_requires_two_problems() {
        let rt = table(vec![vec![1.0, 2.0, 3.0]], false);
        assert!(matches!(
            friedman(&rt),
            Err(StatError::InsufficientData { min: 2, .. })
        ));
    }

    #[test]
    fn test_statistic_against_reference() {
        // Worked example: 4 problems, 3 algorithms, no ties.
        // Ranks per row: [1,2,3] each time -> R = (1, 2, 3)
        // chi2 = 12*4/(3*4) * ((1+4+9) - 3*16/4) = 4 * 2 = 8
        let rows = vec![vec![0.1, 0.2, 0.3]; 4];
        let rt = table(rows, false);
        let r = friedman(&rt).unwrap();
        assert!((r.statistic - 8.0).abs() < 1e-9);
        assert_eq!(r.df, 2);
        // p = sf(8, 2) = exp(-4) ~ 0.0183
        assert!((r.p_value - (-4.0f64).exp()).abs() < 1e-6);
    }
}
