//! Wilcoxon Signed-Rank Test
//!
//! Paired non-parametric test comparing two algorithms over matched problems.
//! Zero differences are discarded per the standard convention, absolute
//! differences are ranked with tie-averaging, and the p-value is exact for
//! small samples (full enumeration of the signed-rank null distribution) or a
//! normal approximation with tie and continuity corrections beyond a
//! configurable threshold. The exact-vs-approximate switch is a documented
//! policy, never a silent fallback from a failure.

use crate::correction::{Correction, adjust_p_values};
use crate::distributions::normal_cdf;
use crate::matrix::MatchedMatrix;
use crate::ranking::rank_values_with_tolerance;
use crate::{DEFAULT_EXACT_THRESHOLD, DEFAULT_TIE_TOLERANCE, MIN_WILCOXON_PAIRS, StatError};
use serde::{Deserialize, Serialize};

/// Configuration for the Wilcoxon family
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WilcoxonConfig {
    /// Significance level used by consumers to interpret the result
    pub alpha: f64,
    /// Correction applied across the family of p-values in pivot/pairwise mode
    pub correction: Correction,
    /// Largest n for which the exact null distribution is enumerated
    pub exact_threshold: usize,
    /// Differences with absolute value at or below this are treated as zero
    pub zero_tolerance: f64,
}

impl Default for WilcoxonConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            correction: Correction::default(),
            exact_threshold: DEFAULT_EXACT_THRESHOLD,
            zero_tolerance: DEFAULT_TIE_TOLERANCE,
        }
    }
}

/// Which procedure produced the p-value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PValueMethod {
    /// Full enumeration of the signed-rank null distribution
    Exact,
    /// Normal approximation with tie and continuity corrections
    NormalApprox,
}

/// Effect direction of a paired comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The first algorithm's values tend higher
    FirstGreater,
    /// The second algorithm's values tend higher
    SecondGreater,
    /// Signed ranks balance exactly
    None,
}

impl Direction {
    /// Direction with the roles of the two algorithms swapped
    pub fn flipped(self) -> Self {
        match self {
            Direction::FirstGreater => Direction::SecondGreater,
            Direction::SecondGreater => Direction::FirstGreater,
            Direction::None => Direction::None,
        }
    }
}

/// Result of one Wilcoxon signed-rank comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WilcoxonResult {
    /// W statistic: the smaller of the positive and negative rank sums
    pub statistic: f64,
    /// Two-sided p-value
    pub p_value: f64,
    /// p-value after family-wise correction (equals `p_value` for a single test)
    pub corrected_p_value: f64,
    /// Effect direction on the raw values
    pub direction: Direction,
    /// Number of non-zero differences the test used
    pub n_used: usize,
    /// Exact enumeration or normal approximation
    pub method: PValueMethod,
}

/// Wilcoxon signed-rank test on matched value pairs `(a, b)`.
///
/// Fails with [`StatError::InsufficientData`] when fewer than
/// [`MIN_WILCOXON_PAIRS`] non-zero differences remain; below that the exact
/// two-sided test cannot reach significance at 0.05, so a p-value would be
/// meaningless rather than merely weak.
pub fn wilcoxon_signed_rank(
    pairs: &[(f64, f64)],
    config: &WilcoxonConfig,
) -> Result<WilcoxonResult, StatError> {
    let diffs: Vec<f64> = pairs
        .iter()
        .map(|&(a, b)| a - b)
        .filter(|d| d.abs() > config.zero_tolerance)
        .collect();

    let n = diffs.len();
    if n < MIN_WILCOXON_PAIRS {
        return Err(StatError::InsufficientData {
            test: "wilcoxon",
            got: n,
            min: MIN_WILCOXON_PAIRS,
        });
    }

    let abs_diffs: Vec<f64> = diffs.iter().map(|d| d.abs()).collect();
    let ranks = rank_values_with_tolerance(&abs_diffs, false, config.zero_tolerance);

    let mut w_plus = 0.0;
    let mut w_minus = 0.0;
    for (d, r) in diffs.iter().zip(&ranks) {
        if *d > 0.0 {
            w_plus += r;
        } else {
            w_minus += r;
        }
    }
    let statistic = w_plus.min(w_minus);

    let direction = if w_plus > w_minus {
        Direction::FirstGreater
    } else if w_minus > w_plus {
        Direction::SecondGreater
    } else {
        Direction::None
    };

    let has_ties = has_tied_magnitudes(&abs_diffs, config.zero_tolerance);

    let (p_value, method) = if n <= config.exact_threshold && !has_ties {
        (exact_p_value(statistic, n), PValueMethod::Exact)
    } else {
        (
            approx_p_value(w_plus, &abs_diffs, config.zero_tolerance)?,
            PValueMethod::NormalApprox,
        )
    };

    Ok(WilcoxonResult {
        statistic,
        p_value,
        corrected_p_value: p_value,
        direction,
        n_used: n,
        method,
    })
}

/// Compare one pivot algorithm against every other algorithm of the matrix.
///
/// Returns `(algorithm, result)` in column order, pivot excluded, with
/// `corrected_p_value` adjusted across the whole family per the configured
/// correction.
pub fn wilcoxon_pivot(
    matrix: &MatchedMatrix,
    pivot: &str,
    config: &WilcoxonConfig,
) -> Result<Vec<(String, WilcoxonResult)>, StatError> {
    let pivot_idx = matrix.algorithm_index(pivot)?;

    let mut results = Vec::new();
    for (idx, name) in matrix.algorithms.iter().enumerate() {
        if idx == pivot_idx {
            continue;
        }
        let pairs = matrix.paired(pivot_idx, idx);
        let result = wilcoxon_signed_rank(&pairs, config)?;
        results.push((name.clone(), result));
    }

    apply_correction(results.iter_mut().map(|(_, r)| r), config.correction);
    Ok(results)
}

/// Compare every unordered pair of algorithms in the matrix.
///
/// Returns `((first, second), result)` for all column pairs `i < j`, with
/// `corrected_p_value` adjusted across the full set of pairs.
pub fn wilcoxon_pairwise(
    matrix: &MatchedMatrix,
    config: &WilcoxonConfig,
) -> Result<Vec<((String, String), WilcoxonResult)>, StatError> {
    let k = matrix.n_algorithms();
    if k < 2 {
        return Err(StatError::InsufficientData {
            test: "wilcoxon",
            got: k,
            min: 2,
        });
    }

    let mut results = Vec::new();
    for i in 0..k {
        for j in (i + 1)..k {
            let pairs = matrix.paired(i, j);
            let result = wilcoxon_signed_rank(&pairs, config)?;
            results.push((
                (matrix.algorithms[i].clone(), matrix.algorithms[j].clone()),
                result,
            ));
        }
    }

    apply_correction(results.iter_mut().map(|(_, r)| r), config.correction);
    Ok(results)
}

fn apply_correction<'a>(
    results: impl Iterator<Item = &'a mut WilcoxonResult>,
    correction: Correction,
) {
    let mut results: Vec<&mut WilcoxonResult> = results.collect();
    let raw: Vec<f64> = results.iter().map(|r| r.p_value).collect();
    let adjusted = adjust_p_values(&raw, correction);
    for (r, adj) in results.iter_mut().zip(adjusted) {
        r.corrected_p_value = adj;
    }
}

fn has_tied_magnitudes(abs_diffs: &[f64], tolerance: f64) -> bool {
    let mut sorted = abs_diffs.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted.windows(2).any(|w| (w[1] - w[0]).abs() <= tolerance)
}

/// Exact two-sided p-value by enumerating the signed-rank null distribution.
///
/// `counts[w]` is the number of sign assignments over ranks 1..n whose
/// positive-rank sum equals w; under the null each of the 2^n assignments is
/// equally likely. Only valid without tied magnitudes (integer ranks).
fn exact_p_value(statistic: f64, n: usize) -> f64 {
    let max_w = n * (n + 1) / 2;
    let mut counts = vec![0u64; max_w + 1];
    counts[0] = 1;
    for rank in 1..=n {
        for w in (rank..=max_w).rev() {
            counts[w] += counts[w - rank];
        }
    }

    let w = statistic.round() as usize;
    let below: u64 = counts[..=w.min(max_w)].iter().sum();
    let total = 2f64.powi(n as i32);
    (2.0 * below as f64 / total).min(1.0)
}

/// Normal approximation with tie correction and continuity correction
fn approx_p_value(w_plus: f64, abs_diffs: &[f64], tolerance: f64) -> Result<f64, StatError> {
    let n = abs_diffs.len() as f64;
    let mean = n * (n + 1.0) / 4.0;

    // Tie correction: subtract sum(t^3 - t)/48 over tie groups of |d|
    let mut sorted = abs_diffs.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && (sorted[j] - sorted[j - 1]).abs() <= tolerance {
            j += 1;
        }
        let t = (j - i) as f64;
        tie_term += t * t * t - t;
        i = j;
    }

    let variance = n * (n + 1.0) * (2.0 * n + 1.0) / 24.0 - tie_term / 48.0;
    if variance <= 0.0 {
        return Err(StatError::DegenerateInput {
            reason: "zero variance in signed ranks".to_string(),
        });
    }

    let mut z = w_plus - mean;
    // Continuity correction towards the mean
    z -= 0.5 * z.signum();
    z /= variance.sqrt();

    Ok((2.0 * (1.0 - normal_cdf(z.abs()))).min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shifted_pairs(n: usize, shift: f64) -> Vec<(f64, f64)> {
        (0..n)
            .map(|i| {
                let base = 1.0 + i as f64 * 0.37;
                (base + shift + i as f64 * 0.01, base)
            })
            .collect()
    }

    #[test]
    fn test_all_positive_differences_exact() {
        // Six strictly positive differences: W- = 0, exact p = 2/2^6 = 0.03125
        let pairs = shifted_pairs(6, 0.5);
        let r = wilcoxon_signed_rank(&pairs, &WilcoxonConfig::default()).unwrap();
        assert_eq!(r.method, PValueMethod::Exact);
        assert_eq!(r.statistic, 0.0);
        assert!((r.p_value - 0.03125).abs() < 1e-12);
        assert_eq!(r.direction, Direction::FirstGreater);
    }

    #[test]
    fn test_symmetry_of_pair_order() {
        let pairs = shifted_pairs(10, 0.2);
        let swapped: Vec<(f64, f64)> = pairs.iter().map(|&(a, b)| (b, a)).collect();
        let cfg = WilcoxonConfig::default();
        let r1 = wilcoxon_signed_rank(&pairs, &cfg).unwrap();
        let r2 = wilcoxon_signed_rank(&swapped, &cfg).unwrap();
        assert_eq!(r1.p_value, r2.p_value);
        assert_eq!(r1.statistic, r2.statistic);
        assert_eq!(r1.direction, r2.direction.flipped());
    }

    #[test]
    fn test_zero_differences_discarded() {
        let mut pairs = shifted_pairs(8, 0.3);
        pairs.push((5.0, 5.0));
        pairs.push((7.0, 7.0));
        let r = wilcoxon_signed_rank(&pairs, &WilcoxonConfig::default()).unwrap();
        assert_eq!(r.n_used, 8);
    }

    #[test]
    fn test_insufficient_nonzero_differences() {
        // Ten pairs but only five non-zero differences
        let mut pairs = vec![(3.0, 3.0); 5];
        pairs.extend(shifted_pairs(5, 0.4));
        let r = wilcoxon_signed_rank(&pairs, &WilcoxonConfig::default());
        assert!(matches!(
            r,
            Err(StatError::InsufficientData { got: 5, min: 6, .. })
        ));
    }

    #[test]
    fn test_two_observations_insufficient_not_nan() {
        let r = wilcoxon_signed_rank(&[(1.0, 2.0)], &WilcoxonConfig::default());
        assert!(matches!(r, Err(StatError::InsufficientData { .. })));
    }

    #[test]
    fn test_ties_switch_to_normal_approximation() {
        // All differences share the same magnitude
        let pairs: Vec<(f64, f64)> = (0..8).map(|i| (i as f64 + 0.5, i as f64)).collect();
        let r = wilcoxon_signed_rank(&pairs, &WilcoxonConfig::default()).unwrap();
        assert_eq!(r.method, PValueMethod::NormalApprox);
        assert!(r.p_value.is_finite());
    }

    #[test]
    fn test_threshold_switches_to_approximation() {
        let pairs = shifted_pairs(30, 0.2);
        let r = wilcoxon_signed_rank(&pairs, &WilcoxonConfig::default()).unwrap();
        assert_eq!(r.method, PValueMethod::NormalApprox);
        // A consistent positive shift over 30 pairs is clearly significant
        assert!(r.p_value < 0.01);
    }

    #[test]
    fn test_exact_matches_known_table_value() {
        // n = 8, W = 3: exact two-sided p = 2 * P(W <= 3) = 2 * 5/256
        let p = exact_p_value(3.0, 8);
        assert!((p - 2.0 * 5.0 / 256.0).abs() < 1e-12);
    }

    fn pivot_matrix() -> MatchedMatrix {
        let problems: Vec<String> = (0..10).map(|i| format!("p{i}")).collect();
        let values: Vec<Vec<f64>> = (0..10)
            .map(|i| {
                let x = i as f64 * 0.13;
                vec![0.9 + x, 0.5 + x * 1.01, 0.7 + x * 0.99]
            })
            .collect();
        MatchedMatrix::new(
            vec!["A".into(), "B".into(), "C".into()],
            problems,
            values,
        )
        .unwrap()
    }

    #[test]
    fn test_pivot_mode() {
        let m = pivot_matrix();
        let results = wilcoxon_pivot(&m, "A", &WilcoxonConfig::default()).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "B");
        assert_eq!(results[1].0, "C");
        for (_, r) in &results {
            // A dominates both, so A (first element of each pair) tends higher
            assert_eq!(r.direction, Direction::FirstGreater);
            assert!(r.corrected_p_value >= r.p_value);
        }
    }

    #[test]
    fn test_pairwise_mode_covers_all_pairs() {
        let m = pivot_matrix();
        let results = wilcoxon_pairwise(&m, &WilcoxonConfig::default()).unwrap();
        assert_eq!(results.len(), 3);
        let names: Vec<&(String, String)> = results.iter().map(|(p, _)| p).collect();
        assert_eq!(names[0], &("A".to_string(), "B".to_string()));
        assert_eq!(names[1], &("A".to_string(), "C".to_string()));
        assert_eq!(names[2], &("B".to_string(), "C".to_string()));
    }

    #[test]
    fn test_unknown_pivot() {
        let m = pivot_matrix();
        assert!(matches!(
            wilcoxon_pivot(&m, "Z", &WilcoxonConfig::default()),
            Err(StatError::UnknownAlgorithm(_))
        ));
    }
}
