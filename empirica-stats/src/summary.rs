//! Sample Summaries
//!
//! Central value and spread for one (algorithm, problem, metric) sample, plus
//! the normality pre-check that decides whether mean/std-dev or median/IQR is
//! the honest summary pair.

use crate::distributions::chi_square_sf;
use serde::{Deserialize, Serialize};

/// How a sample collapses to a single central value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Median (robust default for skewed metric distributions)
    #[default]
    Median,
    /// Arithmetic mean
    Mean,
}

impl std::str::FromStr for Aggregation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "median" => Ok(Aggregation::Median),
            "mean" => Ok(Aggregation::Mean),
            other => Err(format!("unknown aggregation: {}", other)),
        }
    }
}

/// Descriptive statistics of one sample
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SampleSummary {
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator)
    pub std_dev: f64,
    /// Median
    pub median: f64,
    /// First quartile
    pub q1: f64,
    /// Third quartile
    pub q3: f64,
    /// Sample size
    pub n: usize,
}

impl SampleSummary {
    /// Interquartile range
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Central value under the given aggregation
    pub fn central(&self, aggregation: Aggregation) -> f64 {
        match aggregation {
            Aggregation::Median => self.median,
            Aggregation::Mean => self.mean,
        }
    }

    /// Spread companion of [`Self::central`]: IQR for median, std-dev for mean
    pub fn spread(&self, aggregation: Aggregation) -> f64 {
        match aggregation {
            Aggregation::Median => self.iqr(),
            Aggregation::Mean => self.std_dev,
        }
    }
}

/// Summarize a sample. Empty input yields an all-zero summary.
pub fn summarize(samples: &[f64]) -> SampleSummary {
    let n = samples.len();
    if n == 0 {
        return SampleSummary {
            mean: 0.0,
            std_dev: 0.0,
            median: 0.0,
            q1: 0.0,
            q3: 0.0,
            n: 0,
        };
    }

    let mean = samples.iter().sum::<f64>() / n as f64;
    let std_dev = if n > 1 {
        (samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        0.0
    };

    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    SampleSummary {
        mean,
        std_dev,
        median: quantile_sorted(&sorted, 0.5),
        q1: quantile_sorted(&sorted, 0.25),
        q3: quantile_sorted(&sorted, 0.75),
        n,
    }
}

/// Linear-interpolation quantile of pre-sorted data
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = q * (n - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Jarque-Bera normality pre-check.
///
/// Returns true when the sample is consistent with normality at the given
/// level. Samples smaller than 8 observations report false: the moment-based
/// statistic is too unstable to certify anything, and the robust
/// median-based summaries are the safe choice.
pub fn is_normal(samples: &[f64], alpha: f64) -> bool {
    let n = samples.len();
    if n < 8 {
        return false;
    }
    let nf = n as f64;
    let mean = samples.iter().sum::<f64>() / nf;
    let m2 = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / nf;
    if m2 <= 0.0 {
        return false;
    }
    let m3 = samples.iter().map(|x| (x - mean).powi(3)).sum::<f64>() / nf;
    let m4 = samples.iter().map(|x| (x - mean).powi(4)).sum::<f64>() / nf;

    let skewness = m3 / m2.powf(1.5);
    let kurtosis = m4 / (m2 * m2);

    let jb = nf / 6.0 * (skewness * skewness + (kurtosis - 3.0).powi(2) / 4.0);
    chi_square_sf(jb, 2) > alpha
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_odd_sample() {
        let s = summarize(&[5.0, 1.0, 3.0, 2.0, 4.0]);
        assert_eq!(s.median, 3.0);
        assert_eq!(s.mean, 3.0);
        assert_eq!(s.q1, 2.0);
        assert_eq!(s.q3, 4.0);
        assert!((s.iqr() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_summary_even_sample() {
        let s = summarize(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.median, 2.5);
    }

    #[test]
    fn test_summary_empty_and_single() {
        assert_eq!(summarize(&[]).n, 0);
        let s = summarize(&[7.0]);
        assert_eq!(s.median, 7.0);
        assert_eq!(s.std_dev, 0.0);
    }

    #[test]
    fn test_central_and_spread_selection() {
        let s = summarize(&[1.0, 2.0, 3.0, 4.0, 100.0]);
        assert_eq!(s.central(Aggregation::Median), 3.0);
        assert_eq!(s.central(Aggregation::Mean), 22.0);
        assert_eq!(s.spread(Aggregation::Median), s.iqr());
        assert_eq!(s.spread(Aggregation::Mean), s.std_dev);
    }

    #[test]
    fn test_normality_check_rejects_skew() {
        // Heavily skewed sample
        let skewed: Vec<f64> = (0..40).map(|i| (i as f64 / 4.0).exp()).collect();
        assert!(!is_normal(&skewed, 0.05));
    }

    #[test]
    fn test_normality_check_accepts_symmetric_bell() {
        // Symmetric, light-tailed values from a fixed triangular-ish shape
        let mut vals = Vec::new();
        for i in 0..50 {
            let u = (i as f64 + 0.5) / 50.0;
            // Inverse-CDF-ish symmetric spread around zero
            vals.push((u - 0.5) * (1.0 - (2.0 * u - 1.0).abs() / 2.0) * 10.0);
        }
        assert!(is_normal(&vals, 0.01));
    }

    #[test]
    fn test_normality_small_sample_defaults_false() {
        assert!(!is_normal(&[1.0, 2.0, 3.0], 0.05));
    }
}
