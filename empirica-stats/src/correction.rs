//! Multiple-Comparison Correction
//!
//! Adjusts a family of p-values produced by repeated pairwise testing.
//! Which procedure to apply is an explicit configuration choice, never an
//! implicit default buried in a test call.

use serde::{Deserialize, Serialize};

/// Family-wise error correction procedure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Correction {
    /// Holm step-down procedure (uniformly more powerful than Bonferroni)
    #[default]
    Holm,
    /// Plain Bonferroni: multiply every p-value by the family size
    Bonferroni,
    /// No correction
    None,
}

impl std::str::FromStr for Correction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "holm" => Ok(Correction::Holm),
            "bonferroni" => Ok(Correction::Bonferroni),
            "none" => Ok(Correction::None),
            other => Err(format!("unknown correction: {}", other)),
        }
    }
}

/// Adjust a family of p-values, preserving input order
pub fn adjust_p_values(p_values: &[f64], correction: Correction) -> Vec<f64> {
    match correction {
        Correction::None => p_values.to_vec(),
        Correction::Bonferroni => {
            let m = p_values.len() as f64;
            p_values.iter().map(|p| (p * m).min(1.0)).collect()
        }
        Correction::Holm => holm(p_values),
    }
}

/// Holm step-down adjustment.
///
/// Sorts the p-values ascending, multiplies the i-th smallest by (m - i),
/// enforces monotonicity of the adjusted sequence, and maps back to the
/// original order.
fn holm(p_values: &[f64]) -> Vec<f64> {
    let m = p_values.len();
    let mut order: Vec<usize> = (0..m).collect();
    order.sort_by(|&a, &b| {
        p_values[a]
            .partial_cmp(&p_values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut adjusted = vec![0.0; m];
    let mut running_max: f64 = 0.0;
    for (i, &idx) in order.iter().enumerate() {
        let scaled = (p_values[idx] * (m - i) as f64).min(1.0);
        running_max = running_max.max(scaled);
        adjusted[idx] = running_max;
    }
    adjusted
}
