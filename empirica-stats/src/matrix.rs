//! Matched Observation Matrix
//!
//! A problem-by-algorithm matrix of aggregated metric values, matched so that
//! row `i` holds every algorithm's value on the same problem. This is the
//! common input shape for the ranking engine, the Wilcoxon family, and the
//! Bayesian tests.

use crate::StatError;
use serde::{Deserialize, Serialize};

/// Problem-major matrix of metric values, one column per algorithm
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedMatrix {
    /// Algorithm names, in column order
    pub algorithms: Vec<String>,
    /// Problem names, in row order
    pub problems: Vec<String>,
    /// `values[problem_idx][algorithm_idx]`
    pub values: Vec<Vec<f64>>,
}

impl MatchedMatrix {
    /// Build a matrix, checking that every row matches the algorithm count
    pub fn new(
        algorithms: Vec<String>,
        problems: Vec<String>,
        values: Vec<Vec<f64>>,
    ) -> Result<Self, StatError> {
        if values.len() != problems.len() {
            return Err(StatError::DegenerateInput {
                reason: format!(
                    "expected {} rows, got {}",
                    problems.len(),
                    values.len()
                ),
            });
        }
        for (i, row) in values.iter().enumerate() {
            if row.len() != algorithms.len() {
                return Err(StatError::DegenerateInput {
                    reason: format!(
                        "row {} has {} values for {} algorithms",
                        i,
                        row.len(),
                        algorithms.len()
                    ),
                });
            }
        }
        Ok(Self {
            algorithms,
            problems,
            values,
        })
    }

    /// Number of algorithms (columns)
    pub fn n_algorithms(&self) -> usize {
        self.algorithms.len()
    }

    /// Number of problems (rows)
    pub fn n_problems(&self) -> usize {
        self.problems.len()
    }

    /// Column index of an algorithm by name
    pub fn algorithm_index(&self, name: &str) -> Result<usize, StatError> {
        self.algorithms
            .iter()
            .position(|a| a == name)
            .ok_or_else(|| StatError::UnknownAlgorithm(name.to_string()))
    }

    /// All matched values for one algorithm, in problem order
    pub fn column(&self, algorithm_idx: usize) -> Vec<f64> {
        self.values.iter().map(|row| row[algorithm_idx]).collect()
    }

    /// Matched value pairs `(a, b)` for two algorithm columns, in problem order
    pub fn paired(&self, a_idx: usize, b_idx: usize) -> Vec<(f64, f64)> {
        self.values
            .iter()
            .map(|row| (row[a_idx], row[b_idx]))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix() -> MatchedMatrix {
        MatchedMatrix::new(
            vec!["A".into(), "B".into()],
            vec!["p1".into(), "p2".into(), "p3".into()],
            vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]],
        )
        .unwrap()
    }

    #[test]
    fn test_column_extraction() {
        let m = matrix();
        assert_eq!(m.column(0), vec![1.0, 2.0, 3.0]);
        assert_eq!(m.column(1), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_paired_extraction() {
        let m = matrix();
        assert_eq!(m.paired(0, 1), vec![(1.0, 4.0), (2.0, 5.0), (3.0, 6.0)]);
    }

    #[test]
    fn test_algorithm_index() {
        let m = matrix();
        assert_eq!(m.algorithm_index("B").unwrap(), 1);
        assert!(matches!(
            m.algorithm_index("C"),
            Err(StatError::UnknownAlgorithm(_))
        ));
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let r = MatchedMatrix::new(
            vec!["A".into(), "B".into()],
            vec!["p1".into()],
            vec![vec![1.0]],
        );
        assert!(matches!(r, Err(StatError::DegenerateInput { .. })));
    }
}
