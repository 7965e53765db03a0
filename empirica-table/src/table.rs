//! Observation Table
//!
//! Immutable, validated collection of measurements plus the per-metric
//! direction flags. Construction performs all referential-integrity checks;
//! afterwards the table only hands out derived values.

use crate::TableError;
use empirica_stats::{Aggregation, MatchedMatrix, is_normal, summarize};
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

/// One raw measurement row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    /// Algorithm that produced the value
    pub algorithm: String,
    /// Problem instance the algorithm ran on
    pub problem: String,
    /// Metric the value belongs to
    pub metric: String,
    /// Index of the independent repetition
    pub execution_id: u32,
    /// Measured metric value
    pub value: f64,
}

/// Direction flag for one metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Metric name, referenced by the data table
    pub metric: String,
    /// True when larger values are better
    pub maximize: bool,
}

/// Central/spread matrices of one metric, aggregated per (problem, algorithm)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedMetric {
    /// Metric name
    pub metric: String,
    /// Direction flag from the metric spec
    pub maximize: bool,
    /// Aggregation that produced the central values
    pub aggregation: Aggregation,
    /// Central value per (problem, algorithm)
    pub central: MatchedMatrix,
    /// Spread companion: IQR for median aggregation, std-dev for mean
    pub spread: MatchedMatrix,
}

/// Validated, immutable observation table
#[derive(Debug, Clone)]
pub struct ObservationTable {
    observations: Vec<Observation>,
    specs: Vec<MetricSpec>,
    metric_names: Vec<String>,
    algorithms: Vec<String>,
    problems: Vec<String>,
    samples: FxHashMap<(String, String, String), Vec<f64>>,
}

impl ObservationTable {
    /// Build and validate a table from raw rows and metric specs.
    ///
    /// Rejects empty inputs, duplicate metric declarations, data rows whose
    /// metric is undeclared, and non-finite values.
    pub fn new(
        observations: Vec<Observation>,
        specs: Vec<MetricSpec>,
    ) -> Result<Self, TableError> {
        if observations.is_empty() {
            return Err(TableError::EmptyTable("data"));
        }
        if specs.is_empty() {
            return Err(TableError::EmptyTable("metrics"));
        }

        let mut declared: FxHashMap<&str, bool> = FxHashMap::default();
        for spec in &specs {
            if declared.insert(spec.metric.as_str(), spec.maximize).is_some() {
                return Err(TableError::DuplicateMetric(spec.metric.clone()));
            }
        }

        let mut metric_names = Vec::new();
        let mut algorithms = Vec::new();
        let mut problems = Vec::new();
        let mut samples: FxHashMap<(String, String, String), Vec<f64>> = FxHashMap::default();

        for obs in &observations {
            if !declared.contains_key(obs.metric.as_str()) {
                return Err(TableError::UnknownMetric(obs.metric.clone()));
            }
            if !obs.value.is_finite() {
                return Err(TableError::NonFiniteValue {
                    algorithm: obs.algorithm.clone(),
                    problem: obs.problem.clone(),
                    metric: obs.metric.clone(),
                    execution_id: obs.execution_id,
                });
            }

            push_unique(&mut metric_names, &obs.metric);
            push_unique(&mut algorithms, &obs.algorithm);
            push_unique(&mut problems, &obs.problem);

            samples
                .entry((
                    obs.metric.clone(),
                    obs.problem.clone(),
                    obs.algorithm.clone(),
                ))
                .or_default()
                .push(obs.value);
        }

        Ok(Self {
            observations,
            specs,
            metric_names,
            algorithms,
            problems,
            samples,
        })
    }

    /// Metric names that actually occur in the data, in first-seen order
    pub fn metrics(&self) -> &[String] {
        &self.metric_names
    }

    /// Algorithm names in first-seen order
    pub fn algorithms(&self) -> &[String] {
        &self.algorithms
    }

    /// Problem names in first-seen order
    pub fn problems(&self) -> &[String] {
        &self.problems
    }

    /// All raw observations
    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Direction flag of a metric
    pub fn maximize(&self, metric: &str) -> Result<bool, TableError> {
        self.specs
            .iter()
            .find(|s| s.metric == metric)
            .map(|s| s.maximize)
            .ok_or_else(|| TableError::UnknownMetric(metric.to_string()))
    }

    /// Raw sample for one (metric, problem, algorithm) cell, if present
    pub fn sample(&self, metric: &str, problem: &str, algorithm: &str) -> Option<&[f64]> {
        self.samples
            .get(&(
                metric.to_string(),
                problem.to_string(),
                algorithm.to_string(),
            ))
            .map(Vec::as_slice)
    }

    /// Pick mean aggregation when every sample of the metric passes the
    /// normality pre-check, median otherwise (the robust default).
    pub fn auto_aggregation(&self, metric: &str) -> Result<Aggregation, TableError> {
        self.maximize(metric)?; // validates the name
        let mut all_normal = true;
        for ((m, _, _), sample) in &self.samples {
            if m == metric && !is_normal(sample, 0.05) {
                all_normal = false;
                break;
            }
        }
        Ok(if all_normal {
            Aggregation::Mean
        } else {
            Aggregation::Median
        })
    }

    /// Collapse one metric into matched central/spread matrices.
    ///
    /// Every (problem, algorithm) cell of the metric must hold at least one
    /// observation; a hole would silently break the pairing the downstream
    /// tests rely on, so it is an error.
    pub fn aggregated(
        &self,
        metric: &str,
        aggregation: Aggregation,
    ) -> Result<AggregatedMetric, TableError> {
        let maximize = self.maximize(metric)?;

        // Restrict to the algorithms/problems this metric actually covers
        let mut algorithms = Vec::new();
        let mut problems = Vec::new();
        for obs in &self.observations {
            if obs.metric == metric {
                push_unique(&mut algorithms, &obs.algorithm);
                push_unique(&mut problems, &obs.problem);
            }
        }

        let mut central_rows = Vec::with_capacity(problems.len());
        let mut spread_rows = Vec::with_capacity(problems.len());
        for problem in &problems {
            let mut central_row = Vec::with_capacity(algorithms.len());
            let mut spread_row = Vec::with_capacity(algorithms.len());
            for algorithm in &algorithms {
                let sample = self.sample(metric, problem, algorithm).ok_or_else(|| {
                    TableError::MissingSample {
                        algorithm: algorithm.clone(),
                        problem: problem.clone(),
                        metric: metric.to_string(),
                    }
                })?;
                let summary = summarize(sample);
                central_row.push(summary.central(aggregation));
                spread_row.push(summary.spread(aggregation));
            }
            central_rows.push(central_row);
            spread_rows.push(spread_row);
        }

        let central = MatchedMatrix::new(algorithms.clone(), problems.clone(), central_rows)?;
        let spread = MatchedMatrix::new(algorithms, problems, spread_rows)?;

        Ok(AggregatedMetric {
            metric: metric.to_string(),
            maximize,
            aggregation,
            central,
            spread,
        })
    }
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(alg: &str, prob: &str, metric: &str, exec: u32, value: f64) -> Observation {
        Observation {
            algorithm: alg.into(),
            problem: prob.into(),
            metric: metric.into(),
            execution_id: exec,
            value,
        }
    }

    fn spec(metric: &str, maximize: bool) -> MetricSpec {
        MetricSpec {
            metric: metric.into(),
            maximize,
        }
    }

    fn small_table() -> ObservationTable {
        let mut rows = Vec::new();
        for (alg, base) in [("A", 0.9), ("B", 0.5)] {
            for prob in ["p1", "p2"] {
                for exec in 0..3 {
                    rows.push(obs(alg, prob, "HV", exec, base + exec as f64 * 0.01));
                }
            }
        }
        ObservationTable::new(rows, vec![spec("HV", true)]).unwrap()
    }

    #[test]
    fn test_first_seen_order() {
        let t = small_table();
        assert_eq!(t.algorithms(), ["A", "B"]);
        assert_eq!(t.problems(), ["p1", "p2"]);
        assert_eq!(t.metrics(), ["HV"]);
        assert!(t.maximize("HV").unwrap());
    }

    #[test]
    fn test_sample_lookup() {
        let t = small_table();
        let s = t.sample("HV", "p1", "A").unwrap();
        assert_eq!(s.len(), 3);
        assert!(t.sample("HV", "p1", "C").is_none());
    }

    #[test]
    fn test_unknown_metric_rejected() {
        let r = ObservationTable::new(
            vec![obs("A", "p", "IGD", 0, 1.0)],
            vec![spec("HV", true)],
        );
        assert!(matches!(r, Err(TableError::UnknownMetric(_))));
    }

    #[test]
    fn test_duplicate_spec_rejected() {
        let r = ObservationTable::new(
            vec![obs("A", "p", "HV", 0, 1.0)],
            vec![spec("HV", true), spec("HV", false)],
        );
        assert!(matches!(r, Err(TableError::DuplicateMetric(_))));
    }

    #[test]
    fn test_non_finite_rejected() {
        let r = ObservationTable::new(
            vec![obs("A", "p", "HV", 0, f64::NAN)],
            vec![spec("HV", true)],
        );
        assert!(matches!(r, Err(TableError::NonFiniteValue { .. })));
    }

    #[test]
    fn test_aggregated_median() {
        let t = small_table();
        let agg = t.aggregated("HV", Aggregation::Median).unwrap();
        assert_eq!(agg.central.n_problems(), 2);
        assert_eq!(agg.central.n_algorithms(), 2);
        // Medians of {0.9, 0.91, 0.92} and {0.5, 0.51, 0.52}
        assert!((agg.central.values[0][0] - 0.91).abs() < 1e-12);
        assert!((agg.central.values[0][1] - 0.51).abs() < 1e-12);
    }

    #[test]
    fn test_aggregated_missing_cell() {
        let rows = vec![
            obs("A", "p1", "HV", 0, 1.0),
            obs("B", "p1", "HV", 0, 2.0),
            obs("A", "p2", "HV", 0, 1.5),
            // B never ran on p2
        ];
        let t = ObservationTable::new(rows, vec![spec("HV", true)]).unwrap();
        assert!(matches!(
            t.aggregated("HV", Aggregation::Median),
            Err(TableError::MissingSample { .. })
        ));
    }

    #[test]
    fn test_auto_aggregation_prefers_median_for_tiny_samples() {
        let t = small_table();
        assert_eq!(t.auto_aggregation("HV").unwrap(), Aggregation::Median);
    }
}
