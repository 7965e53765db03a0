//! Per-Metric Analysis Executor
//!
//! Runs the full test battery for each selected metric in parallel. A metric
//! is an isolation boundary: any error inside its analysis is logged, recorded
//! as a failure in the report, and does not stop the other metrics.

use chrono::Utc;
use empirica_report::{
    BayesianComparison, FailureInfo, MetricReport, PairwiseEntry, PivotComparison, Report,
    ReportMeta, SCHEMA_VERSION, SignMarker, generate_json_report, latex_friedman_table,
    latex_summary_table, latex_wilcoxon_grid, latex_wilcoxon_pivot_table, layout_cd_diagram,
};
use empirica_stats::{
    Aggregation, BayesianConfig, Correction, CriticalDistanceResult, Direction, MatchedMatrix,
    StatError, WilcoxonConfig, bayesian_sign_test, bayesian_signed_rank_test, critical_distance,
    friedman, rank_table, wilcoxon_pairwise, wilcoxon_pivot, wilcoxon_signed_rank,
};
use empirica_table::{AggregatedMetric, ObservationTable};
use rayon::prelude::*;
use std::fs;
use std::path::Path;

/// Knobs of one analysis run, shared by every metric
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Significance level for every frequentist test
    pub alpha: f64,
    /// Family-wise correction for the Wilcoxon families
    pub correction: Correction,
    /// Fixed aggregation, or `None` for the per-metric normality pre-check
    pub aggregation: Option<Aggregation>,
    /// Pivot algorithm; `None` picks the last algorithm of each metric
    pub pivot: Option<String>,
    /// Seed for the Bayesian tests
    pub seed: Option<u64>,
    /// Opt-in to OS-entropy seeding
    pub allow_unseeded: bool,
    /// Monte-Carlo draws per Bayesian test
    pub sample_size: usize,
    /// Leave the Bayesian tests out entirely
    pub skip_bayesian: bool,
    /// Data CSV path recorded in the report metadata
    pub data_path: Option<String>,
    /// Metrics CSV path recorded in the report metadata
    pub metrics_path: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            correction: Correction::default(),
            aggregation: None,
            pivot: None,
            seed: None,
            allow_unseeded: false,
            sample_size: empirica_stats::DEFAULT_SAMPLE_SIZE,
            skip_bayesian: false,
            data_path: None,
            metrics_path: None,
        }
    }
}

/// Run the battery for every selected metric, in parallel.
///
/// Never fails as a whole: metrics whose analysis aborts end up in
/// `report.failures` with the error that stopped them.
pub fn analyze(table: &ObservationTable, metrics: &[String], config: &AnalysisConfig) -> Report {
    let outcomes: Vec<Result<MetricReport, FailureInfo>> = metrics
        .par_iter()
        .map(|metric| {
            tracing::debug!(metric = %metric, "analyzing");
            analyze_metric(table, metric, config).map_err(|e| {
                tracing::error!(metric = %metric, error = %e, "metric analysis failed");
                FailureInfo {
                    metric: metric.clone(),
                    error: e.to_string(),
                }
            })
        })
        .collect();

    let mut results = Vec::new();
    let mut failures = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(report) => results.push(report),
            Err(failure) => failures.push(failure),
        }
    }

    Report {
        meta: ReportMeta {
            schema_version: SCHEMA_VERSION,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            data_path: config.data_path.clone(),
            metrics_path: config.metrics_path.clone(),
            alpha: config.alpha,
            correction: config.correction,
            seed: config.seed,
        },
        metrics: results,
        failures,
    }
}

fn analyze_metric(
    table: &ObservationTable,
    metric: &str,
    config: &AnalysisConfig,
) -> anyhow::Result<MetricReport> {
    let aggregation = match config.aggregation {
        Some(a) => a,
        None => table.auto_aggregation(metric)?,
    };
    let agg = table.aggregated(metric, aggregation)?;
    let k = agg.central.n_algorithms();
    let n = agg.central.n_problems();

    let ranks = rank_table(&agg.central, agg.maximize)?;
    let average_ranks = ranks.average_ranks();

    let friedman_result = if k >= 3 && n >= 2 {
        Some(friedman(&ranks)?)
    } else {
        tracing::debug!(metric, k, n, "Friedman omnibus not applicable");
        None
    };

    let critical = if friedman_result.is_some() {
        match critical_distance(&average_ranks, n, config.alpha) {
            Ok(result) => Some(result),
            Err(StatError::UnsupportedGroupCount { k, max }) => {
                tracing::warn!(metric, k, max, "no Nemenyi critical values, skipping");
                None
            }
            Err(e) => return Err(e.into()),
        }
    } else {
        None
    };

    let wilcoxon_config = WilcoxonConfig {
        alpha: config.alpha,
        correction: config.correction,
        ..WilcoxonConfig::default()
    };

    let pivot = config
        .pivot
        .clone()
        .unwrap_or_else(|| agg.central.algorithms[k - 1].clone());
    agg.central.algorithm_index(&pivot)?;

    let pivot_results = wilcoxon_pivot(&agg.central, &pivot, &wilcoxon_config)?;
    let pairwise = wilcoxon_pairwise(&agg.central, &wilcoxon_config)?
        .into_iter()
        .map(|((first, second), result)| PairwiseEntry {
            first,
            second,
            result,
        })
        .collect();

    let bayesian = if config.skip_bayesian {
        Vec::new()
    } else {
        bayesian_comparisons(&agg, &pivot, config)?
    };

    Ok(MetricReport {
        metric: metric.to_string(),
        maximize: agg.maximize,
        aggregation,
        algorithms: agg.central.algorithms.clone(),
        problems: agg.central.problems.clone(),
        average_ranks,
        friedman: friedman_result,
        wilcoxon_pivot: Some(PivotComparison {
            pivot,
            results: pivot_results,
        }),
        wilcoxon_pairwise: pairwise,
        critical_distance: critical,
        bayesian,
    })
}

fn bayesian_comparisons(
    agg: &AggregatedMetric,
    pivot: &str,
    config: &AnalysisConfig,
) -> anyhow::Result<Vec<BayesianComparison>> {
    let bayes_config = BayesianConfig {
        sample_size: config.sample_size,
        seed: config.seed,
        allow_unseeded: config.allow_unseeded,
        ..BayesianConfig::default()
    };

    let pivot_idx = agg.central.algorithm_index(pivot)?;
    let mut comparisons = Vec::new();
    for (idx, name) in agg.central.algorithms.iter().enumerate() {
        if idx == pivot_idx {
            continue;
        }
        let pairs = agg.central.paired(idx, pivot_idx);
        let (sign, _) = bayesian_sign_test(&pairs, &bayes_config)?;
        let (signed_rank, _) = bayesian_signed_rank_test(&pairs, &bayes_config)?;
        comparisons.push(BayesianComparison {
            first: name.clone(),
            second: pivot.to_string(),
            sign,
            signed_rank,
        });
    }
    Ok(comparisons)
}

/// Write all artifacts of a finished run into `out_dir`:
/// `{metric}_summary.tex`, `{metric}_friedman.tex`, `{metric}_pivot.tex`,
/// `{metric}_1vs1.tex`, `{metric}_cd.json` and the combined `report.json`.
///
/// The per-problem tables compare raw executions, so they can fail on inputs
/// the aggregated battery accepts (too few runs per cell); such a table is
/// skipped with a warning instead of dropping the rest of the artifacts.
pub fn write_artifacts(
    report: &Report,
    table: &ObservationTable,
    config: &AnalysisConfig,
    out_dir: &Path,
) -> anyhow::Result<()> {
    fs::create_dir_all(out_dir)?;

    for mr in &report.metrics {
        let agg = table.aggregated(&mr.metric, mr.aggregation)?;

        fs::write(
            out_dir.join(format!("{}_summary.tex", mr.metric)),
            latex_summary_table(&agg),
        )?;

        if agg.central.n_algorithms() >= 3 {
            match friedman_markers(table, &agg, config.alpha) {
                Ok(markers) => fs::write(
                    out_dir.join(format!("{}_friedman.tex", mr.metric)),
                    latex_friedman_table(&agg, &markers),
                )?,
                Err(e) => {
                    tracing::warn!(metric = %mr.metric, error = %e, "skipping Friedman table");
                }
            }
        }

        if let Some(pivot) = &mr.wilcoxon_pivot {
            match pivot_markers(table, &agg, &pivot.pivot, config.alpha) {
                Ok(symbols) => fs::write(
                    out_dir.join(format!("{}_pivot.tex", mr.metric)),
                    latex_wilcoxon_pivot_table(&agg, &pivot.pivot, &symbols),
                )?,
                Err(e) => {
                    tracing::warn!(metric = %mr.metric, error = %e, "skipping pivot table");
                }
            }
        }

        if agg.central.n_algorithms() >= 2 {
            match grid_cells(table, &agg, config.alpha) {
                Ok(cells) => fs::write(
                    out_dir.join(format!("{}_1vs1.tex", mr.metric)),
                    latex_wilcoxon_grid(&agg, &cells),
                )?,
                Err(e) => {
                    tracing::warn!(metric = %mr.metric, error = %e, "skipping 1vs1 grid");
                }
            }
        }

        if let Some(cd) = &mr.critical_distance {
            write_cd_layout(out_dir, &mr.metric, &mr.algorithms, cd)?;
        }
    }

    fs::write(out_dir.join("report.json"), generate_json_report(report)?)?;
    tracing::info!(dir = %out_dir.display(), "artifacts written");
    Ok(())
}

fn write_cd_layout(
    out_dir: &Path,
    metric: &str,
    algorithms: &[String],
    cd: &CriticalDistanceResult,
) -> anyhow::Result<()> {
    let diagram = layout_cd_diagram(algorithms, cd);
    fs::write(
        out_dir.join(format!("{}_cd.json", metric)),
        serde_json::to_string_pretty(&diagram)?,
    )?;
    Ok(())
}

/// Execution-major value rows for one (metric, problem), matched across
/// algorithms by run index. Algorithms with extra runs are truncated to the
/// shortest sample so every row stays a complete block.
fn execution_rows(
    table: &ObservationTable,
    metric: &str,
    problem: &str,
    algorithms: &[String],
) -> anyhow::Result<Vec<Vec<f64>>> {
    let mut samples = Vec::with_capacity(algorithms.len());
    for algorithm in algorithms {
        let sample = table
            .sample(metric, problem, algorithm)
            .ok_or_else(|| anyhow::anyhow!("no runs of {algorithm} on {problem} for {metric}"))?;
        samples.push(sample);
    }
    let runs = samples.iter().map(|s| s.len()).min().unwrap_or(0);
    Ok((0..runs)
        .map(|e| samples.iter().map(|s| s[e]).collect())
        .collect())
}

fn friedman_markers(
    table: &ObservationTable,
    agg: &AggregatedMetric,
    alpha: f64,
) -> anyhow::Result<Vec<SignMarker>> {
    let mut markers = Vec::with_capacity(agg.central.n_problems());
    for problem in &agg.central.problems {
        let rows = execution_rows(table, &agg.metric, problem, &agg.central.algorithms)?;
        let runs: Vec<String> = (0..rows.len()).map(|e| format!("run{e}")).collect();
        let matrix = MatchedMatrix::new(agg.central.algorithms.clone(), runs, rows)?;
        let result = friedman(&rank_table(&matrix, agg.maximize)?)?;
        markers.push(if result.p_value < alpha {
            SignMarker::Plus
        } else {
            SignMarker::Equal
        });
    }
    Ok(markers)
}

/// Symbol of a per-problem Wilcoxon comparison, judged for the `first`
/// algorithm of the pair: `+` significantly better, `-` worse, `=` neither.
fn comparison_marker(
    first: &[f64],
    second: &[f64],
    maximize: bool,
    alpha: f64,
) -> anyhow::Result<SignMarker> {
    let pairs: Vec<(f64, f64)> = first.iter().copied().zip(second.iter().copied()).collect();
    let config = WilcoxonConfig {
        alpha,
        correction: Correction::None,
        ..WilcoxonConfig::default()
    };
    let result = wilcoxon_signed_rank(&pairs, &config)?;
    if result.p_value >= alpha {
        return Ok(SignMarker::Equal);
    }
    Ok(match (result.direction, maximize) {
        (Direction::FirstGreater, true) | (Direction::SecondGreater, false) => SignMarker::Plus,
        (Direction::FirstGreater, false) | (Direction::SecondGreater, true) => SignMarker::Minus,
        (Direction::None, _) => SignMarker::Equal,
    })
}

fn pivot_markers(
    table: &ObservationTable,
    agg: &AggregatedMetric,
    pivot: &str,
    alpha: f64,
) -> anyhow::Result<Vec<Vec<SignMarker>>> {
    let mut symbols = Vec::with_capacity(agg.central.n_problems());
    for problem in &agg.central.problems {
        let pivot_sample = table
            .sample(&agg.metric, problem, pivot)
            .ok_or_else(|| anyhow::anyhow!("no runs of {pivot} on {problem}"))?;

        let mut row = Vec::with_capacity(agg.central.n_algorithms());
        for algorithm in &agg.central.algorithms {
            if algorithm == pivot {
                // Placeholder, the renderer leaves the pivot column blank
                row.push(SignMarker::Equal);
                continue;
            }
            let sample = table
                .sample(&agg.metric, problem, algorithm)
                .ok_or_else(|| anyhow::anyhow!("no runs of {algorithm} on {problem}"))?;
            let runs = sample.len().min(pivot_sample.len());
            row.push(comparison_marker(
                &sample[..runs],
                &pivot_sample[..runs],
                agg.maximize,
                alpha,
            )?);
        }
        symbols.push(row);
    }
    Ok(symbols)
}

fn grid_cells(
    table: &ObservationTable,
    agg: &AggregatedMetric,
    alpha: f64,
) -> anyhow::Result<Vec<Vec<String>>> {
    let k = agg.central.n_algorithms();
    let mut cells = vec![vec![String::new(); k]; k];
    for i in 0..k {
        for j in (i + 1)..k {
            let mut symbols = String::with_capacity(agg.central.n_problems());
            for problem in &agg.central.problems {
                let rows = execution_rows(
                    table,
                    &agg.metric,
                    problem,
                    &[
                        agg.central.algorithms[i].clone(),
                        agg.central.algorithms[j].clone(),
                    ],
                )?;
                let first: Vec<f64> = rows.iter().map(|r| r[0]).collect();
                let second: Vec<f64> = rows.iter().map(|r| r[1]).collect();
                let marker = comparison_marker(&first, &second, agg.maximize, alpha)?;
                symbols.push_str(match marker {
                    SignMarker::Plus => "+",
                    SignMarker::Minus => "-",
                    SignMarker::Equal => "=",
                });
            }
            cells[i][j] = symbols;
        }
    }
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use empirica_table::{MetricSpec, Observation};

    fn observation(alg: &str, prob: &str, metric: &str, exec: u32, value: f64) -> Observation {
        Observation {
            algorithm: alg.into(),
            problem: prob.into(),
            metric: metric.into(),
            execution_id: exec,
            value,
        }
    }

    /// Three algorithms, six problems, ten runs each; A clearly dominant
    fn dominant_table() -> ObservationTable {
        let mut rows = Vec::new();
        for (alg, base) in [("A", 0.9), ("B", 0.6), ("C", 0.3)] {
            for p in 0..6 {
                for e in 0..10 {
                    let value = base + p as f64 * 0.001 + e as f64 * 0.002;
                    rows.push(observation(alg, &format!("p{p}"), "HV", e, value));
                }
            }
        }
        let specs = vec![MetricSpec {
            metric: "HV".into(),
            maximize: true,
        }];
        ObservationTable::new(rows, specs).unwrap()
    }

    fn config() -> AnalysisConfig {
        AnalysisConfig {
            seed: Some(42),
            sample_size: 2000,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn test_analyze_dominant_metric() {
        let table = dominant_table();
        let report = analyze(&table, &["HV".to_string()], &config());
        assert!(report.failures.is_empty());
        assert_eq!(report.metrics.len(), 1);

        let mr = &report.metrics[0];
        assert_eq!(mr.algorithms, ["A", "B", "C"]);
        assert_eq!(mr.average_ranks, vec![1.0, 2.0, 3.0]);
        let friedman = mr.friedman.as_ref().unwrap();
        assert!(friedman.p_value < 0.05);
        assert!(mr.critical_distance.is_some());

        // Default pivot is the last algorithm
        let pivot = mr.wilcoxon_pivot.as_ref().unwrap();
        assert_eq!(pivot.pivot, "C");
        assert_eq!(pivot.results.len(), 2);
        // 3 algorithms -> 3 unordered pairs
        assert_eq!(mr.wilcoxon_pairwise.len(), 3);
        assert_eq!(mr.bayesian.len(), 2);
        // A dominates the pivot in every pair
        let a_vs_c = &mr.bayesian[0];
        assert_eq!(a_vs_c.first, "A");
        assert!(a_vs_c.sign.p_greater > 0.8);
    }

    #[test]
    fn test_failure_is_isolated() {
        // IGD has a single problem and run, far below any test minimum
        let mut rows = Vec::new();
        for (alg, base) in [("A", 0.9), ("B", 0.6), ("C", 0.3)] {
            for p in 0..6 {
                for e in 0..10 {
                    rows.push(observation(
                        alg,
                        &format!("p{p}"),
                        "HV",
                        e,
                        base + e as f64 * 0.002 + p as f64 * 0.001,
                    ));
                }
            }
            rows.push(observation(alg, "p0", "IGD", 0, 1.0));
        }
        let specs = vec![
            MetricSpec {
                metric: "HV".into(),
                maximize: true,
            },
            MetricSpec {
                metric: "IGD".into(),
                maximize: false,
            },
        ];
        let table = ObservationTable::new(rows, specs).unwrap();

        let report = analyze(&table, &["HV".to_string(), "IGD".to_string()], &config());
        assert_eq!(report.metrics.len(), 1);
        assert_eq!(report.metrics[0].metric, "HV");
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].metric, "IGD");
        assert!(report.failures[0].error.contains("insufficient"));
    }

    #[test]
    fn test_explicit_pivot_and_skip_bayesian() {
        let table = dominant_table();
        let cfg = AnalysisConfig {
            pivot: Some("A".to_string()),
            skip_bayesian: true,
            seed: None,
            ..AnalysisConfig::default()
        };
        let report = analyze(&table, &["HV".to_string()], &cfg);
        assert!(report.failures.is_empty());
        let mr = &report.metrics[0];
        assert_eq!(mr.wilcoxon_pivot.as_ref().unwrap().pivot, "A");
        assert!(mr.bayesian.is_empty());
    }

    #[test]
    fn test_unknown_pivot_fails_metric() {
        let table = dominant_table();
        let cfg = AnalysisConfig {
            pivot: Some("Z".to_string()),
            skip_bayesian: true,
            ..AnalysisConfig::default()
        };
        let report = analyze(&table, &["HV".to_string()], &cfg);
        assert!(report.metrics.is_empty());
        assert_eq!(report.failures.len(), 1);
    }

    #[test]
    fn test_comparison_marker_direction() {
        let better: Vec<f64> = (0..8).map(|i| 0.9 + i as f64 * 0.01).collect();
        let worse: Vec<f64> = (0..8).map(|i| 0.5 + i as f64 * 0.01).collect();

        // Maximizing: higher first sample means the first algorithm wins
        let m = comparison_marker(&better, &worse, true, 0.05).unwrap();
        assert_eq!(m, SignMarker::Plus);
        // Minimizing flips the verdict
        let m = comparison_marker(&better, &worse, false, 0.05).unwrap();
        assert_eq!(m, SignMarker::Minus);
    }

    #[test]
    fn test_artifacts_written() {
        let table = dominant_table();
        let cfg = config();
        let report = analyze(&table, &["HV".to_string()], &cfg);

        let dir = std::env::temp_dir().join(format!("empirica-test-{}", std::process::id()));
        write_artifacts(&report, &table, &cfg, &dir).unwrap();

        for name in [
            "HV_summary.tex",
            "HV_friedman.tex",
            "HV_pivot.tex",
            "HV_1vs1.tex",
            "HV_cd.json",
            "report.json",
        ] {
            assert!(dir.join(name).exists(), "missing artifact {name}");
        }
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
