//! Human-Readable Report Formatting

use empirica_report::{MetricReport, Report};
use empirica_stats::{Aggregation, Correction, Direction};
use std::fmt::Write;

/// Render a finished report as a plain-text summary for the terminal.
pub fn format_human_output(report: &Report) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Empirica v{} (alpha {}, correction {})",
        report.meta.version,
        report.meta.alpha,
        correction_name(report.meta.correction)
    );
    match report.meta.seed {
        Some(seed) => {
            let _ = writeln!(out, "Seed: {seed}");
        }
        None => {
            let _ = writeln!(out, "Seed: none (unseeded run)");
        }
    }

    for mr in &report.metrics {
        format_metric(&mut out, mr);
    }

    if !report.failures.is_empty() {
        let _ = writeln!(out, "\nFailed metrics:");
        for failure in &report.failures {
            let _ = writeln!(out, "  {}: {}", failure.metric, failure.error);
        }
    }

    out
}

fn format_metric(out: &mut String, mr: &MetricReport) {
    let direction = if mr.maximize { "maximize" } else { "minimize" };
    let _ = writeln!(
        out,
        "\n=== {} ({}, {} aggregation, {} problems) ===",
        mr.metric,
        direction,
        aggregation_name(mr.aggregation),
        mr.problems.len()
    );

    let _ = writeln!(out, "Average ranks:");
    let mut ranked: Vec<(&String, f64)> = mr
        .algorithms
        .iter()
        .zip(mr.average_ranks.iter().copied())
        .collect();
    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    for (name, rank) in ranked {
        let _ = writeln!(out, "  {:<3} {}", format!("{rank:.2}"), name);
    }

    if let Some(friedman) = &mr.friedman {
        let _ = writeln!(
            out,
            "Friedman: chi2 = {:.4}, df = {}, p = {:.4e}",
            friedman.statistic, friedman.df, friedman.p_value
        );
    }
    if let Some(cd) = &mr.critical_distance {
        let _ = writeln!(out, "Nemenyi critical distance: {:.4}", cd.cd);
    }

    if let Some(pivot) = &mr.wilcoxon_pivot {
        let _ = writeln!(out, "Wilcoxon signed-rank vs '{}':", pivot.pivot);
        for (name, result) in &pivot.results {
            let _ = writeln!(
                out,
                "  {:<16} W = {:>6.1}, p = {:.4e}, corrected = {:.4e}, {}",
                name,
                result.statistic,
                result.p_value,
                result.corrected_p_value,
                direction_name(result.direction, &pivot.pivot, name)
            );
        }
    }

    if !mr.bayesian.is_empty() {
        let _ = writeln!(out, "Bayesian posteriors (P[left wins / rope / right wins]):");
        for cmp in &mr.bayesian {
            let _ = writeln!(
                out,
                "  {} vs {}: sign {:.3} / {:.3} / {:.3}, signed-rank {:.3} / {:.3} / {:.3}",
                cmp.first,
                cmp.second,
                cmp.sign.p_greater,
                cmp.sign.p_equal,
                cmp.sign.p_less,
                cmp.signed_rank.p_greater,
                cmp.signed_rank.p_equal,
                cmp.signed_rank.p_less
            );
        }
    }
}

fn correction_name(correction: Correction) -> &'static str {
    match correction {
        Correction::Holm => "holm",
        Correction::Bonferroni => "bonferroni",
        Correction::None => "none",
    }
}

fn aggregation_name(aggregation: Aggregation) -> &'static str {
    match aggregation {
        Aggregation::Median => "median",
        Aggregation::Mean => "mean",
    }
}

/// The pivot is the first element of every pair in pivot mode
fn direction_name(direction: Direction, pivot: &str, other: &str) -> String {
    match direction {
        Direction::FirstGreater => format!("{pivot} higher"),
        Direction::SecondGreater => format!("{other} higher"),
        Direction::None => "no direction".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{AnalysisConfig, analyze};
    use empirica_table::{MetricSpec, Observation, ObservationTable};

    #[test]
    fn test_human_output_sections() {
        let mut rows = Vec::new();
        for (alg, base) in [("A", 0.9), ("B", 0.6), ("C", 0.3)] {
            for p in 0..6 {
                for e in 0..5 {
                    rows.push(Observation {
                        algorithm: alg.into(),
                        problem: format!("p{p}"),
                        metric: "HV".into(),
                        execution_id: e,
                        value: base + p as f64 * 0.001 + e as f64 * 0.002,
                    });
                }
            }
        }
        let table = ObservationTable::new(
            rows,
            vec![MetricSpec {
                metric: "HV".into(),
                maximize: true,
            }],
        )
        .unwrap();
        let config = AnalysisConfig {
            seed: Some(7),
            sample_size: 500,
            ..AnalysisConfig::default()
        };

        let report = analyze(&table, &["HV".to_string()], &config);
        let text = format_human_output(&report);

        assert!(text.contains("Seed: 7"));
        assert!(text.contains("=== HV (maximize"));
        assert!(text.contains("Friedman: chi2"));
        assert!(text.contains("Wilcoxon signed-rank vs 'C':"));
        assert!(text.contains("Bayesian posteriors"));
    }
}
