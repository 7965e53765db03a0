//! LaTeX Table Builders
//!
//! Renders the typed results into self-contained LaTeX documents, one table
//! per document. Values are shown as `central_{spread}` in scientific
//! notation; the best cell of each problem row is shaded dark gray, the
//! second best light gray, judged in the metric's own direction.

use empirica_table::AggregatedMetric;
use serde::{Deserialize, Serialize};

/// Outcome symbol attached to a significance comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignMarker {
    /// Significant, in favor of the row/column owner ("+")
    Plus,
    /// Significant, against the row/column owner ("-")
    Minus,
    /// No significant difference ("=")
    Equal,
}

impl SignMarker {
    fn as_str(self) -> &'static str {
        match self {
            SignMarker::Plus => "+",
            SignMarker::Minus => "-",
            SignMarker::Equal => "=",
        }
    }
}

fn document_open(metric: &str, caption: &str, columns: &str, header: &str) -> String {
    format!(
        "\\documentclass{{article}}\n\
         \\title{{Algorithm Comparison}}\n\
         \\usepackage{{colortbl}}\n\
         \\usepackage{{float}}\n\
         \\usepackage{{rotating}}\n\
         \\usepackage[table]{{xcolor}}\n\
         \\xdefinecolor{{gray95}}{{gray}}{{0.65}}\n\
         \\xdefinecolor{{gray25}}{{gray}}{{0.8}}\n\
         \\begin{{document}}\n\
         \\maketitle\n\
         \\section{{Tables}}\n\
         \\begin{{table}}[H]\n\
         \\caption{{{metric}. {caption}}}\n\
         \\vspace{{1mm}}\n\
         \\centering\n\
         \\begin{{scriptsize}}\n\
         \\begin{{tabular}}{{{columns}}}\n\
         \\hline\n\
         {header} \\\\ \\hline\n"
    )
}

fn document_close() -> &'static str {
    "\\hline\n\\end{tabular}\n\\end{scriptsize}\n\\end{table}\n\\end{document}\n"
}

/// Indices of the best and second-best cells of one problem row
fn best_and_second(values: &[f64], maximize: bool) -> (usize, usize) {
    let better = |a: f64, b: f64| if maximize { a > b } else { a < b };
    let mut best = 0;
    for i in 1..values.len() {
        if better(values[i], values[best]) {
            best = i;
        }
    }
    let mut second = usize::MAX;
    for i in 0..values.len() {
        if i == best {
            continue;
        }
        if second == usize::MAX || better(values[i], values[second]) {
            second = i;
        }
    }
    (best, second)
}

fn value_cell(central: f64, spread: f64, idx: usize, best: usize, second: usize) -> String {
    let body = format!("${central:.2e}_{{ {spread:.2e} }}$");
    if idx == best {
        format!("\\cellcolor{{gray95}}{body}")
    } else if idx == second {
        format!("\\cellcolor{{gray25}}{body}")
    } else {
        body
    }
}

/// Summary table: central and spread value per (problem, algorithm)
pub fn latex_summary_table(agg: &AggregatedMetric) -> String {
    let caption = summary_caption(agg);
    let k = agg.central.n_algorithms();
    let columns = format!("l|{}c", "c|".repeat(k.saturating_sub(1)));
    let header = format!("& {}", agg.central.algorithms.join(" & "));
    let mut doc = document_open(&agg.metric, &caption, &columns, &header);

    for (row_idx, problem) in agg.central.problems.iter().enumerate() {
        let centrals = &agg.central.values[row_idx];
        let spreads = &agg.spread.values[row_idx];
        let (best, second) = best_and_second(centrals, agg.maximize);
        let cells: Vec<String> = centrals
            .iter()
            .zip(spreads)
            .enumerate()
            .map(|(i, (&c, &s))| value_cell(c, s, i, best, second))
            .collect();
        doc.push_str(&format!("{} & {} \\\\\n", problem, cells.join(" & ")));
    }

    doc.push_str(document_close());
    doc
}

/// Summary table with a Friedman column: one +/= marker per problem row,
/// stating whether the algorithms differ significantly on that problem
pub fn latex_friedman_table(agg: &AggregatedMetric, markers: &[SignMarker]) -> String {
    let caption = format!(
        "{} (+ marks problems where the difference between the algorithms is significant)",
        summary_caption(agg)
    );
    let k = agg.central.n_algorithms();
    let columns = format!("l|{}c", "c|".repeat(k));
    let header = format!("& {} & FT", agg.central.algorithms.join(" & "));
    let mut doc = document_open(&agg.metric, &caption, &columns, &header);

    for (row_idx, problem) in agg.central.problems.iter().enumerate() {
        let centrals = &agg.central.values[row_idx];
        let spreads = &agg.spread.values[row_idx];
        let (best, second) = best_and_second(centrals, agg.maximize);
        let cells: Vec<String> = centrals
            .iter()
            .zip(spreads)
            .enumerate()
            .map(|(i, (&c, &s))| value_cell(c, s, i, best, second))
            .collect();
        doc.push_str(&format!(
            "{} & {} & {} \\\\\n",
            problem,
            cells.join(" & "),
            markers[row_idx].as_str()
        ));
    }

    doc.push_str(document_close());
    doc
}

/// Pivot table: every cell carries the value plus the Wilcoxon symbol of the
/// column algorithm against the pivot on that problem.
///
/// `symbols[problem_idx]` holds one marker per algorithm column; the marker
/// of the pivot's own column is ignored and rendered blank.
pub fn latex_wilcoxon_pivot_table(
    agg: &AggregatedMetric,
    pivot: &str,
    symbols: &[Vec<SignMarker>],
) -> String {
    let caption = format!(
        "{} (+/- marks the pivot algorithm '{}' as significantly worse/better, = as equivalent)",
        summary_caption(agg),
        pivot
    );
    let k = agg.central.n_algorithms();
    let columns = format!("l|{}c", "c|".repeat(k.saturating_sub(1)));
    let header = format!("& {}", agg.central.algorithms.join(" & "));
    let mut doc = document_open(&agg.metric, &caption, &columns, &header);

    // Win/loss/tie tallies per non-pivot algorithm for the footer row
    let mut tallies = vec![[0usize; 3]; k];

    for (row_idx, problem) in agg.central.problems.iter().enumerate() {
        let centrals = &agg.central.values[row_idx];
        let spreads = &agg.spread.values[row_idx];
        let (best, second) = best_and_second(centrals, agg.maximize);

        let mut cells = Vec::with_capacity(k);
        for (i, (&c, &s)) in centrals.iter().zip(spreads).enumerate() {
            let cell = value_cell(c, s, i, best, second);
            if agg.central.algorithms[i] == pivot {
                cells.push(cell);
            } else {
                let marker = symbols[row_idx][i];
                match marker {
                    SignMarker::Plus => tallies[i][0] += 1,
                    SignMarker::Minus => tallies[i][1] += 1,
                    SignMarker::Equal => tallies[i][2] += 1,
                }
                cells.push(format!("{cell} {}", marker.as_str()));
            }
        }
        doc.push_str(&format!("{} & {} \\\\\n", problem, cells.join(" & ")));
    }

    doc.push_str("\\hline + / - / =");
    for (i, name) in agg.central.algorithms.iter().enumerate() {
        if name == pivot {
            doc.push_str(" &");
        } else {
            let [w, l, t] = tallies[i];
            doc.push_str(&format!(" & {w} / {l} / {t}"));
        }
    }
    doc.push_str(" \\\\\n");

    doc.push_str(document_close());
    doc
}

/// 1-vs-1 grid: upper-triangle cells hold one symbol per problem for the row
/// algorithm against the column algorithm.
///
/// `cells[i][j]` (for column indices `i < j`) is the concatenated symbol
/// string; other entries are ignored.
pub fn latex_wilcoxon_grid(agg: &AggregatedMetric, cells: &[Vec<String>]) -> String {
    let algorithms = &agg.central.algorithms;
    let k = algorithms.len();
    let caption = format!(
        "Wilcoxon 1vs1. Each symbol is one problem, in order: {}. \
         + means the row algorithm is significantly better, - worse, = equivalent",
        agg.central.problems.join(", ")
    );
    let columns = format!("l|{}c", "c|".repeat(k.saturating_sub(2)));
    let header = format!("& {}", algorithms[1..].join(" & "));
    let mut doc = document_open(&agg.metric, &caption, &columns, &header);

    for i in 0..k - 1 {
        doc.push_str(&algorithms[i]);
        for j in 1..k {
            if j <= i {
                doc.push_str(" & ");
            } else {
                doc.push_str(&format!(" & \\texttt{{{}}}", cells[i][j]));
            }
        }
        doc.push_str(" \\\\\n");
    }

    doc.push_str(document_close());
    doc
}

fn summary_caption(agg: &AggregatedMetric) -> String {
    match agg.aggregation {
        empirica_stats::Aggregation::Median => "Median and interquartile range".to_string(),
        empirica_stats::Aggregation::Mean => "Mean and standard deviation".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use empirica_stats::{Aggregation, MatchedMatrix};

    fn agg(maximize: bool) -> AggregatedMetric {
        let algorithms = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let problems = vec!["p1".to_string(), "p2".to_string()];
        let central = MatchedMatrix::new(
            algorithms.clone(),
            problems.clone(),
            vec![vec![0.9, 0.5, 0.7], vec![0.8, 0.6, 0.65]],
        )
        .unwrap();
        let spread = MatchedMatrix::new(
            algorithms,
            problems,
            vec![vec![0.01, 0.02, 0.03], vec![0.01, 0.02, 0.03]],
        )
        .unwrap();
        AggregatedMetric {
            metric: "HV".to_string(),
            maximize,
            aggregation: Aggregation::Median,
            central,
            spread,
        }
    }

    #[test]
    fn test_summary_table_structure() {
        let doc = latex_summary_table(&agg(true));
        assert!(doc.starts_with("\\documentclass{article}"));
        assert!(doc.contains("\\caption{HV."));
        assert!(doc.contains("& A & B & C"));
        assert!(doc.contains("p1 & "));
        assert!(doc.ends_with("\\end{document}\n"));
    }

    #[test]
    fn test_best_cell_shading_follows_direction() {
        let maxi = latex_summary_table(&agg(true));
        // Maximizing: A (0.9) is best on p1
        let p1_row = maxi.lines().find(|l| l.starts_with("p1 & ")).unwrap();
        let first_cell = p1_row.split(" & ").nth(1).unwrap();
        assert!(first_cell.contains("gray95"));

        let mini = latex_summary_table(&agg(false));
        // Minimizing: B (0.5) is best on p1
        let p1_row = mini.lines().find(|l| l.starts_with("p1 & ")).unwrap();
        let second_cell = p1_row.split(" & ").nth(2).unwrap();
        assert!(second_cell.contains("gray95"));
    }

    #[test]
    fn test_friedman_table_markers() {
        let doc = latex_friedman_table(&agg(true), &[SignMarker::Plus, SignMarker::Equal]);
        assert!(doc.contains("& FT"));
        assert!(doc.lines().any(|l| l.starts_with("p1 & ") && l.ends_with("& + \\\\")));
        assert!(doc.lines().any(|l| l.starts_with("p2 & ") && l.ends_with("& = \\\\")));
    }

    #[test]
    fn test_pivot_table_tallies() {
        let symbols = vec![
            vec![SignMarker::Equal, SignMarker::Plus, SignMarker::Minus],
            vec![SignMarker::Equal, SignMarker::Plus, SignMarker::Equal],
        ];
        let doc = latex_wilcoxon_pivot_table(&agg(true), "A", &symbols);
        // B won twice, C lost once and tied once; pivot column stays blank
        assert!(doc.contains("+ / - / = & & 2 / 0 / 0 & 0 / 1 / 1"));
    }

    #[test]
    fn test_grid_upper_triangle() {
        let cells = vec![
            vec![String::new(), "+=".to_string(), "++".to_string()],
            vec![String::new(), String::new(), "--".to_string()],
            vec![String::new(), String::new(), String::new()],
        ];
        let doc = latex_wilcoxon_grid(&agg(true), &cells);
        assert!(doc.contains("A & \\texttt{+=} & \\texttt{++}"));
        assert!(doc.contains("B &  & \\texttt{--}"));
    }
}
