#![warn(missing_docs)]
//! Empirica CLI Library
//!
//! Command-line front end for the statistical engine: loads the `data` and
//! `metrics` CSV tables, runs the configured analyses for every metric, and
//! writes LaTeX and JSON artifacts. A failing metric is logged and recorded
//! in the report, never allowed to take the other metrics down with it.

mod executor;
mod format;

pub use executor::{AnalysisConfig, analyze, write_artifacts};
pub use format::format_human_output;

use clap::{Parser, Subcommand};
use empirica_stats::{Aggregation, Correction, DEFAULT_SAMPLE_SIZE};
use empirica_table::{ObservationTable, load_data_csv, load_metrics_csv};
use rayon::ThreadPoolBuilder;
use regex::Regex;
use std::path::PathBuf;

/// Empirica CLI arguments
#[derive(Parser, Debug)]
#[command(name = "empirica")]
#[command(author, version, about = "Empirica - statistical comparison of stochastic algorithms")]
pub struct Cli {
    /// Optional subcommand (List, Run); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the data CSV (Algorithm, Problem, MetricName, ExecutionId, MetricValue)
    pub data: PathBuf,

    /// Path to the metrics CSV (MetricName, Maximize)
    pub metrics: PathBuf,

    /// Filter metrics by regex pattern
    #[arg(long, default_value = ".*")]
    pub metric: String,

    /// Output directory for .tex and .json artifacts
    #[arg(short, long, default_value = "outputs")]
    pub output: PathBuf,

    /// Print the JSON report to stdout instead of the human summary
    #[arg(long)]
    pub json: bool,

    /// Significance level
    #[arg(long, default_value = "0.05")]
    pub alpha: f64,

    /// Multiple-comparison correction: holm, bonferroni, none
    #[arg(long, default_value = "holm")]
    pub correction: Correction,

    /// Aggregation of executions per (problem, algorithm): auto, median, mean
    #[arg(long, default_value = "auto")]
    pub aggregation: String,

    /// Pivot algorithm for pivot-mode comparisons (default: last algorithm)
    #[arg(long)]
    pub pivot: Option<String>,

    /// Seed for the Bayesian tests (required unless --unseeded or --skip-bayesian)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Opt in to non-reproducible OS-entropy seeding
    #[arg(long)]
    pub unseeded: bool,

    /// Number of Monte-Carlo draws for the Bayesian tests
    #[arg(long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    pub sample_size: usize,

    /// Skip the Bayesian tests entirely
    #[arg(long)]
    pub skip_bayesian: bool,

    /// Number of threads for parallel per-metric analysis
    /// 0 = use all available cores (default), 1 = single-threaded
    #[arg(long, short = 'j', default_value = "0")]
    pub jobs: usize,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the metrics, algorithms and problems found in the input tables
    List,
    /// Run the analyses (default)
    Run,
}

/// Run the Empirica CLI with arguments from the process environment.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Empirica CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("empirica=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("empirica=info")
            .init();
    }

    if cli.jobs != 0 {
        ThreadPoolBuilder::new()
            .num_threads(cli.jobs)
            .build_global()
            .ok();
    }

    let observations = load_data_csv(&cli.data)?;
    let specs = load_metrics_csv(&cli.metrics)?;
    let table = ObservationTable::new(observations, specs)?;

    match cli.command {
        Some(Commands::List) => list_tables(&table),
        Some(Commands::Run) | None => run_analyses(&cli, &table),
    }
}

fn list_tables(table: &ObservationTable) -> anyhow::Result<()> {
    println!("Metrics ({}):", table.metrics().len());
    for metric in table.metrics() {
        let maximize = table.maximize(metric)?;
        let direction = if maximize { "maximize" } else { "minimize" };
        println!("  {} ({})", metric, direction);
    }
    println!("Algorithms ({}):", table.algorithms().len());
    for algorithm in table.algorithms() {
        println!("  {}", algorithm);
    }
    println!("Problems ({}):", table.problems().len());
    for problem in table.problems() {
        println!("  {}", problem);
    }
    Ok(())
}

fn run_analyses(cli: &Cli, table: &ObservationTable) -> anyhow::Result<()> {
    if !cli.skip_bayesian && cli.seed.is_none() && !cli.unseeded {
        anyhow::bail!(
            "the Bayesian tests need --seed for reproducible results \
             (or pass --unseeded / --skip-bayesian explicitly)"
        );
    }

    let metric_re = Regex::new(&cli.metric)?;
    let selected: Vec<String> = table
        .metrics()
        .iter()
        .filter(|m| metric_re.is_match(m))
        .cloned()
        .collect();
    if selected.is_empty() {
        anyhow::bail!("no metric matches pattern '{}'", cli.metric);
    }

    let aggregation = match cli.aggregation.as_str() {
        "auto" => None,
        other => Some(other.parse::<Aggregation>().map_err(anyhow::Error::msg)?),
    };

    let config = AnalysisConfig {
        alpha: cli.alpha,
        correction: cli.correction,
        aggregation,
        pivot: cli.pivot.clone(),
        seed: cli.seed,
        allow_unseeded: cli.unseeded,
        sample_size: cli.sample_size,
        skip_bayesian: cli.skip_bayesian,
        data_path: Some(cli.data.display().to_string()),
        metrics_path: Some(cli.metrics.display().to_string()),
    };

    let report = analyze(table, &selected, &config);
    write_artifacts(&report, table, &config, &cli.output)?;

    if cli.json {
        println!("{}", empirica_report::generate_json_report(&report)?);
    } else {
        print!("{}", format_human_output(&report));
    }

    if report.failures.is_empty() {
        Ok(())
    } else {
        anyhow::bail!("{} metric(s) failed; see the report for details", report.failures.len())
    }
}
