#![warn(missing_docs)]
//! Travbench CLI Library
//!
//! Command-line front end: loads a query directory, benchmarks an endpoint
//! over HTTP, and writes raw results and aggregate reports.
//!
//! ```text
//! travbench run http://localhost:3000/sparql queries/ --output out/results.json
//! travbench aggregate out/results.json --output out/aggregate.json
//! travbench init > travbench.toml
//! ```

mod config;
mod evaluator;
mod loader;
mod planner;
mod progress;

pub use config::*;
pub use evaluator::CommandEvaluator;
pub use loader::{
    LoadError, MetadataRecord, expand_metadata, load_queries, load_queries_metadata,
    load_workload, split_queries,
};
pub use planner::{ExecutionPlan, build_plan};
pub use progress::ProgressHooks;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;
use travbench_core::{ResultRecord, Runner, RunnerConfig};
use travbench_report::{
    AggregateReport, OutputFormat, read_results, write_aggregates, write_results,
};
use travbench_stats::aggregate_results;
use travbench_topology::{MetricEvaluator, NoEvaluator, WeightScheme};
use travbench_transport::HttpTransport;

/// Travbench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "travbench")]
#[command(author, version, about = "Travbench - link-traversal query endpoint benchmarking")]
pub struct Cli {
    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (default: discover travbench.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Benchmark an endpoint
    Run(RunArgs),
    /// Aggregate a raw JSON result file
    Aggregate(AggregateArgs),
    /// Print a default travbench.toml
    Init,
}

/// Arguments of `travbench run`
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Endpoint URL
    pub endpoint: String,

    /// Query directory
    pub queries: PathBuf,

    /// Run query sets whose name matches this regex
    #[arg(long, default_value = ".*")]
    pub filter: String,

    /// Measured iterations
    #[arg(long, short = 'r')]
    pub replication: Option<usize>,

    /// Discarded warm-up iterations
    #[arg(long, short = 'w')]
    pub warmup: Option<usize>,

    /// Per-query timeout (e.g., "60s")
    #[arg(long)]
    pub timeout: Option<String>,

    /// Edge weighting: unweighted, request-time, document-size
    #[arg(long)]
    pub weighting: Option<WeightScheme>,

    /// Raw results file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also write an aggregate report here
    #[arg(long)]
    pub aggregate: Option<PathBuf>,

    /// Output format: json, csv
    #[arg(long)]
    pub format: Option<String>,

    /// Hide the progress bar
    #[arg(long)]
    pub quiet: bool,
}

/// Arguments of `travbench aggregate`
#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Raw JSON results written by `travbench run`
    pub input: PathBuf,

    /// Aggregate report file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Output format: json, csv
    #[arg(long)]
    pub format: Option<String>,
}

/// Run the Travbench CLI with the process arguments.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the Travbench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let default_filter = if cli.verbose {
        "travbench=debug"
    } else {
        "travbench=info"
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .try_init();

    // Explicit --config must load; otherwise discover, then defaults
    let config = match &cli.config {
        Some(path) => TravConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TravConfig::discover().unwrap_or_default(),
    };

    match cli.command {
        Commands::Run(ref args) => run_benchmark(args, &config),
        Commands::Aggregate(ref args) => aggregate_file(args, &config),
        Commands::Init => {
            print!("{}", TravConfig::default_toml());
            Ok(())
        }
    }
}

/// Layer travbench.toml values under CLI overrides
pub fn build_runner_config(args: &RunArgs, config: &TravConfig) -> anyhow::Result<RunnerConfig> {
    let timeout = match args.timeout.as_ref().or(config.runner.timeout.as_ref()) {
        Some(s) => Some(TravConfig::parse_duration(s).context("Invalid timeout")?),
        None => None,
    };

    Ok(RunnerConfig {
        endpoint: args.endpoint.clone(),
        replication: args.replication.unwrap_or(config.runner.replication),
        warmup: args.warmup.unwrap_or(config.runner.warmup),
        timeout,
        record_timestamps: config.runner.record_timestamps,
        k_to_check: config.runner.k_to_check.clone(),
        weighting: args.weighting.unwrap_or(config.runner.weighting),
        first_k: config.evaluator.first_k_options(),
        probe_query: config.runner.probe_query.clone(),
        delays: config.delays.resolve().context("Invalid [delays]")?,
    })
}

fn output_format(flag: Option<&str>, config: &TravConfig) -> anyhow::Result<OutputFormat> {
    flag.unwrap_or(&config.output.format)
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))
}

fn evaluator(config: &TravConfig) -> Box<dyn MetricEvaluator> {
    match &config.evaluator.command {
        Some(command) => Box::new(CommandEvaluator::new(
            command.clone(),
            config.evaluator.args.clone(),
        )),
        None => {
            info!("no metric evaluator configured; traversal metrics will be -1");
            Box::new(NoEvaluator)
        }
    }
}

fn run_benchmark(args: &RunArgs, config: &TravConfig) -> anyhow::Result<()> {
    let filter = Regex::new(&args.filter)
        .with_context(|| format!("Invalid filter regex: {}", args.filter))?;
    let sets = load_workload(&args.queries)
        .with_context(|| format!("Failed to load queries from {}", args.queries.display()))?;
    let plan = build_plan(sets, Some(&filter));

    if plan.sets.is_empty() {
        println!("No query sets found.");
        return Ok(());
    }

    let runner_config = build_runner_config(args, config)?;
    let format = output_format(args.format.as_deref(), config)?;
    let output = args.output.clone().unwrap_or_else(|| config.output.path.clone());
    let aggregate_path = args
        .aggregate
        .clone()
        .or_else(|| config.output.aggregate_path.clone());

    let executions = plan.queries_per_iteration()
        * (runner_config.warmup + runner_config.replication);
    println!(
        "Travbench: {} query sets, {} queries, {} warm-up + {} measured iterations against {}",
        plan.sets.len(),
        plan.queries_per_iteration(),
        runner_config.warmup,
        runner_config.replication,
        runner_config.endpoint
    );

    let mut hooks = if args.quiet {
        ProgressHooks::hidden()
    } else {
        ProgressHooks::new(executions as u64)
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let results = runtime.block_on(async {
        let mut runner = Runner::new(HttpTransport::default(), evaluator(config), runner_config);
        runner.run(&plan.sets, &mut hooks).await
    });

    let records = results.into_records();
    write_results(&output, &records, format)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    print_summary(&records, &output);

    if let Some(path) = aggregate_path {
        write_aggregate_report(&records, &path, format)?;
    }
    Ok(())
}

fn aggregate_file(args: &AggregateArgs, config: &TravConfig) -> anyhow::Result<()> {
    let format = output_format(args.format.as_deref(), config)?;
    let records = read_results(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    write_aggregate_report(&records, &args.output, format)
}

fn write_aggregate_report(
    records: &[ResultRecord],
    path: &Path,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let report = AggregateReport::new(aggregate_results(records));
    write_aggregates(path, &report, format)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("{} groups aggregated to {}", report.results.len(), path.display());
    Ok(())
}

fn print_summary(records: &[ResultRecord], output: &Path) {
    let failed = records.iter().filter(|r| r.has_error()).count();
    println!(
        "{} records written to {} ({} with errors)",
        records.len(),
        output.display(),
        failed
    );
}
