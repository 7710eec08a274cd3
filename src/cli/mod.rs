//! Command-line parsing for the basin dependence engine.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! statistics. Paths may come from the environment (or a `.env` file loaded in
//! `main`), which suits array jobs where every task shares one configuration.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_BOOTSTRAP_REPLICATES, DEFAULT_MIN_OBSERVATIONS, DEFAULT_TAIL_QUANTILE};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "basin-copula",
    version,
    about = "Rainfall-runoff dependence analysis per basin (rank correlation, tail dependence, copulas)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyse a single basin and write its result row.
    Analyze(AnalyzeArgs),
    /// Analyse every basin of the basin list in parallel.
    Batch(BatchArgs),
    /// Combine per-basin result rows into one file and print summary statistics.
    Merge(MergeArgs),
}

/// Options shared by `analyze` and `batch`.
#[derive(Debug, Args, Clone)]
pub struct EngineArgs {
    /// Text file with one basin id per line.
    #[arg(long, env = "BASIN_LIST", value_name = "FILE")]
    pub basin_list: Option<PathBuf>,

    /// Directory holding `<basin_id>.csv` input files.
    #[arg(long, env = "BASIN_DATA_DIR", value_name = "DIR")]
    pub data_dir: PathBuf,

    /// Directory receiving `<basin_id>.csv` result rows.
    #[arg(long, env = "BASIN_OUTPUT_DIR", value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Quantile threshold for tail dependence, in (0.5, 1).
    #[arg(long, default_value_t = DEFAULT_TAIL_QUANTILE)]
    pub quantile: f64,

    /// Minimum number of paired observations.
    #[arg(long, default_value_t = DEFAULT_MIN_OBSERVATIONS)]
    pub min_observations: usize,

    /// Bootstrap replicates for the goodness-of-fit p-value.
    #[arg(long, default_value_t = DEFAULT_BOOTSTRAP_REPLICATES)]
    pub bootstrap: usize,

    /// Sum daily values to calendar months before analysis.
    #[arg(long)]
    pub monthly: bool,
}

/// Options for a single-basin run.
#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// 1-based index into the basin list.
    #[arg(long, env = "SLURM_ARRAY_TASK_ID")]
    pub index: Option<usize>,

    /// Basin id to analyse directly (takes precedence over `--index`).
    #[arg(long)]
    pub basin_id: Option<String>,
}

/// Options for a whole-list run.
#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub engine: EngineArgs,

    /// Worker threads (defaults to the number of CPUs).
    #[arg(long)]
    pub threads: Option<usize>,
}

/// Options for merging result rows.
#[derive(Debug, Args, Clone)]
pub struct MergeArgs {
    /// Directory of per-basin result rows.
    #[arg(long, env = "BASIN_OUTPUT_DIR", value_name = "DIR")]
    pub input_dir: PathBuf,

    /// Combined CSV to write.
    #[arg(long, value_name = "FILE")]
    pub output: PathBuf,

    /// Also write the summary statistics as JSON.
    #[arg(long, value_name = "JSON")]
    pub summary_json: Option<PathBuf>,
}
