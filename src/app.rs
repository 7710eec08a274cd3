//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - resolves the basin(s) to analyse
//! - runs the per-basin pipeline (one basin, or the whole list in parallel)
//! - merges result rows and prints corpus statistics

use clap::Parser;
use log::{info, warn};
use rayon::prelude::*;

use crate::cli::{AnalyzeArgs, BatchArgs, Command, EngineArgs, MergeArgs};
use crate::domain::AnalysisConfig;
use crate::error::{AppError, EXIT_BATCH};
use crate::io::{basin_at, collect_results, load_basin_list, write_results_csv};
use crate::report::{format_corpus_summary, summarize, write_summary_json};

pub mod pipeline;

use pipeline::{RunSettings, run_basin};

/// Entry point for the `basin-copula` binary.
pub fn run() -> Result<(), AppError> {
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Batch(args) => handle_batch(args),
        Command::Merge(args) => handle_merge(args),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let settings = settings_from_args(&args.engine)?;

    let basin_id = match (&args.basin_id, args.index) {
        (Some(id), _) => id.clone(),
        (None, Some(index)) => {
            let list = require_basin_list(&args.engine)?;
            basin_at(&list, index)?.to_string()
        }
        (None, None) => {
            return Err(AppError::config(
                "No basin selected: pass --basin-id, --index, or set SLURM_ARRAY_TASK_ID.",
            ));
        }
    };

    run_basin(&basin_id, &settings)?;
    Ok(())
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let settings = settings_from_args(&args.engine)?;
    let basins = require_basin_list(&args.engine)?;

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = args.threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder
        .build()
        .map_err(|e| AppError::config(format!("Failed to start worker pool: {e}")))?;

    info!("batch: {} basins on {} threads", basins.len(), pool.current_num_threads());

    let failures: Vec<(String, AppError)> = pool.install(|| {
        basins
            .par_iter()
            .filter_map(|id| match run_basin(id, &settings) {
                Ok(_) => None,
                Err(err) => {
                    warn!("{id}: failed: {err}");
                    Some((id.clone(), err))
                }
            })
            .collect()
    });

    info!(
        "batch: {} succeeded, {} failed",
        basins.len() - failures.len(),
        failures.len()
    );
    if failures.is_empty() {
        return Ok(());
    }

    let mut message = format!("{} of {} basins failed:", failures.len(), basins.len());
    for (id, err) in failures.iter().take(10) {
        message.push_str(&format!("\n  {id}: {err}"));
    }
    if failures.len() > 10 {
        message.push_str(&format!("\n  ... and {} more", failures.len() - 10));
    }
    Err(AppError::new(EXIT_BATCH, message))
}

fn handle_merge(args: MergeArgs) -> Result<(), AppError> {
    let merged = collect_results(&args.input_dir, Some(&args.output))?;
    info!(
        "merge: {} rows from {} files ({} skipped)",
        merged.results.len(),
        merged.files_read,
        merged.skipped.len()
    );

    write_results_csv(&args.output, &merged.results)?;
    println!(
        "Merged {} basins into {}",
        merged.results.len(),
        args.output.display()
    );

    let summary = summarize(&merged.results);
    println!("{}", format_corpus_summary(&summary));

    if let Some(path) = &args.summary_json {
        write_summary_json(path, &summary)?;
    }
    Ok(())
}

fn require_basin_list(engine: &EngineArgs) -> Result<Vec<String>, AppError> {
    let path = engine
        .basin_list
        .as_ref()
        .ok_or_else(|| AppError::config("A basin list is required (--basin-list or BASIN_LIST)."))?;
    load_basin_list(path)
}

pub fn settings_from_args(args: &EngineArgs) -> Result<RunSettings, AppError> {
    let config = AnalysisConfig {
        tail_quantile: args.quantile,
        min_observations: args.min_observations,
        bootstrap_replicates: args.bootstrap,
        ..AnalysisConfig::default()
    };
    config.validate()?;
    Ok(RunSettings {
        data_dir: args.data_dir.clone(),
        output_dir: args.output_dir.clone(),
        monthly: args.monthly,
        config,
    })
}

/// Rewrite argv so a bare basin index runs `analyze`.
///
/// Rules:
/// - `basin-copula 17 ...`  -> `basin-copula analyze --index 17 ...`
/// - anything else          -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    if arg1.parse::<usize>().is_ok() {
        argv[1] = "analyze".to_string();
        argv.insert(2, "--index".to_string());
        argv.insert(3, arg1);
    }
    argv
}
