//! Per-basin pipeline shared by `analyze` and `batch`.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! load -> pseudo-observations -> rank correlation -> tail dependence ->
//! copula candidates -> selection -> write
//!
//! Recoverable conditions (too few rows, a constant series, no feasible
//! copula) end the pipeline early with undefined fields and a status code.
//! They still produce a row.

use std::fmt;
use std::path::PathBuf;

use log::{debug, info, warn};

use crate::dependence::{pseudo_observations, rank_correlation, tail_dependence};
use crate::domain::{AnalysisConfig, BasinResult, BasinSeriesPair, BasinStatus, DependenceSummary};
use crate::error::{AnalysisError, AppError};
use crate::fit::{basin_seed, fit_candidates, select_best};
use crate::io::{basin_input_path, load_basin_series, write_result_row};
use crate::report::format_basin_summary;

/// Pipeline stages, in order. Logged at `debug` level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Loaded,
    Transformed,
    Correlated,
    TailEstimated,
    CopulaFit,
    Selected,
    Written,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where a run reads and writes, plus the engine settings.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub monthly: bool,
    pub config: AnalysisConfig,
}

/// Load, analyse and write one basin.
///
/// Input errors abort the basin without writing a row.
pub fn run_basin(basin_id: &str, settings: &RunSettings) -> Result<BasinResult, AppError> {
    info!("{basin_id}: start");
    let path = basin_input_path(&settings.data_dir, basin_id);
    let series = load_basin_series(&path, settings.monthly)?;
    if series.pair.is_empty() {
        warn!("{basin_id}: no usable rows in {}", path.display());
    } else if series.rows_dropped > 0 {
        debug!(
            "{basin_id}: dropped {} of {} rows with undefined values",
            series.rows_dropped, series.rows_read
        );
    }

    let mut result = analyze_basin(basin_id, &series.pair, &settings.config);
    result.n_months = series.n_months;

    let out = write_result_row(&settings.output_dir, &result)?;
    transition(basin_id, Stage::Written);
    debug!("{basin_id}: wrote {}", out.display());
    info!("{}", format_basin_summary(&result));
    Ok(result)
}

/// Run the statistics for one basin. Never fails: every recoverable
/// condition is reported through `BasinResult::status`.
pub fn analyze_basin(basin_id: &str, pair: &BasinSeriesPair, config: &AnalysisConfig) -> BasinResult {
    let n = pair.len();
    transition(basin_id, Stage::Loaded);

    let obs = match pseudo_observations(pair, config.min_observations) {
        Ok(obs) => obs,
        Err(err) => return stopped(basin_id, n, err),
    };
    transition(basin_id, Stage::Transformed);

    let correlation = match rank_correlation(pair) {
        Ok(c) => c,
        Err(err) => return stopped(basin_id, n, err),
    };
    transition(basin_id, Stage::Correlated);

    let (chi_upper, chi_lower) = tail_dependence(&obs, config.tail_quantile);
    transition(basin_id, Stage::TailEstimated);

    let summary = DependenceSummary {
        spearman_rho: correlation.spearman_rho,
        spearman_pvalue: correlation.spearman_pvalue,
        kendall_tau: correlation.kendall_tau,
        kendall_pvalue: correlation.kendall_pvalue,
        chi_upper,
        chi_lower,
    };

    let seed = basin_seed(basin_id);
    let candidates = fit_candidates(basin_id, &obs, correlation.kendall_tau, config, seed);
    transition(basin_id, Stage::CopulaFit);

    let mut result = BasinResult::undefined(basin_id, n, BasinStatus::Ok);
    result.summary = summary;
    match select_best(&candidates) {
        Ok(best) => {
            result.best_copula = Some(best.family);
            result.copula_parameter = best.parameter;
            result.copula_gof_statistic = best.gof_statistic;
            result.copula_gof_pvalue = best.gof_pvalue;
        }
        Err(err) => {
            info!("{basin_id}: {err}");
            result.status = BasinStatus::NoFit;
        }
    }
    transition(basin_id, Stage::Selected);
    result
}

fn stopped(basin_id: &str, n: usize, err: AnalysisError) -> BasinResult {
    debug_assert!(err.is_recoverable());
    let status = err.status().unwrap_or(BasinStatus::NoFit);
    info!("{basin_id}: {err} (status={status})");
    BasinResult::undefined(basin_id, n, status)
}

fn transition(basin_id: &str, stage: Stage) {
    debug!("{basin_id}: -> {stage}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CopulaFamily;
    use crate::models::sample_copula;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::fs;
    use tempfile::TempDir;

    fn quick_config() -> AnalysisConfig {
        AnalysisConfig {
            bootstrap_replicates: 20,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn identical_series_are_fully_dependent() {
        let mut rng = StdRng::seed_from_u64(1);
        let x: Vec<f64> = (0..120).map(|_| rng.gen_range(0.0..50.0)).collect();
        let pair = BasinSeriesPair::new(x.clone(), x).unwrap();

        let r = analyze_basin("same", &pair, &quick_config());
        assert_eq!(r.status, BasinStatus::Ok);
        assert!((r.summary.spearman_rho - 1.0).abs() < 1e-12);
        assert!((r.summary.kendall_tau - 1.0).abs() < 1e-12);
        assert!(r.summary.spearman_pvalue < 1e-10);
        assert!(r.summary.kendall_pvalue < 1e-10);
        assert!((r.summary.chi_upper - 1.0).abs() < 1e-12);
        assert!(r.best_copula.is_some());
        assert!(r.copula_parameter.is_finite());
        assert!(r.copula_gof_statistic.is_finite());
        assert!((0.0..=1.0).contains(&r.copula_gof_pvalue));
    }

    #[test]
    fn independent_noise_has_weak_correlation() {
        let mut rng = StdRng::seed_from_u64(2);
        let p: Vec<f64> = (0..3650).map(|_| rng.r#gen::<f64>()).collect();
        let q: Vec<f64> = (0..3650).map(|_| rng.r#gen::<f64>()).collect();
        let pair = BasinSeriesPair::new(p, q).unwrap();

        let config = AnalysisConfig {
            bootstrap_replicates: 5,
            ..AnalysisConfig::default()
        };
        let r = analyze_basin("noise", &pair, &config);
        assert_eq!(r.n_observations, 3650);
        assert!(r.summary.spearman_rho.abs() < 0.1);
        assert!((0.0..=1.0).contains(&r.summary.spearman_pvalue));
        assert!(r.summary.chi_upper.is_finite() && r.summary.chi_upper <= 1.0);
    }

    #[test]
    fn short_series_is_insufficient() {
        let pair = BasinSeriesPair::new(vec![1.0, 2.0, 3.0, 4.0, 5.0], vec![2.0, 1.0, 4.0, 3.0, 5.0]).unwrap();
        let r = analyze_basin("short", &pair, &quick_config());
        assert_eq!(r.status, BasinStatus::Insufficient);
        assert_eq!(r.n_observations, 5);
        assert!(r.summary.spearman_rho.is_nan());
        assert!(r.summary.chi_lower.is_nan());
        assert_eq!(r.best_copula, None);
        assert!(r.copula_parameter.is_nan());
    }

    #[test]
    fn constant_runoff_is_degenerate() {
        let pair = BasinSeriesPair::new((0..40).map(|i| i as f64).collect(), vec![1.25; 40]).unwrap();
        let r = analyze_basin("flat", &pair, &quick_config());
        assert_eq!(r.status, BasinStatus::Degenerate);
        assert!(r.summary.spearman_rho.is_nan());
        assert!(r.summary.kendall_tau.is_nan());
        assert!(r.summary.chi_upper.is_nan());
        assert_eq!(r.best_copula, None);
        assert!(r.copula_parameter.is_nan());
        assert!(r.copula_gof_statistic.is_nan());
        assert!(r.copula_gof_pvalue.is_nan());
    }

    #[test]
    fn results_do_not_depend_on_thread_count() {
        let (u, v) = sample_copula(CopulaFamily::Clayton, 2.0, 200, &mut StdRng::seed_from_u64(3));
        let pair = BasinSeriesPair::new(u, v).unwrap();
        let config = quick_config();

        let run_with = |threads: usize| {
            rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .unwrap()
                .install(|| analyze_basin("01013500", &pair, &config))
        };
        let single = run_with(1);
        let multi = run_with(4);
        assert_eq!(single, multi);
        assert_eq!(single, analyze_basin("01013500", &pair, &config));
        assert_eq!(single.status, BasinStatus::Ok);
    }

    #[test]
    fn run_basin_writes_a_row_and_reports_input_errors() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        let output_dir = dir.path().join("out");
        fs::create_dir_all(&data_dir).unwrap();

        let mut body = String::from("date,prcp,runoff\n");
        for day in 1..=28 {
            body.push_str(&format!("2001-02-{day:02},{},{}\n", day % 7, (day * 3) % 11));
        }
        fs::write(data_dir.join("b1.csv"), body).unwrap();
        fs::write(data_dir.join("bad.csv"), "date,prcp,runoff\n2001-01-01,x,1\n").unwrap();
        fs::write(data_dir.join("blank.csv"), "date,prcp,runoff\n2001-01-01,NA,1\n2001-01-02,,\n").unwrap();

        let settings = RunSettings {
            data_dir,
            output_dir: output_dir.clone(),
            monthly: false,
            config: quick_config(),
        };

        let r = run_basin("b1", &settings).unwrap();
        assert_eq!(r.n_observations, 28);
        let text = fs::read_to_string(output_dir.join("b1.csv")).unwrap();
        assert!(text.lines().nth(1).unwrap().starts_with("b1,"));

        let err = run_basin("bad", &settings).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(!output_dir.join("bad.csv").exists());

        let r = run_basin("blank", &settings).unwrap();
        assert_eq!(r.n_observations, 0);
        assert_eq!(r.status, BasinStatus::Insufficient);
        assert!(output_dir.join("blank.csv").exists());

        let monthly = RunSettings {
            monthly: true,
            ..settings
        };
        let r = run_basin("b1", &monthly).unwrap();
        assert_eq!(r.n_months, Some(1));
        assert_eq!(r.status, BasinStatus::Insufficient);
    }
}
