//! Result rows as CSV.
//!
//! Every basin writes `<output_dir>/<basin_id>.csv` holding a header and one
//! row. Files are written to a temporary file in the same directory and then
//! renamed, so a reader never sees a half-written row.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::domain::BasinResult;
use crate::error::AppError;

/// Written for every undefined numeric field.
pub const UNDEFINED: &str = "NaN";

/// Column order of a result row. `n_months` only appears in monthly runs.
pub fn result_header(monthly: bool) -> Vec<&'static str> {
    let mut cols = vec![
        "basin_id",
        "spearman_rho",
        "spearman_pvalue",
        "kendall_tau",
        "kendall_pvalue",
        "chi_upper",
        "chi_lower",
        "best_copula",
        "copula_parameter",
        "copula_gof_statistic",
        "copula_gof_pvalue",
        "n_observations",
    ];
    if monthly {
        cols.push("n_months");
    }
    cols.push("status");
    cols
}

/// Serialise one result in `result_header` order.
pub fn result_record(result: &BasinResult, monthly: bool) -> Vec<String> {
    let s = &result.summary;
    let mut row = vec![
        result.basin_id.clone(),
        format_value(s.spearman_rho),
        format_value(s.spearman_pvalue),
        format_value(s.kendall_tau),
        format_value(s.kendall_pvalue),
        format_value(s.chi_upper),
        format_value(s.chi_lower),
        result
            .best_copula
            .map(|f| f.name().to_string())
            .unwrap_or_default(),
        format_value(result.copula_parameter),
        format_value(result.copula_gof_statistic),
        format_value(result.copula_gof_pvalue),
        result.n_observations.to_string(),
    ];
    if monthly {
        row.push(
            result
                .n_months
                .map(|m| m.to_string())
                .unwrap_or_else(|| UNDEFINED.to_string()),
        );
    }
    row.push(result.status.as_str().to_string());
    row
}

fn format_value(x: f64) -> String {
    if x.is_finite() {
        x.to_string()
    } else {
        UNDEFINED.to_string()
    }
}

/// `<output_dir>/<basin_id>.csv`
pub fn result_output_path(output_dir: &Path, basin_id: &str) -> PathBuf {
    output_dir.join(format!("{basin_id}.csv"))
}

/// Atomically write one basin's row. Returns the final path.
pub fn write_result_row(output_dir: &Path, result: &BasinResult) -> Result<PathBuf, AppError> {
    let path = result_output_path(output_dir, &result.basin_id);
    write_results_csv(&path, std::slice::from_ref(result))?;
    Ok(path)
}

/// Atomically write a header plus one row per result.
///
/// The `n_months` column is included when any result carries it.
pub fn write_results_csv(path: &Path, results: &[BasinResult]) -> Result<(), AppError> {
    let monthly = results.iter().any(|r| r.n_months.is_some());

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(result_header(monthly))
        .map_err(|e| AppError::output(format!("Failed to serialise result header: {e}")))?;
    for r in results {
        writer
            .write_record(result_record(r, monthly))
            .map_err(|e| AppError::output(format!("Failed to serialise row for {}: {e}", r.basin_id)))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::output(format!("Failed to serialise results: {e}")))?;

    write_atomic(path, &bytes)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| {
        AppError::output(format!("Failed to create output directory '{}': {e}", dir.display()))
    })?;

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| AppError::output(format!("Failed to create temp file in '{}': {e}", dir.display())))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.flush())
        .map_err(|e| AppError::output(format!("Failed to write '{}': {e}", path.display())))?;
    tmp.persist(path)
        .map_err(|e| AppError::output(format!("Failed to persist '{}': {}", path.display(), e.error)))?;
    Ok(())
}
