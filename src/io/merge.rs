//! Read per-basin result files back and combine them.

use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::StringRecord;
use log::warn;

use crate::domain::{BasinResult, BasinStatus, CopulaFamily, DependenceSummary};
use crate::error::{AppError, EXIT_INPUT};

/// Rows collected from a results directory.
#[derive(Debug, Clone)]
pub struct MergedResults {
    /// Sorted by `basin_id`.
    pub results: Vec<BasinResult>,
    pub files_read: usize,
    /// Files that could not be parsed, with the reason.
    pub skipped: Vec<(PathBuf, String)>,
}

/// Read every per-basin `*.csv` file in `input_dir`.
///
/// `exclude` (the merge target) is never read. A file must hold exactly one
/// row, so an earlier merged table in the same directory is skipped, and a
/// basin id seen twice keeps its first row in path order. Unreadable files
/// are skipped with a warning; an empty result set is an input error.
pub fn collect_results(input_dir: &Path, exclude: Option<&Path>) -> Result<MergedResults, AppError> {
    let entries = fs::read_dir(input_dir).map_err(|e| {
        AppError::new(
            EXIT_INPUT,
            format!("Failed to read results directory '{}': {e}", input_dir.display()),
        )
    })?;

    let excluded = exclude.and_then(|p| fs::canonicalize(p).ok());
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "csv"))
        .filter(|p| excluded.is_none() || fs::canonicalize(p).ok() != excluded)
        .collect();
    paths.sort();

    let mut results = Vec::new();
    let mut skipped = Vec::new();
    let mut seen = HashSet::new();
    for path in &paths {
        let row = read_result_file(path).and_then(|mut rows| match rows.len() {
            1 => Ok(rows.remove(0)),
            n => Err(format!("expected one result row, found {n}")),
        });
        match row {
            Ok(row) if seen.insert(row.basin_id.clone()) => results.push(row),
            Ok(row) => {
                let message = format!("duplicate basin '{}'", row.basin_id);
                warn!("Skipping {}: {message}", path.display());
                skipped.push((path.clone(), message));
            }
            Err(message) => {
                warn!("Could not read {}: {message}", path.display());
                skipped.push((path.clone(), message));
            }
        }
    }

    if results.is_empty() {
        return Err(AppError::new(
            EXIT_INPUT,
            format!("No result rows found in '{}'.", input_dir.display()),
        ));
    }

    results.sort_by(|a, b| a.basin_id.cmp(&b.basin_id));
    Ok(MergedResults {
        results,
        files_read: paths.len() - skipped.len(),
        skipped,
    })
}

/// Parse a result file written by `write_result_row` (or a merged file).
pub fn read_result_file(path: &Path) -> Result<Vec<BasinResult>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);
    let headers = reader.headers().map_err(|e| e.to_string())?.clone();
    let columns: HashMap<&str, usize> = headers.iter().enumerate().map(|(i, h)| (h, i)).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        rows.push(parse_row(&columns, &record)?);
    }
    Ok(rows)
}

fn parse_row(columns: &HashMap<&str, usize>, record: &StringRecord) -> Result<BasinResult, String> {
    let field = |name: &str| -> Result<&str, String> {
        columns
            .get(name)
            .and_then(|&i| record.get(i))
            .ok_or_else(|| format!("missing column `{name}`"))
    };
    let number = |name: &str| -> Result<f64, String> {
        let raw = field(name)?;
        if raw.is_empty() || raw.eq_ignore_ascii_case("nan") {
            return Ok(f64::NAN);
        }
        raw.parse::<f64>()
            .map_err(|_| format!("`{name}`: not a number '{raw}'"))
    };
    let count = |name: &str| -> Result<usize, String> {
        let raw = field(name)?;
        raw.parse::<usize>()
            .map_err(|_| format!("`{name}`: not a count '{raw}'"))
    };

    let best_copula = match field("best_copula")? {
        "" => None,
        name => Some(
            CopulaFamily::from_name(name).ok_or_else(|| format!("unknown copula '{name}'"))?,
        ),
    };
    let status_raw = field("status")?;
    let status = BasinStatus::parse(status_raw).ok_or_else(|| format!("unknown status '{status_raw}'"))?;
    let n_months = match columns.get("n_months").and_then(|&i| record.get(i)) {
        None | Some("") => None,
        Some(raw) if raw.eq_ignore_ascii_case("nan") => None,
        Some(raw) => Some(
            raw.parse::<usize>()
                .map_err(|_| format!("`n_months`: not a count '{raw}'"))?,
        ),
    };

    Ok(BasinResult {
        basin_id: field("basin_id")?.to_string(),
        summary: DependenceSummary {
            spearman_rho: number("spearman_rho")?,
            spearman_pvalue: number("spearman_pvalue")?,
            kendall_tau: number("kendall_tau")?,
            kendall_pvalue: number("kendall_pvalue")?,
            chi_upper: number("chi_upper")?,
            chi_lower: number("chi_lower")?,
        },
        best_copula,
        copula_parameter: number("copula_parameter")?,
        copula_gof_statistic: number("copula_gof_statistic")?,
        copula_gof_pvalue: number("copula_gof_pvalue")?,
        n_observations: count("n_observations")?,
        n_months,
        status,
    })
}
