//! Basin list and per-basin series ingest.
//!
//! This module is responsible for turning a basin CSV (`date,prcp,runoff`)
//! into a clean `BasinSeriesPair`:
//!
//! - rows where either value is empty, `NaN` or `NA` are dropped
//! - any other value that is not a finite number makes the file malformed
//! - with `monthly`, daily rows are summed per calendar month

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use csv::StringRecord;

use crate::domain::BasinSeriesPair;
use crate::error::{AnalysisError, AppError};

const DATE_COLUMN: &str = "date";
const PRCP_COLUMN: &str = "prcp";
const RUNOFF_COLUMN: &str = "runoff";

/// A loaded basin series plus ingest bookkeeping.
#[derive(Debug, Clone)]
pub struct BasinSeries {
    pub pair: BasinSeriesPair,
    pub rows_read: usize,
    pub rows_dropped: usize,
    /// Number of calendar months after aggregation (monthly runs only).
    pub n_months: Option<usize>,
}

/// Read the basin list: one id per line, blank lines ignored.
pub fn load_basin_list(path: &Path) -> Result<Vec<String>, AppError> {
    let text = fs::read_to_string(path).map_err(|e| {
        AppError::config(format!("Failed to read basin list '{}': {e}", path.display()))
    })?;
    let ids: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();
    if ids.is_empty() {
        return Err(AppError::config(format!(
            "Basin list '{}' is empty.",
            path.display()
        )));
    }
    Ok(ids)
}

/// Resolve a 1-based index into the basin list.
pub fn basin_at(ids: &[String], index: usize) -> Result<&str, AppError> {
    if index == 0 || index > ids.len() {
        return Err(AppError::config(format!(
            "Basin index {index} out of range (1..={}).",
            ids.len()
        )));
    }
    Ok(&ids[index - 1])
}

/// `<data_dir>/<basin_id>.csv`
pub fn basin_input_path(data_dir: &Path, basin_id: &str) -> PathBuf {
    data_dir.join(format!("{basin_id}.csv"))
}

/// Load one basin's series.
pub fn load_basin_series(path: &Path, monthly: bool) -> Result<BasinSeries, AnalysisError> {
    let input_err = |message: String| AnalysisError::InputRead {
        path: path.to_path_buf(),
        message,
    };

    let file = File::open(path).map_err(|e| input_err(format!("cannot open: {e}")))?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| input_err(format!("cannot read header: {e}")))?
        .clone();
    let header_map = build_header_map(&headers);

    let column = |name: &str| {
        header_map
            .get(name)
            .copied()
            .ok_or_else(|| input_err(format!("missing required column `{name}`")))
    };
    let prcp_idx = column(PRCP_COLUMN)?;
    let runoff_idx = column(RUNOFF_COLUMN)?;
    let date_idx = if monthly { Some(column(DATE_COLUMN)?) } else { None };

    let mut dates = Vec::new();
    let mut prcp = Vec::new();
    let mut runoff = Vec::new();
    let mut rows_read = 0usize;
    let mut rows_dropped = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2: header is line 1.
        let line = idx + 2;
        rows_read += 1;

        let record = result.map_err(|e| input_err(format!("line {line}: {e}")))?;
        let p = parse_value(record.get(prcp_idx).unwrap_or(""))
            .map_err(|e| input_err(format!("line {line}, `{PRCP_COLUMN}`: {e}")))?;
        let r = parse_value(record.get(runoff_idx).unwrap_or(""))
            .map_err(|e| input_err(format!("line {line}, `{RUNOFF_COLUMN}`: {e}")))?;

        let (Some(p), Some(r)) = (p, r) else {
            rows_dropped += 1;
            continue;
        };

        if let Some(date_idx) = date_idx {
            let raw = record.get(date_idx).unwrap_or("");
            let date = parse_date(raw)
                .ok_or_else(|| input_err(format!("line {line}: invalid date '{raw}'")))?;
            dates.push(date);
        }
        prcp.push(p);
        runoff.push(r);
    }

    let (prcp, runoff, n_months) = if monthly {
        let (p, r) = aggregate_monthly(&dates, &prcp, &runoff);
        let n = p.len();
        (p, r, Some(n))
    } else {
        (prcp, runoff, None)
    };

    let pair = BasinSeriesPair::new(prcp, runoff).map_err(|e| input_err(e.to_string()))?;
    Ok(BasinSeries {
        pair,
        rows_read,
        rows_dropped,
        n_months,
    })
}

/// `Ok(None)` marks an undefined cell.
fn parse_value(raw: &str) -> Result<Option<f64>, String> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") || s.eq_ignore_ascii_case("na") {
        return Ok(None);
    }
    match s.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        Ok(_) => Err(format!("non-finite value '{s}'")),
        Err(_) => Err(format!("not a number: '{s}'")),
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time part.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Sum both series per calendar month, in chronological order.
pub fn aggregate_monthly(dates: &[NaiveDate], prcp: &[f64], runoff: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let mut months: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    for ((date, &p), &r) in dates.iter().zip(prcp).zip(runoff) {
        let entry = months.entry((date.year(), date.month())).or_insert((0.0, 0.0));
        entry.0 += p;
        entry.1 += r;
    }
    months.into_values().unzip()
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a UTF-8 BOM.
    name.trim().trim_start_matches('\u{feff}').to_ascii_lowercase()
}
