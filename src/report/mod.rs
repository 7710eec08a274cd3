//! Corpus-level summaries over merged basin results.
//!
//! Undefined (`NaN`) values are skipped by every statistic, and a statistic
//! with no defined inputs is `None` (serialised as JSON `null`).

pub mod format;

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::domain::{BasinResult, CopulaFamily};
use crate::error::AppError;

pub use format::*;

/// Significance level for the "significant correlation" counts.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Descriptive statistics of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnStats {
    /// Number of defined values.
    pub count: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation (n - 1 denominator).
    pub std: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl ColumnStats {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let defined: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        let count = defined.len();
        if count == 0 {
            return Self {
                count,
                mean: None,
                std: None,
                min: None,
                max: None,
            };
        }
        let n = count as f64;
        let mean = defined.iter().sum::<f64>() / n;
        let std = (count > 1).then(|| {
            let ss: f64 = defined.iter().map(|v| (v - mean) * (v - mean)).sum();
            (ss / (n - 1.0)).sqrt()
        });
        Self {
            count,
            mean: Some(mean),
            std,
            min: defined.iter().copied().reduce(f64::min),
            max: defined.iter().copied().reduce(f64::max),
        }
    }
}

/// Counts of p-values below `SIGNIFICANCE_LEVEL`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignificanceCounts {
    pub spearman: usize,
    pub kendall: usize,
}

/// Summary of a merged result set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorpusSummary {
    pub total_basins: usize,
    pub spearman_rho: ColumnStats,
    pub kendall_tau: ColumnStats,
    pub chi_upper: ColumnStats,
    pub chi_lower: ColumnStats,
    /// Basins per selected family; basins without a fit are not counted.
    pub best_copula: BTreeMap<String, usize>,
    pub status: BTreeMap<String, usize>,
    pub significant: SignificanceCounts,
}

/// Summarise a result set.
pub fn summarize(results: &[BasinResult]) -> CorpusSummary {
    let mut best_copula = BTreeMap::new();
    for family in CopulaFamily::ALL {
        let n = results.iter().filter(|r| r.best_copula == Some(family)).count();
        if n > 0 {
            best_copula.insert(family.name().to_string(), n);
        }
    }

    let mut status = BTreeMap::new();
    for r in results {
        *status.entry(r.status.as_str().to_string()).or_insert(0) += 1;
    }

    CorpusSummary {
        total_basins: results.len(),
        spearman_rho: ColumnStats::from_values(results.iter().map(|r| r.summary.spearman_rho)),
        kendall_tau: ColumnStats::from_values(results.iter().map(|r| r.summary.kendall_tau)),
        chi_upper: ColumnStats::from_values(results.iter().map(|r| r.summary.chi_upper)),
        chi_lower: ColumnStats::from_values(results.iter().map(|r| r.summary.chi_lower)),
        best_copula,
        status,
        significant: SignificanceCounts {
            spearman: count_significant(results, |r| r.summary.spearman_pvalue),
            kendall: count_significant(results, |r| r.summary.kendall_pvalue),
        },
    }
}

fn count_significant(results: &[BasinResult], pvalue: impl Fn(&BasinResult) -> f64) -> usize {
    results
        .iter()
        .filter(|r| {
            let p = pvalue(r);
            p.is_finite() && p < SIGNIFICANCE_LEVEL
        })
        .count()
}

/// Write the summary as pretty JSON.
pub fn write_summary_json(path: &Path, summary: &CorpusSummary) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::output(format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BasinStatus;
    use approx::assert_abs_diff_eq;

    fn row(id: &str, rho: f64, p: f64, family: Option<CopulaFamily>) -> BasinResult {
        let mut r = BasinResult::undefined(id, 100, BasinStatus::Ok);
        r.summary.spearman_rho = rho;
        r.summary.spearman_pvalue = p;
        r.summary.kendall_tau = rho * 0.7;
        r.summary.kendall_pvalue = p;
        r.best_copula = family;
        if family.is_none() {
            r.status = BasinStatus::NoFit;
        }
        r
    }

    #[test]
    fn column_stats_skip_nan() {
        let s = ColumnStats::from_values([1.0, f64::NAN, 3.0]);
        assert_eq!(s.count, 2);
        assert_eq!(s.mean, Some(2.0));
        assert_abs_diff_eq!(s.std.unwrap(), 2.0_f64.sqrt(), epsilon = 1e-15);
        assert_eq!(s.min, Some(1.0));
        assert_eq!(s.max, Some(3.0));

        let empty = ColumnStats::from_values([f64::NAN]);
        assert_eq!(empty.count, 0);
        assert_eq!(empty.mean, None);
    }

    #[test]
    fn summary_counts_families_and_significance() {
        let results = vec![
            row("a", 0.6, 0.001, Some(CopulaFamily::Gumbel)),
            row("b", 0.2, 0.2, Some(CopulaFamily::Gumbel)),
            row("c", 0.4, 0.01, Some(CopulaFamily::Frank)),
            row("d", f64::NAN, f64::NAN, None),
        ];
        let s = summarize(&results);
        assert_eq!(s.total_basins, 4);
        assert_eq!(s.best_copula.get("Gumbel"), Some(&2));
        assert_eq!(s.best_copula.get("Frank"), Some(&1));
        assert_eq!(s.best_copula.get("Gaussian"), None);
        assert_eq!(s.status.get("no_fit"), Some(&1));
        assert_eq!(s.significant, SignificanceCounts { spearman: 2, kendall: 2 });
        assert_eq!(s.spearman_rho.count, 3);
        assert_abs_diff_eq!(s.spearman_rho.mean.unwrap(), 0.4, epsilon = 1e-15);
    }

    #[test]
    fn summary_serialises_undefined_as_null() {
        let s = summarize(&[row("a", f64::NAN, f64::NAN, None)]);
        let json = serde_json::to_value(&s).unwrap();
        assert!(json["spearman_rho"]["mean"].is_null());
        assert_eq!(json["total_basins"], 1);
    }
}
