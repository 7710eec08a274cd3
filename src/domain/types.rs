//! Shared domain types.
//!
//! These types are intentionally kept small and immutable once built:
//!
//! - input series for one basin (`BasinSeriesPair`)
//! - intermediate dependence estimates (`PseudoObservations`, `DependenceSummary`)
//! - copula candidates and the final per-basin row (`CopulaFit`, `BasinResult`)

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AppError};

/// Default quantile threshold for tail dependence.
pub const DEFAULT_TAIL_QUANTILE: f64 = 0.95;

/// Default minimum number of paired observations.
pub const DEFAULT_MIN_OBSERVATIONS: usize = 10;

/// Default number of bootstrap replicates for the goodness-of-fit p-value.
pub const DEFAULT_BOOTSTRAP_REPLICATES: usize = 100;

/// Precipitation and runoff for one basin, index-aligned by time.
#[derive(Debug, Clone, PartialEq)]
pub struct BasinSeriesPair {
    precipitation: Vec<f64>,
    runoff: Vec<f64>,
}

impl BasinSeriesPair {
    /// Build a pair, rejecting mismatched lengths and non-finite entries.
    ///
    /// The minimum-length check is *not* done here: a short basin is still a
    /// valid input and gets reported as `insufficient` by the pipeline.
    pub fn new(precipitation: Vec<f64>, runoff: Vec<f64>) -> Result<Self, AnalysisError> {
        if precipitation.len() != runoff.len() {
            return Err(AnalysisError::LengthMismatch {
                precipitation: precipitation.len(),
                runoff: runoff.len(),
            });
        }
        if let Some(index) = precipitation.iter().position(|x| !x.is_finite()) {
            return Err(AnalysisError::NonFiniteValue {
                series: "precipitation",
                index,
            });
        }
        if let Some(index) = runoff.iter().position(|x| !x.is_finite()) {
            return Err(AnalysisError::NonFiniteValue {
                series: "runoff",
                index,
            });
        }
        Ok(Self {
            precipitation,
            runoff,
        })
    }

    pub fn precipitation(&self) -> &[f64] {
        &self.precipitation
    }

    pub fn runoff(&self) -> &[f64] {
        &self.runoff
    }

    pub fn len(&self) -> usize {
        self.precipitation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.precipitation.is_empty()
    }
}

/// Rank-based marginals in the open interval (0,1).
#[derive(Debug, Clone, PartialEq)]
pub struct PseudoObservations {
    pub u: Vec<f64>,
    pub v: Vec<f64>,
}

impl PseudoObservations {
    pub fn len(&self) -> usize {
        self.u.len()
    }

    pub fn is_empty(&self) -> bool {
        self.u.is_empty()
    }
}

/// Rank correlation and tail dependence for one basin. `NaN` marks undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DependenceSummary {
    pub spearman_rho: f64,
    pub spearman_pvalue: f64,
    pub kendall_tau: f64,
    pub kendall_pvalue: f64,
    pub chi_upper: f64,
    pub chi_lower: f64,
}

impl DependenceSummary {
    pub fn undefined() -> Self {
        Self {
            spearman_rho: f64::NAN,
            spearman_pvalue: f64::NAN,
            kendall_tau: f64::NAN,
            kendall_pvalue: f64::NAN,
            chi_upper: f64::NAN,
            chi_lower: f64::NAN,
        }
    }
}

/// Parametric copula families, declared in selection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CopulaFamily {
    Gaussian,
    Clayton,
    Gumbel,
    Frank,
}

impl CopulaFamily {
    /// All families, highest priority first.
    pub const ALL: [CopulaFamily; 4] = [
        CopulaFamily::Gaussian,
        CopulaFamily::Clayton,
        CopulaFamily::Gumbel,
        CopulaFamily::Frank,
    ];

    /// Tie-break rank; lower wins.
    pub fn priority(self) -> usize {
        match self {
            CopulaFamily::Gaussian => 0,
            CopulaFamily::Clayton => 1,
            CopulaFamily::Gumbel => 2,
            CopulaFamily::Frank => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CopulaFamily::Gaussian => "Gaussian",
            CopulaFamily::Clayton => "Clayton",
            CopulaFamily::Gumbel => "Gumbel",
            CopulaFamily::Frank => "Frank",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for CopulaFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One fitted family and its goodness-of-fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CopulaFit {
    pub family: CopulaFamily,
    pub parameter: f64,
    pub gof_statistic: f64,
    pub gof_pvalue: f64,
}

/// Outcome code written to the result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BasinStatus {
    Ok,
    Insufficient,
    Degenerate,
    NoFit,
}

impl BasinStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BasinStatus::Ok => "ok",
            BasinStatus::Insufficient => "insufficient",
            BasinStatus::Degenerate => "degenerate",
            BasinStatus::NoFit => "no_fit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "ok" => Some(BasinStatus::Ok),
            "insufficient" => Some(BasinStatus::Insufficient),
            "degenerate" => Some(BasinStatus::Degenerate),
            "no_fit" => Some(BasinStatus::NoFit),
            _ => None,
        }
    }
}

impl fmt::Display for BasinStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final summary row for one basin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasinResult {
    pub basin_id: String,
    pub summary: DependenceSummary,
    pub best_copula: Option<CopulaFamily>,
    pub copula_parameter: f64,
    pub copula_gof_statistic: f64,
    pub copula_gof_pvalue: f64,
    pub n_observations: usize,
    /// Present only for monthly-aggregated runs.
    pub n_months: Option<usize>,
    pub status: BasinStatus,
}

impl BasinResult {
    /// A row with every estimate undefined.
    pub fn undefined(basin_id: impl Into<String>, n_observations: usize, status: BasinStatus) -> Self {
        Self {
            basin_id: basin_id.into(),
            summary: DependenceSummary::undefined(),
            best_copula: None,
            copula_parameter: f64::NAN,
            copula_gof_statistic: f64::NAN,
            copula_gof_pvalue: f64::NAN,
            n_observations,
            n_months: None,
            status,
        }
    }
}

/// Engine configuration shared by every basin of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    /// Quantile threshold `q` for tail dependence.
    pub tail_quantile: f64,
    pub min_observations: usize,
    pub bootstrap_replicates: usize,
    /// Upper bound of `|θ|` for the Frank root search.
    pub frank_theta_max: f64,
    pub frank_max_iter: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tail_quantile: DEFAULT_TAIL_QUANTILE,
            min_observations: DEFAULT_MIN_OBSERVATIONS,
            bootstrap_replicates: DEFAULT_BOOTSTRAP_REPLICATES,
            frank_theta_max: 100.0,
            frank_max_iter: 100,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if !(self.tail_quantile.is_finite() && self.tail_quantile > 0.5 && self.tail_quantile < 1.0) {
            return Err(AppError::config(format!(
                "Invalid tail quantile {}: must lie in (0.5, 1).",
                self.tail_quantile
            )));
        }
        if self.min_observations < 3 {
            return Err(AppError::config("Minimum observations must be >= 3."));
        }
        if !(self.frank_theta_max.is_finite() && self.frank_theta_max > 1.0) {
            return Err(AppError::config("Frank search bound must be finite and > 1."));
        }
        if self.frank_max_iter == 0 {
            return Err(AppError::config("Frank iteration budget must be >= 1."));
        }
        Ok(())
    }
}
