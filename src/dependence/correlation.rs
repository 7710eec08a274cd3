//! Spearman's ρ and Kendall's τ-b with two-sided asymptotic p-values.
//!
//! Both statistics are computed from the raw series, independently of the
//! pseudo-observation transform used for copula fitting.
//!
//! - Spearman: Pearson correlation of average ranks; p-value from the Student-t
//!   approximation with `n - 2` degrees of freedom.
//! - Kendall: τ-b with the standard tie correction; p-value from the normal
//!   approximation of `S = C - D` with tie-corrected variance.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::domain::BasinSeriesPair;
use crate::error::AnalysisError;
use crate::math::{average_ranks, is_constant, pearson, tie_groups, two_sided_normal_pvalue};

/// Rank correlation statistics for one basin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankCorrelation {
    pub spearman_rho: f64,
    pub spearman_pvalue: f64,
    pub kendall_tau: f64,
    pub kendall_pvalue: f64,
}

/// Compute both statistics for a basin.
///
/// A zero-variance series leaves both statistics undefined and is reported as
/// `DegenerateSeries` so the caller can mark the basin instead of failing.
pub fn rank_correlation(pair: &BasinSeriesPair) -> Result<RankCorrelation, AnalysisError> {
    if is_constant(pair.precipitation()) {
        return Err(AnalysisError::DegenerateSeries {
            series: "precipitation",
        });
    }
    if is_constant(pair.runoff()) {
        return Err(AnalysisError::DegenerateSeries { series: "runoff" });
    }

    let (spearman_rho, spearman_pvalue) = spearman(pair.precipitation(), pair.runoff());
    let (kendall_tau, kendall_pvalue) = kendall(pair.precipitation(), pair.runoff());

    Ok(RankCorrelation {
        spearman_rho,
        spearman_pvalue,
        kendall_tau,
        kendall_pvalue,
    })
}

/// Spearman's ρ and its two-sided p-value. Both are `NaN` if undefined.
pub fn spearman(x: &[f64], y: &[f64]) -> (f64, f64) {
    let Some(rho) = pearson(&average_ranks(x), &average_ranks(y)) else {
        return (f64::NAN, f64::NAN);
    };
    (rho, spearman_pvalue(rho, x.len()))
}

fn spearman_pvalue(rho: f64, n: usize) -> f64 {
    if n < 3 {
        return f64::NAN;
    }
    if rho.abs() >= 1.0 {
        return 0.0;
    }
    let df = (n - 2) as f64;
    let t = rho * (df / (1.0 - rho * rho)).sqrt();
    match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => (2.0 * dist.sf(t.abs())).clamp(0.0, 1.0),
        Err(_) => f64::NAN,
    }
}

/// Kendall's τ-b and its two-sided p-value. Both are `NaN` if undefined.
pub fn kendall(x: &[f64], y: &[f64]) -> (f64, f64) {
    let n = x.len().min(y.len());
    if n < 2 {
        return (f64::NAN, f64::NAN);
    }

    // Pairwise scan: n is at most a few thousand daily values per basin.
    let mut concordant: i64 = 0;
    let mut discordant: i64 = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            if x[i] == x[j] || y[i] == y[j] {
                continue;
            }
            if (x[i] - x[j]) * (y[i] - y[j]) > 0.0 {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }

    let x_ties = tie_groups(&x[..n]);
    let y_ties = tie_groups(&y[..n]);
    let pairs = |g: &[usize]| g.iter().map(|&t| (t * (t - 1) / 2) as f64).sum::<f64>();

    let n_f = n as f64;
    let n0 = n_f * (n_f - 1.0) / 2.0;
    let n1 = pairs(&x_ties);
    let n2 = pairs(&y_ties);
    let denom = ((n0 - n1) * (n0 - n2)).sqrt();
    if !(denom > 0.0) {
        return (f64::NAN, f64::NAN);
    }

    let s = (concordant - discordant) as f64;
    let tau = (s / denom).clamp(-1.0, 1.0);

    if n < 3 {
        return (tau, f64::NAN);
    }

    // Tie-corrected variance of S.
    let v0 = |g: &[usize]| {
        g.iter()
            .map(|&t| {
                let t = t as f64;
                t * (t - 1.0) * (t - 2.0)
            })
            .sum::<f64>()
    };
    let v1 = |g: &[usize]| {
        g.iter()
            .map(|&t| {
                let t = t as f64;
                t * (t - 1.0) * (2.0 * t + 5.0)
            })
            .sum::<f64>()
    };
    let m = n_f * (n_f - 1.0);
    let var = (m * (2.0 * n_f + 5.0) - v1(&x_ties) - v1(&y_ties)) / 18.0
        + (2.0 * n1 * n2) / m
        + v0(&x_ties) * v0(&y_ties) / (9.0 * m * (n_f - 2.0));

    let pvalue = if var > 0.0 {
        two_sided_normal_pvalue(s / var.sqrt())
    } else {
        f64::NAN
    };

    (tau, pvalue)
}
