//! Parameter estimation by inversion of Kendall's τ.
//!
//! Gaussian, Clayton and Gumbel have closed forms. Frank has no closed-form
//! inverse, so `τ(θ) = 1 - 4/θ · (1 - D₁(θ))` is solved with Brent's method.

use std::f64::consts::PI;

use roots::{SimpleConvergency, find_root_brent};

use crate::domain::{AnalysisConfig, CopulaFamily};
use crate::error::AnalysisError;
use crate::models::frank_tau;

/// Largest |ρ| handed to the Gaussian copula.
const GAUSSIAN_RHO_MAX: f64 = 1.0 - 1e-6;

/// τ is capped here before the Archimedean closed forms.
const TAU_CAP: f64 = 1.0 - 1e-3;

/// Lower end of the Frank search bracket (θ = 0 is excluded).
const FRANK_THETA_MIN: f64 = 1e-8;

const FRANK_TOLERANCE: f64 = 1e-12;

/// Estimate one family's parameter from Kendall's τ.
///
/// - `Ok(Some(θ))`: the family is a candidate.
/// - `Ok(None)`: τ lies outside the family's attainable range.
/// - `Err(RootFindNonConvergence)`: the Frank search failed; the family is
///   excluded but the basin continues.
pub fn estimate_parameter(
    family: CopulaFamily,
    tau: f64,
    config: &AnalysisConfig,
) -> Result<Option<f64>, AnalysisError> {
    if !tau.is_finite() {
        return Ok(None);
    }
    let estimate = match family {
        CopulaFamily::Gaussian => {
            Some((PI * tau / 2.0).sin().clamp(-GAUSSIAN_RHO_MAX, GAUSSIAN_RHO_MAX))
        }
        CopulaFamily::Clayton => (tau > 0.0 && tau <= 1.0).then(|| {
            let t = tau.min(TAU_CAP);
            2.0 * t / (1.0 - t)
        }),
        CopulaFamily::Gumbel => (tau >= 0.0 && tau <= 1.0).then(|| 1.0 / (1.0 - tau.min(TAU_CAP))),
        CopulaFamily::Frank => {
            if tau == 0.0 || tau.abs() >= 1.0 {
                None
            } else {
                Some(frank_theta(tau, config)?)
            }
        }
    };
    Ok(estimate)
}

/// Solve Frank's τ relation, searching `|θ|` over `[1e-8, theta_max]`.
fn frank_theta(tau: f64, config: &AnalysisConfig) -> Result<f64, AnalysisError> {
    let target = tau.abs();
    let f = |theta: f64| frank_tau(theta) - target;
    let mut convergency = SimpleConvergency {
        eps: FRANK_TOLERANCE,
        max_iter: config.frank_max_iter,
    };
    let theta = find_root_brent(FRANK_THETA_MIN, config.frank_theta_max, f, &mut convergency)
        .map_err(|_| AnalysisError::RootFindNonConvergence {
            family: CopulaFamily::Frank,
            tau,
        })?;
    Ok(theta.copysign(tau))
}
