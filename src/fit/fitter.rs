//! Candidate fitting across all copula families for one basin.
//!
//! For each family we:
//! - invert Kendall's τ to a parameter (skipping families that cannot attain τ)
//! - compute the goodness-of-fit statistic and bootstrap p-value
//!
//! Families whose parameter search fails are logged and left out; they never
//! fail the basin.

use log::{debug, warn};

use crate::domain::{AnalysisConfig, CopulaFamily, CopulaFit, PseudoObservations};
use crate::fit::estimate::estimate_parameter;
use crate::fit::gof::gof_test;
use crate::models::is_valid_parameter;

/// Fit every feasible family. The result is in priority order.
pub fn fit_candidates(
    basin_id: &str,
    obs: &PseudoObservations,
    kendall_tau: f64,
    config: &AnalysisConfig,
    seed: u64,
) -> Vec<CopulaFit> {
    let mut fits = Vec::with_capacity(CopulaFamily::ALL.len());
    for family in CopulaFamily::ALL {
        let theta = match estimate_parameter(family, kendall_tau, config) {
            Ok(Some(theta)) => theta,
            Ok(None) => {
                debug!("{basin_id}: {family} infeasible for tau={kendall_tau:.4}");
                continue;
            }
            Err(err) => {
                warn!("{basin_id}: {family} excluded: {err}");
                continue;
            }
        };

        if !is_valid_parameter(family, theta) {
            warn!("{basin_id}: {family} excluded: parameter {theta} outside its domain");
            continue;
        }

        let fit = gof_test(obs, family, theta, seed, config.bootstrap_replicates);
        debug!(
            "{basin_id}: {family} theta={:.6} Sn={:.6} p={:.3}",
            fit.parameter, fit.gof_statistic, fit.gof_pvalue
        );
        fits.push(fit);
    }
    fits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependence::to_pseudo;
    use crate::models::sample_copula;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn obs(family: CopulaFamily, theta: f64, n: usize) -> PseudoObservations {
        let (u, v) = sample_copula(family, theta, n, &mut StdRng::seed_from_u64(17));
        PseudoObservations {
            u: to_pseudo(&u),
            v: to_pseudo(&v),
        }
    }

    fn quick_config() -> AnalysisConfig {
        AnalysisConfig {
            bootstrap_replicates: 10,
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn positive_dependence_fits_all_families() {
        let fits = fit_candidates("b", &obs(CopulaFamily::Gumbel, 2.0, 120), 0.5, &quick_config(), 1);
        let families: Vec<_> = fits.iter().map(|f| f.family).collect();
        assert_eq!(families, CopulaFamily::ALL.to_vec());
    }

    #[test]
    fn negative_dependence_skips_clayton_and_gumbel() {
        let fits = fit_candidates("b", &obs(CopulaFamily::Frank, -5.0, 120), -0.45, &quick_config(), 1);
        let families: Vec<_> = fits.iter().map(|f| f.family).collect();
        assert_eq!(families, vec![CopulaFamily::Gaussian, CopulaFamily::Frank]);
    }

    #[test]
    fn frank_is_dropped_when_search_fails() {
        let fits = fit_candidates("b", &obs(CopulaFamily::Clayton, 50.0, 60), 0.99, &quick_config(), 1);
        assert!(fits.iter().all(|f| f.family != CopulaFamily::Frank));
        assert_eq!(fits.len(), 3);
    }
}
