//! Copula selection by minimum Cramér–von Mises statistic.
//!
//! Selection rules:
//! 1. Ignore candidates whose statistic is not finite.
//! 2. Choose the minimum statistic.
//! 3. Statistics within a relative tolerance of `1e-12` of that minimum are a
//!    tie, resolved by family priority (Gaussian, Clayton, Gumbel, Frank).

use crate::domain::CopulaFit;
use crate::error::AnalysisError;

const TIE_TOLERANCE: f64 = 1e-12;

/// Pick the best candidate. The result does not depend on input order.
pub fn select_best(candidates: &[CopulaFit]) -> Result<CopulaFit, AnalysisError> {
    let finite = || candidates.iter().filter(|c| c.gof_statistic.is_finite());
    let minimum = finite()
        .map(|c| c.gof_statistic)
        .min_by(f64::total_cmp)
        .ok_or(AnalysisError::NoFeasibleCopula)?;

    // Ties are measured against the global minimum, never chained.
    finite()
        .filter(|c| is_tie(c.gof_statistic, minimum))
        .min_by_key(|c| c.family.priority())
        .copied()
        .ok_or(AnalysisError::NoFeasibleCopula)
}

fn is_tie(a: f64, b: f64) -> bool {
    let scale = 1.0_f64.max(a.abs()).max(b.abs());
    (a - b).abs() <= TIE_TOLERANCE * scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CopulaFamily;

    fn fit(family: CopulaFamily, stat: f64) -> CopulaFit {
        CopulaFit {
            family,
            parameter: 1.5,
            gof_statistic: stat,
            gof_pvalue: 0.5,
        }
    }

    #[test]
    fn lowest_statistic_wins() {
        let candidates = [
            fit(CopulaFamily::Gaussian, 0.04),
            fit(CopulaFamily::Gumbel, 0.01),
            fit(CopulaFamily::Frank, 0.02),
        ];
        assert_eq!(select_best(&candidates).unwrap().family, CopulaFamily::Gumbel);
    }

    #[test]
    fn ties_go_to_higher_priority_in_any_order() {
        let mut candidates = vec![
            fit(CopulaFamily::Frank, 0.02),
            fit(CopulaFamily::Clayton, 0.02 + 1e-15),
            fit(CopulaFamily::Gumbel, 0.02),
        ];
        assert_eq!(select_best(&candidates).unwrap().family, CopulaFamily::Clayton);
        candidates.reverse();
        assert_eq!(select_best(&candidates).unwrap().family, CopulaFamily::Clayton);
    }

    #[test]
    fn near_ties_are_measured_from_the_minimum() {
        // Frank ~ Clayton and Clayton ~ Gaussian, but Gaussian is too far from Frank.
        let candidates = [
            fit(CopulaFamily::Frank, 0.02),
            fit(CopulaFamily::Clayton, 0.02 + 0.8e-12),
            fit(CopulaFamily::Gaussian, 0.02 + 1.6e-12),
        ];
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];
        for order in orders {
            let permuted: Vec<CopulaFit> = order.iter().map(|&i| candidates[i]).collect();
            assert_eq!(
                select_best(&permuted).unwrap().family,
                CopulaFamily::Clayton,
                "{order:?}"
            );
        }
    }

    #[test]
    fn non_finite_candidates_are_ignored() {
        let candidates = [
            fit(CopulaFamily::Gaussian, f64::NAN),
            fit(CopulaFamily::Frank, 0.3),
        ];
        assert_eq!(select_best(&candidates).unwrap().family, CopulaFamily::Frank);
    }

    #[test]
    fn empty_candidate_set_is_no_fit() {
        assert_eq!(select_best(&[]).unwrap_err(), AnalysisError::NoFeasibleCopula);
        let only_nan = [fit(CopulaFamily::Gumbel, f64::INFINITY)];
        assert_eq!(select_best(&only_nan).unwrap_err(), AnalysisError::NoFeasibleCopula);
    }
}
