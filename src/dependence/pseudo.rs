//! Rank transform to pseudo-observations.
//!
//! Each series is ranked independently (average rank for ties) and mapped to
//! `rank / (n + 1)`, so every value lies strictly inside (0,1).

use crate::domain::{BasinSeriesPair, PseudoObservations};
use crate::error::AnalysisError;
use crate::math::average_ranks;

/// Rank-normalise one series.
pub fn to_pseudo(values: &[f64]) -> Vec<f64> {
    let denom = values.len() as f64 + 1.0;
    average_ranks(values).into_iter().map(|r| r / denom).collect()
}

/// Transform a basin's series pair, enforcing the minimum sample size.
pub fn pseudo_observations(
    pair: &BasinSeriesPair,
    min_observations: usize,
) -> Result<PseudoObservations, AnalysisError> {
    let n = pair.len();
    if n < min_observations {
        return Err(AnalysisError::InsufficientData {
            n,
            min: min_observations,
        });
    }
    Ok(PseudoObservations {
        u: to_pseudo(pair.precipitation()),
        v: to_pseudo(pair.runoff()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn short_series_is_insufficient() {
        let pair = BasinSeriesPair::new(vec![1.0; 5], vec![2.0; 5]).unwrap();
        let err = pseudo_observations(&pair, 10).unwrap_err();
        assert_eq!(err, AnalysisError::InsufficientData { n: 5, min: 10 });
    }

    #[test]
    fn normalisation_is_rank_over_n_plus_one() {
        let u = to_pseudo(&[0.0, 5.0, 5.0, 1.0]);
        assert_abs_diff_eq!(u[0], 1.0 / 5.0, epsilon = 1e-15);
        assert_abs_diff_eq!(u[1], 3.5 / 5.0, epsilon = 1e-15);
        assert_abs_diff_eq!(u[2], 3.5 / 5.0, epsilon = 1e-15);
        assert_abs_diff_eq!(u[3], 2.0 / 5.0, epsilon = 1e-15);
    }

    proptest! {
        #[test]
        fn values_stay_inside_unit_interval(
            values in prop::collection::vec((0.0f64..500.0, 0.0f64..500.0), 10..200)
        ) {
            let (p, r): (Vec<f64>, Vec<f64>) = values.into_iter().unzip();
            let pair = BasinSeriesPair::new(p, r).unwrap();
            let obs = pseudo_observations(&pair, 10).unwrap();
            prop_assert!(obs.u.iter().chain(obs.v.iter()).all(|&x| x > 0.0 && x < 1.0));
        }

        #[test]
        fn sum_is_invariant_under_joint_reordering(
            values in prop::collection::vec((0u8..20, 0.0f64..100.0), 10..100),
            shift in 1usize..50,
        ) {
            let p: Vec<f64> = values.iter().map(|(a, _)| *a as f64).collect();
            let r: Vec<f64> = values.iter().map(|(_, b)| *b).collect();
            let n = p.len();
            let k = shift % n;
            let mut p_rot = p.clone();
            let mut r_rot = r.clone();
            p_rot.rotate_left(k);
            r_rot.rotate_left(k);

            let a = pseudo_observations(&BasinSeriesPair::new(p, r).unwrap(), 10).unwrap();
            let b = pseudo_observations(&BasinSeriesPair::new(p_rot, r_rot).unwrap(), 10).unwrap();
            let sum_a: f64 = a.u.iter().sum();
            let sum_b: f64 = b.u.iter().sum();
            // Ranks always sum to n(n+1)/2, so the normalised sum is n/2.
            prop_assert!((sum_a - sum_b).abs() < 1e-9);
            prop_assert!((sum_a - n as f64 / 2.0).abs() < 1e-9);
        }
    }
}
