//! Empirical tail dependence at a fixed quantile threshold.

use crate::domain::PseudoObservations;

/// Upper and lower tail coefficients `(chi_upper, chi_lower)`.
///
/// Both are conditioned on the precipitation margin:
///
/// - `chi_upper = #(u > q and v > q) / #(u > q)`
/// - `chi_lower = #(u < 1-q and v < 1-q) / #(u < 1-q)`
///
/// A coefficient is `NaN` when its conditioning set is empty.
pub fn tail_dependence(obs: &PseudoObservations, q: f64) -> (f64, f64) {
    let lower = 1.0 - q;
    let mut upper_cond = 0usize;
    let mut upper_joint = 0usize;
    let mut lower_cond = 0usize;
    let mut lower_joint = 0usize;

    for (&u, &v) in obs.u.iter().zip(&obs.v) {
        if u > q {
            upper_cond += 1;
            if v > q {
                upper_joint += 1;
            }
        }
        if u < lower {
            lower_cond += 1;
            if v < lower {
                lower_joint += 1;
            }
        }
    }

    (ratio(upper_joint, upper_cond), ratio(lower_joint, lower_cond))
}

fn ratio(joint: usize, cond: usize) -> f64 {
    if cond == 0 {
        f64::NAN
    } else {
        joint as f64 / cond as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependence::pseudo::to_pseudo;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn comonotone_sample_has_full_tail_dependence() {
        let x: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let obs = PseudoObservations {
            u: to_pseudo(&x),
            v: to_pseudo(&x),
        };
        let (up, lo) = tail_dependence(&obs, 0.95);
        assert_eq!(up, 1.0);
        assert_eq!(lo, 1.0);
    }

    #[test]
    fn countermonotone_sample_has_no_tail_dependence() {
        let x: Vec<f64> = (0..200).map(|i| i as f64).collect();
        let y: Vec<f64> = x.iter().map(|v| -v).collect();
        let obs = PseudoObservations {
            u: to_pseudo(&x),
            v: to_pseudo(&y),
        };
        assert_eq!(tail_dependence(&obs, 0.9), (0.0, 0.0));
    }

    #[test]
    fn independent_uniforms_approach_one_minus_q() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 20_000;
        let x: Vec<f64> = (0..n).map(|_| rng.r#gen::<f64>()).collect();
        let y: Vec<f64> = (0..n).map(|_| rng.r#gen::<f64>()).collect();
        let obs = PseudoObservations {
            u: to_pseudo(&x),
            v: to_pseudo(&y),
        };
        let (up, lo) = tail_dependence(&obs, 0.9);
        assert_abs_diff_eq!(up, 0.1, epsilon = 0.03);
        assert_abs_diff_eq!(lo, 0.1, epsilon = 0.03);
    }

    #[test]
    fn empty_conditioning_set_is_nan() {
        let obs = PseudoObservations {
            u: vec![0.5, 0.5, 0.5],
            v: vec![0.2, 0.4, 0.6],
        };
        let (up, lo) = tail_dependence(&obs, 0.95);
        assert!(up.is_nan());
        assert!(lo.is_nan());
    }
}
