//! Random sampling from the supported copulas.
//!
//! - Gaussian: correlated normals mapped through `Φ`.
//! - Clayton, Frank: conditional inversion `v = C⁻¹(w | u)`.
//! - Gumbel: Marshall–Olkin construction with a positive-stable frailty.
//!
//! Clayton and Gumbel are evaluated in log space: the capped estimates
//! (θ in the thousands) overflow the direct formulas.

use std::f64::consts::PI;

use rand::Rng;
use rand_distr::{Exp1, StandardNormal};

use crate::domain::CopulaFamily;
use crate::math::norm_cdf;

/// Draw `n` pairs `(u, v)` from `C_θ`.
///
/// Every draw lies in the open unit square.
pub fn sample_copula<R: Rng + ?Sized>(
    family: CopulaFamily,
    theta: f64,
    n: usize,
    rng: &mut R,
) -> (Vec<f64>, Vec<f64>) {
    let mut u = Vec::with_capacity(n);
    let mut v = Vec::with_capacity(n);
    for _ in 0..n {
        let (a, b) = loop {
            let (a, b) = match family {
                CopulaFamily::Gaussian => sample_gaussian(theta, rng),
                CopulaFamily::Clayton => sample_clayton(theta, rng),
                CopulaFamily::Gumbel => sample_gumbel(theta, rng),
                CopulaFamily::Frank => sample_frank(theta, rng),
            };
            if a.is_finite() && b.is_finite() {
                break (a, b);
            }
        };
        u.push(clip_open(a));
        v.push(clip_open(b));
    }
    (u, v)
}

fn clip_open(x: f64) -> f64 {
    x.clamp(f64::MIN_POSITIVE, 1.0 - f64::EPSILON)
}

/// `ln(1 + eˣ)` without overflow.
fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}

/// Uniform on the open interval (0,1).
fn open_unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    loop {
        let x: f64 = rng.r#gen();
        if x > 0.0 {
            return x;
        }
    }
}

fn sample_gaussian<R: Rng + ?Sized>(rho: f64, rng: &mut R) -> (f64, f64) {
    let z1: f64 = rng.sample(StandardNormal);
    let z2: f64 = rng.sample(StandardNormal);
    let x = z1;
    let y = rho * z1 + (1.0 - rho * rho).max(0.0).sqrt() * z2;
    (norm_cdf(x), norm_cdf(y))
}

fn sample_clayton<R: Rng + ?Sized>(theta: f64, rng: &mut R) -> (f64, f64) {
    let u = open_unit(rng);
    let w = open_unit(rng);
    if theta < 1e-10 {
        return (u, w);
    }
    // v = (1 + u^-θ · (w^(-θ/(1+θ)) - 1))^(-1/θ)
    let ln_scale = -theta * u.ln();
    let ln_excess = (-theta / (1.0 + theta) * w.ln()).exp_m1().ln();
    let ln_t = softplus(ln_scale + ln_excess);
    (u, (-ln_t / theta).exp())
}

fn sample_frank<R: Rng + ?Sized>(theta: f64, rng: &mut R) -> (f64, f64) {
    let u = open_unit(rng);
    let w = open_unit(rng);
    if theta.abs() < 1e-10 {
        return (u, w);
    }
    let num = w * (-theta).exp_m1();
    let den = w + (1.0 - w) * (-theta * u).exp();
    (u, -(num / den).ln_1p() / theta)
}

fn sample_gumbel<R: Rng + ?Sized>(theta: f64, rng: &mut R) -> (f64, f64) {
    if theta <= 1.0 + 1e-12 {
        return (open_unit(rng), open_unit(rng));
    }
    let alpha = 1.0 / theta;
    let ln_s = ln_positive_stable(alpha, rng);
    let e1: f64 = rng.sample(Exp1);
    let e2: f64 = rng.sample(Exp1);
    // Generator inverse ψ(t) = exp(-t^α), with t = E / S.
    let u = (-(alpha * (e1.ln() - ln_s)).exp()).exp();
    let v = (-(alpha * (e2.ln() - ln_s)).exp()).exp();
    (u, v)
}

/// Log of a positive stable variate with Laplace transform `exp(-s^α)`,
/// `α ∈ (0,1)` (Kanter's representation).
fn ln_positive_stable<R: Rng + ?Sized>(alpha: f64, rng: &mut R) -> f64 {
    let v = PI * open_unit(rng);
    let w: f64 = rng.sample(Exp1);
    let ln_a = (alpha * v).sin().ln() - v.sin().ln() / alpha;
    let ln_b = (1.0 - alpha) / alpha * (((1.0 - alpha) * v).sin().ln() - w.ln());
    ln_a + ln_b
}
