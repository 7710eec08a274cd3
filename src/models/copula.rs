//! Closed-form CDFs and τ relations for the four supported families.
//!
//! Parameter domains:
//!
//! | family   | parameter | domain      | τ(θ)                          |
//! |----------|-----------|-------------|-------------------------------|
//! | Gaussian | ρ         | (-1, 1)     | 2/π · asin ρ                  |
//! | Clayton  | θ         | (0, ∞)      | θ / (θ + 2)                   |
//! | Gumbel   | θ         | [1, ∞)      | 1 - 1/θ                       |
//! | Frank    | θ         | ℝ \ {0}     | 1 - 4/θ · (1 - D₁(θ))         |
//!
//! The Archimedean CDFs are evaluated through their generators in log space so
//! that large parameters and values near the unit-square boundary neither
//! overflow nor lose all precision.

use std::f64::consts::PI;

use crate::domain::CopulaFamily;
use crate::math::quadrature::integrate;
use crate::math::{bvn_cdf, norm_ppf};

/// `C_θ(u, v)` for `(u, v)` in the closed unit square.
pub fn copula_cdf(family: CopulaFamily, theta: f64, u: f64, v: f64) -> f64 {
    // Boundary conditions shared by every copula.
    if u <= 0.0 || v <= 0.0 {
        return 0.0;
    }
    if u >= 1.0 {
        return v.min(1.0);
    }
    if v >= 1.0 {
        return u;
    }

    let c = match family {
        CopulaFamily::Gaussian => gaussian_cdf(theta, u, v),
        CopulaFamily::Clayton => clayton_cdf(theta, u, v),
        CopulaFamily::Gumbel => gumbel_cdf(theta, u, v),
        CopulaFamily::Frank => frank_cdf(theta, u, v),
    };

    // Clamp to the Fréchet–Hoeffding bounds to absorb rounding.
    c.clamp((u + v - 1.0).max(0.0), u.min(v))
}

/// `true` if `theta` lies in the family's parameter domain.
pub fn is_valid_parameter(family: CopulaFamily, theta: f64) -> bool {
    if !theta.is_finite() {
        return false;
    }
    match family {
        CopulaFamily::Gaussian => theta.abs() < 1.0,
        CopulaFamily::Clayton => theta > 0.0,
        CopulaFamily::Gumbel => theta >= 1.0,
        CopulaFamily::Frank => theta != 0.0,
    }
}

/// Kendall's τ implied by a parameter value.
pub fn tau_of_parameter(family: CopulaFamily, theta: f64) -> f64 {
    match family {
        CopulaFamily::Gaussian => 2.0 / PI * theta.asin(),
        CopulaFamily::Clayton => theta / (theta + 2.0),
        CopulaFamily::Gumbel => 1.0 - 1.0 / theta,
        CopulaFamily::Frank => frank_tau(theta),
    }
}

/// Frank's τ as a function of θ. Continuous through θ = 0.
pub fn frank_tau(theta: f64) -> f64 {
    if theta.abs() < 1e-8 {
        // τ ≈ θ/9 near the origin.
        return theta / 9.0;
    }
    1.0 - 4.0 / theta * (1.0 - debye1(theta))
}

/// First Debye function `D₁(x) = (1/x) ∫₀ˣ t / (eᵗ - 1) dt`.
///
/// Negative arguments use `D₁(-x) = D₁(x) + x/2`.
pub fn debye1(x: f64) -> f64 {
    if x < 0.0 {
        return debye1(-x) - x / 2.0;
    }
    if x < 1e-8 {
        return 1.0 - x / 4.0;
    }
    let panels = ((x / 4.0).ceil() as usize).clamp(2, 64);
    integrate(debye_integrand, 0.0, x, panels) / x
}

fn debye_integrand(t: f64) -> f64 {
    if t < 1e-12 { 1.0 } else { t / t.exp_m1() }
}

fn gaussian_cdf(rho: f64, u: f64, v: f64) -> f64 {
    bvn_cdf(norm_ppf(u), norm_ppf(v), rho)
}

fn clayton_cdf(theta: f64, u: f64, v: f64) -> f64 {
    if theta.abs() < 1e-12 {
        return u * v;
    }
    // log(u^-θ + v^-θ - 1) with a = -θ ln u, b = -θ ln v, both >= 0.
    let a = -theta * u.ln();
    let b = -theta * v.ln();
    let m = a.max(b);
    let inner = (a - m).exp() + (b - m).exp() - (-m).exp();
    if inner <= 0.0 {
        return 0.0;
    }
    let log_s = m + inner.ln();
    (-log_s / theta).exp()
}

fn gumbel_cdf(theta: f64, u: f64, v: f64) -> f64 {
    let x = -u.ln();
    let y = -v.ln();
    let hi = x.max(y);
    let lo = x.min(y);
    if hi == 0.0 {
        return 1.0;
    }
    // ((x^θ + y^θ))^(1/θ) factored to keep (lo/hi)^θ in [0, 1].
    let s = hi * (1.0 + (lo / hi).powf(theta)).powf(1.0 / theta);
    (-s).exp()
}

fn frank_cdf(theta: f64, u: f64, v: f64) -> f64 {
    if theta.abs() < 1e-12 {
        return u * v;
    }
    let num = (-theta * u).exp_m1() * (-theta * v).exp_m1();
    let den = (-theta).exp_m1();
    -(num / den).ln_1p() / theta
}
