//! Bivariate copula families.
//!
//! Each family is implemented as small, pure functions keyed on
//! `CopulaFamily`, so the fitting and goodness-of-fit code can stay generic:
//!
//! - `copula_cdf`: evaluate `C_θ(u, v)`
//! - `tau_of_parameter`: Kendall's τ implied by `θ`
//! - `sample_copula`: draw pairs from `C_θ`

pub mod copula;
pub mod sample;

pub use copula::*;
pub use sample::*;
