//! Numerical utilities: ranking, normal distribution functions, quadrature.

pub mod normal;
pub mod quadrature;
pub mod rank;

pub use normal::*;
pub use rank::*;
