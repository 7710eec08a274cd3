//! Copula fitting orchestration.
//!
//! Responsibilities:
//!
//! - invert Kendall's τ to a parameter for each family
//! - score each candidate with a Cramér–von Mises statistic (parallel bootstrap)
//! - select the best family with a deterministic tie-break

pub mod estimate;
pub mod fitter;
pub mod gof;
pub mod selection;

pub use estimate::*;
pub use fitter::*;
pub use gof::*;
pub use selection::*;
