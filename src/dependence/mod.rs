//! Nonparametric dependence measures computed on every basin before any
//! copula is fitted.

pub mod correlation;
pub mod pseudo;
pub mod tail;

pub use correlation::{RankCorrelation, kendall, rank_correlation, spearman};
pub use pseudo::{pseudo_observations, to_pseudo};
pub use tail::tail_dependence;
