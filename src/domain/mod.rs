//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - basin inputs (`BasinSeriesPair`) and pseudo-observations
//! - dependence estimates and copula candidates
//! - the per-basin result row and run configuration

pub mod types;

pub use types::*;
