//! `basin-copula` library crate.
//!
//! The binary is a thin wrapper around this library so that:
//!
//! - the statistics are testable without spawning processes
//! - the per-basin pipeline can be driven from other tools
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod dependence;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod report;
