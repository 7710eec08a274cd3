//! Input/output helpers.
//!
//! - basin list and series ingest (`ingest`)
//! - atomic result rows (`export`)
//! - reading result rows back for merging (`merge`)

pub mod export;
pub mod ingest;
pub mod merge;

pub use export::*;
pub use ingest::*;
pub use merge::*;
