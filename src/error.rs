//! Error types.
//!
//! - `AnalysisError` is the engine's typed error. Most variants are
//!   *recoverable*: they end up as a status code on the basin's result row.
//! - `AppError` is what crosses the process boundary. It carries the exit code.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{BasinStatus, CopulaFamily};

/// Exit code for invalid arguments or configuration.
pub const EXIT_CONFIG: u8 = 2;
/// Exit code for unreadable or malformed basin input.
pub const EXIT_INPUT: u8 = 3;
/// Exit code for failures writing result rows.
pub const EXIT_OUTPUT: u8 = 4;
/// Exit code when at least one basin of a batch failed.
pub const EXIT_BATCH: u8 = 5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("insufficient data: {n} paired observations, at least {min} required")]
    InsufficientData { n: usize, min: usize },

    #[error("degenerate series: `{series}` has zero variance")]
    DegenerateSeries { series: &'static str },

    #[error("no copula family yields a valid parameter")]
    NoFeasibleCopula,

    #[error("{family} parameter search did not converge (tau={tau:.6})")]
    RootFindNonConvergence { family: CopulaFamily, tau: f64 },

    #[error("failed to read '{}': {message}", .path.display())]
    InputRead { path: PathBuf, message: String },

    #[error("series length mismatch: precipitation has {precipitation}, runoff has {runoff}")]
    LengthMismatch { precipitation: usize, runoff: usize },

    #[error("non-finite value in `{series}` at index {index}")]
    NonFiniteValue { series: &'static str, index: usize },
}

impl AnalysisError {
    /// Status recorded on the result row when this error ends a basin early.
    ///
    /// `RootFindNonConvergence` only removes one family from the candidate set,
    /// so it never sets a basin status on its own.
    pub fn status(&self) -> Option<BasinStatus> {
        match self {
            AnalysisError::InsufficientData { .. } => Some(BasinStatus::Insufficient),
            AnalysisError::DegenerateSeries { .. } => Some(BasinStatus::Degenerate),
            AnalysisError::NoFeasibleCopula => Some(BasinStatus::NoFit),
            _ => None,
        }
    }

    /// `false` for errors that abort the basin without writing a row.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            AnalysisError::InputRead { .. }
                | AnalysisError::LengthMismatch { .. }
                | AnalysisError::NonFiniteValue { .. }
        )
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::new(EXIT_OUTPUT, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        let exit_code = match err {
            AnalysisError::InputRead { .. }
            | AnalysisError::LengthMismatch { .. }
            | AnalysisError::NonFiniteValue { .. } => EXIT_INPUT,
            _ => EXIT_CONFIG,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recoverable_errors_map_to_status() {
        let err = AnalysisError::InsufficientData { n: 5, min: 10 };
        assert_eq!(err.status(), Some(BasinStatus::Insufficient));
        assert!(err.is_recoverable());

        let err = AnalysisError::DegenerateSeries { series: "runoff" };
        assert_eq!(err.status(), Some(BasinStatus::Degenerate));

        assert_eq!(AnalysisError::NoFeasibleCopula.status(), Some(BasinStatus::NoFit));

        let err = AnalysisError::RootFindNonConvergence {
            family: CopulaFamily::Frank,
            tau: 0.999,
        };
        assert!(err.is_recoverable());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn input_errors_are_fatal_with_input_exit_code() {
        let err = AnalysisError::InputRead {
            path: PathBuf::from("missing.csv"),
            message: "not found".to_string(),
        };
        assert!(!err.is_recoverable());
        let app: AppError = err.into();
        assert_eq!(app.exit_code(), EXIT_INPUT);
        assert!(app.to_string().contains("missing.csv"));
    }
}
