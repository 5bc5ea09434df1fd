//! Error types for the sadj-seats crate.

use sadj_approx::ApproxError;
use sadj_arima::{ArimaError, SeasonalArimaSpec};
use sadj_extract::ExtractError;
use sadj_ucm::UcmError;

use crate::warning::Warning;

/// Error type for all fallible operations in the sadj-seats crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SeatsError {
    /// Returned when a configuration value is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the violated constraint.
        reason: String,
    },

    /// Returned when the series is empty.
    #[error("series is empty")]
    EmptySeries,

    /// Returned when the series contains NaN or infinite values.
    #[error("series contains non-finite values")]
    NonFiniteSeries,

    /// Returned when a log decomposition is asked for a series with values
    /// that are not strictly positive.
    #[error("log transform needs strictly positive values")]
    NonPositiveSeries,

    /// Returned when the series is too short for the model.
    #[error("insufficient data: got {n} observations, need at least {min}")]
    InsufficientData {
        /// Number of observations provided.
        n: usize,
        /// Minimum number of observations required.
        min: usize,
    },

    /// Returned when validation cannot stabilise the model.
    #[error("invalid model: {reason}")]
    InvalidModel {
        /// Why the model was rejected.
        reason: String,
    },

    /// Returned when neither the model nor any approximation decomposes.
    #[error("model {spec} is not decomposable ({rounds} approximation rounds)")]
    NonDecomposable {
        /// Last specification tried.
        spec: SeasonalArimaSpec,
        /// Approximation rounds used.
        rounds: usize,
        /// Warnings raised on the way, including every rejected candidate.
        warnings: Vec<Warning>,
    },

    /// Wraps a model or likelihood error.
    #[error(transparent)]
    Arima(#[from] ArimaError),

    /// Wraps a decomposition error.
    #[error(transparent)]
    Ucm(#[from] UcmError),

    /// Wraps an approximation error other than exhaustion.
    #[error(transparent)]
    Approx(#[from] ApproxError),

    /// Wraps a signal extraction error.
    #[error(transparent)]
    Extract(#[from] ExtractError),
}
