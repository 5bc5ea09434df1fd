//! Error types for the sadj-ucm crate.

use sadj_arima::ArimaError;

use crate::component::ComponentKind;

/// Error type for all fallible operations in the sadj-ucm crate.
///
/// Every variant except [`UcmError::InvalidConfig`] means that the model has
/// no admissible canonical decomposition.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UcmError {
    /// Returned when a threshold is outside its admissible range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the violated constraint.
        reason: String,
    },

    /// Returned when the variance left for the noise component is negative.
    #[error("canonical noise variance is negative ({variance:.6e})")]
    NegativeNoise {
        /// The (negative) maximal noise variance.
        variance: f64,
    },

    /// Returned when a component numerator is not a valid spectrum.
    #[error("cannot factorize the {component} spectrum: {source}")]
    Factorization {
        /// The component whose numerator failed.
        component: ComponentKind,
        /// Underlying factorization error.
        source: ArimaError,
    },

    /// Returned when the partial-fraction system has no solution.
    #[error("partial fraction expansion failed: {reason}")]
    PartialFractions {
        /// Description of the numerical failure.
        reason: String,
    },

    /// Wraps a lower-level polynomial or model error.
    #[error(transparent)]
    Arima(#[from] ArimaError),
}

impl UcmError {
    /// True when the error means "this model does not decompose", as opposed
    /// to a caller mistake.
    pub fn is_decomposition_failure(&self) -> bool {
        !matches!(self, UcmError::InvalidConfig { .. })
    }
}
