//! Error types for the sadj-approx crate.

use sadj_arima::{ArimaError, SeasonalArimaSpec};

use crate::engine::Rejection;

/// Error type for all fallible operations in the sadj-approx crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApproxError {
    /// Returned when the configuration is outside its admissible range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the violated constraint.
        reason: String,
    },

    /// Returned when the search ends without a decomposable model.
    #[error("no decomposable model found after {rounds} rounds (last specification {spec})")]
    NonDecomposable {
        /// Specification of the last candidate tried.
        spec: SeasonalArimaSpec,
        /// Rounds used.
        rounds: usize,
        /// Every candidate rejected on the way, in order.
        rejected: Vec<Rejection>,
    },

    /// Wraps a root-finding or model construction error.
    #[error(transparent)]
    Arima(#[from] ArimaError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_invalid_config() {
        let e = ApproxError::InvalidConfig {
            reason: "max_rounds must be in [1, 10], got 0".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "invalid configuration: max_rounds must be in [1, 10], got 0"
        );
    }

    #[test]
    fn error_non_decomposable() {
        let e = ApproxError::NonDecomposable {
            spec: SeasonalArimaSpec::airline(12),
            rounds: 3,
            rejected: vec![],
        };
        assert_eq!(
            e.to_string(),
            "no decomposable model found after 3 rounds (last specification (0,1,1)(0,1,1)12)"
        );
    }

    #[test]
    fn error_transparent() {
        let e = ApproxError::from(ArimaError::NonStationary);
        assert_eq!(e.to_string(), "autoregressive polynomial is not stationary");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<ApproxError>();
    }
}
