//! Error types for the sadj-extract crate.

use sadj_arima::ArimaError;

/// Error type for all fallible operations in the sadj-extract crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExtractError {
    /// Returned when the series is empty.
    #[error("series is empty")]
    EmptySeries,

    /// Returned when the series contains NaN or infinite values.
    #[error("series contains non-finite values")]
    NonFiniteSeries,

    /// Returned when the series is too short for the model.
    #[error("insufficient data: got {n} observations, need at least {min}")]
    InsufficientData {
        /// Number of observations provided.
        n: usize,
        /// Minimum number of observations required.
        min: usize,
    },

    /// Returned when the aggregate MA polynomial has a unit root, which the
    /// Wiener-Kolmogorov filter cannot invert.
    #[error("aggregate MA polynomial is not invertible (root modulus {modulus:.6})")]
    NonInvertible {
        /// Largest inverse root modulus.
        modulus: f64,
    },

    /// Returned when a covariance matrix is not positive definite.
    #[error("singular {context}")]
    Singular {
        /// Which matrix failed.
        context: &'static str,
    },

    /// Wraps a filtering or polynomial error.
    #[error(transparent)]
    Arima(#[from] ArimaError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert_eq!(ExtractError::EmptySeries.to_string(), "series is empty");
        assert_eq!(
            ExtractError::InsufficientData { n: 10, min: 15 }.to_string(),
            "insufficient data: got 10 observations, need at least 15"
        );
        assert_eq!(
            ExtractError::NonInvertible { modulus: 1.0 }.to_string(),
            "aggregate MA polynomial is not invertible (root modulus 1.000000)"
        );
        assert_eq!(
            ExtractError::Singular {
                context: "signal covariance"
            }
            .to_string(),
            "singular signal covariance"
        );
    }

    #[test]
    fn error_transparent() {
        let e = ExtractError::from(ArimaError::EmptyData);
        assert_eq!(e.to_string(), "input data is empty");
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<ExtractError>();
    }
}
