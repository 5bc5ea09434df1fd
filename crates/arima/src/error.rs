//! Error types for the sadj-arima crate.

/// Error type for all fallible operations in the sadj-arima crate.
///
/// Covers malformed specifications, invalid input series and the numerical
/// failures that can occur while filtering or estimating a model.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ArimaError {
    /// Returned when the input series is empty.
    #[error("input data is empty")]
    EmptyData,

    /// Returned when the series is too short for the requested operation.
    #[error("insufficient data: got {n} observations, need at least {min}")]
    InsufficientData {
        /// Number of observations provided.
        n: usize,
        /// Minimum number of observations required.
        min: usize,
    },

    /// Returned when the input data contains NaN or infinite values.
    #[error("input data contains non-finite values")]
    NonFiniteData,

    /// Returned when a specification is structurally invalid.
    #[error("invalid order specification: {reason}")]
    InvalidOrder {
        /// Description of the violated constraint.
        reason: String,
    },

    /// Returned when a coefficient vector does not match its declared order.
    #[error("{part} has {got} coefficients, expected {expected}")]
    CoefficientMismatch {
        /// Which polynomial was mis-sized.
        part: &'static str,
        /// Declared order.
        expected: usize,
        /// Number of coefficients supplied.
        got: usize,
    },

    /// Returned when a coefficient or variance is NaN or infinite.
    #[error("model contains non-finite parameters")]
    NonFiniteParameter,

    /// Returned when an innovation variance is negative.
    #[error("innovation variance must be non-negative, got {0}")]
    NegativeVariance(f64),

    /// Returned when polynomial root finding does not produce finite roots.
    #[error("root finding failed for polynomial of degree {degree}")]
    RootFindingFailed {
        /// Degree of the offending polynomial.
        degree: usize,
    },

    /// Returned when a symmetric polynomial cannot be written as `v·θ(z)θ(1/z)`.
    #[error("spectral factorization failed: {reason}")]
    FactorizationFailed {
        /// Why the factorization was rejected.
        reason: String,
    },

    /// Returned when a linear system or covariance matrix is singular.
    #[error("singular system in {context}")]
    Singular {
        /// Where the singular system was encountered.
        context: &'static str,
    },

    /// Returned when an operation requires a stationary autoregressive part.
    #[error("autoregressive polynomial is not stationary")]
    NonStationary,

    /// Returned when the optimisation algorithm fails to converge.
    #[error("optimisation failed to converge")]
    OptimizationFailed,
}
