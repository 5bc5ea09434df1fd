//! The estimator trait and the choice between implementations.

use std::fmt;
use std::str::FromStr;

use sadj_ucm::UnobservedComponentsModel;

use crate::error::ExtractError;
use crate::estimates::ComponentEstimates;
use crate::matrix::ExactMatrix;
use crate::smoother::KalmanSmoother;
use crate::wk::WienerKolmogorov;

/// Estimates the components of a series given a decomposed model.
///
/// The model is expressed at unit innovation variance; `ser` is the
/// standard error of the fitted model's innovations and scales every
/// standard error in the output.
pub trait ComponentEstimator {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Estimates every component of `model` in sample, plus `horizon`
    /// forecasts.
    fn estimate(
        &self,
        series: &[f64],
        model: &UnobservedComponentsModel,
        horizon: usize,
        ser: f64,
    ) -> Result<ComponentEstimates, ExtractError>;
}

/// Available estimators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EstimationMethod {
    /// Symmetric Wiener-Kolmogorov filters applied to the series extended
    /// with backcasts and forecasts.
    #[default]
    WienerKolmogorov,
    /// Fixed-interval Kalman smoother on the composite state-space model.
    Smoother,
    /// Exact finite-sample signal extraction by dense matrices.
    ExactMatrix,
}

impl EstimationMethod {
    /// Boxed estimator for this method, with default settings.
    pub fn estimator(self) -> Box<dyn ComponentEstimator + Send + Sync> {
        match self {
            EstimationMethod::WienerKolmogorov => Box::new(WienerKolmogorov::default()),
            EstimationMethod::Smoother => Box::new(KalmanSmoother),
            EstimationMethod::ExactMatrix => Box::new(ExactMatrix),
        }
    }

    /// The identifier accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            EstimationMethod::WienerKolmogorov => "wk",
            EstimationMethod::Smoother => "smoother",
            EstimationMethod::ExactMatrix => "matrix",
        }
    }
}

impl fmt::Display for EstimationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EstimationMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "wk" | "burman" => Ok(EstimationMethod::WienerKolmogorov),
            "smoother" | "kalman" => Ok(EstimationMethod::Smoother),
            "matrix" | "mcelroy" => Ok(EstimationMethod::ExactMatrix),
            other => Err(format!(
                "unknown estimation method {other:?} (expected wk, smoother or matrix)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display() {
        for m in [
            EstimationMethod::WienerKolmogorov,
            EstimationMethod::Smoother,
            EstimationMethod::ExactMatrix,
        ] {
            assert_eq!(m.to_string().parse::<EstimationMethod>().unwrap(), m);
        }
        assert_eq!("Kalman".parse::<EstimationMethod>().unwrap(), EstimationMethod::Smoother);
        assert!("x13".parse::<EstimationMethod>().is_err());
    }

    #[test]
    fn estimator_names() {
        assert_eq!(EstimationMethod::WienerKolmogorov.estimator().name(), "wk");
        assert_eq!(EstimationMethod::Smoother.estimator().name(), "smoother");
        assert_eq!(EstimationMethod::ExactMatrix.estimator().name(), "matrix");
        assert_eq!(EstimationMethod::default(), EstimationMethod::WienerKolmogorov);
    }
}
