//! Assignment of autoregressive roots to components.

use std::f64::consts::PI;

use sadj_arima::{Polynomial, SeasonalArimaModel};
use tracing::debug;

use crate::config::SelectorConfig;
use crate::error::UcmError;

/// AR factors of the trend, seasonal and transitory components.
///
/// Unit roots coming from differencing are kept apart from the stationary
/// roots so that the state-space form can initialise them as diffuse.
#[derive(Clone, Debug, PartialEq)]
pub struct RootAllocation {
    /// `(1−B)^{d+D}`.
    pub trend_unit: Polynomial,
    /// Stationary trend roots (real, positive, modulus ≥ rmod).
    pub trend_stationary: Polynomial,
    /// `(1 + B + … + B^{s−1})^D`.
    pub seasonal_unit: Polynomial,
    /// Stationary roots at seasonal frequencies with modulus ≥ rmod.
    pub seasonal_stationary: Polynomial,
    /// Every remaining stationary root.
    pub transitory: Polynomial,
}

impl RootAllocation {
    /// Full trend AR operator.
    pub fn trend(&self) -> Polynomial {
        &self.trend_unit * &self.trend_stationary
    }

    /// Full seasonal AR operator.
    pub fn seasonal(&self) -> Polynomial {
        &self.seasonal_unit * &self.seasonal_stationary
    }
}

/// Splits the AR side of a model between the components.
#[derive(Clone, Copy, Debug, Default)]
pub struct RootSelector {
    config: SelectorConfig,
}

impl RootSelector {
    /// Creates a selector with the given thresholds.
    pub fn new(config: SelectorConfig) -> Self {
        Self { config }
    }

    /// Allocates the roots of `model`.
    ///
    /// Inverse roots `r` of the stationary AR operator go to the trend when
    /// their argument is within `epsphi` of zero and `|r| ≥ rmod`, to the
    /// seasonal when their argument is within `epsphi` of a seasonal
    /// frequency `2πk/s` and `|r| ≥ rmod`, and to the transitory otherwise.
    pub fn allocate(&self, model: &SeasonalArimaModel) -> Result<RootAllocation, UcmError> {
        let spec = model.spec();
        let period = spec.period();
        let tol = self.config.epsphi().to_radians();
        let rmod = self.config.rmod();

        let mut trend = Vec::new();
        let mut seasonal = Vec::new();
        let mut transitory = Vec::new();
        let stationary = model.stationary_ar();
        for r in stationary.inverse_roots()? {
            let arg = r.arg().abs();
            let big = r.norm() >= rmod;
            if big && arg <= tol {
                trend.push(r);
            } else if big && period > 1 && is_seasonal_frequency(arg, period, tol) {
                seasonal.push(r);
            } else {
                transitory.push(r);
            }
        }
        debug!(
            trend = trend.len(),
            seasonal = seasonal.len(),
            transitory = transitory.len(),
            "allocated stationary AR roots"
        );

        let trend_unit = Polynomial::difference(spec.d() + spec.bd());
        let seasonal_unit = if period > 1 {
            Polynomial::seasonal_sum(period).pow(spec.bd())
        } else {
            Polynomial::one()
        };
        Ok(RootAllocation {
            trend_unit,
            trend_stationary: Polynomial::from_inverse_roots(&trend),
            seasonal_unit,
            seasonal_stationary: Polynomial::from_inverse_roots(&seasonal),
            transitory: Polynomial::from_inverse_roots(&transitory),
        })
    }
}

fn is_seasonal_frequency(arg: f64, period: usize, tol: f64) -> bool {
    (1..=period / 2).any(|k| (arg - 2.0 * PI * k as f64 / period as f64).abs() <= tol)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use sadj_arima::SeasonalArimaSpec;

    #[test]
    fn airline_has_only_unit_roots() {
        let m = SeasonalArimaModel::airline(12, -0.4, -0.6, 1.0).unwrap();
        let a = RootSelector::default().allocate(&m).unwrap();
        assert_eq!(a.trend_unit, Polynomial::difference(2));
        assert_eq!(a.seasonal_unit.degree(), 11);
        assert!(a.trend_stationary.is_one());
        assert!(a.seasonal_stationary.is_one());
        assert!(a.transitory.is_one());
        // (1−B)² S(B) = (1−B)(1−B¹²)
        let product = &a.trend() * &a.seasonal();
        for (x, y) in product.coefficients().iter().zip(m.differencing().coefficients()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-12);
        }
    }

    #[test]
    fn positive_ar_root_goes_to_trend() {
        let spec = SeasonalArimaSpec::regular(1, 1, 0);
        let m = SeasonalArimaModel::new(spec, vec![-0.8], vec![], vec![], vec![], 1.0).unwrap();
        let a = RootSelector::default().allocate(&m).unwrap();
        assert_abs_diff_eq!(a.trend_stationary.coefficients()[1], -0.8, epsilon = 1e-12);
        assert!(a.transitory.is_one());
    }

    #[test]
    fn small_or_negative_roots_are_transitory() {
        let spec = SeasonalArimaSpec::regular(2, 1, 0);
        // (1 - 0.3B)(1 + 0.7B)
        let ar = &Polynomial::monic(&[-0.3]) * &Polynomial::monic(&[0.7]);
        let m = SeasonalArimaModel::new(spec, ar.tail().to_vec(), vec![], vec![], vec![], 1.0)
            .unwrap();
        let a = RootSelector::default().allocate(&m).unwrap();
        assert!(a.trend_stationary.is_one());
        assert_eq!(a.transitory.degree(), 2);
    }

    #[test]
    fn negative_seasonal_ar_is_seasonal() {
        // 1 + 0.8B⁴ has inverse roots at ±45° and ±135°: quarterly harmonics
        // are at 90° and 180°, so these stay transitory; 1 - 0.8B⁴ has roots
        // at 0°, 90°, 180°
        let spec = SeasonalArimaSpec::new(0, 1, 1, 1, 0, 0, 4).unwrap();
        let m = SeasonalArimaModel::new(spec, vec![], vec![-0.8], vec![0.1], vec![], 1.0).unwrap();
        let a = RootSelector::default().allocate(&m).unwrap();
        assert_eq!(a.trend_stationary.degree(), 1);
        assert_eq!(a.seasonal_stationary.degree(), 3);
        assert!(a.transitory.is_one());

        let m = SeasonalArimaModel::new(spec, vec![], vec![0.8], vec![0.1], vec![], 1.0).unwrap();
        let a = RootSelector::default().allocate(&m).unwrap();
        assert_eq!(a.transitory.degree(), 4);
    }
}
