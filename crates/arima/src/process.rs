//! Generic ARIMA processes `φ(B)δ(B)xₜ = θ(B)aₜ`.
//!
//! [`ArimaProcess`] is the common currency between the seasonal model, the
//! components of a decomposition and the state-space machinery: the
//! stationary AR part and the unit-root (differencing) part are kept apart
//! because they are initialised differently by the Kalman filter.

use crate::acf;
use crate::error::ArimaError;
use crate::polynomial::Polynomial;
use crate::state_space::StateSpace;
use crate::symmetric::SymmetricPolynomial;

/// An ARIMA-type process with separate stationary and unit-root AR factors.
#[derive(Clone, Debug, PartialEq)]
pub struct ArimaProcess {
    stationary_ar: Polynomial,
    differencing: Polynomial,
    ma: Polynomial,
    variance: f64,
}

impl ArimaProcess {
    /// Creates a process from its operators and innovation variance.
    pub fn new(
        stationary_ar: Polynomial,
        differencing: Polynomial,
        ma: Polynomial,
        variance: f64,
    ) -> Self {
        Self {
            stationary_ar,
            differencing,
            ma,
            variance,
        }
    }

    /// White noise with the given variance.
    pub fn white_noise(variance: f64) -> Self {
        Self::new(Polynomial::one(), Polynomial::one(), Polynomial::one(), variance)
    }

    /// Stationary AR operator.
    pub fn stationary_ar(&self) -> &Polynomial {
        &self.stationary_ar
    }

    /// Unit-root AR operator.
    pub fn differencing(&self) -> &Polynomial {
        &self.differencing
    }

    /// MA operator.
    pub fn ma(&self) -> &Polynomial {
        &self.ma
    }

    /// Innovation variance.
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Full AR operator `φ(B)δ(B)`.
    pub fn ar(&self) -> Polynomial {
        &self.stationary_ar * &self.differencing
    }

    /// True when the process has no unit roots.
    pub fn is_stationary(&self) -> bool {
        self.differencing.degree() == 0
    }

    /// True when the process is white noise.
    pub fn is_white_noise(&self) -> bool {
        self.stationary_ar.degree() == 0 && self.differencing.degree() == 0 && self.ma.degree() == 0
    }

    /// Spectral numerator `σ²θ(z)θ(1/z)`.
    pub fn numerator(&self) -> SymmetricPolynomial {
        self.ma.acgf().scaled(self.variance)
    }

    /// Denominator `|φ(e^{−iω})δ(e^{−iω})|²` as a symmetric polynomial.
    pub fn denominator(&self) -> SymmetricPolynomial {
        self.ar().acgf()
    }

    /// Pseudo-spectrum at frequency `ω` (infinite at unit roots).
    pub fn spectrum(&self, omega: f64) -> f64 {
        let num = self.numerator().eval(omega);
        let den = self.ar().gain(omega);
        if den < 1e-24 {
            return if num > 0.0 { f64::INFINITY } else { 0.0 };
        }
        num / den
    }

    /// ψ-weights of `θ(B) / (φ(B)δ(B))`.
    pub fn psi_weights(&self, n: usize) -> Vec<f64> {
        acf::psi_weights(&self.ma, &self.ar(), n)
    }

    /// Autocovariances of the stationary transform `δ(B)xₜ` up to `nlags`.
    pub fn differenced_autocovariances(&self, nlags: usize) -> Result<Vec<f64>, ArimaError> {
        acf::autocovariances(&self.numerator(), &self.stationary_ar, nlags)
    }

    /// State-space form with exact diffuse initialisation of the unit roots.
    pub fn state_space(&self) -> Result<StateSpace, ArimaError> {
        StateSpace::arima(&self.differencing, &self.stationary_ar, &self.ma, self.variance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn random_walk_psi_weights_are_one() {
        let p = ArimaProcess::new(
            Polynomial::one(),
            Polynomial::difference(1),
            Polynomial::one(),
            1.0,
        );
        assert!(p.psi_weights(10).iter().all(|w| (*w - 1.0).abs() < 1e-14));
        assert!(!p.is_stationary());
    }

    #[test]
    fn ar1_spectrum() {
        let p = ArimaProcess::new(
            Polynomial::monic(&[-0.5]),
            Polynomial::one(),
            Polynomial::one(),
            1.0,
        );
        // 1 / |1 - 0.5|² at ω = 0
        assert_abs_diff_eq!(p.spectrum(0.0), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn unit_root_spectrum_is_infinite() {
        let p = ArimaProcess::new(
            Polynomial::one(),
            Polynomial::difference(1),
            Polynomial::one(),
            1.0,
        );
        assert!(p.spectrum(0.0).is_infinite());
    }

    #[test]
    fn white_noise_detection() {
        assert!(ArimaProcess::white_noise(0.3).is_white_noise());
    }
}
