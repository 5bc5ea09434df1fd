//! Seasonal ARIMA models with concrete coefficients.

use std::fmt;

use crate::error::ArimaError;
use crate::polynomial::Polynomial;
use crate::process::ArimaProcess;
use crate::spec::SeasonalArimaSpec;

/// A seasonal ARIMA model
/// `φ(B)Φ(Bˢ)(1−B)ᵈ(1−Bˢ)ᴰ yₜ = θ(B)Θ(Bˢ) aₜ`, `Var(aₜ) = σ²`.
///
/// Coefficient vectors hold the tails of monic polynomials, so
/// `φ(B) = 1 + φ₁B + … + φₚBᵖ` and `θ(B) = 1 + θ₁B + … + θ_qB^q`.
/// Values are immutable; every transformation returns a new model.
#[derive(Clone, Debug, PartialEq)]
pub struct SeasonalArimaModel {
    spec: SeasonalArimaSpec,
    phi: Vec<f64>,
    bphi: Vec<f64>,
    theta: Vec<f64>,
    btheta: Vec<f64>,
    variance: f64,
}

impl SeasonalArimaModel {
    /// Creates a model from its specification and coefficient tails.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`ArimaError::CoefficientMismatch`] | a vector length differs from its order |
    /// | [`ArimaError::NonFiniteParameter`] | any coefficient or the variance is not finite |
    /// | [`ArimaError::NegativeVariance`] | `variance < 0` |
    pub fn new(
        spec: SeasonalArimaSpec,
        phi: Vec<f64>,
        bphi: Vec<f64>,
        theta: Vec<f64>,
        btheta: Vec<f64>,
        variance: f64,
    ) -> Result<Self, ArimaError> {
        check_len("regular AR", spec.p(), &phi)?;
        check_len("seasonal AR", spec.bp(), &bphi)?;
        check_len("regular MA", spec.q(), &theta)?;
        check_len("seasonal MA", spec.bq(), &btheta)?;
        if phi
            .iter()
            .chain(&bphi)
            .chain(&theta)
            .chain(&btheta)
            .any(|c| !c.is_finite())
            || !variance.is_finite()
        {
            return Err(ArimaError::NonFiniteParameter);
        }
        if variance < 0.0 {
            return Err(ArimaError::NegativeVariance(variance));
        }
        Ok(Self {
            spec,
            phi,
            bphi,
            theta,
            btheta,
            variance,
        })
    }

    /// A model with every coefficient at zero and unit variance.
    pub fn zeroed(spec: SeasonalArimaSpec) -> Self {
        Self {
            spec,
            phi: vec![0.0; spec.p()],
            bphi: vec![0.0; spec.bp()],
            theta: vec![0.0; spec.q()],
            btheta: vec![0.0; spec.bq()],
            variance: 1.0,
        }
    }

    /// The airline model `(0,1,1)(0,1,1)ₛ` with MA coefficients `θ`, `Θ`.
    pub fn airline(
        period: usize,
        theta: f64,
        btheta: f64,
        variance: f64,
    ) -> Result<Self, ArimaError> {
        let spec = SeasonalArimaSpec::new(0, 1, 1, 0, 1, 1, period)?;
        Self::new(spec, vec![], vec![], vec![theta], vec![btheta], variance)
    }

    /// The order specification.
    pub fn spec(&self) -> &SeasonalArimaSpec {
        &self.spec
    }

    /// Regular AR coefficients `φ₁…φₚ`.
    pub fn phi(&self) -> &[f64] {
        &self.phi
    }

    /// Seasonal AR coefficients `Φ₁…Φ_P`.
    pub fn bphi(&self) -> &[f64] {
        &self.bphi
    }

    /// Regular MA coefficients `θ₁…θ_q`.
    pub fn theta(&self) -> &[f64] {
        &self.theta
    }

    /// Seasonal MA coefficients `Θ₁…Θ_Q`.
    pub fn btheta(&self) -> &[f64] {
        &self.btheta
    }

    /// Innovation variance `σ²`.
    pub fn variance(&self) -> f64 {
        self.variance
    }

    /// Regular AR operator `φ(B)`.
    pub fn regular_ar(&self) -> Polynomial {
        Polynomial::monic(&self.phi)
    }

    /// Seasonal AR operator `Φ(Bˢ)` expanded in `B`.
    pub fn seasonal_ar(&self) -> Polynomial {
        Polynomial::seasonal(&self.bphi, self.spec.period())
    }

    /// Stationary AR operator `φ(B)Φ(Bˢ)`.
    pub fn stationary_ar(&self) -> Polynomial {
        &self.regular_ar() * &self.seasonal_ar()
    }

    /// Differencing operator `(1−B)ᵈ(1−Bˢ)ᴰ`.
    pub fn differencing(&self) -> Polynomial {
        &Polynomial::difference(self.spec.d())
            * &Polynomial::seasonal_difference(self.spec.period(), self.spec.bd())
    }

    /// Full AR operator including differencing.
    pub fn ar(&self) -> Polynomial {
        &self.stationary_ar() * &self.differencing()
    }

    /// Regular MA operator `θ(B)`.
    pub fn regular_ma(&self) -> Polynomial {
        Polynomial::monic(&self.theta)
    }

    /// Seasonal MA operator `Θ(Bˢ)` expanded in `B`.
    pub fn seasonal_ma(&self) -> Polynomial {
        Polynomial::seasonal(&self.btheta, self.spec.period())
    }

    /// Full MA operator `θ(B)Θ(Bˢ)`.
    pub fn ma(&self) -> Polynomial {
        &self.regular_ma() * &self.seasonal_ma()
    }

    /// The model as a generic ARIMA process.
    pub fn process(&self) -> ArimaProcess {
        ArimaProcess::new(
            self.stationary_ar(),
            self.differencing(),
            self.ma(),
            self.variance,
        )
    }

    /// Pseudo-spectrum `σ²|θΘ|² / |φΦΔ|²` at frequency `ω`; infinite at the
    /// unit roots of the differencing operator.
    pub fn spectrum(&self, omega: f64) -> f64 {
        self.process().spectrum(omega)
    }

    /// Returns a copy with a different innovation variance.
    pub fn with_variance(&self, variance: f64) -> Self {
        Self {
            variance,
            ..self.clone()
        }
    }

    /// Returns a copy with new regular MA coefficients (same order).
    pub fn with_theta(&self, theta: Vec<f64>) -> Result<Self, ArimaError> {
        Self::new(
            self.spec,
            self.phi.clone(),
            self.bphi.clone(),
            theta,
            self.btheta.clone(),
            self.variance,
        )
    }

    /// Returns a copy with new seasonal MA coefficients (same order).
    pub fn with_btheta(&self, btheta: Vec<f64>) -> Result<Self, ArimaError> {
        Self::new(
            self.spec,
            self.phi.clone(),
            self.bphi.clone(),
            self.theta.clone(),
            btheta,
            self.variance,
        )
    }

    /// Re-targets the model to `spec`, keeping the leading coefficients of
    /// every polynomial that survives and zero-filling new terms.
    pub fn respecified(&self, spec: SeasonalArimaSpec) -> Self {
        Self {
            spec,
            phi: resize(&self.phi, spec.p()),
            bphi: resize(&self.bphi, spec.bp()),
            theta: resize(&self.theta, spec.q()),
            btheta: resize(&self.btheta, spec.bq()),
            variance: self.variance,
        }
    }
}

impl fmt::Display for SeasonalArimaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.spec)?;
        let parts = [
            ("phi", &self.phi),
            ("bphi", &self.bphi),
            ("theta", &self.theta),
            ("btheta", &self.btheta),
        ];
        for (name, coeffs) in parts {
            if !coeffs.is_empty() {
                let list: Vec<String> = coeffs.iter().map(|c| format!("{c:.4}")).collect();
                write!(f, " {name}=[{}]", list.join(", "))?;
            }
        }
        write!(f, " var={:.6}", self.variance)
    }
}

fn check_len(part: &'static str, expected: usize, coeffs: &[f64]) -> Result<(), ArimaError> {
    if coeffs.len() != expected {
        return Err(ArimaError::CoefficientMismatch {
            part,
            expected,
            got: coeffs.len(),
        });
    }
    Ok(())
}

fn resize(coeffs: &[f64], len: usize) -> Vec<f64> {
    let mut out: Vec<f64> = coeffs.iter().take(len).copied().collect();
    out.resize(len, 0.0);
    out
}
