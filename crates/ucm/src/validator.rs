//! Stabilisation and simplification of candidate models.
//!
//! [`ModelValidator`] is a composition of two policies: a
//! [`SimplificationPolicy`] that removes AR/MA factors which cancel, and a
//! [`BoundaryPolicy`] that keeps the MA polynomials away from the unit
//! circle. Both act on one polynomial at a time; the validator applies them
//! to the regular and the seasonal parts.

use num_complex::Complex64;
use sadj_arima::{Polynomial, SeasonalArimaModel};
use tracing::{debug, instrument, warn};

use crate::config::ValidatorConfig;

/// Slack added to `xl` before a root counts as outside the boundary.
const BOUNDARY_SLACK: f64 = 1e-6;

/// Outcome of a validation.
#[derive(Clone, Debug, PartialEq)]
pub enum Validation {
    /// The model needs no change.
    Valid,
    /// The model was replaced.
    Changed {
        /// The replacement model.
        model: SeasonalArimaModel,
        /// An MA root was clamped to the boundary.
        cut_off: bool,
        /// Common factors were cancelled.
        simplified: bool,
    },
    /// No stabilised model exists.
    Invalid {
        /// Why the model was rejected.
        reason: String,
    },
}

impl Validation {
    /// The model to continue with: the replacement when changed, `original`
    /// when valid, `None` when invalid.
    pub fn model<'a>(&'a self, original: &'a SeasonalArimaModel) -> Option<&'a SeasonalArimaModel> {
        match self {
            Validation::Valid => Some(original),
            Validation::Changed { model, .. } => Some(model),
            Validation::Invalid { .. } => None,
        }
    }
}

/// Keeps an MA polynomial inside the admissible region.
pub trait BoundaryPolicy {
    /// Returns the tail of the adjusted polynomial, `Ok(None)` when
    /// `tail` already satisfies the boundary `xl`.
    fn enforce(&self, tail: &[f64], xl: f64) -> Result<Option<Vec<f64>>, String>;
}

/// Removes factors shared by an AR and an MA polynomial.
pub trait SimplificationPolicy {
    /// Returns the reduced `(ar, ma)` tails, `Ok(None)` when nothing cancels.
    fn simplify(
        &self,
        ar: &[f64],
        ma: &[f64],
        epsilon: f64,
    ) -> Result<Option<(Vec<f64>, Vec<f64>)>, String>;
}

/// Moves every inverse MA root with modulus above `xl` radially onto the
/// circle of radius `xl` (onto the unit circle when `xl == 1`).
#[derive(Clone, Copy, Debug, Default)]
pub struct RootClamp;

impl BoundaryPolicy for RootClamp {
    fn enforce(&self, tail: &[f64], xl: f64) -> Result<Option<Vec<f64>>, String> {
        if tail.is_empty() {
            return Ok(None);
        }
        let roots = Polynomial::monic(tail)
            .inverse_roots()
            .map_err(|e| e.to_string())?;
        if roots.iter().all(|r| r.norm() <= xl + BOUNDARY_SLACK) {
            return Ok(None);
        }
        if roots.iter().any(|r| !r.is_finite()) {
            return Err("MA polynomial has non-finite roots".to_string());
        }
        let clamped: Vec<Complex64> = roots
            .iter()
            .map(|r| {
                if r.norm() > xl {
                    r * (xl / r.norm())
                } else {
                    *r
                }
            })
            .collect();
        let poly = Polynomial::from_inverse_roots(&clamped);
        let mut out = poly.tail().to_vec();
        out.resize(tail.len(), 0.0);
        if out.iter().any(|c| !c.is_finite()) {
            return Err("clamped MA polynomial is not finite".to_string());
        }
        Ok(Some(out))
    }
}

/// Cancels AR and MA inverse roots closer than `epsilon`.
///
/// The validator applies it to the regular pair and to the seasonal pair
/// separately. A regular AR root that matches a root of the seasonal MA, or
/// the reverse, is kept: removing it would leave an MA that is no longer a
/// polynomial in `Bˢ`, which the multiplicative model cannot hold.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommonFactorCancellation;

impl SimplificationPolicy for CommonFactorCancellation {
    fn simplify(
        &self,
        ar: &[f64],
        ma: &[f64],
        epsilon: f64,
    ) -> Result<Option<(Vec<f64>, Vec<f64>)>, String> {
        if ar.is_empty() || ma.is_empty() {
            return Ok(None);
        }
        let ar_roots = Polynomial::monic(ar)
            .inverse_roots()
            .map_err(|e| e.to_string())?;
        let ma_roots = Polynomial::monic(ma)
            .inverse_roots()
            .map_err(|e| e.to_string())?;

        let mut ma_used = vec![false; ma_roots.len()];
        let mut ar_keep = Vec::with_capacity(ar_roots.len());
        for r in &ar_roots {
            let hit = ma_roots
                .iter()
                .enumerate()
                .find(|(j, m)| !ma_used[*j] && (*m - r).norm() < epsilon)
                .map(|(j, _)| j);
            match hit {
                Some(j) => ma_used[j] = true,
                None => ar_keep.push(*r),
            }
        }
        if ar_keep.len() == ar_roots.len() {
            return Ok(None);
        }
        let ma_keep: Vec<Complex64> = ma_roots
            .iter()
            .zip(&ma_used)
            .filter(|(_, used)| !**used)
            .map(|(r, _)| *r)
            .collect();
        Ok(Some((
            Polynomial::from_inverse_roots(&ar_keep).tail().to_vec(),
            Polynomial::from_inverse_roots(&ma_keep).tail().to_vec(),
        )))
    }
}

/// Validates candidate models before every decomposition attempt.
#[derive(Clone, Debug)]
pub struct ModelValidator<B = RootClamp, S = CommonFactorCancellation> {
    config: ValidatorConfig,
    boundary: B,
    simplification: S,
}

impl ModelValidator {
    /// Validator with root clamping and common-factor cancellation.
    pub fn new(config: ValidatorConfig) -> Self {
        Self::with_policies(config, RootClamp, CommonFactorCancellation)
    }
}

impl Default for ModelValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::new())
    }
}

impl<B: BoundaryPolicy, S: SimplificationPolicy> ModelValidator<B, S> {
    /// Validator with custom policies.
    pub fn with_policies(config: ValidatorConfig, boundary: B, simplification: S) -> Self {
        Self {
            config,
            boundary,
            simplification,
        }
    }

    /// The thresholds in use.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Simplifies, then clamps the MA polynomials of `model`.
    ///
    /// Common factors are only looked for within the regular part and
    /// within the seasonal part (see [`CommonFactorCancellation`]).
    ///
    /// A model that needs neither step is reported [`Validation::Valid`] and
    /// must be used unchanged.
    #[instrument(skip(self, model), fields(spec = %model.spec()))]
    pub fn validate(&self, model: &SeasonalArimaModel) -> Validation {
        match self.run(model) {
            Ok(v) => v,
            Err(reason) => {
                warn!(%reason, "model rejected by validator");
                Validation::Invalid { reason }
            }
        }
    }

    fn run(&self, model: &SeasonalArimaModel) -> Result<Validation, String> {
        let eps = self.config.epsilon();
        let xl = self.config.xl();
        let spec = *model.spec();

        let (mut phi, mut theta) = (model.phi().to_vec(), model.theta().to_vec());
        let (mut bphi, mut btheta) = (model.bphi().to_vec(), model.btheta().to_vec());
        let mut simplified = false;
        if let Some((a, m)) = self.simplification.simplify(&phi, &theta, eps)? {
            debug!(removed = phi.len() - a.len(), "cancelled regular AR/MA factors");
            (phi, theta) = (a, m);
            simplified = true;
        }
        if let Some((a, m)) = self.simplification.simplify(&bphi, &btheta, eps)? {
            debug!(removed = bphi.len() - a.len(), "cancelled seasonal AR/MA factors");
            (bphi, btheta) = (a, m);
            simplified = true;
        }

        let mut cut_off = false;
        if let Some(t) = self.boundary.enforce(&theta, xl)? {
            theta = t;
            cut_off = true;
        }
        if let Some(t) = self.boundary.enforce(&btheta, xl)? {
            btheta = t;
            cut_off = true;
        }
        if cut_off {
            warn!(xl, "MA roots clamped to the boundary");
        }

        if !simplified && !cut_off {
            return Ok(Validation::Valid);
        }
        let spec = spec
            .with_regular(phi.len(), spec.d(), theta.len())
            .with_seasonal(bphi.len(), spec.bd(), btheta.len());
        let model = SeasonalArimaModel::new(spec, phi, bphi, theta, btheta, model.variance())
            .map_err(|e| e.to_string())?;
        Ok(Validation::Changed {
            model,
            cut_off,
            simplified,
        })
    }
}
