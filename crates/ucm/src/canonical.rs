//! Canonical decomposition of a seasonal ARIMA model.
//!
//! The aggregate spectrum `|θ|²/|φδ|²` is split by partial fractions over
//! the AR factors selected for each component. Every component then gives up
//! the minimum of its pseudo-spectrum, and the sum of these minima becomes
//! the white-noise irregular. This makes every component but the irregular
//! non-invertible at some frequency, and the irregular as large as possible.
//!
//! All spectra are computed at unit innovation variance, so the component
//! variances are shares of the innovation variance of the model.

use std::f64::consts::PI;

use nalgebra::{DMatrix, DVector};
use sadj_arima::{ArimaProcess, Polynomial, SeasonalArimaModel, SymmetricPolynomial};
use tracing::{debug, instrument, warn};

use crate::component::{ComponentKind, UnobservedComponentsModel, pseudo_spectrum_min};
use crate::config::DecomposerConfig;
use crate::error::UcmError;
use crate::selector::{RootAllocation, RootSelector};

/// Noise variances within this distance of zero are set to zero.
const NOISE_TOL: f64 = 1e-9;
/// Relative remainder under which a polynomial division is exact.
const DIVISION_TOL: f64 = 1e-6;
/// Relative residual accepted from the partial-fraction system.
const RESIDUAL_TOL: f64 = 1e-7;

/// Result of a canonical decomposition.
#[derive(Clone, Debug)]
pub struct Decomposition {
    /// The component models.
    pub model: UnobservedComponentsModel,
    /// Noise variance that was within rounding of zero and set to zero.
    pub clamped_noise: Option<f64>,
    /// White-noise variance added to the aggregate to make a negative noise
    /// admissible (noisy mode only).
    pub noise_deficit: Option<f64>,
}

impl Decomposition {
    /// True when the aggregate differs from the decomposed model.
    pub fn changed_aggregate(&self) -> bool {
        self.noise_deficit.is_some()
    }
}

/// Computes canonical decompositions.
///
/// # Example
///
/// ```
/// use sadj_arima::SeasonalArimaModel;
/// use sadj_ucm::{CanonicalDecomposer, ComponentKind, DecomposerConfig};
///
/// let model = SeasonalArimaModel::airline(12, 0.5, -0.6, 1.0).unwrap();
/// let d = CanonicalDecomposer::new(DecomposerConfig::new())
///     .decompose(&model)
///     .unwrap();
/// assert!(d.model.has(ComponentKind::Seasonal));
/// assert!(d.model.closure_error(200) < 1e-6);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalDecomposer {
    config: DecomposerConfig,
}

/// A component while its numerator is being built.
struct Part {
    kind: ComponentKind,
    num: SymmetricPolynomial,
    den: SymmetricPolynomial,
}

impl CanonicalDecomposer {
    /// Creates a decomposer.
    pub fn new(config: DecomposerConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &DecomposerConfig {
        &self.config
    }

    /// Decomposes `model` into trend, seasonal, transitory and irregular.
    ///
    /// # Errors
    ///
    /// - [`UcmError::NegativeNoise`] when the canonical noise is negative and
    ///   noisy mode is off.
    /// - [`UcmError::Factorization`] when a component spectrum cannot be
    ///   factorized.
    /// - [`UcmError::PartialFractions`] when the AR factors of two
    ///   components are not coprime.
    #[instrument(skip(self, model), fields(spec = %model.spec()))]
    pub fn decompose(&self, model: &SeasonalArimaModel) -> Result<Decomposition, UcmError> {
        self.config.validate()?;
        let alloc = RootSelector::new(*self.config.selector()).allocate(model)?;

        // MA unit roots shared with the differencing cancel from the
        // spectrum; they are put back on the component afterwards.
        let mut ma = model.ma();
        let mut trend_unit = alloc.trend_unit.clone();
        let mut seasonal_unit = alloc.seasonal_unit.clone();
        let mut restored = [Polynomial::one(), Polynomial::one()];
        for (kind, factor) in unit_factors(&alloc, model.spec().period()) {
            let (unit, slot) = match kind {
                ComponentKind::Trend => (&mut trend_unit, 0),
                _ => (&mut seasonal_unit, 1),
            };
            while let (Some(m), Some(u)) =
                (exact_quotient(&ma, &factor)?, exact_quotient(unit, &factor)?)
            {
                debug!(%kind, factor = %factor, "MA unit root shared with differencing");
                ma = m;
                *unit = u;
                restored[slot] = &restored[slot] * &factor;
            }
        }

        let mut parts: Vec<Part> = Vec::with_capacity(3);
        for (kind, ar) in [
            (ComponentKind::Trend, &trend_unit * &alloc.trend_stationary),
            (ComponentKind::Seasonal, &seasonal_unit * &alloc.seasonal_stationary),
            (ComponentKind::Transitory, alloc.transitory.clone()),
        ] {
            if ar.degree() > 0 {
                parts.push(Part {
                    kind,
                    num: SymmetricPolynomial::zero(),
                    den: ar.acgf(),
                });
            }
        }
        let has_trend = parts.iter().any(|p| p.kind == ComponentKind::Trend);
        let has_seasonal = parts.iter().any(|p| p.kind == ComponentKind::Seasonal);

        let numerator = ma.acgf().trimmed(1e-13);
        let dens: Vec<SymmetricPolynomial> = parts.iter().map(|p| p.den.clone()).collect();
        let (quotients, remainder) = partial_fractions(&numerator, &dens)?;
        for (part, q) in parts.iter_mut().zip(quotients) {
            part.num = q;
        }

        let mut noise = 0.0;
        if let Some(r) = remainder {
            let r = r.trimmed(1e-10);
            if r.degree() == 0 {
                noise += r.coefficients()[0];
            } else {
                // a remainder with lags goes to the transitory
                match parts.iter_mut().find(|p| p.kind == ComponentKind::Transitory) {
                    Some(p) => p.num = p.num.add(&r.mul(&p.den)),
                    None => parts.push(Part {
                        kind: ComponentKind::Transitory,
                        num: r,
                        den: SymmetricPolynomial::constant(1.0),
                    }),
                }
            }
        }

        for part in &mut parts {
            let eps = pseudo_spectrum_min(&part.num, &part.den, self.config.grid_points());
            debug!(component = %part.kind, min = eps, "removing spectral minimum");
            part.num = part.num.add_scaled(&part.den, -eps);
            noise += eps;
        }

        let mut clamped_noise = None;
        let mut noise_deficit = None;
        if noise < -NOISE_TOL {
            if !self.config.noisy() {
                return Err(UcmError::NegativeNoise { variance: noise });
            }
            warn!(variance = noise, "negative canonical noise added to the aggregate");
            noise_deficit = Some(-noise);
            noise = 0.0;
        } else if noise.abs() <= NOISE_TOL && noise != 0.0 {
            warn!(variance = noise, "canonical noise set to zero");
            clamped_noise = Some(noise);
            noise = 0.0;
        }

        let mut irregular = None;
        if has_seasonal || !has_trend {
            if noise > 0.0 {
                irregular = Some(ArimaProcess::white_noise(noise));
            }
        } else if let Some(trend) = parts.iter_mut().find(|p| p.kind == ComponentKind::Trend) {
            trend.num = trend.num.add_scaled(&trend.den, noise);
        }

        let mut components: [Option<ArimaProcess>; 4] = [None, None, None, irregular];
        for part in &parts {
            let (theta, variance) = part
                .num
                .factorize()
                .map_err(|source| UcmError::Factorization {
                    component: part.kind,
                    source,
                })?;
            let process = match part.kind {
                ComponentKind::Trend => ArimaProcess::new(
                    alloc.trend_stationary.clone(),
                    &trend_unit * &restored[0],
                    &theta * &restored[0],
                    variance,
                ),
                ComponentKind::Seasonal => ArimaProcess::new(
                    alloc.seasonal_stationary.clone(),
                    &seasonal_unit * &restored[1],
                    &theta * &restored[1],
                    variance,
                ),
                _ => ArimaProcess::new(
                    alloc.transitory.clone(),
                    Polynomial::one(),
                    theta,
                    variance,
                ),
            };
            components[part.kind.index()] = Some(process);
        }

        let aggregate = match noise_deficit {
            None => ArimaProcess::new(model.stationary_ar(), model.differencing(), model.ma(), 1.0),
            Some(deficit) => {
                let num = model.ma().acgf().add_scaled(&model.ar().acgf(), deficit);
                let (theta, variance) = num.factorize()?;
                ArimaProcess::new(model.stationary_ar(), model.differencing(), theta, variance)
            }
        };

        let ucm = UnobservedComponentsModel::new(aggregate, components);
        debug!(closure = ucm.closure_error(200), "canonical decomposition done");
        Ok(Decomposition {
            model: ucm,
            clamped_noise,
            noise_deficit,
        })
    }
}

/// Unit-root factors of the differencing that an MA polynomial may share:
/// `1 − B` for the trend, `1 + B` and the second-order factors of
/// `1 + B + … + B^{s−1}` for the seasonal.
fn unit_factors(alloc: &RootAllocation, period: usize) -> Vec<(ComponentKind, Polynomial)> {
    let mut out = Vec::new();
    if alloc.trend_unit.degree() > 0 {
        out.push((ComponentKind::Trend, Polynomial::new(vec![1.0, -1.0])));
    }
    if alloc.seasonal_unit.degree() > 0 {
        if period % 2 == 0 {
            out.push((ComponentKind::Seasonal, Polynomial::new(vec![1.0, 1.0])));
        }
        for k in 1..period.div_ceil(2) {
            let c = (2.0 * PI * k as f64 / period as f64).cos();
            out.push((
                ComponentKind::Seasonal,
                Polynomial::new(vec![1.0, -2.0 * c, 1.0]),
            ));
        }
    }
    out
}

/// `p / f` when the division leaves no remainder.
fn exact_quotient(p: &Polynomial, f: &Polynomial) -> Result<Option<Polynomial>, UcmError> {
    if p.degree() < f.degree() {
        return Ok(None);
    }
    let (q, rem) = p.divide(f)?;
    let scale = p.coefficients().iter().fold(1.0_f64, |m, c| m.max(c.abs()));
    if rem.coefficients().iter().all(|c| c.abs() <= DIVISION_TOL * scale) {
        Ok(Some(q))
    } else {
        Ok(None)
    }
}

/// Solves `N = Σᵢ Qᵢ Π_{j≠i} Dⱼ + R Π Dⱼ` for the symmetric numerators `Qᵢ`
/// (one degree below `Dᵢ`) and the remainder `R`.
///
/// The identity is imposed at mid-point frequencies in `(0, π)` and solved by
/// least squares. `R` is `None` when `N` has lower degree than `Π Dⱼ`.
fn partial_fractions(
    numerator: &SymmetricPolynomial,
    dens: &[SymmetricPolynomial],
) -> Result<(Vec<SymmetricPolynomial>, Option<SymmetricPolynomial>), UcmError> {
    let degrees: Vec<usize> = dens.iter().map(SymmetricPolynomial::degree).collect();
    let total: usize = degrees.iter().sum();
    let q = numerator.degree();
    let rem_len = if q >= total { q - total + 1 } else { 0 };
    let unknowns = total + rem_len;
    let rows = 2 * unknowns + 2;

    let basis = |k: usize, omega: f64| if k == 0 { 1.0 } else { 2.0 * (k as f64 * omega).cos() };
    let mut a = DMatrix::<f64>::zeros(rows, unknowns);
    let mut b = DVector::<f64>::zeros(rows);
    for m in 0..rows {
        let omega = PI * (m as f64 + 0.5) / rows as f64;
        let values: Vec<f64> = dens.iter().map(|d| d.eval(omega)).collect();
        let mut col = 0;
        for (i, n) in degrees.iter().enumerate() {
            let others: f64 = values
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, v)| v)
                .product();
            for k in 0..*n {
                a[(m, col)] = basis(k, omega) * others;
                col += 1;
            }
        }
        let all: f64 = values.iter().product();
        for k in 0..rem_len {
            a[(m, col)] = basis(k, omega) * all;
            col += 1;
        }
        b[m] = numerator.eval(omega);
    }

    let x = a
        .clone()
        .svd(true, true)
        .solve(&b, 1e-14)
        .map_err(|e| UcmError::PartialFractions {
            reason: e.to_string(),
        })?;
    let residual = (&a * &x - &b).amax();
    if !residual.is_finite() || residual > RESIDUAL_TOL * b.amax().max(1.0) {
        return Err(UcmError::PartialFractions {
            reason: format!("residual {residual:.3e}; component AR factors are not coprime"),
        });
    }

    let mut out = Vec::with_capacity(dens.len());
    let mut pos = 0;
    for n in degrees {
        out.push(SymmetricPolynomial::new(x.as_slice()[pos..pos + n].to_vec()));
        pos += n;
    }
    let remainder = (rem_len > 0).then(|| SymmetricPolynomial::new(x.as_slice()[pos..].to_vec()));
    Ok((out, remainder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use sadj_arima::SeasonalArimaSpec;

    #[test]
    fn partial_fractions_local_level() {
        // (1 - 0.5B)(1 - 0.5F) / |1-B|² = Q/|1-B|² + R
        let n = Polynomial::new(vec![1.0, -0.5]).acgf();
        let d = Polynomial::difference(1).acgf();
        let (q, r) = partial_fractions(&n, std::slice::from_ref(&d)).unwrap();
        let r = r.unwrap();
        // 1.25 - 0.5(z + 1/z) = Q + R(2 - z - 1/z)  →  R = 0.5, Q = 0.25
        assert_abs_diff_eq!(r.coefficients()[0], 0.5, epsilon = 1e-10);
        assert_abs_diff_eq!(q[0].coefficients()[0], 0.25, epsilon = 1e-10);
    }

    #[test]
    fn partial_fractions_without_remainder() {
        // AR(2) with no MA splits into two AR(1) pieces
        let d1 = Polynomial::new(vec![1.0, -0.8]).acgf();
        let d2 = Polynomial::new(vec![1.0, 0.5]).acgf();
        let (q, r) =
            partial_fractions(&SymmetricPolynomial::constant(1.0), &[d1.clone(), d2.clone()])
            .unwrap();
        assert!(r.is_none());
        for omega in [0.1, 1.0, 2.5] {
            let lhs = 1.0 / (d1.eval(omega) * d2.eval(omega));
            let rhs = q[0].eval(omega) / d1.eval(omega) + q[1].eval(omega) / d2.eval(omega);
            assert_abs_diff_eq!(lhs, rhs, epsilon = 1e-10);
        }
    }

    #[test]
    fn random_walk_plus_noise() {
        // (0,1,1) with θ = -0.5: trend is a random walk, noise goes to the
        // trend because there is no seasonal
        let spec = SeasonalArimaSpec::regular(0, 1, 1);
        let m = SeasonalArimaModel::new(spec, vec![], vec![], vec![-0.5], vec![], 1.0).unwrap();
        let d = CanonicalDecomposer::default().decompose(&m).unwrap();
        assert!(!d.model.has(ComponentKind::Irregular));
        let trend = d.model.component(ComponentKind::Trend).unwrap();
        assert_abs_diff_eq!(trend.variance(), 1.0, epsilon = 1e-8);
        assert_abs_diff_eq!(trend.ma().coefficients()[1], -0.5, epsilon = 1e-6);
        assert!(d.model.closure_error(200) < 1e-8);
    }

    #[test]
    fn pure_ma_is_transitory_plus_noise() {
        let spec = SeasonalArimaSpec::regular(0, 0, 1);
        let m = SeasonalArimaModel::new(spec, vec![], vec![], vec![0.4], vec![], 1.0).unwrap();
        let d = CanonicalDecomposer::default().decompose(&m).unwrap();
        assert!(d.model.has(ComponentKind::Transitory));
        // min of 1.16 + 0.8cos ω is 0.36 at π
        let irr = d.model.component(ComponentKind::Irregular).unwrap();
        assert_abs_diff_eq!(irr.variance(), 0.36, epsilon = 1e-8);
        assert!(d.model.closure_error(200) < 1e-8);
    }

    #[test]
    fn unit_ma_root_is_restored() {
        // θ = -1 cancels the regular difference
        let m = SeasonalArimaModel::airline(4, -1.0, -0.5, 1.0).unwrap();
        let d = CanonicalDecomposer::default().decompose(&m).unwrap();
        let trend = d.model.component(ComponentKind::Trend).unwrap();
        assert_eq!(trend.differencing().degree(), 2);
        let at_zero = trend.ma().coefficients().iter().sum::<f64>();
        assert_abs_diff_eq!(at_zero, 0.0, epsilon = 1e-8);
        assert!(d.model.closure_error(200) < 1e-6);
    }

    #[test]
    fn negative_noise_is_rejected_unless_noisy() {
        // strongly positive regular MA: the component minima leave about
        // -1.908 for the noise
        let spec = SeasonalArimaSpec::new(0, 1, 2, 0, 1, 1, 4).unwrap();
        let m = SeasonalArimaModel::new(spec, vec![], vec![], vec![1.2, 0.5], vec![0.6], 1.0)
            .unwrap();

        let variance = match CanonicalDecomposer::default().decompose(&m) {
            Err(UcmError::NegativeNoise { variance }) => variance,
            Err(other) => panic!("expected NegativeNoise, got {other}"),
            Ok(_) => panic!("expected NegativeNoise, got a decomposition"),
        };
        assert_abs_diff_eq!(variance, -1.908, epsilon = 0.02);

        let d = CanonicalDecomposer::new(DecomposerConfig::new().with_noisy(true))
            .decompose(&m)
            .unwrap();
        assert!(d.changed_aggregate());
        assert_abs_diff_eq!(d.noise_deficit.unwrap(), -variance, epsilon = 1e-9);
        assert!(!d.model.has(ComponentKind::Irregular));
        assert!(d.model.closure_error(200) < 1e-6);
    }
}
