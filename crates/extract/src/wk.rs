//! Wiener-Kolmogorov estimation by Burman's method.
//!
//! The optimal two-sided filter for component `i` has generating function
//!
//! ```text
//!            Nᵢ(B,F) · Π_{j≠i} |ARⱼ(B)|²
//! νᵢ(B,F) = ─────────────────────────────
//!                 σ²ₐ θ(B) θ(F)
//! ```
//!
//! where `θ` is the aggregate moving average. The numerator is applied
//! directly, the denominator by one forward and one backward recursion. The
//! series is extended at both ends with backcasts and forecasts long enough
//! for the recursions to forget their zero start.

use sadj_arima::{Polynomial, SymmetricPolynomial, autocovariances, kalman, psi_weights};
use sadj_ucm::UnobservedComponentsModel;
use tracing::{debug, instrument};

use crate::common::{check_series, observed, stdev};
use crate::error::ExtractError;
use crate::estimates::{ComponentEstimates, ComponentSeries};
use crate::estimator::ComponentEstimator;
use crate::smoother::attach_forecasts;

/// Aggregate MA roots closer to the unit circle than this are refused.
const INVERTIBILITY_TOL: f64 = 1e-9;
/// Filter weights below this size are dropped.
const WEIGHT_TOL: f64 = 1e-12;

/// Wiener-Kolmogorov estimator.
///
/// # Example
///
/// ```
/// use sadj_arima::SeasonalArimaModel;
/// use sadj_extract::{ComponentEstimator, WienerKolmogorov};
/// use sadj_ucm::CanonicalDecomposer;
///
/// let model = SeasonalArimaModel::airline(4, -0.4, -0.5, 1.0).unwrap();
/// let ucm = CanonicalDecomposer::default().decompose(&model).unwrap().model;
/// let y: Vec<f64> = (0..40).map(|t| (t as f64 * 0.1) + [1.0, -0.5, 0.2, -0.7][t % 4]).collect();
/// let est = WienerKolmogorov::default().estimate(&y, &ucm, 4, 1.0).unwrap();
/// assert!(est.reconstruction_error() < 1e-6);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WienerKolmogorov {
    max_extension: usize,
}

impl WienerKolmogorov {
    /// Defaults: at most 20 000 extension points on each side.
    pub fn new() -> Self {
        Self {
            max_extension: 20_000,
        }
    }

    /// Caps the number of backcasts and forecasts added at each end.
    pub fn with_max_extension(mut self, points: usize) -> Self {
        self.max_extension = points;
        self
    }

    pub fn max_extension(&self) -> usize {
        self.max_extension
    }

    /// Points needed for weights decaying like `ρᵏ` to drop below the
    /// tolerance.
    fn extension(&self, rho: f64, filter_degree: usize) -> usize {
        let decay = if rho > 0.0 {
            (WEIGHT_TOL.ln() / rho.ln()).ceil().max(0.0) as usize
        } else {
            0
        };
        (filter_degree + decay).min(self.max_extension)
    }
}

impl Default for WienerKolmogorov {
    fn default() -> Self {
        Self::new()
    }
}

/// Numerator of the filter for one component.
fn filter_numerator(model: &UnobservedComponentsModel, index: usize) -> SymmetricPolynomial {
    let mut w = SymmetricPolynomial::constant(1.0);
    for (j, (_, c)) in model.iter().enumerate() {
        w = if j == index {
            w.mul(&c.numerator())
        } else {
            w.mul(&c.denominator())
        };
    }
    w
}

/// Applies `w(B,F) / (σ² θ(B)θ(F))` to `x`.
fn apply_filter(x: &[f64], w: &SymmetricPolynomial, theta: &Polynomial, variance: f64) -> Vec<f64> {
    let n = x.len();
    let w = w.coefficients();
    let k = w.len() - 1;
    let th = theta.coefficients();
    let q = th.len() - 1;

    let mut y = vec![0.0; n];
    for t in k..n.saturating_sub(k) {
        let mut acc = w[0] * x[t];
        for (lag, wl) in w.iter().enumerate().skip(1) {
            acc += wl * (x[t - lag] + x[t + lag]);
        }
        y[t] = acc;
    }

    let mut u = vec![0.0; n];
    for t in 0..n {
        let acc: f64 = (1..=q.min(t)).map(|j| th[j] * u[t - j]).sum();
        u[t] = (y[t] - acc) / th[0];
    }
    let mut z = vec![0.0; n];
    for t in (0..n).rev() {
        let acc: f64 = (1..=q.min(n - 1 - t)).map(|j| th[j] * z[t + j]).sum();
        z[t] = (u[t] - acc) / th[0];
    }
    z.iter_mut().for_each(|v| *v /= variance);
    z
}

/// Revision variance `R(τ)` for `τ = 0…lags-1`: the error variance added by
/// not knowing the series beyond `τ` periods after the estimate.
fn revision_variances(nu: &[f64], psi: &[f64]) -> Vec<f64> {
    let k = nu.len();
    let mut xi = vec![0.0; k];
    for (m, slot) in xi.iter_mut().enumerate().skip(1) {
        *slot = (0..k - m).map(|l| nu[m + l] * psi[l]).sum();
    }
    // suffix sums of Ξ(m)², R(τ) = Σ_{m>τ}
    let mut revision = vec![0.0; k];
    let mut acc = 0.0;
    for tau in (0..k).rev() {
        revision[tau] = acc;
        acc += xi[tau] * xi[tau];
    }
    revision
}

impl ComponentEstimator for WienerKolmogorov {
    fn name(&self) -> &'static str {
        "wk"
    }

    /// # Errors
    ///
    /// [`ExtractError::NonInvertible`] when the aggregate MA has a root on
    /// the unit circle; the Kalman smoother handles that case.
    #[instrument(skip_all, fields(n = series.len(), horizon))]
    fn estimate(
        &self,
        series: &[f64],
        model: &UnobservedComponentsModel,
        horizon: usize,
        ser: f64,
    ) -> Result<ComponentEstimates, ExtractError> {
        check_series(series, model)?;
        let n = series.len();
        let aggregate = model.aggregate();
        let theta = aggregate.ma();
        let variance = aggregate.variance();
        let rho = theta.max_inverse_root_modulus()?;
        if rho >= 1.0 - INVERTIBILITY_TOL {
            return Err(ExtractError::NonInvertible { modulus: rho });
        }

        let numerators: Vec<SymmetricPolynomial> = (0..model.iter().count())
            .map(|i| filter_numerator(model, i))
            .collect();
        let filter_degree = numerators.iter().map(|w| w.degree()).max().unwrap_or(0);
        let ext = self.extension(rho, filter_degree + theta.degree());
        debug!(rho, ext, "extending series");

        let ss = aggregate.state_space()?;
        let back = kalman::backcast(&ss, series, ext)?;
        let ahead = kalman::forecast(&ss, series, ext + horizon)?;
        let mut x = back.values;
        x.extend_from_slice(series);
        x.extend_from_slice(&ahead.values);

        let full_ar = aggregate.ar();
        let psi = psi_weights(theta, &full_ar, ext);
        let mut components: [Option<ComponentSeries>; 4] = Default::default();
        for ((kind, c), w) in model.iter().zip(&numerators) {
            let z = apply_filter(&x, w, theta, variance);
            let values = z[ext..ext + n].to_vec();
            let forecasts = z[ext + n..ext + n + horizon].to_vec();

            let complement = model.complement(kind).0;
            let final_var =
                autocovariances(&c.numerator().mul(&complement), theta, 0)?[0] / variance;
            let nu: Vec<f64> = autocovariances(w, theta, ext)?
                .iter()
                .map(|v| v / variance)
                .collect();
            let revision = revision_variances(&nu, &psi);
            let rev = |tau: usize| revision.get(tau).copied().unwrap_or(0.0) * variance;
            let sd = (0..n)
                .map(|t| stdev(final_var + rev(n - 1 - t) + rev(t), ser))
                .collect();

            components[kind.index()] = Some(ComponentSeries {
                values,
                stdev: sd,
                forecasts,
                forecast_stdev: Vec::new(),
            });
        }
        attach_forecasts(&mut components, series, model, horizon, ser)?;

        Ok(ComponentEstimates::new(
            observed(series, model, horizon, ser)?,
            components,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use sadj_arima::ArimaProcess;
    use sadj_ucm::ComponentKind;

    #[test]
    fn extension_grows_with_root_modulus() {
        let wk = WienerKolmogorov::new();
        assert_eq!(wk.extension(0.0, 5), 5);
        assert!(wk.extension(0.9, 5) < wk.extension(0.99, 5));
        assert_eq!(wk.with_max_extension(100).extension(0.999_999, 5), 100);
    }

    #[test]
    fn filter_of_pure_moving_average() {
        // w = 1, θ = 1: identity
        let x = [1.0, 2.0, 3.0];
        let z = apply_filter(&x, &SymmetricPolynomial::constant(1.0), &Polynomial::one(), 1.0);
        assert_eq!(z, x.to_vec());
        // w = 2, σ² = 4: halves
        let z = apply_filter(&x, &SymmetricPolynomial::constant(2.0), &Polynomial::one(), 4.0);
        assert_eq!(z, vec![0.5, 1.0, 1.5]);
    }

    #[test]
    fn revision_vanishes_far_from_the_end() {
        let nu = [0.5, 0.25, 0.125, 0.0625, 0.0];
        let psi = [1.0, 0.5, 0.25, 0.125, 0.0625];
        let r = revision_variances(&nu, &psi);
        assert!(r[0] > r[1] && r[1] > r[2]);
        assert_eq!(r[4], 0.0);
    }

    #[test]
    fn refuses_unit_ma_root() {
        let trend = ArimaProcess::new(
            Polynomial::one(),
            Polynomial::difference(1),
            Polynomial::one(),
            1.0,
        );
        let aggregate = ArimaProcess::new(
            Polynomial::one(),
            Polynomial::difference(1),
            Polynomial::monic(&[-1.0]),
            1.0,
        );
        let model = UnobservedComponentsModel::new(aggregate, [Some(trend), None, None, None]);
        let err = WienerKolmogorov::new()
            .estimate(&[1.0, 2.0, 3.0, 4.0], &model, 0, 1.0)
            .unwrap_err();
        assert!(matches!(err, ExtractError::NonInvertible { .. }));
    }

    #[test]
    fn local_level_matches_smoother() {
        let trend = ArimaProcess::new(
            Polynomial::one(),
            Polynomial::difference(1),
            Polynomial::one(),
            0.25,
        );
        let aggregate = ArimaProcess::new(
            Polynomial::one(),
            Polynomial::difference(1),
            Polynomial::monic(&[-0.5]),
            1.0,
        );
        let model = UnobservedComponentsModel::new(
            aggregate,
            [Some(trend), None, None, Some(ArimaProcess::white_noise(0.5))],
        );
        let y: Vec<f64> = (0..60).map(|t| (t as f64 * 0.37).sin() + 0.05 * t as f64).collect();
        let wk = WienerKolmogorov::new().estimate(&y, &model, 0, 1.0).unwrap();
        let ks = crate::KalmanSmoother.estimate(&y, &model, 0, 1.0).unwrap();
        let (a, b) = (
            wk.component(ComponentKind::Trend).unwrap(),
            ks.component(ComponentKind::Trend).unwrap(),
        );
        for t in 0..y.len() {
            assert_abs_diff_eq!(a.values[t], b.values[t], epsilon = 1e-7);
        }
        // middle of the sample: both are the doubly-infinite filter
        assert_abs_diff_eq!(a.stdev[30], b.stdev[30], epsilon = 1e-6);
    }
}
