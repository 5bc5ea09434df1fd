//! Estimation of seasonal ARIMA models.
//!
//! The series is differenced by `(1−B)ᵈ(1−Bˢ)ᴰ` and the stationary ARMA
//! part is fitted to the result, either by exact maximum likelihood
//! (Kalman filter, scale concentrated out) or by conditional least
//! squares. Coefficients are searched over the unconstrained PACF
//! parametrisation with Nelder-Mead, so every candidate is stationary and
//! invertible.

use argmin::core::{CostFunction, Executor};
use argmin::solver::neldermead::NelderMead;
use tracing::{debug, instrument};

use crate::error::ArimaError;
use crate::kalman;
use crate::model::SeasonalArimaModel;
use crate::params;
use crate::polynomial::Polynomial;
use crate::spec::SeasonalArimaSpec;
use crate::state_space::StateSpace;

/// Initial simplex edge length in the unconstrained space.
const SIMPLEX_STEP: f64 = 0.3;

/// Re-estimation seam used by the approximation engine.
pub trait ArimaEstimator {
    /// Fits the model described by `request` to `series`.
    fn estimate(
        &self,
        series: &[f64],
        request: &EstimationRequest,
    ) -> Result<Estimation, ArimaError>;
}

/// What to estimate.
#[derive(Clone, Debug)]
pub struct EstimationRequest {
    spec: SeasonalArimaSpec,
    start: Option<SeasonalArimaModel>,
    mean_correction: bool,
    exact: bool,
    fixed_seasonal_ma: Option<f64>,
}

impl EstimationRequest {
    /// Exact maximum likelihood of `spec` without mean correction.
    pub fn new(spec: SeasonalArimaSpec) -> Self {
        Self {
            spec,
            start: None,
            mean_correction: false,
            exact: true,
            fixed_seasonal_ma: None,
        }
    }

    /// Starting coefficients; terms outside `spec` are dropped.
    pub fn with_start(mut self, model: &SeasonalArimaModel) -> Self {
        self.start = Some(model.respecified(self.spec));
        self
    }

    /// Estimates a constant in the differenced series.
    pub fn with_mean_correction(mut self, on: bool) -> Self {
        self.mean_correction = on;
        self
    }

    /// Exact likelihood (`true`) or conditional least squares (`false`).
    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    /// Holds the single seasonal MA coefficient at `value`.
    pub fn with_fixed_seasonal_ma(mut self, value: f64) -> Self {
        self.fixed_seasonal_ma = Some(value);
        self
    }

    /// The specification to fit.
    pub fn spec(&self) -> &SeasonalArimaSpec {
        &self.spec
    }

    /// Whether a mean is estimated.
    pub fn mean_correction(&self) -> bool {
        self.mean_correction
    }

    /// Whether the exact likelihood is maximised.
    pub fn exact(&self) -> bool {
        self.exact
    }

    /// The fixed seasonal MA coefficient, if any.
    pub fn fixed_seasonal_ma(&self) -> Option<f64> {
        self.fixed_seasonal_ma
    }
}

/// A fitted model.
#[derive(Clone, Debug)]
pub struct Estimation {
    /// Coefficients with the ML innovation variance.
    pub model: SeasonalArimaModel,
    /// Residual standard error, corrected for the number of parameters.
    pub ser: f64,
    /// Mean of the differenced series (0 without mean correction).
    pub mean: f64,
    /// Maximised (concentrated) log-likelihood.
    pub log_likelihood: f64,
    /// Number of observations entering the likelihood.
    pub n_effective: usize,
}

/// Nelder-Mead maximum-likelihood estimator.
#[derive(Clone, Debug)]
pub struct MaximumLikelihood {
    max_iters: u64,
    sd_tolerance: f64,
}

impl Default for MaximumLikelihood {
    fn default() -> Self {
        Self {
            max_iters: 1000,
            sd_tolerance: 1e-8,
        }
    }
}

impl MaximumLikelihood {
    /// Estimator with the default iteration cap and tolerance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Nelder-Mead iteration cap.
    pub fn with_max_iters(mut self, max_iters: u64) -> Self {
        self.max_iters = max_iters;
        self
    }

    /// Sets the simplex standard-deviation stopping tolerance.
    pub fn with_sd_tolerance(mut self, tol: f64) -> Self {
        self.sd_tolerance = tol;
        self
    }
}

impl ArimaEstimator for MaximumLikelihood {
    #[instrument(skip(self, series, request), fields(spec = %request.spec(), n = series.len()))]
    fn estimate(
        &self,
        series: &[f64],
        request: &EstimationRequest,
    ) -> Result<Estimation, ArimaError> {
        if series.is_empty() {
            return Err(ArimaError::EmptyData);
        }
        if series.iter().any(|x| !x.is_finite()) {
            return Err(ArimaError::NonFiniteData);
        }
        let spec = *request.spec();
        let layout = Layout::new(&spec, request.fixed_seasonal_ma())?;
        let n_params = layout.dim() + usize::from(request.mean_correction());
        let differencing = &Polynomial::difference(spec.d())
            * &Polynomial::seasonal_difference(spec.period(), spec.bd());
        let min = differencing.degree() + spec.ar_degree() + n_params + 2;
        if series.len() < min {
            return Err(ArimaError::InsufficientData {
                n: series.len(),
                min,
            });
        }

        let mut w = difference(series, &differencing);
        let mean = if request.mean_correction() {
            w.iter().sum::<f64>() / w.len() as f64
        } else {
            0.0
        };
        w.iter_mut().for_each(|v| *v -= mean);

        let start = layout.start(request.start.as_ref());
        let best = if start.is_empty() {
            start
        } else {
            let mut simplex = Vec::with_capacity(start.len() + 1);
            simplex.push(start.clone());
            for i in 0..start.len() {
                let mut vertex = start.clone();
                vertex[i] += SIMPLEX_STEP;
                simplex.push(vertex);
            }
            let cost = ArimaCost {
                data: &w,
                layout: &layout,
                exact: request.exact(),
            };
            let solver = NelderMead::new(simplex)
                .with_sd_tolerance(self.sd_tolerance)
                .map_err(|_| ArimaError::OptimizationFailed)?;
            let result = Executor::new(cost, solver)
                .configure(|state| state.max_iters(self.max_iters))
                .run()
                .map_err(|_| ArimaError::OptimizationFailed)?;
            result
                .state()
                .best_param
                .clone()
                .ok_or(ArimaError::OptimizationFailed)?
        };

        let coeffs = layout.coefficients(&best);
        let fit = evaluate(&w, &coeffs, request.exact())?;
        let sigma2 = fit.ssq / fit.n as f64;
        let dof = fit.n.saturating_sub(n_params).max(1);
        let ser = (fit.ssq / dof as f64).sqrt();
        let Coefficients {
            phi,
            bphi,
            theta,
            btheta,
            ..
        } = coeffs;
        let model = SeasonalArimaModel::new(spec, phi, bphi, theta, btheta, sigma2)?;
        debug!(%model, ser, mean, loglik = fit.log_likelihood, "model estimated");
        Ok(Estimation {
            model,
            ser,
            mean,
            log_likelihood: fit.log_likelihood,
            n_effective: fit.n,
        })
    }
}

/// Deterministic path `mₜ` with `δ(B)mₜ = μ`, zero before the sample.
///
/// Adding it to a zero-mean ARIMA path reproduces a series whose
/// differenced mean is `μ`.
pub fn mean_effect(differencing: &Polynomial, mean: f64, n: usize) -> Vec<f64> {
    let delta = differencing.coefficients();
    let mut m = Vec::with_capacity(n);
    for t in 0..n {
        let acc: f64 = (1..delta.len().min(t + 1)).map(|j| delta[j] * m[t - j]).sum();
        m.push(mean - acc);
    }
    m
}

/// Applies a differencing operator, dropping the first `deg δ` points.
pub fn difference(series: &[f64], differencing: &Polynomial) -> Vec<f64> {
    let delta = differencing.coefficients();
    let d = differencing.degree();
    (d..series.len())
        .map(|t| delta.iter().enumerate().map(|(j, c)| c * series[t - j]).sum())
        .collect()
}

struct Coefficients {
    period: usize,
    phi: Vec<f64>,
    bphi: Vec<f64>,
    theta: Vec<f64>,
    btheta: Vec<f64>,
}

impl Coefficients {
    fn operators(&self) -> (Polynomial, Polynomial) {
        let ar = &Polynomial::monic(&self.phi) * &Polynomial::seasonal(&self.bphi, self.period);
        let ma = &Polynomial::monic(&self.theta) * &Polynomial::seasonal(&self.btheta, self.period);
        (ar, ma)
    }
}

/// Maps the optimiser's parameter vector onto the four coefficient blocks.
struct Layout {
    spec: SeasonalArimaSpec,
    fixed_btheta: Option<f64>,
}

impl Layout {
    fn new(spec: &SeasonalArimaSpec, fixed: Option<f64>) -> Result<Self, ArimaError> {
        if fixed.is_some() && spec.bq() != 1 {
            return Err(ArimaError::InvalidOrder {
                reason: format!("cannot fix the seasonal MA of {spec}"),
            });
        }
        Ok(Self {
            spec: *spec,
            fixed_btheta: fixed,
        })
    }

    fn free_bq(&self) -> usize {
        if self.fixed_btheta.is_some() {
            0
        } else {
            self.spec.bq()
        }
    }

    fn dim(&self) -> usize {
        self.spec.p() + self.spec.bp() + self.spec.q() + self.free_bq()
    }

    fn coefficients(&self, params: &[f64]) -> Coefficients {
        let (p, bp, q) = (self.spec.p(), self.spec.bp(), self.spec.q());
        let (a, rest) = params.split_at(p);
        let (b, rest) = rest.split_at(bp);
        let (c, d) = rest.split_at(q);
        Coefficients {
            period: self.spec.period(),
            phi: params::unconstrained_to_polynomial(a),
            bphi: params::unconstrained_to_polynomial(b),
            theta: params::unconstrained_to_polynomial(c),
            btheta: match self.fixed_btheta {
                Some(v) => vec![v],
                None => params::unconstrained_to_polynomial(d),
            },
        }
    }

    fn start(&self, model: Option<&SeasonalArimaModel>) -> Vec<f64> {
        let Some(m) = model else {
            return vec![0.0; self.dim()];
        };
        let mut out = params::polynomial_to_unconstrained(m.phi());
        out.extend(params::polynomial_to_unconstrained(m.bphi()));
        out.extend(params::polynomial_to_unconstrained(m.theta()));
        if self.fixed_btheta.is_none() {
            out.extend(params::polynomial_to_unconstrained(m.btheta()));
        }
        out
    }
}

struct Fit {
    ssq: f64,
    n: usize,
    log_likelihood: f64,
}

fn evaluate(w: &[f64], coeffs: &Coefficients, exact: bool) -> Result<Fit, ArimaError> {
    let (ar, ma) = coeffs.operators();
    if exact {
        let ss = StateSpace::arma(&ar, &ma, 1.0)?;
        let lik = kalman::likelihood(&ss, w)?;
        Ok(Fit {
            ssq: lik.ssq,
            n: lik.n_regular,
            log_likelihood: lik.concentrated(),
        })
    } else {
        let (ssq, n) = conditional_ssq(w, &ar, &ma);
        let sigma2 = ssq / n.max(1) as f64;
        let log_likelihood =
            -0.5 * n as f64 * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0);
        Ok(Fit {
            ssq,
            n,
            log_likelihood,
        })
    }
}

/// Residual sum of squares conditional on the first `deg φ` values and on
/// zero pre-sample innovations.
fn conditional_ssq(w: &[f64], ar: &Polynomial, ma: &Polynomial) -> (f64, usize) {
    let phi = ar.coefficients();
    let theta = ma.coefficients();
    let p = ar.degree();
    let mut e = vec![0.0; w.len()];
    let mut ssq = 0.0;
    for t in p..w.len() {
        let ar_part: f64 = phi.iter().enumerate().map(|(j, c)| c * w[t - j]).sum();
        let ma_part: f64 = (1..theta.len())
            .filter(|&j| j <= t)
            .map(|j| theta[j] * e[t - j])
            .sum();
        e[t] = ar_part - ma_part;
        ssq += e[t] * e[t];
    }
    (ssq, w.len().saturating_sub(p))
}

struct ArimaCost<'a> {
    data: &'a [f64],
    layout: &'a Layout,
    exact: bool,
}

impl CostFunction for ArimaCost<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> Result<Self::Output, argmin::core::Error> {
        let coeffs = self.layout.coefficients(params);
        match evaluate(self.data, &coeffs, self.exact) {
            Ok(fit) if fit.log_likelihood.is_finite() => Ok(-fit.log_likelihood),
            _ => Ok(f64::MAX),
        }
    }
}
