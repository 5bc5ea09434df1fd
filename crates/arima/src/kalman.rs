//! Kalman filter and fixed-interval smoother with exact diffuse
//! initialisation.
//!
//! Operates on any [`StateSpace`]. The diffuse part of the initial
//! covariance is handled with the exact two-term recursions, so unit-root
//! models need neither a large-κ prior nor a conditioning sample.
//! Observations may be missing (`None`); they skip the update step.

use ndarray::{Array1, Array2};

use crate::error::ArimaError;
use crate::state_space::{StateSpace, outer};

/// Below this, `F∞` (and the whole of `P∞`) counts as zero.
const DIFFUSE_TOL: f64 = 1e-9;

/// Below this a prediction variance is treated as degenerate.
const VARIANCE_TOL: f64 = 1e-14;

/// Prediction-error summary of a filter pass.
#[derive(Clone, Debug)]
pub struct Likelihood {
    /// `Σ v²/F` over the regular steps.
    pub ssq: f64,
    /// `Σ ln F` over the regular steps.
    pub sum_log_f: f64,
    /// `Σ ln F∞` over the diffuse steps.
    pub sum_log_f_inf: f64,
    /// Number of regular (non-diffuse, non-missing) steps.
    pub n_regular: usize,
    /// Number of diffuse steps.
    pub n_diffuse: usize,
}

impl Likelihood {
    /// Maximum-likelihood scale factor `ssq / n`.
    pub fn scale(&self) -> f64 {
        if self.n_regular == 0 {
            return 0.0;
        }
        self.ssq / self.n_regular as f64
    }

    /// Diffuse log-likelihood with the scale concentrated out.
    pub fn concentrated(&self) -> f64 {
        let n = self.n_regular as f64;
        let sigma2 = self.scale();
        if sigma2 <= 0.0 {
            return f64::NEG_INFINITY;
        }
        -0.5 * (n * ((2.0 * std::f64::consts::PI * sigma2).ln() + 1.0)
            + self.sum_log_f
            + self.sum_log_f_inf)
    }
}

/// Smoothed states and their variances.
#[derive(Clone, Debug)]
pub struct Smoothed {
    /// Row `t` holds `E[xₜ | y₁…yₙ]`.
    pub states: Array2<f64>,
    /// `Var[xₜ | y₁…yₙ]` for each `t`.
    pub variances: Vec<Array2<f64>>,
}

/// Point forecasts and their mean-squared errors.
#[derive(Clone, Debug)]
pub struct Forecast {
    /// Forecasts for horizons `1…h`.
    pub values: Vec<f64>,
    /// Forecast error variances (in the model's variance units).
    pub variances: Vec<f64>,
}

enum Update {
    Missing,
    Diffuse {
        v: f64,
        f_inf: f64,
        f_star: f64,
        l0: Array2<f64>,
        l1: Array2<f64>,
    },
    Regular {
        v: f64,
        f: f64,
        l0: Array2<f64>,
    },
}

struct Step {
    a: Array1<f64>,
    p_star: Array2<f64>,
    p_inf: Option<Array2<f64>>,
    update: Update,
}

struct FilterPass {
    steps: Vec<Step>,
    likelihood: Likelihood,
    a: Array1<f64>,
    p_star: Array2<f64>,
    p_inf: Option<Array2<f64>>,
}

fn run_filter(
    ss: &StateSpace,
    y: &[Option<f64>],
    store: bool,
) -> Result<FilterPass, ArimaError> {
    let t = ss.t();
    let z = ss.z();
    let h = ss.h();
    let rqr = ss.rqr();
    let m = ss.dim();

    let mut a = Array1::<f64>::zeros(m);
    let mut p_star = ss.p_star().clone();
    let mut p_inf = (ss.n_diffuse() > 0).then(|| ss.p_inf().clone());
    let mut steps = Vec::with_capacity(if store { y.len() } else { 0 });
    let mut lik = Likelihood {
        ssq: 0.0,
        sum_log_f: 0.0,
        sum_log_f_inf: 0.0,
        n_regular: 0,
        n_diffuse: 0,
    };

    for obs in y {
        let predicted = store.then(|| (a.clone(), p_star.clone(), p_inf.clone()));

        let m_star = p_star.dot(z);
        let f_star = z.dot(&m_star) + h;
        let diffuse = p_inf.as_ref().map(|pi| {
            let m_inf = pi.dot(z);
            let f_inf = z.dot(&m_inf);
            (m_inf, f_inf)
        });

        let update = match (obs, diffuse) {
            (Some(obs), Some((m_inf, f_inf))) if f_inf > DIFFUSE_TOL => {
                let v = obs - z.dot(&a);
                let k0 = t.dot(&m_inf) / f_inf;
                let k1 = (t.dot(&m_star) - &k0 * f_star) / f_inf;
                let l0 = t - &outer(&k0, z);
                let l1 = -outer(&k1, z);
                let pi = p_inf.as_ref().ok_or(ArimaError::Singular {
                    context: "diffuse filter",
                })?;
                let tpi = t.dot(pi);
                let next_inf = tpi.dot(&l0.t());
                let next_star = tpi.dot(&l1.t()) + t.dot(&p_star).dot(&l0.t()) + rqr;
                a = t.dot(&a) + &k0 * v;
                p_star = next_star;
                p_inf = Some(next_inf);
                lik.sum_log_f_inf += f_inf.ln();
                lik.n_diffuse += 1;
                Update::Diffuse {
                    v,
                    f_inf,
                    f_star,
                    l0,
                    l1,
                }
            }
            (Some(obs), _) if f_star > VARIANCE_TOL => {
                let v = obs - z.dot(&a);
                let k0 = t.dot(&m_star) / f_star;
                let l0 = t - &outer(&k0, z);
                a = t.dot(&a) + &k0 * v;
                p_star = t.dot(&p_star).dot(&l0.t()) + rqr;
                if let Some(pi) = p_inf.as_mut() {
                    *pi = t.dot(&*pi).dot(&t.t());
                }
                lik.ssq += v * v / f_star;
                lik.sum_log_f += f_star.ln();
                lik.n_regular += 1;
                Update::Regular { v, f: f_star, l0 }
            }
            _ => {
                a = t.dot(&a);
                p_star = t.dot(&p_star).dot(&t.t()) + rqr;
                if let Some(pi) = p_inf.as_mut() {
                    *pi = t.dot(&*pi).dot(&t.t());
                }
                Update::Missing
            }
        };

        if !a.iter().all(|v| v.is_finite()) {
            return Err(ArimaError::NonFiniteData);
        }
        symmetrize(&mut p_star);
        if p_inf
            .as_ref()
            .is_some_and(|pi| pi.iter().all(|v| v.abs() < DIFFUSE_TOL))
        {
            p_inf = None;
        }

        if let Some((a_pred, p_star_pred, p_inf_pred)) = predicted {
            steps.push(Step {
                a: a_pred,
                p_star: p_star_pred,
                p_inf: p_inf_pred,
                update,
            });
        }
    }

    Ok(FilterPass {
        steps,
        likelihood: lik,
        a,
        p_star,
        p_inf,
    })
}

/// Prediction-error decomposition of `y` under `ss`.
pub fn likelihood(ss: &StateSpace, y: &[f64]) -> Result<Likelihood, ArimaError> {
    let obs: Vec<Option<f64>> = y.iter().map(|v| Some(*v)).collect();
    Ok(run_filter(ss, &obs, false)?.likelihood)
}

/// Fixed-interval smoother over the whole sample.
///
/// # Errors
///
/// Propagates filter failures (non-finite state estimates).
pub fn smooth(ss: &StateSpace, y: &[Option<f64>]) -> Result<Smoothed, ArimaError> {
    let pass = run_filter(ss, y, true)?;
    let t = ss.t();
    let z = ss.z();
    let m = ss.dim();
    let n = pass.steps.len();
    let zz = outer(z, z);

    let mut r0 = Array1::<f64>::zeros(m);
    let mut r1 = Array1::<f64>::zeros(m);
    let mut n0 = Array2::<f64>::zeros((m, m));
    let mut n1 = Array2::<f64>::zeros((m, m));
    let mut n2 = Array2::<f64>::zeros((m, m));

    let mut states = Array2::<f64>::zeros((n, m));
    let mut variances = vec![Array2::<f64>::zeros((m, m)); n];

    for (i, step) in pass.steps.iter().enumerate().rev() {
        let in_diffuse = step.p_inf.is_some();
        match &step.update {
            Update::Missing => {
                r0 = t.t().dot(&r0);
                n0 = t.t().dot(&n0).dot(t);
                if in_diffuse {
                    r1 = t.t().dot(&r1);
                    n1 = t.t().dot(&n1).dot(t);
                    n2 = t.t().dot(&n2).dot(t);
                }
            }
            Update::Regular { v, f, l0 } => {
                r0 = z * (v / f) + l0.t().dot(&r0);
                n0 = &zz / *f + l0.t().dot(&n0).dot(l0);
                if in_diffuse {
                    r1 = t.t().dot(&r1);
                    n1 = t.t().dot(&n1).dot(l0);
                    n2 = t.t().dot(&n2).dot(t);
                }
            }
            Update::Diffuse {
                v,
                f_inf,
                f_star,
                l0,
                l1,
            } => {
                let next_r1 = z * (v / f_inf) + l0.t().dot(&r1) + l1.t().dot(&r0);
                let next_r0 = l0.t().dot(&r0);
                let next_n2 = &zz * (-f_star / (f_inf * f_inf))
                    + l0.t().dot(&n2).dot(l0)
                    + l0.t().dot(&n1).dot(l1)
                    + l1.t().dot(&n1).dot(l0)
                    + l1.t().dot(&n0).dot(l1);
                let next_n1 = &zz / *f_inf
                    + l0.t().dot(&n1).dot(l0)
                    + l1.t().dot(&n0).dot(l0)
                    + l0.t().dot(&n0).dot(l1);
                let next_n0 = l0.t().dot(&n0).dot(l0);
                r0 = next_r0;
                r1 = next_r1;
                n0 = next_n0;
                n1 = next_n1;
                n2 = next_n2;
            }
        }

        let ps = &step.p_star;
        let mut alpha = &step.a + &ps.dot(&r0);
        let mut var = ps - &ps.dot(&n0).dot(ps);
        if let Some(pi) = &step.p_inf {
            alpha = alpha + pi.dot(&r1);
            let cross = pi.dot(&n1).dot(ps);
            var = var - &cross - &cross.t() - &pi.dot(&n2).dot(pi);
        }
        symmetrize(&mut var);
        states.row_mut(i).assign(&alpha);
        variances[i] = var;
    }

    Ok(Smoothed { states, variances })
}

/// Forecasts `h` steps beyond the end of `y`.
///
/// # Errors
///
/// [`ArimaError::InsufficientData`] when the sample does not identify the
/// diffuse initial state.
pub fn forecast(ss: &StateSpace, y: &[f64], h: usize) -> Result<Forecast, ArimaError> {
    let obs: Vec<Option<f64>> = y.iter().map(|v| Some(*v)).collect();
    let pass = run_filter(ss, &obs, false)?;
    if pass.p_inf.is_some() {
        return Err(ArimaError::InsufficientData {
            n: y.len(),
            min: ss.n_diffuse() + 1,
        });
    }
    let t = ss.t();
    let z = ss.z();
    let mut a = pass.a;
    let mut p = pass.p_star;
    let mut values = Vec::with_capacity(h);
    let mut variances = Vec::with_capacity(h);
    for _ in 0..h {
        values.push(z.dot(&a));
        variances.push(z.dot(&p.dot(z)) + ss.h());
        a = t.dot(&a);
        p = t.dot(&p).dot(&t.t()) + ss.rqr();
    }
    Ok(Forecast { values, variances })
}

/// Backcasts `h` values before the start of `y`, nearest first reversed so
/// that the result is in chronological order.
///
/// Uses the time-reversibility of Gaussian ARIMA processes with real
/// coefficients: the reversed series follows the same model.
pub fn backcast(ss: &StateSpace, y: &[f64], h: usize) -> Result<Forecast, ArimaError> {
    let reversed: Vec<f64> = y.iter().rev().copied().collect();
    let mut fc = forecast(ss, &reversed, h)?;
    fc.values.reverse();
    fc.variances.reverse();
    Ok(fc)
}

fn symmetrize(p: &mut Array2<f64>) {
    let n = p.nrows();
    for i in 0..n {
        for j in (i + 1)..n {
            let v = 0.5 * (p[[i, j]] + p[[j, i]]);
            p[[i, j]] = v;
            p[[j, i]] = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polynomial::Polynomial;
    use approx::assert_abs_diff_eq;

    fn random_walk(var: f64) -> StateSpace {
        StateSpace::arima(
            &Polynomial::difference(1),
            &Polynomial::one(),
            &Polynomial::one(),
            var,
        )
        .unwrap()
    }

    #[test]
    fn random_walk_forecast_is_last_value() {
        let ss = random_walk(1.0);
        let fc = forecast(&ss, &[1.0, 2.0, 4.0], 3).unwrap();
        for v in &fc.values {
            assert_abs_diff_eq!(*v, 4.0, epsilon = 1e-10);
        }
        assert_abs_diff_eq!(fc.variances[0], 1.0, epsilon = 1e-10);
        assert_abs_diff_eq!(fc.variances[2], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn random_walk_uses_one_diffuse_step() {
        let ss = random_walk(1.0);
        let lik = likelihood(&ss, &[1.0, 2.0, 4.0, 3.0]).unwrap();
        assert_eq!(lik.n_diffuse, 1);
        assert_eq!(lik.n_regular, 3);
        // increments 1, 2, -1
        assert_abs_diff_eq!(lik.ssq, 6.0, epsilon = 1e-10);
    }

    #[test]
    fn ar1_likelihood_matches_closed_form() {
        let phi = 0.6_f64;
        let ss = StateSpace::arma(&Polynomial::monic(&[-phi]), &Polynomial::one(), 1.0).unwrap();
        let y = [0.5, -0.2, 0.8, 1.1];
        let lik = likelihood(&ss, &y).unwrap();
        let mut ssq = y[0] * y[0] * (1.0 - phi * phi);
        for t in 1..y.len() {
            let e = y[t] - phi * y[t - 1];
            ssq += e * e;
        }
        assert_abs_diff_eq!(lik.ssq, ssq, epsilon = 1e-10);
        assert_abs_diff_eq!(lik.sum_log_f, -(1.0 - phi * phi).ln(), epsilon = 1e-10);
    }

    #[test]
    fn local_level_smoother_interpolates_missing() {
        // random walk signal plus unit noise
        let level = random_walk(1.0);
        let ss = StateSpace::compose(&[level], 1.0).unwrap();
        let y = [Some(1.0), Some(1.0), None, Some(1.0), Some(1.0)];
        let sm = smooth(&ss, &y).unwrap();
        for t in 0..5 {
            assert_abs_diff_eq!(sm.states[[t, 0]], 1.0, epsilon = 1e-9);
            assert!(sm.variances[t][[0, 0]] > 0.0);
        }
        // the gap is the least certain point
        assert!(sm.variances[2][[0, 0]] > sm.variances[1][[0, 0]]);
    }

    #[test]
    fn noiseless_smoother_reproduces_data() {
        let ss = random_walk(1.0);
        let y = [Some(0.3), Some(-1.0), Some(2.5)];
        let sm = smooth(&ss, &y).unwrap();
        for (t, v) in y.iter().enumerate() {
            assert_abs_diff_eq!(sm.states[[t, 0]], v.unwrap(), epsilon = 1e-9);
            assert_abs_diff_eq!(sm.variances[t][[0, 0]], 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn short_sample_cannot_forecast_integrated_model() {
        let ss = StateSpace::arima(
            &Polynomial::difference(2),
            &Polynomial::one(),
            &Polynomial::one(),
            1.0,
        )
        .unwrap();
        let err = forecast(&ss, &[1.0], 2);
        assert!(matches!(err, Err(ArimaError::InsufficientData { .. })));
    }

    #[test]
    fn backcast_of_random_walk_is_first_value() {
        let ss = random_walk(1.0);
        let bc = backcast(&ss, &[5.0, 2.0, 3.0], 2).unwrap();
        assert_abs_diff_eq!(bc.values[0], 5.0, epsilon = 1e-10);
        assert_abs_diff_eq!(bc.values[1], 5.0, epsilon = 1e-10);
        assert!(bc.variances[0] > bc.variances[1]);
    }
}
