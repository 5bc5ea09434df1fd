//! Linear Gaussian state-space models.
//!
//! ```text
//! x[t+1] = T * x[t] + R * e[t]     (state transition, e ~ N(0, Q))
//! y[t]   = Z' * x[t] + u[t]        (observation, u ~ N(0, H))
//! ```
//!
//! The initial state is `x[0] ~ N(0, P* + κP∞)` with `κ → ∞`: `P∞` marks
//! the diffuse directions (unit roots) and `P*` the stationary covariance.

use ndarray::{Array1, Array2, s};

use crate::error::ArimaError;
use crate::polynomial::Polynomial;

/// Iteration cap for the doubling solution of the Lyapunov equation.
const LYAPUNOV_ITERS: usize = 100;

/// State-space representation with diffuse initial conditions.
#[derive(Clone, Debug)]
pub struct StateSpace {
    t: Array2<f64>,
    r: Array2<f64>,
    q: Array2<f64>,
    z: Array1<f64>,
    h: f64,
    p_star: Array2<f64>,
    p_inf: Array2<f64>,
    rqr: Array2<f64>,
    n_diffuse: usize,
}

impl StateSpace {
    /// Builds a state-space model from its system matrices.
    ///
    /// # Errors
    ///
    /// [`ArimaError::InvalidOrder`] when the matrix dimensions disagree.
    pub fn new(
        t: Array2<f64>,
        r: Array2<f64>,
        q: Array2<f64>,
        z: Array1<f64>,
        h: f64,
        p_star: Array2<f64>,
        p_inf: Array2<f64>,
    ) -> Result<Self, ArimaError> {
        let m = z.len();
        let k = q.nrows();
        let ok = t.dim() == (m, m)
            && r.dim() == (m, k)
            && q.dim() == (k, k)
            && p_star.dim() == (m, m)
            && p_inf.dim() == (m, m);
        if !ok {
            return Err(ArimaError::InvalidOrder {
                reason: format!("inconsistent state-space dimensions (state dimension {m})"),
            });
        }
        let rqr = r.dot(&q).dot(&r.t());
        let n_diffuse = (0..m).filter(|&i| p_inf[[i, i]] != 0.0).count();
        Ok(Self {
            t,
            r,
            q,
            z,
            h,
            p_star,
            p_inf,
            rqr,
            n_diffuse,
        })
    }

    /// Stationary ARMA model `φ(B)x = θ(B)e`, `Var(e) = variance`.
    ///
    /// # Errors
    ///
    /// [`ArimaError::NonStationary`] when `φ` has roots on or inside the
    /// unit circle.
    pub fn arma(ar: &Polynomial, ma: &Polynomial, variance: f64) -> Result<Self, ArimaError> {
        Self::arima(&Polynomial::one(), ar, ma, variance)
    }

    /// ARIMA model `φ(B)δ(B)x = θ(B)e`.
    ///
    /// The state stacks the `d = deg δ` most recent levels ahead of the
    /// companion state of the stationary ARMA part `wₜ = δ(B)xₜ`:
    /// `[xₜ, …, x_{t−d+1}, w-state]`. Only the levels are diffuse.
    pub fn arima(
        differencing: &Polynomial,
        stationary_ar: &Polynomial,
        ma: &Polynomial,
        variance: f64,
    ) -> Result<Self, ArimaError> {
        let delta = differencing.coefficients();
        let d = differencing.degree();
        let (tw, rw) = companion(stationary_ar, ma);
        let rdim = rw.len();
        let m = d + rdim;

        let mut t = Array2::zeros((m, m));
        let mut r = Array2::zeros((m, 1));
        if d > 0 {
            for k in 0..d {
                t[[0, k]] = -delta[k + 1];
            }
            for j in 0..rdim {
                t[[0, d + j]] = tw[[0, j]];
            }
            for i in 1..d {
                t[[i, i - 1]] = 1.0;
            }
            r[[0, 0]] = rw[0];
        }
        t.slice_mut(s![d.., d..]).assign(&tw);
        for i in 0..rdim {
            r[[d + i, 0]] = rw[i];
        }

        let rrt = outer(&rw, &rw) * variance;
        let pw = lyapunov(&tw, &rrt)?;
        let mut p_star = Array2::zeros((m, m));
        p_star.slice_mut(s![d.., d..]).assign(&pw);
        let mut p_inf = Array2::zeros((m, m));
        for i in 0..d {
            p_inf[[i, i]] = 1.0;
        }

        let mut z = Array1::zeros(m);
        z[0] = 1.0;
        let q = Array2::from_elem((1, 1), variance);
        Self::new(t, r, q, z, 0.0, p_star, p_inf)
    }

    /// Block-diagonal composition: the observation is the sum of the blocks'
    /// observations plus white noise of variance `h`.
    pub fn compose(blocks: &[StateSpace], h: f64) -> Result<Self, ArimaError> {
        let m: usize = blocks.iter().map(|b| b.dim()).sum();
        let k: usize = blocks.iter().map(|b| b.q.nrows()).sum();
        let mut t = Array2::zeros((m, m));
        let mut r = Array2::zeros((m, k));
        let mut q = Array2::zeros((k, k));
        let mut z = Array1::zeros(m);
        let mut p_star = Array2::zeros((m, m));
        let mut p_inf = Array2::zeros((m, m));
        let mut h_total = h;
        let (mut off, mut koff) = (0, 0);
        for b in blocks {
            let (bm, bk) = (b.dim(), b.q.nrows());
            t.slice_mut(s![off..off + bm, off..off + bm]).assign(&b.t);
            r.slice_mut(s![off..off + bm, koff..koff + bk]).assign(&b.r);
            q.slice_mut(s![koff..koff + bk, koff..koff + bk]).assign(&b.q);
            z.slice_mut(s![off..off + bm]).assign(&b.z);
            p_star.slice_mut(s![off..off + bm, off..off + bm]).assign(&b.p_star);
            p_inf.slice_mut(s![off..off + bm, off..off + bm]).assign(&b.p_inf);
            h_total += b.h;
            off += bm;
            koff += bk;
        }
        Self::new(t, r, q, z, h_total, p_star, p_inf)
    }

    /// State dimension.
    pub fn dim(&self) -> usize {
        self.z.len()
    }

    /// Number of diffuse initial directions.
    pub fn n_diffuse(&self) -> usize {
        self.n_diffuse
    }

    /// Transition matrix `T`.
    pub fn t(&self) -> &Array2<f64> {
        &self.t
    }

    /// Noise loading `R`.
    pub fn r(&self) -> &Array2<f64> {
        &self.r
    }

    /// State noise covariance `Q`.
    pub fn q(&self) -> &Array2<f64> {
        &self.q
    }

    /// Precomputed `R·Q·Rᵀ`.
    pub fn rqr(&self) -> &Array2<f64> {
        &self.rqr
    }

    /// Observation vector `Z`.
    pub fn z(&self) -> &Array1<f64> {
        &self.z
    }

    /// Observation noise variance `H`.
    pub fn h(&self) -> f64 {
        self.h
    }

    /// Stationary part of the initial covariance.
    pub fn p_star(&self) -> &Array2<f64> {
        &self.p_star
    }

    /// Diffuse part of the initial covariance.
    pub fn p_inf(&self) -> &Array2<f64> {
        &self.p_inf
    }
}

/// Companion form of a stationary ARMA model.
///
/// First column `T[i, 0] = −φᵢ₊₁`, unit super-diagonal, and
/// `R = [1, θ₁, …, θ_q, 0, …]` with dimension `max(p, q + 1)`.
fn companion(ar: &Polynomial, ma: &Polynomial) -> (Array2<f64>, Array1<f64>) {
    let phi = ar.tail();
    let theta = ma.tail();
    let r = phi.len().max(theta.len() + 1).max(1);

    let mut t = Array2::zeros((r, r));
    for (i, c) in phi.iter().enumerate() {
        t[[i, 0]] = -c;
    }
    for i in 0..r.saturating_sub(1) {
        t[[i, i + 1]] = 1.0;
    }

    let mut r_vec = Array1::zeros(r);
    r_vec[0] = 1.0;
    for (j, c) in theta.iter().enumerate() {
        r_vec[j + 1] = *c;
    }
    (t, r_vec)
}

/// Solves `P = T P Tᵀ + W` by the doubling algorithm.
pub(crate) fn lyapunov(t: &Array2<f64>, w: &Array2<f64>) -> Result<Array2<f64>, ArimaError> {
    let mut p = w.clone();
    let mut a = t.clone();
    for _ in 0..LYAPUNOV_ITERS {
        let next = &p + &a.dot(&p).dot(&a.t());
        let scale = next.diag().iter().fold(1.0_f64, |m, v| m.max(v.abs()));
        let diff = (&next - &p).iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        p = next;
        if !scale.is_finite() {
            return Err(ArimaError::NonStationary);
        }
        if diff <= 1e-14 * scale {
            return Ok(p);
        }
        a = a.dot(&a);
    }
    Err(ArimaError::NonStationary)
}

pub(crate) fn outer(u: &Array1<f64>, v: &Array1<f64>) -> Array2<f64> {
    let mut out = Array2::zeros((u.len(), v.len()));
    for (i, a) in u.iter().enumerate() {
        for (j, b) in v.iter().enumerate() {
            out[[i, j]] = a * b;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn ar1_block() {
        let ss = StateSpace::arma(&Polynomial::monic(&[-0.5]), &Polynomial::one(), 1.0).unwrap();
        assert_eq!(ss.dim(), 1);
        assert_abs_diff_eq!(ss.t()[[0, 0]], 0.5, epsilon = 1e-12);
        // stationary variance 1 / (1 - 0.25)
        assert_abs_diff_eq!(ss.p_star()[[0, 0]], 4.0 / 3.0, epsilon = 1e-10);
        assert_eq!(ss.n_diffuse(), 0);
    }

    #[test]
    fn ma1_block() {
        let ss = StateSpace::arma(&Polynomial::one(), &Polynomial::monic(&[0.8]), 2.0).unwrap();
        assert_eq!(ss.dim(), 2);
        assert_abs_diff_eq!(ss.t()[[0, 1]], 1.0);
        assert_abs_diff_eq!(ss.r()[[1, 0]], 0.8);
        assert_abs_diff_eq!(ss.q()[[0, 0]], 2.0);
        // Var(x) = 2·(1 + 0.64)
        assert_abs_diff_eq!(ss.p_star()[[0, 0]], 3.28, epsilon = 1e-10);
    }

    #[test]
    fn arima_block_layout() {
        let ss = StateSpace::arima(
            &Polynomial::difference(2),
            &Polynomial::one(),
            &Polynomial::monic(&[0.3]),
            1.0,
        )
        .unwrap();
        assert_eq!(ss.dim(), 4);
        assert_eq!(ss.n_diffuse(), 2);
        // x_t = 2x_{t-1} - x_{t-2} + w_t
        assert_abs_diff_eq!(ss.t()[[0, 0]], 2.0);
        assert_abs_diff_eq!(ss.t()[[0, 1]], -1.0);
        assert_abs_diff_eq!(ss.t()[[0, 3]], 1.0);
        assert_abs_diff_eq!(ss.t()[[1, 0]], 1.0);
        assert_abs_diff_eq!(ss.r()[[0, 0]], 1.0);
        assert_abs_diff_eq!(ss.r()[[3, 0]], 0.3);
        assert_abs_diff_eq!(ss.p_inf()[[1, 1]], 1.0);
        assert_abs_diff_eq!(ss.p_inf()[[2, 2]], 0.0);
    }

    #[test]
    fn compose_stacks_blocks() {
        let a = StateSpace::arma(&Polynomial::monic(&[-0.5]), &Polynomial::one(), 1.0).unwrap();
        let b = StateSpace::arima(
            &Polynomial::difference(1),
            &Polynomial::one(),
            &Polynomial::one(),
            0.5,
        )
        .unwrap();
        let c = StateSpace::compose(&[a, b], 0.1).unwrap();
        assert_eq!(c.dim(), 3);
        assert_eq!(c.q().dim(), (2, 2));
        assert_abs_diff_eq!(c.q()[[1, 1]], 0.5);
        assert_abs_diff_eq!(c.z()[0], 1.0);
        assert_abs_diff_eq!(c.z()[1], 1.0);
        assert_abs_diff_eq!(c.h(), 0.1);
        assert_eq!(c.n_diffuse(), 1);
    }

    #[test]
    fn explosive_ar_is_rejected() {
        let err = StateSpace::arma(&Polynomial::monic(&[-1.2]), &Polynomial::one(), 1.0);
        assert!(matches!(err, Err(ArimaError::NonStationary)));
    }

    #[test]
    fn mismatched_dimensions() {
        let err = StateSpace::new(
            Array2::zeros((2, 2)),
            Array2::zeros((2, 1)),
            Array2::zeros((1, 1)),
            Array1::zeros(3),
            0.0,
            Array2::zeros((2, 2)),
            Array2::zeros((2, 2)),
        );
        assert!(matches!(err, Err(ArimaError::InvalidOrder { .. })));
    }
}
