//! Unconstrained parametrisation of stationary / invertible polynomials.
//!
//! **Not part of the public API.**

/// Largest partial autocorrelation accepted when mapping back, so that
/// starting values stay strictly inside the admissible region.
const MAX_PACF: f64 = 0.99;

/// Maps unconstrained parameters to the tail of a monic polynomial whose
/// roots lie outside the unit circle (Jones 1980, Monahan 1984).
///
/// `r_k = tanh(α_k)` gives partial autocorrelations in (-1, 1); the
/// Levinson-Durbin recursion turns them into coefficients of
/// `1 − r-weighted lags`, returned in the `1 + c₁B + …` convention.
pub(crate) fn unconstrained_to_polynomial(alpha: &[f64]) -> Vec<f64> {
    let p = alpha.len();
    if p == 0 {
        return Vec::new();
    }
    let r: Vec<f64> = alpha.iter().map(|a| a.tanh()).collect();

    let mut phi = vec![0.0; p];
    let mut prev = vec![0.0; p];
    phi[0] = r[0];
    for k in 1..p {
        prev.copy_from_slice(&phi);
        phi[k] = r[k];
        for j in 0..k {
            phi[j] = prev[j] - r[k] * prev[k - 1 - j];
        }
    }
    phi.iter().map(|c| -c).collect()
}

/// Inverse of [`unconstrained_to_polynomial`] by the step-down recursion.
///
/// Partial autocorrelations are clipped to `±0.99`, so polynomials on or
/// outside the admissible boundary map to nearby interior points.
pub(crate) fn polynomial_to_unconstrained(tail: &[f64]) -> Vec<f64> {
    let p = tail.len();
    let mut phi: Vec<f64> = tail.iter().map(|c| -c).collect();
    let mut alpha = vec![0.0; p];
    for k in (0..p).rev() {
        let r = phi[k].clamp(-MAX_PACF, MAX_PACF);
        alpha[k] = r.atanh();
        let denom = 1.0 - r * r;
        let prev: Vec<f64> = (0..k)
            .map(|j| (phi[j] + r * phi[k - 1 - j]) / denom)
            .collect();
        phi[..k].copy_from_slice(&prev);
    }
    alpha
}
