//! Symmetric Laurent polynomials.
//!
//! A [`SymmetricPolynomial`] with coefficients `(s₀, …, sₙ)` represents
//! `s₀ + Σₖ sₖ(zᵏ + z⁻ᵏ)`, which on the unit circle is the real function
//! `s₀ + 2Σₖ sₖ cos(kω)`. Every spectral numerator in the crate has this
//! form.

use std::f64::consts::PI;

use num_complex::Complex64;
use tracing::debug;

use crate::error::ArimaError;
use crate::polynomial::Polynomial;
use crate::roots;

/// Radial tolerance used to decide that a root lies on the unit circle.
const CIRCLE_TOL: f64 = 1e-5;
/// Angular tolerance used to group repeated unit-circle roots.
const ANGLE_TOL: f64 = 1e-3;
/// Relative reconstruction error accepted from a factorization.
const FACTOR_TOL: f64 = 1e-6;

/// A real symmetric Laurent polynomial.
#[derive(Clone, Debug, PartialEq)]
pub struct SymmetricPolynomial {
    coeffs: Vec<f64>,
}

impl SymmetricPolynomial {
    /// Creates a symmetric polynomial from `(s₀, …, sₙ)`.
    pub fn new(coeffs: Vec<f64>) -> Self {
        if coeffs.is_empty() {
            return Self { coeffs: vec![0.0] };
        }
        Self { coeffs }
    }

    /// The zero polynomial.
    pub fn zero() -> Self {
        Self { coeffs: vec![0.0] }
    }

    /// A constant (white-noise) numerator.
    pub fn constant(value: f64) -> Self {
        Self {
            coeffs: vec![value],
        }
    }

    /// Coefficients `(s₀, …, sₙ)`.
    pub fn coefficients(&self) -> &[f64] {
        &self.coeffs
    }

    /// Nominal degree `n`.
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// Value on the unit circle at frequency `ω`.
    pub fn eval(&self, omega: f64) -> f64 {
        self.coeffs[0]
            + 2.0
                * self.coeffs[1..]
                    .iter()
                    .enumerate()
                    .map(|(k, c)| c * ((k + 1) as f64 * omega).cos())
                    .sum::<f64>()
    }

    /// Product of two symmetric polynomials.
    pub fn mul(&self, other: &SymmetricPolynomial) -> SymmetricPolynomial {
        let a = self.laurent();
        let b = other.laurent();
        let na = self.degree();
        let nb = other.degree();
        let mut full = vec![0.0; a.len() + b.len() - 1];
        for (i, x) in a.iter().enumerate() {
            for (j, y) in b.iter().enumerate() {
                full[i + j] += x * y;
            }
        }
        let centre = na + nb;
        SymmetricPolynomial::new(full[centre..].to_vec())
    }

    /// Sum of two symmetric polynomials.
    pub fn add(&self, other: &SymmetricPolynomial) -> SymmetricPolynomial {
        self.add_scaled(other, 1.0)
    }

    /// Returns `self + factor·other`.
    pub fn add_scaled(&self, other: &SymmetricPolynomial, factor: f64) -> SymmetricPolynomial {
        let n = self.coeffs.len().max(other.coeffs.len());
        let coeffs = (0..n)
            .map(|k| {
                self.coeffs.get(k).copied().unwrap_or(0.0)
                    + factor * other.coeffs.get(k).copied().unwrap_or(0.0)
            })
            .collect();
        SymmetricPolynomial::new(coeffs)
    }

    /// Multiplies every coefficient by `factor`.
    pub fn scaled(&self, factor: f64) -> SymmetricPolynomial {
        SymmetricPolynomial::new(self.coeffs.iter().map(|c| c * factor).collect())
    }

    /// Drops trailing coefficients below `tol` times the largest one.
    pub fn trimmed(&self, tol: f64) -> SymmetricPolynomial {
        let scale = self.max_abs();
        let mut coeffs = self.coeffs.clone();
        while coeffs.len() > 1 && coeffs[coeffs.len() - 1].abs() <= tol * scale {
            coeffs.pop();
        }
        SymmetricPolynomial { coeffs }
    }

    /// Largest coefficient magnitude.
    pub fn max_abs(&self) -> f64 {
        self.coeffs.iter().fold(0.0_f64, |m, c| m.max(c.abs()))
    }

    /// True when every coefficient is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|c| *c == 0.0)
    }

    /// Full Laurent coefficient vector `(sₙ, …, s₁, s₀, s₁, …, sₙ)`, i.e. the
    /// ordinary polynomial `zⁿ·S(z)`.
    pub fn laurent(&self) -> Vec<f64> {
        let n = self.degree();
        (0..=2 * n).map(|j| self.coeffs[j.abs_diff(n)]).collect()
    }

    /// Smallest value on a uniform grid of `points + 1` frequencies in `[0, π]`.
    pub fn grid_min(&self, points: usize) -> f64 {
        (0..=points)
            .map(|k| self.eval(PI * k as f64 / points as f64))
            .fold(f64::INFINITY, f64::min)
    }

    /// Factorizes `S(z) = v·θ(z)θ(1/z)` with `θ(0) = 1` and every root of
    /// `θ` on or outside the unit circle.
    ///
    /// Repeated unit-circle roots are shared between `θ(z)` and `θ(1/z)`;
    /// this requires each of them to have even multiplicity, which holds for
    /// any non-negative spectrum.
    ///
    /// # Errors
    ///
    /// [`ArimaError::FactorizationFailed`] when the polynomial is negative
    /// somewhere or the root structure cannot be split.
    pub fn factorize(&self) -> Result<(Polynomial, f64), ArimaError> {
        let s = self.trimmed(1e-13);
        if s.is_zero() {
            return Ok((Polynomial::one(), 0.0));
        }
        if s.degree() == 0 {
            if s.coeffs[0] < 0.0 {
                return Err(ArimaError::FactorizationFailed {
                    reason: format!("negative white-noise variance {}", s.coeffs[0]),
                });
            }
            return Ok((Polynomial::one(), s.coeffs[0]));
        }

        let n = s.degree();
        let roots = roots::find_roots(&s.laurent())?;
        let chosen = select_outer_roots(&roots, n, CIRCLE_TOL)
            .or_else(|| select_outer_roots(&roots, n, 100.0 * CIRCLE_TOL))
            .ok_or_else(|| ArimaError::FactorizationFailed {
                reason: format!("cannot split {} roots into a degree-{n} factor", roots.len()),
            })?;

        let inverse: Vec<Complex64> = chosen.iter().map(|z| z.inv()).collect();
        let theta = Polynomial::from_inverse_roots(&inverse);
        let c = theta.acgf();

        let num: f64 = s.coeffs.iter().zip(c.coeffs.iter()).map(|(a, b)| a * b).sum();
        let den: f64 = c.coeffs.iter().map(|b| b * b).sum();
        let variance = num / den;
        if !variance.is_finite() || variance < 0.0 {
            return Err(ArimaError::FactorizationFailed {
                reason: format!("implied innovation variance {variance}"),
            });
        }

        let err = s
            .coeffs
            .iter()
            .zip(c.coeffs.iter())
            .fold(0.0_f64, |m, (a, b)| m.max((a - variance * b).abs()));
        if err > FACTOR_TOL * s.max_abs() {
            return Err(ArimaError::FactorizationFailed {
                reason: format!("reconstruction error {err:.3e}"),
            });
        }
        debug!(degree = n, variance, "factorized symmetric polynomial");
        Ok((theta, variance))
    }
}

/// Chooses `n` roots of `zⁿS(z)` for the factor `θ(z)`: every root outside
/// the unit circle, plus half of each group of repeated unit-circle roots.
fn select_outer_roots(roots: &[Complex64], n: usize, tol: f64) -> Option<Vec<Complex64>> {
    let mut chosen: Vec<Complex64> = roots
        .iter()
        .filter(|z| z.norm() > 1.0 + tol)
        .copied()
        .collect();

    let mut angles: Vec<f64> = roots
        .iter()
        .filter(|z| (z.norm() - 1.0).abs() <= tol)
        .map(|z| z.arg().abs())
        .collect();
    angles.sort_by(f64::total_cmp);

    let mut groups: Vec<Vec<f64>> = Vec::new();
    for a in angles {
        match groups.last_mut() {
            Some(g) if a - g[g.len() - 1] < ANGLE_TOL => g.push(a),
            _ => groups.push(vec![a]),
        }
    }
    for g in groups {
        let mean = g.iter().sum::<f64>() / g.len() as f64;
        if mean < ANGLE_TOL {
            chosen.extend(std::iter::repeat_n(Complex64::new(1.0, 0.0), g.len() / 2));
        } else if PI - mean < ANGLE_TOL {
            chosen.extend(std::iter::repeat_n(Complex64::new(-1.0, 0.0), g.len() / 2));
        } else {
            for _ in 0..g.len() / 4 {
                chosen.push(Complex64::from_polar(1.0, mean));
                chosen.push(Complex64::from_polar(1.0, -mean));
            }
        }
    }
    (chosen.len() == n).then_some(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn eval_matches_cosine_series() {
        let s = SymmetricPolynomial::new(vec![2.0, 0.5]);
        assert_abs_diff_eq!(s.eval(0.0), 3.0, epsilon = 1e-14);
        assert_abs_diff_eq!(s.eval(PI), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn product_matches_pointwise_product() {
        let a = Polynomial::monic(&[0.5]).acgf();
        let b = Polynomial::monic(&[-0.3, 0.2]).acgf();
        let p = a.mul(&b);
        for k in 0..12 {
            let w = k as f64 * 0.27;
            assert_abs_diff_eq!(p.eval(w), a.eval(w) * b.eval(w), epsilon = 1e-12);
        }
    }

    #[test]
    fn factorize_invertible_ma() {
        let theta = Polynomial::monic(&[0.5, 0.2]);
        let s = theta.acgf().scaled(2.0);
        let (f, v) = s.factorize().unwrap();
        assert_abs_diff_eq!(v, 2.0, epsilon = 1e-10);
        for (a, b) in f.coefficients().iter().zip(theta.coefficients()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-9);
        }
    }

    #[test]
    fn factorize_reflects_non_invertible_roots() {
        // 1 + 2B has its root inside the circle; the invertible equivalent
        // is 4·(1 + 0.5B)(1 + 0.5F).
        let s = Polynomial::monic(&[2.0]).acgf();
        let (f, v) = s.factorize().unwrap();
        assert_abs_diff_eq!(f.coefficients()[1], 0.5, epsilon = 1e-10);
        assert_abs_diff_eq!(v, 4.0, epsilon = 1e-10);
    }

    #[test]
    fn factorize_unit_root() {
        let theta = &Polynomial::monic(&[1.0]) * &Polynomial::monic(&[-0.8]);
        let (f, v) = theta.acgf().factorize().unwrap();
        assert_abs_diff_eq!(v, 1.0, epsilon = 1e-6);
        for (a, b) in f.coefficients().iter().zip(theta.coefficients()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn factorize_white_noise() {
        let (f, v) = SymmetricPolynomial::constant(0.7).factorize().unwrap();
        assert!(f.is_one());
        assert_abs_diff_eq!(v, 0.7);
    }

    #[test]
    fn factorize_negative_fails() {
        let s = SymmetricPolynomial::new(vec![1.0, 0.9]);
        assert!(matches!(
            s.factorize(),
            Err(ArimaError::FactorizationFailed { .. })
        ));
    }

    #[test]
    fn laurent_layout() {
        let s = SymmetricPolynomial::new(vec![3.0, 2.0, 1.0]);
        assert_eq!(s.laurent(), vec![1.0, 2.0, 3.0, 2.0, 1.0]);
    }
}
