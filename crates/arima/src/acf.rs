//! Autocovariances and ψ-weights of ARMA-type processes.

use nalgebra::{DMatrix, DVector};

use crate::error::ArimaError;
use crate::polynomial::Polynomial;
use crate::symmetric::SymmetricPolynomial;

/// Autocovariances `γ₀…γ_nlags` of a stationary process with spectral
/// numerator `S` and AR operator `φ`, i.e. with generating function
/// `S(z) / (φ(z)φ(1/z))`.
///
/// The first `deg S + deg φ + 1` values solve a linear system; later lags
/// follow the AR recursion.
///
/// # Errors
///
/// [`ArimaError::Singular`] when `φ` has roots on the unit circle.
pub fn autocovariances(
    numerator: &SymmetricPolynomial,
    ar: &Polynomial,
    nlags: usize,
) -> Result<Vec<f64>, ArimaError> {
    let s = numerator.coefficients();
    let phi = ar.coefficients();
    let n = numerator.degree();
    let p = ar.degree();
    let k_max = n + p;

    let mut gamma = if p == 0 {
        let lead = phi[0] * phi[0];
        s.iter().map(|v| v / lead).collect::<Vec<f64>>()
    } else {
        let c = ar.acgf();
        let c = c.coefficients();
        let dim = k_max + 1;
        let mut a = DMatrix::<f64>::zeros(dim, dim);
        let mut b = DVector::<f64>::zeros(dim);
        for k in 0..=n {
            for j in -(p as isize)..=(p as isize) {
                let lag = (k as isize - j).unsigned_abs();
                a[(k, lag)] += c[j.unsigned_abs()];
            }
            b[k] = s[k];
        }
        for k in (n + 1)..=k_max {
            for (j, phi_j) in phi.iter().enumerate() {
                a[(k, k.abs_diff(j))] += phi_j;
            }
        }
        let solution = a.lu().solve(&b).ok_or(ArimaError::Singular {
            context: "autocovariance system",
        })?;
        if solution.iter().any(|v| !v.is_finite()) {
            return Err(ArimaError::Singular {
                context: "autocovariance system",
            });
        }
        solution.iter().copied().collect()
    };

    while gamma.len() < nlags + 1 {
        let k = gamma.len();
        let acc: f64 = (1..=p.min(k)).map(|j| phi[j] * gamma[k - j]).sum();
        gamma.push(-acc / phi[0]);
    }
    gamma.truncate(nlags + 1);
    Ok(gamma)
}

/// First `n` ψ-weights of `θ(B)/φ(B)`.
///
/// `φ` may contain unit roots, in which case the weights do not decay.
pub fn psi_weights(ma: &Polynomial, ar: &Polynomial, n: usize) -> Vec<f64> {
    let theta = ma.coefficients();
    let phi = ar.coefficients();
    let mut psi = Vec::with_capacity(n);
    for l in 0..n {
        let acc: f64 = (1..phi.len().min(l + 1)).map(|j| phi[j] * psi[l - j]).sum();
        psi.push((theta.get(l).copied().unwrap_or(0.0) - acc) / phi[0]);
    }
    psi
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn arma11_closed_form() {
        // (1 - 0.7B) x = (1 + 0.4B) a
        let ar = Polynomial::monic(&[-0.7]);
        let ma = Polynomial::monic(&[0.4]);
        let g = autocovariances(&ma.acgf(), &ar, 3).unwrap();
        let (a, b) = (0.7_f64, 0.4_f64);
        let g0 = (1.0 + 2.0 * a * b + b * b) / (1.0 - a * a);
        let g1 = (1.0 + a * b) * (a + b) / (1.0 - a * a);
        assert_abs_diff_eq!(g[0], g0, epsilon = 1e-12);
        assert_abs_diff_eq!(g[1], g1, epsilon = 1e-12);
        assert_abs_diff_eq!(g[2], a * g1, epsilon = 1e-12);
        assert_abs_diff_eq!(g[3], a * a * g1, epsilon = 1e-12);
    }

    #[test]
    fn pure_ma_truncates() {
        let ma = Polynomial::monic(&[0.5, 0.2]);
        let g = autocovariances(&ma.acgf(), &Polynomial::one(), 4).unwrap();
        assert_abs_diff_eq!(g[0], 1.29, epsilon = 1e-14);
        assert_abs_diff_eq!(g[1], 0.6, epsilon = 1e-14);
        assert_abs_diff_eq!(g[2], 0.2, epsilon = 1e-14);
        assert_abs_diff_eq!(g[3], 0.0);
        assert_abs_diff_eq!(g[4], 0.0);
    }

    #[test]
    fn ar2_variance_is_positive() {
        let ar = &Polynomial::monic(&[-0.9]) * &Polynomial::monic(&[0.95]);
        let g = autocovariances(&SymmetricPolynomial::constant(1.0), &ar, 2).unwrap();
        assert!(g[0] > 1.0);
    }

    #[test]
    fn psi_weights_of_ar1() {
        let psi = psi_weights(&Polynomial::one(), &Polynomial::monic(&[-0.5]), 4);
        assert_abs_diff_eq!(psi[0], 1.0);
        assert_abs_diff_eq!(psi[1], 0.5);
        assert_abs_diff_eq!(psi[3], 0.125);
    }

    #[test]
    fn psi_weights_of_integrated_ma() {
        // (1 - B) x = (1 - 0.6B) a  =>  ψ = 1, 0.4, 0.4, ...
        let psi = psi_weights(&Polynomial::monic(&[-0.6]), &Polynomial::difference(1), 5);
        assert_abs_diff_eq!(psi[0], 1.0);
        for w in &psi[1..] {
            assert_abs_diff_eq!(*w, 0.4, epsilon = 1e-14);
        }
    }
}
