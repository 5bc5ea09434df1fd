//! Polynomial root finding.
//!
//! Uses the Aberth–Ehrlich simultaneous iteration, which converges for
//! clustered and near-unit-circle roots where companion-matrix methods lose
//! accuracy.
//!
//! **Not part of the public API.**

use std::f64::consts::TAU;

use num_complex::Complex64;

use crate::error::ArimaError;

const MAX_ITERS: usize = 500;
const TOLERANCE: f64 = 1e-15;

/// Returns all roots of `c[0] + c[1]·z + … + c[n]·zⁿ`.
///
/// Trailing zero coefficients are ignored; leading zero coefficients
/// produce roots at the origin.
pub(crate) fn find_roots(coeffs: &[f64]) -> Result<Vec<Complex64>, ArimaError> {
    let mut c = coeffs.to_vec();
    while c.len() > 1 && c[c.len() - 1] == 0.0 {
        c.pop();
    }
    let degree = c.len().saturating_sub(1);
    if degree == 0 {
        return Ok(Vec::new());
    }
    if c.iter().any(|x| !x.is_finite()) {
        return Err(ArimaError::RootFindingFailed { degree });
    }

    let n_zero = c.iter().take_while(|x| **x == 0.0).count();
    let c = &c[n_zero..];
    let m = c.len() - 1;
    let mut roots = vec![Complex64::new(0.0, 0.0); n_zero];
    if m == 0 {
        return Ok(roots);
    }

    let lead = c[m];
    let monic: Vec<Complex64> = c.iter().map(|x| Complex64::new(x / lead, 0.0)).collect();
    let derivative: Vec<Complex64> = (1..=m).map(|k| monic[k] * k as f64).collect();

    // The product of the root moduli is |c0 / cm|.
    let radius = (c[0] / lead).abs().powf(1.0 / m as f64).max(1e-3);
    let mut z: Vec<Complex64> = (0..m)
        .map(|k| Complex64::from_polar(radius, TAU * k as f64 / m as f64 + 0.4))
        .collect();

    for _ in 0..MAX_ITERS {
        let mut max_step: f64 = 0.0;
        for i in 0..m {
            let f = horner(&monic, z[i]);
            if f.norm() == 0.0 {
                continue;
            }
            let ratio = f / horner(&derivative, z[i]);
            let repulsion: Complex64 = (0..m)
                .filter(|&j| j != i)
                .map(|j| (z[i] - z[j]).inv())
                .sum();
            let step = ratio / (Complex64::new(1.0, 0.0) - ratio * repulsion);
            if step.re.is_finite() && step.im.is_finite() {
                z[i] -= step;
                max_step = max_step.max(step.norm() / z[i].norm().max(1.0));
            }
        }
        if max_step < TOLERANCE {
            break;
        }
    }

    if z.iter().any(|r| !r.re.is_finite() || !r.im.is_finite()) {
        return Err(ArimaError::RootFindingFailed { degree });
    }
    roots.extend(z.into_iter().map(|r| {
        if r.im.abs() <= 1e-12 * r.norm().max(1.0) {
            Complex64::new(r.re, 0.0)
        } else {
            r
        }
    }));
    Ok(roots)
}

/// Evaluates a complex polynomial (ascending coefficients) at `z`.
pub(crate) fn horner(coeffs: &[Complex64], z: Complex64) -> Complex64 {
    coeffs
        .iter()
        .rev()
        .fold(Complex64::new(0.0, 0.0), |acc, c| acc * z + c)
}
