//! Polynomials in the backshift operator `B`.
//!
//! A [`Polynomial`] stores ascending coefficients `c₀ + c₁B + … + cₙBⁿ`.
//! Autoregressive and moving-average operators always carry `c₀ = 1`.

use std::fmt;
use std::ops::Mul;

use num_complex::Complex64;

use crate::error::ArimaError;
use crate::roots;
use crate::symmetric::SymmetricPolynomial;

/// A real polynomial in the backshift operator.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    coeffs: Vec<f64>,
}

impl Polynomial {
    /// Creates a polynomial from ascending coefficients.
    ///
    /// An empty vector is read as the zero polynomial.
    pub fn new(coeffs: Vec<f64>) -> Self {
        if coeffs.is_empty() {
            return Self { coeffs: vec![0.0] };
        }
        Self { coeffs }
    }

    /// The constant polynomial `1`.
    pub fn one() -> Self {
        Self { coeffs: vec![1.0] }
    }

    /// Builds `1 + t₁B + … + tₖBᵏ` from its tail coefficients.
    pub fn monic(tail: &[f64]) -> Self {
        let mut coeffs = Vec::with_capacity(tail.len() + 1);
        coeffs.push(1.0);
        coeffs.extend_from_slice(tail);
        Self { coeffs }
    }

    /// Builds `1 + t₁Bˢ + … + tₖB^{ks}` from seasonal tail coefficients.
    pub fn seasonal(tail: &[f64], period: usize) -> Self {
        let period = period.max(1);
        let mut coeffs = vec![0.0; tail.len() * period + 1];
        coeffs[0] = 1.0;
        for (j, c) in tail.iter().enumerate() {
            coeffs[(j + 1) * period] = *c;
        }
        Self { coeffs }
    }

    /// Builds `Π (1 − rᵢB)` from inverse roots.
    ///
    /// Complex inverse roots must appear together with their conjugates for
    /// the product to be real; the imaginary residue is discarded.
    pub fn from_inverse_roots(inverse_roots: &[Complex64]) -> Self {
        let mut acc = vec![Complex64::new(1.0, 0.0)];
        for r in inverse_roots {
            let mut next = vec![Complex64::new(0.0, 0.0); acc.len() + 1];
            for (k, c) in acc.iter().enumerate() {
                next[k] += c;
                next[k + 1] -= c * r;
            }
            acc = next;
        }
        Self {
            coeffs: acc.iter().map(|c| c.re).collect(),
        }
    }

    /// Regular differencing `(1 − B)ᵈ`.
    pub fn difference(order: usize) -> Self {
        Self::new(vec![1.0, -1.0]).pow(order)
    }

    /// Seasonal differencing `(1 − Bˢ)ᴰ`.
    pub fn seasonal_difference(period: usize, order: usize) -> Self {
        Self::seasonal(&[-1.0], period).pow(order)
    }

    /// Seasonal sum `1 + B + … + B^{s−1}`, the seasonal factor of `1 − Bˢ`.
    pub fn seasonal_sum(period: usize) -> Self {
        Self {
            coeffs: vec![1.0; period.max(1)],
        }
    }

    /// Ascending coefficients.
    pub fn coefficients(&self) -> &[f64] {
        &self.coeffs
    }

    /// Coefficients beyond the constant term.
    pub fn tail(&self) -> &[f64] {
        &self.coeffs[1..]
    }

    /// Nominal degree (number of coefficients minus one).
    pub fn degree(&self) -> usize {
        self.coeffs.len() - 1
    }

    /// True for the constant polynomial `1`.
    pub fn is_one(&self) -> bool {
        self.coeffs.len() == 1 && self.coeffs[0] == 1.0
    }

    /// Evaluates the polynomial at a complex point.
    pub fn eval(&self, z: Complex64) -> Complex64 {
        self.coeffs
            .iter()
            .rev()
            .fold(Complex64::new(0.0, 0.0), |acc, c| acc * z + c)
    }

    /// Evaluates the polynomial at `B = e^{−iω}`.
    pub fn eval_frequency(&self, omega: f64) -> Complex64 {
        self.eval(Complex64::from_polar(1.0, -omega))
    }

    /// Squared gain `|P(e^{−iω})|²`.
    pub fn gain(&self, omega: f64) -> f64 {
        self.eval_frequency(omega).norm_sqr()
    }

    /// Raises the polynomial to a non-negative integer power.
    pub fn pow(&self, n: usize) -> Self {
        (0..n).fold(Self::one(), |acc, _| &acc * self)
    }

    /// Multiplies every coefficient by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            coeffs: self.coeffs.iter().map(|c| c * factor).collect(),
        }
    }

    /// Drops trailing coefficients whose magnitude is below `tol` times the
    /// largest coefficient.
    pub fn trimmed(&self, tol: f64) -> Self {
        let scale = self.coeffs.iter().fold(0.0_f64, |m, c| m.max(c.abs()));
        let mut coeffs = self.coeffs.clone();
        while coeffs.len() > 1 && coeffs[coeffs.len() - 1].abs() <= tol * scale {
            coeffs.pop();
        }
        Self { coeffs }
    }

    /// Inverse roots `rᵢ` such that `P(B) = c₀ Π (1 − rᵢB)`.
    ///
    /// The polynomial is stable (stationary or invertible) when every
    /// inverse root lies strictly inside the unit circle.
    pub fn inverse_roots(&self) -> Result<Vec<Complex64>, ArimaError> {
        let reversed: Vec<f64> = self.trimmed(0.0).coeffs.iter().rev().copied().collect();
        roots::find_roots(&reversed)
    }

    /// Largest inverse-root modulus, zero for constants.
    pub fn max_inverse_root_modulus(&self) -> Result<f64, ArimaError> {
        Ok(self
            .inverse_roots()?
            .iter()
            .fold(0.0_f64, |m, r| m.max(r.norm())))
    }

    /// Autocovariance generating function `P(z)P(1/z)` as a symmetric
    /// polynomial.
    pub fn acgf(&self) -> SymmetricPolynomial {
        let n = self.coeffs.len();
        let coeffs = (0..n)
            .map(|k| {
                (0..n - k)
                    .map(|j| self.coeffs[j] * self.coeffs[j + k])
                    .sum()
            })
            .collect();
        SymmetricPolynomial::new(coeffs)
    }

    /// Long division by a divisor with non-zero constant term.
    ///
    /// Returns `(quotient, remainder)` with `self = divisor·quotient + remainder`.
    pub fn divide(&self, divisor: &Polynomial) -> Result<(Polynomial, Polynomial), ArimaError> {
        let d = divisor.trimmed(0.0);
        if d.coeffs[0] == 0.0 {
            return Err(ArimaError::Singular {
                context: "polynomial division",
            });
        }
        let n = self.coeffs.len();
        let m = d.coeffs.len();
        if n < m {
            return Ok((Polynomial::new(vec![0.0]), self.clone()));
        }
        let mut q = vec![0.0; n - m + 1];
        for k in 0..q.len() {
            let acc: f64 = (1..m.min(k + 1))
                .map(|j| d.coeffs[j] * q[k - j])
                .sum();
            q[k] = (self.coeffs[k] - acc) / d.coeffs[0];
        }
        let quotient = Polynomial::new(q);
        let product = &quotient * &d;
        let remainder: Vec<f64> = (0..n)
            .map(|k| self.coeffs[k] - product.coeffs.get(k).copied().unwrap_or(0.0))
            .collect();
        Ok((quotient, Polynomial::new(remainder)))
    }
}

impl Mul<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &Polynomial) -> Polynomial {
        let mut out = vec![0.0; self.coeffs.len() + rhs.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            if *a == 0.0 {
                continue;
            }
            for (j, b) in rhs.coeffs.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        Polynomial { coeffs: out }
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (k, c) in self.coeffs.iter().enumerate() {
            if *c == 0.0 && !(k == 0 && self.coeffs.len() == 1) {
                continue;
            }
            let sign = if *c < 0.0 { "-" } else { "+" };
            if first {
                if *c < 0.0 {
                    write!(f, "-")?;
                }
            } else {
                write!(f, " {sign} ")?;
            }
            match k {
                0 => write!(f, "{:.4}", c.abs())?,
                1 => write!(f, "{:.4} B", c.abs())?,
                _ => write!(f, "{:.4} B^{k}", c.abs())?,
            }
            first = false;
        }
        Ok(())
    }
}
