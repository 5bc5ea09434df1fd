//! Exact finite-sample signal extraction with dense matrices.
//!
//! For a component `s` with differencing `δ_S` and the sum `n` of the other
//! components with differencing `δ_N`, the estimate solves
//!
//! ```text
//! (Δ_S' Σ_u⁻¹ Δ_S + Δ_N' Σ_v⁻¹ Δ_N) ŝ = Δ_N' Σ_v⁻¹ Δ_N y
//! ```
//!
//! where `Δ` are the differencing matrices and `Σ_u`, `Σ_v` the Toeplitz
//! covariances of the differenced components. The inverse of the left-hand
//! matrix is the error covariance. Cost is cubic in the sample size.

use nalgebra::{DMatrix, DVector};
use sadj_arima::{ArimaProcess, Polynomial, SymmetricPolynomial, autocovariances};
use sadj_ucm::UnobservedComponentsModel;
use tracing::instrument;

use crate::common::{check_series, observed, stdev};
use crate::error::ExtractError;
use crate::estimates::{ComponentEstimates, ComponentSeries};
use crate::estimator::ComponentEstimator;
use crate::smoother::attach_forecasts;

/// Exact matrix estimator.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactMatrix;

/// `(n - d) × n` matrix applying `δ` to a series of length `n`.
fn difference_matrix(delta: &Polynomial, n: usize) -> DMatrix<f64> {
    let d = delta.coefficients();
    let k = delta.degree();
    let rows = n.saturating_sub(k);
    let mut m = DMatrix::zeros(rows, n);
    for i in 0..rows {
        for (j, dj) in d.iter().enumerate() {
            m[(i, i + k - j)] = *dj;
        }
    }
    m
}

fn toeplitz(gamma: &[f64], n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |i, j| gamma[i.abs_diff(j)])
}

/// `Δ' Σ⁻¹ Δ` for a differenced process with the given spectral numerator
/// and stationary AR.
fn precision(
    delta: &Polynomial,
    numerator: &SymmetricPolynomial,
    ar: &Polynomial,
    n: usize,
    context: &'static str,
) -> Result<DMatrix<f64>, ExtractError> {
    let diff = difference_matrix(delta, n);
    let m = diff.nrows();
    let gamma = autocovariances(numerator, ar, m.max(1))?;
    let chol = toeplitz(&gamma, m)
        .cholesky()
        .ok_or(ExtractError::Singular { context })?;
    Ok(diff.transpose() * chol.solve(&diff))
}

/// The stationary AR and differencing of the sum of every component other
/// than `skip`.
fn complement_operators(
    model: &UnobservedComponentsModel,
    skip: usize,
) -> Option<(Polynomial, Polynomial)> {
    let others: Vec<&ArimaProcess> = model
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != skip)
        .map(|(_, (_, c))| c)
        .collect();
    if others.is_empty() {
        return None;
    }
    let mut stationary = Polynomial::one();
    let mut differencing = Polynomial::one();
    for c in others {
        stationary = &stationary * c.stationary_ar();
        differencing = &differencing * c.differencing();
    }
    Some((stationary, differencing))
}

impl ComponentEstimator for ExactMatrix {
    fn name(&self) -> &'static str {
        "matrix"
    }

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
        let y = DVector::from_column_slice(series);
        let mut components: [Option<ComponentSeries>; 4] = Default::default();

        for (i, (kind, c)) in model.iter().enumerate() {
            let Some((other_ar, other_diff)) = complement_operators(model, i) else {
                components[kind.index()] = Some(ComponentSeries {
                    values: series.to_vec(),
                    stdev: vec![0.0; n],
                    ..ComponentSeries::default()
                });
                continue;
            };
            let signal = precision(
                c.differencing(),
                &c.numerator(),
                c.stationary_ar(),
                n,
                "signal covariance",
            )?;
            let (other_numerator, _) = model.complement(kind);
            let noise = precision(
                &other_diff,
                &other_numerator,
                &other_ar,
                n,
                "complement covariance",
            )?;
            let rhs = &noise * &y;
            let chol = (signal + noise)
                .cholesky()
                .ok_or(ExtractError::Singular {
                    context: "extraction matrix",
                })?;
            let values = chol.solve(&rhs);
            let covariance = chol.inverse();
            components[kind.index()] = Some(ComponentSeries {
                values: values.iter().copied().collect(),
                stdev: (0..n).map(|t| stdev(covariance[(t, t)], ser)).collect(),
                ..ComponentSeries::default()
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
    use sadj_ucm::ComponentKind;

    #[test]
    fn difference_matrix_rows() {
        let m = difference_matrix(&Polynomial::difference(1), 4);
        assert_eq!(m.nrows(), 3);
        assert_eq!(m.row(0).iter().copied().collect::<Vec<_>>(), vec![-1.0, 1.0, 0.0, 0.0]);
        assert_eq!(m.row(2).iter().copied().collect::<Vec<_>>(), vec![0.0, 0.0, -1.0, 1.0]);
        let id = difference_matrix(&Polynomial::one(), 3);
        assert_eq!(id, DMatrix::identity(3, 3));
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
        let y = [1.0, 1.4, 0.9, 1.8, 2.2, 2.0, 2.6, 3.1, 2.9, 3.5];
        let exact = ExactMatrix.estimate(&y, &model, 2, 1.5).unwrap();
        let ks = crate::KalmanSmoother.estimate(&y, &model, 2, 1.5).unwrap();
        assert!(exact.reconstruction_error() < 1e-9);
        for kind in [ComponentKind::Trend, ComponentKind::Irregular] {
            let (a, b) = (exact.component(kind).unwrap(), ks.component(kind).unwrap());
            for t in 0..y.len() {
                assert_abs_diff_eq!(a.values[t], b.values[t], epsilon = 1e-8);
                assert_abs_diff_eq!(a.stdev[t], b.stdev[t], epsilon = 1e-8);
            }
            assert_eq!(a.forecasts, b.forecasts);
        }
    }

    #[test]
    fn single_component_is_the_series() {
        let model = UnobservedComponentsModel::new(
            ArimaProcess::white_noise(1.0),
            [None, None, None, Some(ArimaProcess::white_noise(1.0))],
        );
        let est = ExactMatrix.estimate(&[0.1, 0.2, 0.3], &model, 0, 1.0).unwrap();
        let irr = est.component(ComponentKind::Irregular).unwrap();
        assert_eq!(irr.values, vec![0.1, 0.2, 0.3]);
        assert_eq!(irr.stdev, vec![0.0; 3]);
    }
}
