//! The model currently being decomposed, together with its series.

use std::cell::OnceCell;

use sadj_arima::{ArimaError, Estimation, SeasonalArimaModel, StateSpace, difference, kalman};
use tracing::debug;

/// A series and the model the kernel is working with.
///
/// Values of this type are replaced, not mutated, as the approximation
/// search moves to another model. The residual standard error is computed
/// on first use from the concentrated exact likelihood of the differenced
/// series, unless it came with an estimation.
#[derive(Clone, Debug)]
pub struct WorkingModel<'a> {
    series: &'a [f64],
    model: SeasonalArimaModel,
    mean_correction: bool,
    mean: f64,
    ser: OnceCell<f64>,
}

impl<'a> WorkingModel<'a> {
    /// Wraps a fitted model. With mean correction the mean of the
    /// differenced series is taken as the mean estimate.
    pub fn new(series: &'a [f64], model: SeasonalArimaModel, mean_correction: bool) -> Self {
        let mean = if mean_correction {
            let w = difference(series, &model.differencing());
            if w.is_empty() {
                0.0
            } else {
                w.iter().sum::<f64>() / w.len() as f64
            }
        } else {
            0.0
        };
        Self {
            series,
            model,
            mean_correction,
            mean,
            ser: OnceCell::new(),
        }
    }

    /// Wraps a model returned by an estimator, keeping its mean and
    /// residual standard error.
    pub fn estimated(series: &'a [f64], estimation: Estimation, mean_correction: bool) -> Self {
        let ser = OnceCell::new();
        if estimation.ser.is_finite() && estimation.ser > 0.0 {
            let _ = ser.set(estimation.ser);
        }
        Self {
            series,
            model: estimation.model,
            mean_correction,
            mean: if mean_correction { estimation.mean } else { 0.0 },
            ser,
        }
    }

    pub fn model(&self) -> &SeasonalArimaModel {
        &self.model
    }

    pub fn mean_correction(&self) -> bool {
        self.mean_correction
    }

    /// Mean of the differenced series, zero without mean correction.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Residual standard error `sqrt(Σv²/F / (n − k))`, with `k` the number
    /// of estimated coefficients (plus one for the mean).
    pub fn ser(&self) -> Result<f64, ArimaError> {
        if let Some(v) = self.ser.get() {
            return Ok(*v);
        }
        let mut w = difference(self.series, &self.model.differencing());
        w.iter_mut().for_each(|v| *v -= self.mean);
        let ss = StateSpace::arma(&self.model.stationary_ar(), &self.model.ma(), 1.0)?;
        let lik = kalman::likelihood(&ss, &w)?;
        let k = self.model.spec().n_coefficients() + usize::from(self.mean_correction);
        let dof = lik.n_regular.saturating_sub(k).max(1);
        let ser = (lik.ssq / dof as f64).sqrt();
        debug!(ser, dof, "residual standard error");
        let _ = self.ser.set(ser);
        Ok(ser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use sadj_arima::SeasonalArimaSpec;

    #[test]
    fn white_noise_ser() {
        let spec = SeasonalArimaSpec::new(0, 0, 0, 0, 0, 0, 1).unwrap();
        let model = SeasonalArimaModel::zeroed(spec);
        let y = [1.0, -1.0, 2.0, -2.0];
        let w = WorkingModel::new(&y, model, false);
        assert_abs_diff_eq!(w.ser().unwrap(), (10.0_f64 / 4.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn mean_of_differences() {
        let spec = SeasonalArimaSpec::new(0, 1, 0, 0, 0, 0, 1).unwrap();
        let model = SeasonalArimaModel::zeroed(spec);
        let y = [1.0, 3.0, 4.0, 7.0];
        let w = WorkingModel::new(&y, model.clone(), true);
        assert_abs_diff_eq!(w.mean(), 2.0, epsilon = 1e-12);
        // differences 2, 1, 3 around 2, one coefficient for the mean
        assert_abs_diff_eq!(w.ser().unwrap(), 1.0, epsilon = 1e-12);
        assert_eq!(WorkingModel::new(&y, model, false).mean(), 0.0);
    }

    #[test]
    fn estimated_ser_is_kept() {
        let model = SeasonalArimaModel::airline(4, -0.3, -0.4, 1.0).unwrap();
        let est = Estimation {
            model,
            ser: 0.7,
            mean: 1.5,
            log_likelihood: 0.0,
            n_effective: 10,
        };
        let w = WorkingModel::estimated(&[1.0; 12], est, false);
        assert_eq!(w.ser().unwrap(), 0.7);
        assert_eq!(w.mean(), 0.0);
    }
}
