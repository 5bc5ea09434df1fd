//! Input checks and pieces shared by the estimators.

use sadj_arima::kalman;
use sadj_ucm::UnobservedComponentsModel;

use crate::error::ExtractError;
use crate::estimates::ComponentSeries;

/// Checks the series against the model: non-empty, finite and long enough
/// to identify the diffuse initial state with one observation to spare.
pub(crate) fn check_series(
    series: &[f64],
    model: &UnobservedComponentsModel,
) -> Result<(), ExtractError> {
    if series.is_empty() {
        return Err(ExtractError::EmptySeries);
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(ExtractError::NonFiniteSeries);
    }
    let min = model.aggregate().differencing().degree() + 2;
    if series.len() < min {
        return Err(ExtractError::InsufficientData {
            n: series.len(),
            min,
        });
    }
    Ok(())
}

/// Standard error from a variance in model units.
pub(crate) fn stdev(variance: f64, ser: f64) -> f64 {
    ser * variance.max(0.0).sqrt()
}

/// The observed series with its own forecasts from the aggregate model.
pub(crate) fn observed(
    series: &[f64],
    model: &UnobservedComponentsModel,
    horizon: usize,
    ser: f64,
) -> Result<ComponentSeries, ExtractError> {
    let (forecasts, forecast_stdev) = if horizon == 0 {
        (Vec::new(), Vec::new())
    } else {
        let fc = kalman::forecast(&model.aggregate().state_space()?, series, horizon)?;
        let sd = fc.variances.iter().map(|v| stdev(*v, ser)).collect();
        (fc.values, sd)
    };
    Ok(ComponentSeries {
        values: series.to_vec(),
        stdev: vec![0.0; series.len()],
        forecasts,
        forecast_stdev,
    })
}
