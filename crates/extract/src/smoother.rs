//! Component estimates from the fixed-interval Kalman smoother.
//!
//! The non-irregular components are stacked into one block-diagonal
//! state-space model whose observation noise is the irregular. Appending
//! `horizon` missing observations turns the smoother into a forecaster, so
//! the same pass also provides component forecasts; the other estimators
//! borrow those.

use sadj_arima::{StateSpace, kalman};
use sadj_ucm::{ComponentKind, UnobservedComponentsModel};
use tracing::{debug, instrument};

use crate::common::{check_series, observed, stdev};
use crate::error::ExtractError;
use crate::estimates::{ComponentEstimates, ComponentSeries};
use crate::estimator::ComponentEstimator;

/// Smoothed values and variances of one component over the sample and the
/// forecast horizon, variances in model units.
#[derive(Clone, Debug)]
pub(crate) struct Track {
    pub values: Vec<f64>,
    pub variances: Vec<f64>,
}

impl Track {
    /// Splits at `n` into in-sample estimates and forecasts.
    pub(crate) fn into_series(self, n: usize, ser: f64) -> ComponentSeries {
        let sd: Vec<f64> = self.variances.iter().map(|v| stdev(*v, ser)).collect();
        let mut values = self.values;
        let forecasts = values.split_off(n);
        let (stdev, forecast_stdev) = sd.split_at(n);
        ComponentSeries {
            values,
            stdev: stdev.to_vec(),
            forecasts,
            forecast_stdev: forecast_stdev.to_vec(),
        }
    }

    /// Only the part beyond `n`.
    pub(crate) fn forecasts(&self, n: usize, ser: f64) -> (Vec<f64>, Vec<f64>) {
        (
            self.values[n..].to_vec(),
            self.variances[n..].iter().map(|v| stdev(*v, ser)).collect(),
        )
    }
}

/// Runs the composite smoother over `series` followed by `horizon` missing
/// values.
pub(crate) fn smooth_tracks(
    series: &[f64],
    model: &UnobservedComponentsModel,
    horizon: usize,
) -> Result<[Option<Track>; 4], ExtractError> {
    let n = series.len();
    let mut tracks: [Option<Track>; 4] = Default::default();
    let irregular = model
        .component(ComponentKind::Irregular)
        .map(|c| c.variance());

    let mut blocks = Vec::new();
    let mut offsets = Vec::new();
    let mut offset = 0;
    for (kind, c) in model.iter() {
        if kind == ComponentKind::Irregular {
            continue;
        }
        let ss = c.state_space()?;
        offsets.push((kind, offset));
        offset += ss.dim();
        blocks.push(ss);
    }

    if blocks.is_empty() {
        if let Some(h) = irregular {
            let mut values = series.to_vec();
            values.resize(n + horizon, 0.0);
            let mut variances = vec![0.0; n];
            variances.resize(n + horizon, h);
            tracks[ComponentKind::Irregular.index()] = Some(Track { values, variances });
        }
        return Ok(tracks);
    }

    let ss = StateSpace::compose(&blocks, irregular.unwrap_or(0.0))?;
    let obs: Vec<Option<f64>> = series
        .iter()
        .map(|v| Some(*v))
        .chain(std::iter::repeat_n(None, horizon))
        .collect();
    let smoothed = kalman::smooth(&ss, &obs)?;
    debug!(states = ss.dim(), points = obs.len(), "composite smoother done");

    for (kind, off) in offsets {
        let values = (0..n + horizon).map(|t| smoothed.states[[t, off]]).collect();
        let variances = smoothed.variances.iter().map(|v| v[[off, off]]).collect();
        tracks[kind.index()] = Some(Track { values, variances });
    }

    if let Some(h) = irregular {
        let z = ss.z();
        let mut values = Vec::with_capacity(n + horizon);
        let mut variances = Vec::with_capacity(n + horizon);
        for t in 0..n {
            values.push(series[t] - z.dot(&smoothed.states.row(t)));
            variances.push(z.dot(&smoothed.variances[t].dot(z)));
        }
        values.resize(n + horizon, 0.0);
        variances.resize(n + horizon, h);
        tracks[ComponentKind::Irregular.index()] = Some(Track { values, variances });
    }
    Ok(tracks)
}

/// Attaches smoother forecasts to components estimated by another method.
pub(crate) fn attach_forecasts(
    components: &mut [Option<ComponentSeries>; 4],
    series: &[f64],
    model: &UnobservedComponentsModel,
    horizon: usize,
    ser: f64,
) -> Result<(), ExtractError> {
    if horizon == 0 {
        return Ok(());
    }
    let tracks = smooth_tracks(series, model, horizon)?;
    for (slot, track) in components.iter_mut().zip(tracks.iter()) {
        if let (Some(c), Some(track)) = (slot.as_mut(), track.as_ref()) {
            let (values, sd) = track.forecasts(series.len(), ser);
            if c.forecasts.is_empty() {
                c.forecasts = values;
            }
            c.forecast_stdev = sd;
        }
    }
    Ok(())
}

/// Kalman smoother estimator.
///
/// Handles any decomposition, including non-invertible aggregates, at the
/// cost of an `O(n m³)` pass where `m` is the total state dimension.
#[derive(Clone, Copy, Debug, Default)]
pub struct KalmanSmoother;

impl ComponentEstimator for KalmanSmoother {
    fn name(&self) -> &'static str {
        "smoother"
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
        let tracks = smooth_tracks(series, model, horizon)?;
        let components = tracks.map(|t| t.map(|t| t.into_series(n, ser)));
        Ok(ComponentEstimates::new(
            observed(series, model, horizon, ser)?,
            components,
        ))
    }
}
