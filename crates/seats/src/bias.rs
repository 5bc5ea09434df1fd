//! Mapping component estimates back to the scale of the observed series.
//!
//! For a log decomposition the exponentiated seasonal and irregular are
//! divided by their geometric means, so that neither carries a systematic
//! multiplicative level, and the trend is multiplied by both factors. The
//! seasonally adjusted series and the final irregular are then derived from
//! the series itself, which makes `trend × seasonal × irregular` reproduce
//! the series exactly. Standard errors go through the delta method.

use sadj_extract::{ComponentEstimates, ComponentSeries};
use sadj_ucm::ComponentKind;
use tracing::debug;

/// The series and its components on the scale of the observations.
///
/// The final irregular is what the seasonally adjusted series leaves after
/// the trend, so it includes any transitory movements. The transitory
/// estimate is still reported on its own.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Levels {
    pub series: ComponentSeries,
    pub trend: Option<ComponentSeries>,
    pub seasonal: Option<ComponentSeries>,
    pub transitory: Option<ComponentSeries>,
    pub irregular: Option<ComponentSeries>,
    pub seasonally_adjusted: ComponentSeries,
}

/// Correction factors applied by a multiplicative decomposition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiasFactors {
    /// Geometric mean of the seasonal factors over whole cycles.
    pub seasonal: f64,
    /// Geometric mean of the irregular factors.
    pub irregular: f64,
}

/// Reconciles component estimates with the observed series.
#[derive(Clone, Copy, Debug)]
pub struct BiasCorrector {
    period: usize,
}

impl BiasCorrector {
    /// `period` is the length of one seasonal cycle.
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    /// Additive or multiplicative correction depending on `log`.
    pub fn correct(&self, estimates: &ComponentEstimates, log: bool) -> Levels {
        if log {
            self.multiplicative(estimates).0
        } else {
            self.additive(estimates)
        }
    }

    /// Additive models: components unchanged, `sa = y − s` and
    /// `irregular = sa − trend`.
    pub fn additive(&self, estimates: &ComponentEstimates) -> Levels {
        let series = estimates.series.clone();
        let trend = estimates.component(ComponentKind::Trend).cloned();
        let seasonal = estimates.component(ComponentKind::Seasonal).cloned();
        let transitory = estimates.component(ComponentKind::Transitory).cloned();

        let sa = match &seasonal {
            Some(s) => ComponentSeries {
                values: zip(&series.values, &s.values, |y, s| y - s),
                stdev: s.stdev.clone(),
                forecasts: zip(&series.forecasts, &s.forecasts, |y, s| y - s),
                forecast_stdev: zip(&series.forecast_stdev, &s.forecast_stdev, residual_sd),
            },
            None => series.clone(),
        };

        let irregular = self.has_irregular(estimates).then(|| {
            let (values, forecasts) = match &trend {
                Some(t) => (
                    zip(&sa.values, &t.values, |a, t| a - t),
                    zip(&sa.forecasts, &t.forecasts, |a, t| a - t),
                ),
                None => (sa.values.clone(), sa.forecasts.clone()),
            };
            let (stdev, forecast_stdev) = noise_stdev(estimates);
            ComponentSeries {
                values,
                stdev,
                forecasts,
                forecast_stdev,
            }
        });

        Levels {
            series,
            trend,
            seasonal,
            transitory,
            irregular,
            seasonally_adjusted: sa,
        }
    }

    /// Log models: exponentiates, removes the geometric-mean bias of the
    /// seasonal and irregular factors and moves it into the trend.
    pub fn multiplicative(&self, estimates: &ComponentEstimates) -> (Levels, BiasFactors) {
        let factors = BiasFactors {
            seasonal: estimates
                .component(ComponentKind::Seasonal)
                .map_or(1.0, |s| self.cycle_geometric_mean(&s.values)),
            irregular: estimates
                .component(ComponentKind::Irregular)
                .map_or(1.0, |i| geometric_mean(&i.values)),
        };
        debug!(seasonal = factors.seasonal, irregular = factors.irregular, "bias factors");

        let series = exp_series(&estimates.series, 1.0);
        let seasonal = estimates
            .component(ComponentKind::Seasonal)
            .map(|s| exp_series(s, 1.0 / factors.seasonal));
        let trend = estimates
            .component(ComponentKind::Trend)
            .map(|t| exp_series(t, factors.seasonal * factors.irregular));
        let transitory = estimates
            .component(ComponentKind::Transitory)
            .map(|c| exp_series(c, 1.0));

        let sa = match &seasonal {
            Some(s) => {
                let values = zip(&series.values, &s.values, |y, s| y / s);
                let forecasts = zip(&series.forecasts, &s.forecasts, |y, s| y / s);
                let (sd, fsd) = estimates
                    .component(ComponentKind::Seasonal)
                    .map_or((Vec::new(), Vec::new()), |c| {
                        let fsd =
                            zip(&estimates.series.forecast_stdev, &c.forecast_stdev, residual_sd);
                        (c.stdev.clone(), fsd)
                    });
                ComponentSeries {
                    stdev: zip(&values, &sd, |v, s| v * s),
                    forecast_stdev: zip(&forecasts, &fsd, |v, s| v * s),
                    values,
                    forecasts,
                }
            }
            None => series.clone(),
        };

        let irregular = self.has_irregular(estimates).then(|| {
            let (values, forecasts) = match &trend {
                Some(t) => (
                    zip(&sa.values, &t.values, |a, t| a / t),
                    zip(&sa.forecasts, &t.forecasts, |a, t| a / t),
                ),
                None => (sa.values.clone(), sa.forecasts.clone()),
            };
            let (sd, fsd) = noise_stdev(estimates);
            ComponentSeries {
                stdev: zip(&values, &sd, |v, s| v * s),
                forecast_stdev: zip(&forecasts, &fsd, |v, s| v * s),
                values,
                forecasts,
            }
        });

        let levels = Levels {
            series,
            trend,
            seasonal,
            transitory,
            irregular,
            seasonally_adjusted: sa,
        };
        (levels, factors)
    }

    fn has_irregular(&self, estimates: &ComponentEstimates) -> bool {
        estimates.component(ComponentKind::Irregular).is_some()
            || estimates.component(ComponentKind::Transitory).is_some()
    }

    /// `exp` of the mean over the whole cycles at the start of `values`, or
    /// over all of them when the sample is shorter than a cycle.
    fn cycle_geometric_mean(&self, values: &[f64]) -> f64 {
        let whole = values.len() - values.len() % self.period;
        if whole == 0 {
            geometric_mean(values)
        } else {
            geometric_mean(&values[..whole])
        }
    }
}

/// `exp` of the arithmetic mean of log values.
fn geometric_mean(log_values: &[f64]) -> f64 {
    if log_values.is_empty() {
        return 1.0;
    }
    (log_values.iter().sum::<f64>() / log_values.len() as f64).exp()
}

/// Exponentiates a log series and multiplies it by `factor`; standard
/// errors follow the delta method.
fn exp_series(log: &ComponentSeries, factor: f64) -> ComponentSeries {
    let values: Vec<f64> = log.values.iter().map(|v| factor * v.exp()).collect();
    let forecasts: Vec<f64> = log.forecasts.iter().map(|v| factor * v.exp()).collect();
    ComponentSeries {
        stdev: zip(&values, &log.stdev, |v, s| v * s),
        forecast_stdev: zip(&forecasts, &log.forecast_stdev, |v, s| v * s),
        values,
        forecasts,
    }
}

/// Standard error of the part of a forecast that is not `part`, treating
/// the two forecast errors as uncorrelated.
fn residual_sd(total: f64, part: f64) -> f64 {
    (total * total - part * part).max(0.0).sqrt()
}

/// Standard errors of the final irregular: the irregular and transitory
/// estimates combined.
fn noise_stdev(estimates: &ComponentEstimates) -> (Vec<f64>, Vec<f64>) {
    let mut sd = vec![0.0; estimates.series.len()];
    let mut fsd = vec![0.0; estimates.series.horizon()];
    for kind in [ComponentKind::Irregular, ComponentKind::Transitory] {
        if let Some(c) = estimates.component(kind) {
            for (acc, s) in sd.iter_mut().zip(&c.stdev) {
                *acc += s * s;
            }
            for (acc, s) in fsd.iter_mut().zip(&c.forecast_stdev) {
                *acc += s * s;
            }
        }
    }
    sd.iter_mut().chain(fsd.iter_mut()).for_each(|v| *v = v.sqrt());
    (sd, fsd)
}

fn zip(a: &[f64], b: &[f64], f: impl Fn(f64, f64) -> f64) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| f(*x, *y)).collect()
}
