//! The outcome of a decomposition run.

use std::fmt;

use sadj_approx::ApproximationState;
use sadj_arima::SeasonalArimaModel;
use sadj_extract::{ComponentSeries, EstimationMethod};
use sadj_ucm::UnobservedComponentsModel;

use crate::bias::Levels;
use crate::warning::Warning;

/// Named output series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeriesName {
    Series,
    Trend,
    Seasonal,
    Transitory,
    Irregular,
    SeasonallyAdjusted,
}

impl SeriesName {
    pub const ALL: [SeriesName; 6] = [
        SeriesName::Series,
        SeriesName::Trend,
        SeriesName::Seasonal,
        SeriesName::Transitory,
        SeriesName::Irregular,
        SeriesName::SeasonallyAdjusted,
    ];

    /// Short name used as a key prefix and CSV column.
    pub fn as_str(self) -> &'static str {
        match self {
            SeriesName::Series => "series",
            SeriesName::Trend => "trend",
            SeriesName::Seasonal => "seasonal",
            SeriesName::Transitory => "transitory",
            SeriesName::Irregular => "irregular",
            SeriesName::SeasonallyAdjusted => "sa",
        }
    }
}

impl fmt::Display for SeriesName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic flags of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Flags {
    /// MA roots were clamped at validation.
    pub cut_off: bool,
    /// The decomposed model is not the fitted one (approximation or noisy
    /// aggregate).
    pub changed: bool,
    /// The decomposition has a seasonal component.
    pub seasonality_present: bool,
}

/// How the approximation search ended, when it ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApproximationOutcome {
    pub state: ApproximationState,
    pub rounds: usize,
}

/// Everything a decomposition run produces.
#[derive(Clone, Debug)]
pub struct DecompositionResult {
    /// The ARIMA model that was decomposed.
    pub model: SeasonalArimaModel,
    /// Its canonical decomposition, at unit innovation variance.
    pub components: UnobservedComponentsModel,
    pub mean_correction: bool,
    /// Mean of the differenced (log) series.
    pub mean: f64,
    /// Residual standard error of `model`.
    pub ser: f64,
    pub method: EstimationMethod,
    pub log: bool,
    pub approximation: Option<ApproximationOutcome>,
    pub flags: Flags,
    pub warnings: Vec<Warning>,
    pub levels: Levels,
}

impl DecompositionResult {
    /// One output series, `None` when the decomposition lacks it.
    pub fn series(&self, name: SeriesName) -> Option<&ComponentSeries> {
        let l = &self.levels;
        match name {
            SeriesName::Series => Some(&l.series),
            SeriesName::Trend => l.trend.as_ref(),
            SeriesName::Seasonal => l.seasonal.as_ref(),
            SeriesName::Transitory => l.transitory.as_ref(),
            SeriesName::Irregular => l.irregular.as_ref(),
            SeriesName::SeasonallyAdjusted => Some(&l.seasonally_adjusted),
        }
    }

    /// Looks a series up by key: `trend`, `trend_forecast`, `trend_stdev`,
    /// `trend_stdevforecast` and likewise for the other names.
    pub fn get(&self, key: &str) -> Option<&[f64]> {
        let (base, suffix) = match key.split_once('_') {
            Some((b, s)) => (b, s),
            None => (key, ""),
        };
        let name = SeriesName::ALL.into_iter().find(|n| n.as_str() == base)?;
        let s = self.series(name)?;
        match suffix {
            "" => Some(&s.values),
            "forecast" => Some(&s.forecasts),
            "stdev" => Some(&s.stdev),
            "stdevforecast" => Some(&s.forecast_stdev),
            _ => None,
        }
    }

    /// Keys accepted by [`get`](Self::get) for this result.
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        for name in SeriesName::ALL {
            if self.series(name).is_some() {
                for suffix in ["", "_forecast", "_stdev", "_stdevforecast"] {
                    keys.push(format!("{name}{suffix}"));
                }
            }
        }
        keys
    }

    /// Looks a diagnostic flag up by its conventional name.
    pub fn flag(&self, key: &str) -> Option<bool> {
        match key {
            "cutOff" => Some(self.flags.cut_off),
            "changed" => Some(self.flags.changed),
            "seasonalityPresent" => Some(self.flags.seasonality_present),
            _ => None,
        }
    }

    /// Number of in-sample points.
    pub fn len(&self) -> usize {
        self.levels.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.series.is_empty()
    }

    /// Forecast horizon.
    pub fn horizon(&self) -> usize {
        self.levels.series.horizon()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sadj_arima::{ArimaProcess, SeasonalArimaSpec};

    fn result() -> DecompositionResult {
        let series = ComponentSeries {
            values: vec![1.0, 2.0],
            stdev: vec![0.0, 0.0],
            forecasts: vec![3.0],
            forecast_stdev: vec![0.5],
        };
        let trend = ComponentSeries {
            values: vec![0.9, 2.1],
            stdev: vec![0.1, 0.1],
            forecasts: vec![3.0],
            forecast_stdev: vec![0.4],
        };
        DecompositionResult {
            model: SeasonalArimaModel::zeroed(SeasonalArimaSpec::regular(0, 1, 1)),
            components: UnobservedComponentsModel::new(
                ArimaProcess::white_noise(1.0),
                Default::default(),
            ),
            mean_correction: false,
            mean: 0.0,
            ser: 1.0,
            method: EstimationMethod::Smoother,
            log: false,
            approximation: None,
            flags: Flags {
                cut_off: true,
                ..Flags::default()
            },
            warnings: Vec::new(),
            levels: Levels {
                seasonally_adjusted: series.clone(),
                series,
                trend: Some(trend),
                ..Levels::default()
            },
        }
    }

    #[test]
    fn lookup_by_key() {
        let r = result();
        assert_eq!(r.get("trend"), Some(&[0.9, 2.1][..]));
        assert_eq!(r.get("trend_stdevforecast"), Some(&[0.4][..]));
        assert_eq!(r.get("sa_forecast"), Some(&[3.0][..]));
        assert_eq!(r.get("seasonal"), None);
        assert_eq!(r.get("trend_bogus"), None);
        assert_eq!(r.keys().len(), 12);
        assert_eq!(r.flag("cutOff"), Some(true));
        assert_eq!((r.len(), r.horizon()), (2, 1));
    }
}
