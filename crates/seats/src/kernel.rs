//! The decomposition kernel: validate, decompose, approximate when needed,
//! extract and correct.

use sadj_approx::{ApproxError, ApproximationEngine};
use sadj_arima::{
    ArimaEstimator, MaximumLikelihood, SeasonalArimaModel, SeasonalArimaSpec, mean_effect,
};
use sadj_extract::{ComponentEstimates, ComponentSeries, EstimationMethod, ExtractError};
use sadj_ucm::{
    CanonicalDecomposer, ComponentKind, Decomposition, ModelValidator, UnobservedComponentsModel,
    Validation,
};
use tracing::{debug, info, instrument, warn};

use crate::bias::BiasCorrector;
use crate::config::SeatsConfig;
use crate::error::SeatsError;
use crate::result::{ApproximationOutcome, DecompositionResult, Flags};
use crate::warning::Warning;
use crate::working::WorkingModel;

/// A model accepted by validation.
struct Validated {
    model: SeasonalArimaModel,
    cut_off: bool,
    replaced: bool,
}

/// Runs decompositions with one configuration and one estimator.
///
/// The estimator is only used when the fitted model does not decompose and
/// the approximation search needs to re-estimate candidates.
#[derive(Clone, Debug)]
pub struct Seats<E = MaximumLikelihood> {
    config: SeatsConfig,
    estimator: E,
}

impl Seats<MaximumLikelihood> {
    /// Kernel with the built-in maximum-likelihood estimator.
    pub fn new(config: SeatsConfig) -> Self {
        Self {
            config,
            estimator: MaximumLikelihood::new(),
        }
    }
}

impl Default for Seats<MaximumLikelihood> {
    fn default() -> Self {
        Self::new(SeatsConfig::default())
    }
}

impl<E: ArimaEstimator> Seats<E> {
    /// Replaces the estimator used by the approximation search.
    pub fn with_estimator<F: ArimaEstimator>(self, estimator: F) -> Seats<F> {
        Seats {
            config: self.config,
            estimator,
        }
    }

    /// The configuration in use.
    pub fn config(&self) -> &SeatsConfig {
        &self.config
    }

    /// Decomposes `series` under the fitted `model`.
    ///
    /// # Errors
    ///
    /// - [`SeatsError::InvalidModel`] when validation cannot stabilise the
    ///   model or an approximation.
    /// - [`SeatsError::NonDecomposable`] when neither the model nor any
    ///   approximation has a canonical decomposition.
    /// - Input and configuration errors.
    #[instrument(
        skip_all,
        fields(spec = %model.spec(), n = series.len(), method = %self.config.method())
    )]
    pub fn decompose(
        &self,
        series: &[f64],
        model: &SeasonalArimaModel,
    ) -> Result<DecompositionResult, SeatsError> {
        let config = &self.config;
        config.validate()?;
        check_series(series, model.spec(), config.log())?;
        let transformed: Vec<f64> = if config.log() {
            series.iter().map(|v| v.ln()).collect()
        } else {
            series.to_vec()
        };

        let validator = ModelValidator::new(*config.validator());
        let decomposer = CanonicalDecomposer::new(config.decomposer());
        let mut warnings = Vec::new();
        let mut flags = Flags::default();

        let validated = match validate(&validator, model) {
            Ok(v) => v,
            Err(reason) => return Err(SeatsError::InvalidModel { reason }),
        };
        if validated.replaced {
            warn_validation(model, &validated, &mut warnings);
        }
        flags.cut_off = validated.cut_off;
        let mut working =
            WorkingModel::new(&transformed, validated.model, config.mean_correction());
        let mut approximation = None;

        let decomposition = match decomposer.decompose(working.model()) {
            Ok(d) => d,
            Err(e) if e.is_decomposition_failure() => {
                warn!(error = %e, "fitted model does not decompose");
                let engine = ApproximationEngine::new(*config.approximation());
                let outcome = engine.run(
                    &transformed,
                    working.model(),
                    working.mean_correction(),
                    &self.estimator,
                    |candidate, _| -> Result<(Validated, Decomposition), String> {
                        let v = validate(&validator, candidate)?;
                        let d = decomposer.decompose(&v.model).map_err(|e| e.to_string())?;
                        Ok((v, d))
                    },
                );
                match outcome {
                    Ok(found) => {
                        warnings.extend(found.rejected.into_iter().map(Warning::CandidateRejected));
                        let (accepted, d) = found.value;
                        let spec = *accepted.model.spec();
                        warnings.push(Warning::Approximated {
                            state: found.state,
                            spec,
                            rounds: found.rounds,
                        });
                        if accepted.replaced {
                            warn_validation(&found.estimation.model, &accepted, &mut warnings);
                        }
                        flags.cut_off |= accepted.cut_off;
                        flags.changed = true;
                        approximation = Some(ApproximationOutcome {
                            state: found.state,
                            rounds: found.rounds,
                        });
                        working = if accepted.replaced {
                            WorkingModel::new(&transformed, accepted.model, found.mean_correction)
                        } else {
                            WorkingModel::estimated(
                                &transformed,
                                found.estimation,
                                found.mean_correction,
                            )
                        };
                        d
                    }
                    Err(ApproxError::NonDecomposable {
                        spec,
                        rounds,
                        rejected,
                    }) => {
                        warnings.extend(rejected.into_iter().map(Warning::CandidateRejected));
                        return Err(SeatsError::NonDecomposable {
                            spec,
                            rounds,
                            warnings,
                        });
                    }
                    Err(other) => return Err(other.into()),
                }
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(variance) = decomposition.clamped_noise {
            warnings.push(Warning::NoiseClamped { variance });
        }
        if let Some(deficit) = decomposition.noise_deficit {
            warnings.push(Warning::NoisyModel { deficit });
            flags.changed = true;
        }
        let components = decomposition.model;
        flags.seasonality_present = components.has(ComponentKind::Seasonal);

        let n = series.len();
        let period = working.model().spec().period();
        let horizon = config.horizon().periods(period);
        let effect = if working.mean_correction() {
            mean_effect(&working.model().differencing(), working.mean(), n + horizon)
        } else {
            Vec::new()
        };
        let adjusted: Vec<f64> = if effect.is_empty() {
            transformed.clone()
        } else {
            transformed.iter().zip(&effect).map(|(y, m)| y - m).collect()
        };

        let ser = working.ser()?;
        let (mut estimates, method) =
            self.extract(&adjusted, &components, horizon, ser, &mut warnings)?;
        if !effect.is_empty() {
            restore_mean(&mut estimates, &effect, n);
        }
        let levels = BiasCorrector::new(period).correct(&estimates, config.log());

        info!(
            spec = %working.model().spec(),
            ser,
            changed = flags.changed,
            warnings = warnings.len(),
            "decomposition complete"
        );
        Ok(DecompositionResult {
            model: working.model().clone(),
            components,
            mean_correction: working.mean_correction(),
            mean: working.mean(),
            ser,
            method,
            log: config.log(),
            approximation,
            flags,
            warnings,
            levels,
        })
    }

    /// Runs the configured estimator, falling back to the Kalman smoother
    /// when the Wiener-Kolmogorov filter cannot invert the aggregate MA.
    fn extract(
        &self,
        series: &[f64],
        model: &UnobservedComponentsModel,
        horizon: usize,
        ser: f64,
        warnings: &mut Vec<Warning>,
    ) -> Result<(ComponentEstimates, EstimationMethod), SeatsError> {
        let requested = self.config.method();
        match requested.estimator().estimate(series, model, horizon, ser) {
            Ok(est) => Ok((est, requested)),
            Err(e @ ExtractError::NonInvertible { .. }) => {
                let used = EstimationMethod::Smoother;
                warn!(error = %e, %requested, %used, "falling back to another estimator");
                warnings.push(Warning::EstimatorFallback {
                    requested,
                    used,
                    reason: e.to_string(),
                });
                let est = used.estimator().estimate(series, model, horizon, ser)?;
                Ok((est, used))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Decomposes `series` with the built-in estimator.
///
/// Shorthand for `Seats::new(config).decompose(series, model)`.
pub fn decompose(
    series: &[f64],
    model: &SeasonalArimaModel,
    config: &SeatsConfig,
) -> Result<DecompositionResult, SeatsError> {
    Seats::new(*config).decompose(series, model)
}

fn check_series(series: &[f64], spec: &SeasonalArimaSpec, log: bool) -> Result<(), SeatsError> {
    if series.is_empty() {
        return Err(SeatsError::EmptySeries);
    }
    if series.iter().any(|v| !v.is_finite()) {
        return Err(SeatsError::NonFiniteSeries);
    }
    if log && series.iter().any(|v| *v <= 0.0) {
        return Err(SeatsError::NonPositiveSeries);
    }
    let min = spec.differencing_degree() + 2;
    if series.len() < min {
        return Err(SeatsError::InsufficientData {
            n: series.len(),
            min,
        });
    }
    Ok(())
}

fn validate(validator: &ModelValidator, model: &SeasonalArimaModel) -> Result<Validated, String> {
    match validator.validate(model) {
        Validation::Valid => Ok(Validated {
            model: model.clone(),
            cut_off: false,
            replaced: false,
        }),
        Validation::Changed {
            model, cut_off, ..
        } => Ok(Validated {
            model,
            cut_off,
            replaced: true,
        }),
        Validation::Invalid { reason } => Err(reason),
    }
}

fn warn_validation(original: &SeasonalArimaModel, v: &Validated, warnings: &mut Vec<Warning>) {
    let (from, to) = (*original.spec(), *v.model.spec());
    if from != to {
        warnings.push(Warning::ModelSimplified { from, to });
    }
    if v.cut_off {
        warnings.push(Warning::ModelCutOff { spec: to });
    }
    debug!(%from, %to, cut_off = v.cut_off, "model changed by validation");
}

/// Adds the deterministic mean path back to the series and the trend.
fn restore_mean(estimates: &mut ComponentEstimates, effect: &[f64], n: usize) {
    let (inside, ahead) = effect.split_at(n);
    let add = |s: &mut ComponentSeries| {
        s.values.iter_mut().zip(inside).for_each(|(v, m)| *v += m);
        s.forecasts.iter_mut().zip(ahead).for_each(|(v, m)| *v += m);
    };
    add(&mut estimates.series);
    match estimates.component_mut(ComponentKind::Trend) {
        Some(trend) => add(trend),
        None => estimates.set_component(
            ComponentKind::Trend,
            ComponentSeries {
                values: inside.to_vec(),
                stdev: vec![0.0; n],
                forecasts: ahead.to_vec(),
                forecast_stdev: vec![0.0; ahead.len()],
            },
        ),
    }
}
