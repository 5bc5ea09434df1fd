//! The bounded approximation search.

use std::fmt;

use sadj_arima::{
    ArimaEstimator, Estimation, EstimationRequest, SeasonalArimaModel, SeasonalArimaSpec,
};
use tracing::{debug, info, instrument, warn};

use crate::config::{ApproximationConfig, ApproximationMode};
use crate::error::ApproxError;
use crate::state::ApproximationState;

/// A candidate the search gave up on.
#[derive(Clone, Debug, PartialEq)]
pub struct Rejection {
    /// State that produced the candidate.
    pub state: ApproximationState,
    /// Its specification.
    pub spec: SeasonalArimaSpec,
    /// Why it was rejected.
    pub reason: String,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.state, self.spec, self.reason)
    }
}

/// A successful search.
#[derive(Clone, Debug)]
pub struct Approximation<T> {
    /// Whatever the attempt produced for the accepted model.
    pub value: T,
    /// The re-estimated model that was accepted.
    pub estimation: Estimation,
    /// Whether the accepted model estimates a mean.
    pub mean_correction: bool,
    /// State that produced the accepted model.
    pub state: ApproximationState,
    /// Rounds used, including the successful one.
    pub rounds: usize,
    /// Candidates rejected before the accepted one.
    pub rejected: Vec<Rejection>,
}

/// Searches for a decomposable model near a fitted one.
///
/// Each round takes one step of the transition table, re-estimates the new
/// specification on the series and hands the result to the caller's
/// attempt. A candidate whose estimation fails is skipped, and the table
/// continues from its specification.
#[derive(Clone, Copy, Debug, Default)]
pub struct ApproximationEngine {
    config: ApproximationConfig,
}

impl ApproximationEngine {
    /// Creates an engine.
    pub fn new(config: ApproximationConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &ApproximationConfig {
        &self.config
    }

    /// Runs the search from `model`, which just failed to decompose.
    ///
    /// `attempt` receives every re-estimated candidate together with its
    /// mean-correction flag; the first `Ok` ends the search.
    ///
    /// # Errors
    ///
    /// [`ApproxError::NonDecomposable`] when the mode is `None`, the table
    /// reaches its terminal state, or the round budget runs out.
    #[instrument(skip_all, fields(spec = %model.spec(), table = ?self.config.table()))]
    pub fn run<T, E, F, X>(
        &self,
        series: &[f64],
        model: &SeasonalArimaModel,
        mean_correction: bool,
        estimator: &E,
        mut attempt: F,
    ) -> Result<Approximation<T>, ApproxError>
    where
        E: ArimaEstimator + ?Sized,
        F: FnMut(&SeasonalArimaModel, bool) -> Result<T, X>,
        X: fmt::Display,
    {
        self.config.validate()?;
        let mut current = model.clone();
        let mut mean = mean_correction;
        let mut state = ApproximationState::Entry;
        let mut rounds = 0;
        let mut rejected = Vec::new();

        if self.config.mode() == ApproximationMode::None {
            return Err(ApproxError::NonDecomposable {
                spec: *current.spec(),
                rounds,
                rejected,
            });
        }

        while rounds < self.config.max_rounds() {
            let Some(step) = self.config.table().transition(state, &current, mean)? else {
                debug!(%state, "transition table exhausted");
                break;
            };
            rounds += 1;
            state = step.state;
            let spec = *step.start.spec();
            debug!(round = rounds, %state, %spec, mean = step.mean_correction, "trying candidate");

            let mut request = EstimationRequest::new(spec)
                .with_start(&step.start)
                .with_mean_correction(step.mean_correction)
                .with_exact(self.config.exact_likelihood());
            if let Some(value) = step.fixed_seasonal_ma {
                request = request.with_fixed_seasonal_ma(value);
            }
            mean = step.mean_correction;

            let estimation = match estimator.estimate(series, &request) {
                Ok(e) => e,
                Err(e) => {
                    warn!(%state, %spec, error = %e, "candidate estimation failed");
                    rejected.push(Rejection {
                        state,
                        spec,
                        reason: e.to_string(),
                    });
                    current = step.start;
                    continue;
                }
            };
            match attempt(&estimation.model, mean) {
                Ok(value) => {
                    info!(%state, %spec, rounds, "decomposable model found");
                    return Ok(Approximation {
                        value,
                        estimation,
                        mean_correction: mean,
                        state,
                        rounds,
                        rejected,
                    });
                }
                Err(e) => {
                    warn!(%state, %spec, reason = %e, "candidate does not decompose");
                    rejected.push(Rejection {
                        state,
                        spec,
                        reason: e.to_string(),
                    });
                    current = estimation.model;
                }
            }
        }

        Err(ApproxError::NonDecomposable {
            spec: *current.spec(),
            rounds,
            rejected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sadj_arima::ArimaError;
    use std::cell::RefCell;

    /// Returns the starting model unchanged.
    struct Echo;

    impl ArimaEstimator for Echo {
        fn estimate(
            &self,
            _series: &[f64],
            request: &EstimationRequest,
        ) -> Result<Estimation, ArimaError> {
            let model = SeasonalArimaModel::zeroed(*request.spec());
            Ok(Estimation {
                model,
                ser: 1.0,
                mean: 0.0,
                log_likelihood: 0.0,
                n_effective: 0,
            })
        }
    }

    struct Failing;

    impl ArimaEstimator for Failing {
        fn estimate(&self, _: &[f64], _: &EstimationRequest) -> Result<Estimation, ArimaError> {
            Err(ArimaError::OptimizationFailed)
        }
    }

    /// Records the likelihood flag of every request.
    #[derive(Default)]
    struct Recording {
        exact: RefCell<Vec<bool>>,
    }

    impl ArimaEstimator for Recording {
        fn estimate(
            &self,
            series: &[f64],
            request: &EstimationRequest,
        ) -> Result<Estimation, ArimaError> {
            self.exact.borrow_mut().push(request.exact());
            Echo.estimate(series, request)
        }
    }

    fn start() -> SeasonalArimaModel {
        SeasonalArimaModel::zeroed(SeasonalArimaSpec::new(1, 1, 2, 1, 1, 1, 12).unwrap())
    }

    #[test]
    fn mode_none_fails_immediately() {
        let engine =
            ApproximationEngine::new(ApproximationConfig::new().with_mode(ApproximationMode::None));
        let err = engine
            .run(&[], &start(), false, &Echo, |_, _| Ok::<(), String>(()))
            .unwrap_err();
        assert!(matches!(err, ApproxError::NonDecomposable { rounds: 0, .. }));
    }

    #[test]
    fn first_decomposable_candidate_wins() {
        let engine = ApproximationEngine::default();
        let out = engine
            .run(&[], &start(), true, &Echo, |m, _| {
                if m.spec().bp() == 0 {
                    Ok(*m.spec())
                } else {
                    Err("still seasonal AR")
                }
            })
            .unwrap();
        assert_eq!(out.rounds, 1);
        assert_eq!(out.state, ApproximationState::D);
        assert_eq!(out.value.bp(), 0);
        assert!(out.rejected.is_empty());
    }

    #[test]
    fn estimation_failures_are_skipped() {
        let engine = ApproximationEngine::default();
        let err = engine
            .run(&[], &start(), true, &Failing, |_, _| Ok::<(), String>(()))
            .unwrap_err();
        let ApproxError::NonDecomposable { rounds, rejected, spec } = err else {
            panic!("expected NonDecomposable");
        };
        assert!(rounds <= 10);
        assert_eq!(rejected.len(), rounds);
        assert!(spec.is_airline());
    }

    #[test]
    fn likelihood_choice_reaches_the_estimator() {
        for exact in [true, false] {
            let engine = ApproximationEngine::new(
                ApproximationConfig::new()
                    .with_exact_likelihood(exact)
                    .with_max_rounds(3),
            );
            let recording = Recording::default();
            let _ = engine.run(&[], &start(), true, &recording, |_, _| Err::<(), _>("never"));
            let seen = recording.exact.into_inner();
            assert!(!seen.is_empty() && seen.len() <= 3);
            assert!(seen.iter().all(|e| *e == exact));
        }
    }

    #[test]
    fn budget_is_respected() {
        let engine = ApproximationEngine::new(ApproximationConfig::new().with_max_rounds(2));
        let err = engine
            .run(&[], &start(), true, &Echo, |_, _| Err::<(), _>("never"))
            .unwrap_err();
        assert!(matches!(err, ApproxError::NonDecomposable { rounds: 2, .. }));
    }
}
