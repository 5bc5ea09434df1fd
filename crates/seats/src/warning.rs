//! Non-fatal conditions recorded during a decomposition.

use std::fmt;

use sadj_approx::{ApproximationState, Rejection};
use sadj_arima::SeasonalArimaSpec;
use sadj_extract::EstimationMethod;

/// Something the caller should know about, but that did not stop the run.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    /// MA roots beyond the boundary were clamped.
    ModelCutOff {
        /// Specification of the clamped model.
        spec: SeasonalArimaSpec,
    },
    /// Common AR/MA factors were cancelled, lowering the orders.
    ModelSimplified {
        /// Specification before simplification.
        from: SeasonalArimaSpec,
        /// Specification after simplification.
        to: SeasonalArimaSpec,
    },
    /// A canonical noise variance within rounding of zero was set to zero.
    NoiseClamped {
        /// The clamped value.
        variance: f64,
    },
    /// A negative canonical noise was absorbed by adding white noise to the
    /// aggregate model.
    NoisyModel {
        /// Variance added.
        deficit: f64,
    },
    /// An approximation candidate was rejected.
    CandidateRejected(Rejection),
    /// The fitted model was replaced by an approximation.
    Approximated {
        /// State that produced the accepted model.
        state: ApproximationState,
        /// Accepted specification.
        spec: SeasonalArimaSpec,
        /// Rounds used.
        rounds: usize,
    },
    /// The requested estimator could not handle the model and another one
    /// was used.
    EstimatorFallback {
        /// Requested method.
        requested: EstimationMethod,
        /// Method used instead.
        used: EstimationMethod,
        /// Why the requested method failed.
        reason: String,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ModelCutOff { spec } => {
                write!(f, "MA roots of {spec} clamped to the boundary")
            }
            Warning::ModelSimplified { from, to } => {
                write!(f, "common factors cancelled: {from} -> {to}")
            }
            Warning::NoiseClamped { variance } => {
                write!(f, "noise variance {variance:.3e} set to zero")
            }
            Warning::NoisyModel { deficit } => {
                write!(f, "white noise of variance {deficit:.6} added to the model")
            }
            Warning::CandidateRejected(r) => write!(f, "approximation candidate rejected: {r}"),
            Warning::Approximated { state, spec, rounds } => {
                write!(f, "model approximated by {spec} (state {state}, {rounds} rounds)")
            }
            Warning::EstimatorFallback {
                requested,
                used,
                reason,
            } => write!(f, "{requested} estimator failed ({reason}), used {used}"),
        }
    }
}
