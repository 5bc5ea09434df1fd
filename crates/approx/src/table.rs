//! Transition tables of the approximation search.
//!
//! A table maps the previous state and the model that just failed to
//! decompose onto the next state and the starting point of the next
//! estimation. Every rule either lowers an order, removes the mean, or moves
//! to a fallback, so the search cannot cycle.

use sadj_arima::{Polynomial, SeasonalArimaModel, SeasonalArimaSpec};
use tracing::debug;

use crate::boundary::seasonal_ma_boundary;
use crate::error::ApproxError;
use crate::state::ApproximationState as S;

/// Modulus above which a dominant AR root is treated as a unit root.
const DOMINANT_ROOT: f64 = 0.5;
/// Largest regular MA order a candidate may reach.
const MAX_MA_ORDER: usize = 3;
/// Margin kept below the tabulated airline boundary.
const BOUNDARY_MARGIN: f64 = 0.01;

/// Which set of rules drives the search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TransitionTable {
    /// Order reductions followed by the airline fallback.
    #[default]
    Original,
    /// As [`TransitionTable::Original`], but monthly and quarterly airline
    /// models jump to the tabulated decomposability boundary.
    KnownAnswer,
}

/// The next candidate of the search.
#[derive(Clone, Debug, PartialEq)]
pub struct Move {
    /// State entered.
    pub state: S,
    /// Starting model for the re-estimation, already in the new specification.
    pub start: SeasonalArimaModel,
    /// Whether the mean is estimated.
    pub mean_correction: bool,
    /// Seasonal MA coefficient to hold fixed during estimation.
    pub fixed_seasonal_ma: Option<f64>,
}

impl TransitionTable {
    /// Next move after `model` failed to decompose in state `previous`.
    ///
    /// Returns `Ok(None)` when the terminal state is reached.
    pub fn transition(
        self,
        previous: S,
        model: &SeasonalArimaModel,
        mean_correction: bool,
    ) -> Result<Option<Move>, ApproxError> {
        if previous.is_terminal() {
            return Ok(None);
        }
        let spec = *model.spec();
        if self == TransitionTable::KnownAnswer && spec.is_airline() {
            if previous == S::K {
                return Ok(None);
            }
            let theta = model.theta()[0];
            if let Some(bound) = seasonal_ma_boundary(spec.period(), theta) {
                let fixed = bound - BOUNDARY_MARGIN;
                debug!(theta, fixed, "airline seasonal MA fixed at boundary");
                return Ok(Some(Move {
                    state: S::K,
                    start: model.with_btheta(vec![fixed])?,
                    mean_correction: false,
                    fixed_seasonal_ma: Some(fixed),
                }));
            }
        }
        original(previous, model, mean_correction)
    }
}

fn original(
    previous: S,
    model: &SeasonalArimaModel,
    mean_correction: bool,
) -> Result<Option<Move>, ApproxError> {
    let spec = *model.spec();
    let step = |state, spec: SeasonalArimaSpec, mean| Move {
        state,
        start: model.respecified(spec),
        mean_correction: mean,
        fixed_seasonal_ma: None,
    };

    if previous.is_fallback() && is_fallback_spec(&spec) {
        return Ok(None);
    }
    let (p, d, q) = (spec.p(), spec.d(), spec.q());
    let (bp, bd, bq) = (spec.bp(), spec.bd(), spec.bq());

    if bp > 0 && bq > 0 && bd == 0 {
        let modulus = Polynomial::monic(model.bphi()).max_inverse_root_modulus()?;
        if modulus > DOMINANT_ROOT {
            return Ok(Some(step(S::A, spec.with_seasonal(bp - 1, 1, bq), false)));
        }
    }
    if bp > 0 {
        return Ok(Some(step(S::D, spec.with_seasonal(bp - 1, bd, bq), mean_correction)));
    }
    if p > 0 {
        let roots = Polynomial::monic(model.phi()).inverse_roots()?;
        // dominant real root; complex pairs count as non-dominant
        let dominant = roots
            .iter()
            .enumerate()
            .filter(|(_, r)| r.im.abs() < 1e-8)
            .max_by(|(_, a), (_, b)| a.re.abs().total_cmp(&b.re.abs()))
            .map(|(i, r)| (i, r.re));
        let (drop_at, r) = dominant.unwrap_or((0, 0.0));
        let remaining: Vec<_> = roots
            .iter()
            .enumerate()
            .filter(|(i, _)| dominant.is_none() || *i != drop_at)
            .map(|(_, r)| *r)
            .collect();
        let mut phi = if dominant.is_some() {
            Polynomial::from_inverse_roots(&remaining).tail().to_vec()
        } else {
            model.phi()[..p - 1].to_vec()
        };
        phi.resize(p - 1, 0.0);

        let (state, next) = if r > DOMINANT_ROOT && d < 2 {
            (S::B, spec.with_regular(p - 1, d + 1, q))
        } else if q < MAX_MA_ORDER {
            (S::C, spec.with_regular(p - 1, d, q + 1))
        } else {
            return Ok(Some(fallback(model, &spec)));
        };
        debug!(dropped = r, %state, "regular AR root removed");
        let start = model.respecified(next);
        let start = SeasonalArimaModel::new(
            next,
            phi,
            start.bphi().to_vec(),
            start.theta().to_vec(),
            start.btheta().to_vec(),
            start.variance(),
        )?;
        return Ok(Some(Move {
            state,
            start,
            mean_correction,
            fixed_seasonal_ma: None,
        }));
    }
    if q > 1 {
        return Ok(Some(step(S::E, spec.with_regular(p, d, q - 1), mean_correction)));
    }
    if bq > 1 {
        return Ok(Some(step(S::F, spec.with_seasonal(bp, bd, 1), mean_correction)));
    }
    if mean_correction {
        return Ok(Some(step(S::G, spec, false)));
    }
    if !is_fallback_spec(&spec) {
        return Ok(Some(fallback(model, &spec)));
    }
    Ok(None)
}

/// `(0,1,1)(0,1,1)ₛ`, or `(0,1,1)` for non-seasonal series.
fn fallback_spec(spec: &SeasonalArimaSpec) -> SeasonalArimaSpec {
    spec.with_regular(0, 1, 1).with_seasonal(0, 1, 1)
}

fn is_fallback_spec(spec: &SeasonalArimaSpec) -> bool {
    fallback_spec(spec) == *spec
}

fn fallback(model: &SeasonalArimaModel, spec: &SeasonalArimaSpec) -> Move {
    Move {
        state: S::H,
        start: model.respecified(fallback_spec(spec)),
        mean_correction: false,
        fixed_seasonal_ma: None,
    }
}
