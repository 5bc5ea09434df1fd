//! # sadj-approx
//!
//! When a fitted seasonal ARIMA model has no canonical decomposition, this
//! crate searches for a nearby model that has one. The search is a small
//! state machine ([`ApproximationState`]) driven by a pure transition table
//! ([`TransitionTable`]); each candidate is re-estimated on the series
//! through an [`ArimaEstimator`](sadj_arima::ArimaEstimator).
//!
//! ## Workflow
//!
//! ```mermaid
//! graph LR
//!     A["model fails to decompose"] --> B["TransitionTable::transition"]
//!     B -->|"Move"| C["ArimaEstimator::estimate"]
//!     C -->|"Estimation"| D["attempt(model)"]
//!     D -->|"Err"| B
//!     D -->|"Ok"| E["Approximation"]
//!     B -->|"terminal / budget"| F["ApproxError::NonDecomposable"]
//! ```
//!
//! The search uses at most ten rounds.

mod boundary;
mod config;
mod engine;
mod error;
mod state;
mod table;

pub use boundary::seasonal_ma_boundary;
pub use config::{ApproximationConfig, ApproximationMode, MAX_ROUNDS};
pub use engine::{ApproximationEngine, Approximation, Rejection};
pub use error::ApproxError;
pub use state::ApproximationState;
pub use table::{Move, TransitionTable};
