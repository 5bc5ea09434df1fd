//! # sadj-extract
//!
//! Estimates the components of an observed series given its decomposed
//! unobserved-components model. Three interchangeable estimators implement
//! [`ComponentEstimator`]:
//!
//! | Method | Type | Notes |
//! |--------|------|-------|
//! | `wk` | [`WienerKolmogorov`] | symmetric filters on the extended series; needs an invertible aggregate MA |
//! | `smoother` | [`KalmanSmoother`] | composite state space, any model |
//! | `matrix` | [`ExactMatrix`] | dense exact solution, cubic in the sample size |
//!
//! All three return the same in-sample estimates up to numerical error. Component
//! forecasts and their standard errors always come from the state-space
//! form. Standard errors are scaled by the `ser` passed in, since models
//! are decomposed at unit innovation variance.

mod common;
mod error;
mod estimates;
mod estimator;
mod matrix;
mod smoother;
mod wk;

pub use error::ExtractError;
pub use estimates::{ComponentEstimates, ComponentSeries};
pub use estimator::{ComponentEstimator, EstimationMethod};
pub use matrix::ExactMatrix;
pub use smoother::KalmanSmoother;
pub use wk::WienerKolmogorov;
