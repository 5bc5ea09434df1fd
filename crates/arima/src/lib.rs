//! # sadj-arima
//!
//! Seasonal ARIMA models and the numerical machinery shared by the
//! decomposition crates: polynomial algebra in the backshift operator,
//! spectral factorisation, autocovariances, state-space filtering and
//! maximum-likelihood estimation.
//!
//! ## Workflow
//!
//! ```mermaid
//! graph LR
//!     A["SeasonalArimaSpec::new(..)"] -->|"EstimationRequest"| B["MaximumLikelihood::estimate"]
//!     B --> C["Estimation { model, ser, mean }"]
//!     C -->|".model.process()"| D["ArimaProcess"]
//!     D -->|".state_space()"| E["StateSpace"]
//!     E --> F["kalman::smooth / forecast / backcast"]
//! ```
//!
//! ## Conventions
//!
//! | Symbol | Meaning |
//! |--------|---------|
//! | `φ(B) = 1 + φ₁B + …` | regular AR operator |
//! | `Φ(Bˢ)` | seasonal AR operator |
//! | `θ(B)`, `Θ(Bˢ)` | regular and seasonal MA operators |
//! | `δ(B) = (1−B)ᵈ(1−Bˢ)ᴰ` | differencing operator |
//! | `g(ω)` | pseudo-spectrum, evaluated at `z = e^{−iω}` |
//!
//! Inverse roots are the reciprocals of polynomial roots; a stationary or
//! invertible operator has all inverse roots strictly inside the unit
//! circle.

mod acf;
mod error;
mod estimation;
mod model;
mod polynomial;
mod process;
mod spec;
mod state_space;
mod symmetric;

pub mod kalman;

pub(crate) mod params;
pub(crate) mod roots;

pub use acf::{autocovariances, psi_weights};
pub use error::ArimaError;
pub use estimation::{
    ArimaEstimator, Estimation, EstimationRequest, MaximumLikelihood, difference, mean_effect,
};
pub use model::SeasonalArimaModel;
pub use polynomial::Polynomial;
pub use process::ArimaProcess;
pub use spec::SeasonalArimaSpec;
pub use state_space::StateSpace;
pub use symmetric::SymmetricPolynomial;
