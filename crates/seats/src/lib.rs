//! # sadj-seats
//!
//! Model-based seasonal adjustment: decomposes a series into trend,
//! seasonal, transitory and irregular components given a fitted seasonal
//! ARIMA model.
//!
//! ## Workflow
//!
//! ```mermaid
//! graph LR
//!     A["series + SeasonalArimaModel"] --> B["ModelValidator"]
//!     B --> C["CanonicalDecomposer"]
//!     C -->|"fails"| D["ApproximationEngine"]
//!     D -->|"candidate"| B
//!     C -->|"UnobservedComponentsModel"| E["ComponentEstimator"]
//!     E --> F["BiasCorrector"]
//!     F --> G["DecompositionResult"]
//! ```
//!
//! ## Example
//!
//! ```
//! use sadj_arima::SeasonalArimaModel;
//! use sadj_seats::{Horizon, SeatsConfig, SeriesName, decompose};
//!
//! let y: Vec<f64> = (0..72)
//!     .map(|t| {
//!         let season = (2.0 * std::f64::consts::PI * t as f64 / 12.0).sin();
//!         100.0 + 0.5 * t as f64 + 5.0 * season + ((t * 7919) % 13) as f64 * 0.1
//!     })
//!     .collect();
//! let model = SeasonalArimaModel::airline(12, -0.4, -0.5, 1.0).unwrap();
//! let config = SeatsConfig::new().with_horizon(Horizon::Count(12));
//! let result = decompose(&y, &model, &config).unwrap();
//!
//! assert!(result.flags.seasonality_present);
//! assert_eq!(result.get("sa_forecast").unwrap().len(), 12);
//! let sa = result.series(SeriesName::SeasonallyAdjusted).unwrap();
//! assert_eq!(sa.len(), y.len());
//! ```

mod bias;
mod config;
mod error;
mod kernel;
mod result;
mod warning;
mod working;

pub use bias::{BiasCorrector, BiasFactors, Levels};
pub use config::{Horizon, SeatsConfig};
pub use error::SeatsError;
pub use kernel::{Seats, decompose};
pub use result::{ApproximationOutcome, DecompositionResult, Flags, SeriesName};
pub use warning::Warning;
pub use working::WorkingModel;

pub use sadj_approx::{ApproximationConfig, ApproximationMode, ApproximationState, TransitionTable};
pub use sadj_extract::{ComponentSeries, EstimationMethod};
pub use sadj_ucm::{ComponentKind, SelectorConfig, ValidatorConfig};
