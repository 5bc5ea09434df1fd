//! # sadj-ucm
//!
//! Unobserved-components models for seasonal ARIMA processes: validation of
//! candidate models and their canonical decomposition into trend, seasonal,
//! transitory and irregular components.
//!
//! ## Workflow
//!
//! ```mermaid
//! graph LR
//!     A["SeasonalArimaModel"] -->|"ModelValidator::validate"| B["Validation"]
//!     B -->|"Valid / Changed"| C["CanonicalDecomposer::decompose"]
//!     C --> D["Decomposition { model, .. }"]
//!     D --> E["UnobservedComponentsModel"]
//! ```
//!
//! ## Root allocation
//!
//! | Inverse AR root `r` | Component |
//! |---------------------|-----------|
//! | `(1−B)` from differencing | trend |
//! | `1 + B + … + B^{s−1}` from seasonal differencing | seasonal |
//! | real, `r > 0`, `|r| ≥ rmod` | trend |
//! | argument within `epsphi` of `2πk/s`, `|r| ≥ rmod` | seasonal |
//! | anything else | transitory |

mod canonical;
mod component;
mod config;
mod error;
mod selector;
mod validator;

pub use canonical::{CanonicalDecomposer, Decomposition};
pub use component::{ComponentKind, UnobservedComponentsModel};
pub use config::{DecomposerConfig, SelectorConfig, ValidatorConfig};
pub use error::UcmError;
pub use selector::{RootAllocation, RootSelector};
pub use validator::{
    BoundaryPolicy, CommonFactorCancellation, ModelValidator, RootClamp, SimplificationPolicy,
    Validation,
};
