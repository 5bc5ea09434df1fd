//! Configuration of a SEATS decomposition.

use sadj_approx::{ApproxError, ApproximationConfig, ApproximationMode};
use sadj_extract::EstimationMethod;
use sadj_ucm::{DecomposerConfig, SelectorConfig, UcmError, ValidatorConfig};

use crate::error::SeatsError;

/// How many periods to forecast.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Horizon {
    /// An explicit number of periods.
    Count(usize),
    /// Whole years at the series frequency.
    Years(usize),
}

impl Horizon {
    /// Number of periods for a series with `period` observations a year.
    pub fn periods(self, period: usize) -> usize {
        match self {
            Horizon::Count(n) => n,
            Horizon::Years(y) => y * period.max(1),
        }
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Horizon::Years(1)
    }
}

/// Everything a decomposition run needs besides the series and the model.
///
/// # Example
///
/// ```
/// use sadj_seats::{ApproximationMode, EstimationMethod, Horizon, SeatsConfig};
///
/// let config = SeatsConfig::new()
///     .with_method(EstimationMethod::Smoother)
///     .with_horizon(Horizon::Count(6))
///     .with_log(true);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.approximation().mode(), ApproximationMode::Legacy);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeatsConfig {
    validator: ValidatorConfig,
    selector: SelectorConfig,
    approximation: ApproximationConfig,
    method: EstimationMethod,
    horizon: Horizon,
    log: bool,
    mean_correction: bool,
}

impl SeatsConfig {
    /// Defaults of every part, Wiener-Kolmogorov estimation, one year of
    /// forecasts, additive, no mean correction.
    pub fn new() -> Self {
        Self {
            validator: ValidatorConfig::new(),
            selector: SelectorConfig::new(),
            approximation: ApproximationConfig::new(),
            method: EstimationMethod::WienerKolmogorov,
            horizon: Horizon::default(),
            log: false,
            mean_correction: false,
        }
    }

    pub fn with_validator(mut self, validator: ValidatorConfig) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_selector(mut self, selector: SelectorConfig) -> Self {
        self.selector = selector;
        self
    }

    pub fn with_approximation(mut self, approximation: ApproximationConfig) -> Self {
        self.approximation = approximation;
        self
    }

    /// Shortcut for changing only the approximation mode.
    pub fn with_approximation_mode(mut self, mode: ApproximationMode) -> Self {
        self.approximation = self.approximation.with_mode(mode);
        self
    }

    /// Shortcut for choosing exact maximum likelihood or conditional sum of
    /// squares when candidates are re-estimated.
    pub fn with_exact_likelihood(mut self, exact: bool) -> Self {
        self.approximation = self.approximation.with_exact_likelihood(exact);
        self
    }

    pub fn with_method(mut self, method: EstimationMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_horizon(mut self, horizon: Horizon) -> Self {
        self.horizon = horizon;
        self
    }

    /// Decomposes the log of the series and maps the result back to levels.
    pub fn with_log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    /// Estimates a mean in the differenced series.
    pub fn with_mean_correction(mut self, on: bool) -> Self {
        self.mean_correction = on;
        self
    }

    pub fn validator(&self) -> &ValidatorConfig {
        &self.validator
    }

    pub fn selector(&self) -> &SelectorConfig {
        &self.selector
    }

    pub fn approximation(&self) -> &ApproximationConfig {
        &self.approximation
    }

    pub fn method(&self) -> EstimationMethod {
        self.method
    }

    pub fn horizon(&self) -> Horizon {
        self.horizon
    }

    pub fn log(&self) -> bool {
        self.log
    }

    pub fn mean_correction(&self) -> bool {
        self.mean_correction
    }

    /// Decomposer settings implied by the selector and the approximation
    /// mode.
    pub fn decomposer(&self) -> DecomposerConfig {
        DecomposerConfig::new()
            .with_selector(self.selector)
            .with_noisy(self.approximation.mode() == ApproximationMode::Noisy)
    }

    /// Validates every part.
    pub fn validate(&self) -> Result<(), SeatsError> {
        self.validator.validate().map_err(ucm_reason)?;
        self.decomposer().validate().map_err(ucm_reason)?;
        self.approximation.validate().map_err(|e| match e {
            ApproxError::InvalidConfig { reason } => SeatsError::InvalidConfig { reason },
            other => SeatsError::from(other),
        })
    }
}

fn ucm_reason(e: UcmError) -> SeatsError {
    match e {
        UcmError::InvalidConfig { reason } => SeatsError::InvalidConfig { reason },
        other => SeatsError::from(other),
    }
}

impl Default for SeatsConfig {
    fn default() -> Self {
        Self::new()
    }
}
