//! Thresholds for validation, root selection and decomposition.

use crate::error::UcmError;

/// Configuration of the [`ModelValidator`](crate::ModelValidator).
///
/// # Example
///
/// ```
/// use sadj_ucm::ValidatorConfig;
///
/// let config = ValidatorConfig::new().with_xl(0.98);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValidatorConfig {
    xl: f64,
    epsilon: f64,
}

impl ValidatorConfig {
    /// Defaults: `xl = 0.95`, `epsilon = 1e-4`.
    pub fn new() -> Self {
        Self {
            xl: 0.95,
            epsilon: 1e-4,
        }
    }

    /// Sets the MA boundary: inverse MA roots larger than `xl` are clamped.
    pub fn with_xl(mut self, xl: f64) -> Self {
        self.xl = xl;
        self
    }

    /// Sets the distance under which an AR and an MA root cancel.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Returns the MA boundary.
    pub fn xl(&self) -> f64 {
        self.xl
    }

    /// Returns the cancellation distance.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Checks `xl ∈ [0.9, 1]` and `epsilon ≥ 0`.
    pub fn validate(&self) -> Result<(), UcmError> {
        if !(0.9..=1.0).contains(&self.xl) {
            return Err(UcmError::InvalidConfig {
                reason: format!("xl must be in [0.9, 1], got {}", self.xl),
            });
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(UcmError::InvalidConfig {
                reason: format!("epsilon must be finite and non-negative, got {}", self.epsilon),
            });
        }
        Ok(())
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Thresholds used to assign AR roots to components.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectorConfig {
    rmod: f64,
    epsphi: f64,
}

impl SelectorConfig {
    /// Defaults: `rmod = 0.5`, `epsphi = 2°`.
    pub fn new() -> Self {
        Self {
            rmod: 0.5,
            epsphi: 2.0,
        }
    }

    /// Sets the modulus above which a root is trend or seasonal.
    pub fn with_rmod(mut self, rmod: f64) -> Self {
        self.rmod = rmod;
        self
    }

    /// Sets the angular tolerance (degrees) around seasonal frequencies.
    pub fn with_epsphi(mut self, epsphi: f64) -> Self {
        self.epsphi = epsphi;
        self
    }

    /// Returns the modulus threshold.
    pub fn rmod(&self) -> f64 {
        self.rmod
    }

    /// Returns the angular tolerance in degrees.
    pub fn epsphi(&self) -> f64 {
        self.epsphi
    }

    /// Checks `rmod ∈ [0, 1]` and `epsphi ∈ [0, 10]`.
    pub fn validate(&self) -> Result<(), UcmError> {
        if !(0.0..=1.0).contains(&self.rmod) {
            return Err(UcmError::InvalidConfig {
                reason: format!("rmod must be in [0, 1], got {}", self.rmod),
            });
        }
        if !(0.0..=10.0).contains(&self.epsphi) {
            return Err(UcmError::InvalidConfig {
                reason: format!("epsphi must be in [0, 10], got {}", self.epsphi),
            });
        }
        Ok(())
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration of the [`CanonicalDecomposer`](crate::CanonicalDecomposer).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecomposerConfig {
    selector: SelectorConfig,
    noisy: bool,
    grid_points: usize,
}

impl DecomposerConfig {
    /// Defaults: default selector, strict (non-noisy), 1440 grid points.
    pub fn new() -> Self {
        Self {
            selector: SelectorConfig::new(),
            noisy: false,
            grid_points: 1440,
        }
    }

    /// Sets the root selector thresholds.
    pub fn with_selector(mut self, selector: SelectorConfig) -> Self {
        self.selector = selector;
        self
    }

    /// Accepts models with a negative canonical noise by adding the deficit
    /// to the aggregate as white noise.
    pub fn with_noisy(mut self, noisy: bool) -> Self {
        self.noisy = noisy;
        self
    }

    /// Sets the number of grid intervals on `[0, π]` for minimum searches.
    pub fn with_grid_points(mut self, points: usize) -> Self {
        self.grid_points = points;
        self
    }

    /// Returns the selector thresholds.
    pub fn selector(&self) -> &SelectorConfig {
        &self.selector
    }

    /// Returns whether noisy decompositions are accepted.
    pub fn noisy(&self) -> bool {
        self.noisy
    }

    /// Returns the number of grid intervals.
    pub fn grid_points(&self) -> usize {
        self.grid_points
    }

    /// Validates the selector and requires at least 16 grid points.
    pub fn validate(&self) -> Result<(), UcmError> {
        self.selector.validate()?;
        if self.grid_points < 16 {
            return Err(UcmError::InvalidConfig {
                reason: format!("grid_points must be at least 16, got {}", self.grid_points),
            });
        }
        Ok(())
    }
}

impl Default for DecomposerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ValidatorConfig::new().validate().is_ok());
        assert!(SelectorConfig::new().validate().is_ok());
        assert!(DecomposerConfig::new().validate().is_ok());
        assert_eq!(DecomposerConfig::new().grid_points(), 1440);
    }

    #[test]
    fn xl_range() {
        assert!(ValidatorConfig::new().with_xl(1.0).validate().is_ok());
        assert!(ValidatorConfig::new().with_xl(0.85).validate().is_err());
        assert!(ValidatorConfig::new().with_xl(1.01).validate().is_err());
    }

    #[test]
    fn selector_ranges() {
        assert!(SelectorConfig::new().with_rmod(1.5).validate().is_err());
        assert!(SelectorConfig::new().with_epsphi(11.0).validate().is_err());
        assert!(SelectorConfig::new().with_epsphi(f64::NAN).validate().is_err());
        assert!(
            DecomposerConfig::new()
                .with_selector(SelectorConfig::new().with_rmod(-0.1))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn grid_minimum() {
        assert!(DecomposerConfig::new().with_grid_points(8).validate().is_err());
    }
}
