//! Configuration of the approximation search.

use crate::error::ApproxError;
use crate::table::TransitionTable;

/// Largest admissible round budget.
pub const MAX_ROUNDS: usize = 10;

/// What to do when the fitted model does not decompose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ApproximationMode {
    /// Fail immediately.
    None,
    /// Search for a nearby decomposable model.
    #[default]
    Legacy,
    /// As `Legacy`, and accept a negative canonical noise by adding the
    /// deficit to the aggregate model.
    Noisy,
}

/// Configuration of the [`ApproximationEngine`](crate::ApproximationEngine).
///
/// # Example
///
/// ```
/// use sadj_approx::{ApproximationConfig, ApproximationMode, TransitionTable};
///
/// let config = ApproximationConfig::new()
///     .with_mode(ApproximationMode::Noisy)
///     .with_table(TransitionTable::KnownAnswer);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApproximationConfig {
    mode: ApproximationMode,
    table: TransitionTable,
    max_rounds: usize,
    exact_likelihood: bool,
}

impl ApproximationConfig {
    /// Defaults: `Legacy` mode, the `Original` table, 10 rounds, exact
    /// maximum likelihood.
    pub fn new() -> Self {
        Self {
            mode: ApproximationMode::Legacy,
            table: TransitionTable::Original,
            max_rounds: MAX_ROUNDS,
            exact_likelihood: true,
        }
    }

    /// Sets the mode.
    pub fn with_mode(mut self, mode: ApproximationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the transition table.
    pub fn with_table(mut self, table: TransitionTable) -> Self {
        self.table = table;
        self
    }

    /// Sets the round budget.
    pub fn with_max_rounds(mut self, rounds: usize) -> Self {
        self.max_rounds = rounds;
        self
    }

    /// Re-estimates candidates by exact maximum likelihood (`true`) or by
    /// conditional sum of squares.
    pub fn with_exact_likelihood(mut self, exact: bool) -> Self {
        self.exact_likelihood = exact;
        self
    }

    pub fn mode(&self) -> ApproximationMode {
        self.mode
    }

    pub fn table(&self) -> TransitionTable {
        self.table
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    pub fn exact_likelihood(&self) -> bool {
        self.exact_likelihood
    }

    /// Checks `max_rounds ∈ [1, 10]`.
    pub fn validate(&self) -> Result<(), ApproxError> {
        if !(1..=MAX_ROUNDS).contains(&self.max_rounds) {
            return Err(ApproxError::InvalidConfig {
                reason: format!(
                    "max_rounds must be in [1, {MAX_ROUNDS}], got {}",
                    self.max_rounds
                ),
            });
        }
        Ok(())
    }
}

impl Default for ApproximationConfig {
    fn default() -> Self {
        Self::new()
    }
}
