//! States of the approximation search.

use std::fmt;

/// Where the search stands. Each state names the last change applied to the
/// model.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ApproximationState {
    /// The fitted model, before any change.
    #[default]
    Entry,
    /// Seasonal AR term replaced by seasonal differencing.
    A,
    /// Regular AR root absorbed into the differencing.
    B,
    /// Regular AR root traded for a regular MA term.
    C,
    /// Seasonal AR term dropped.
    D,
    /// Regular MA order reduced.
    E,
    /// Seasonal MA order reduced to one.
    F,
    /// Mean correction dropped.
    G,
    /// Airline fallback.
    H,
    /// Terminal: no further candidate.
    I,
    /// Airline with the seasonal MA fixed at its tabulated boundary.
    K,
}

impl ApproximationState {
    /// True for the absorbing state.
    pub fn is_terminal(self) -> bool {
        self == ApproximationState::I
    }

    /// True for the states that produce an airline model.
    pub fn is_fallback(self) -> bool {
        matches!(self, ApproximationState::H | ApproximationState::K)
    }
}

impl fmt::Display for ApproximationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ApproximationState::Entry => "entry",
            ApproximationState::A => "A",
            ApproximationState::B => "B",
            ApproximationState::C => "C",
            ApproximationState::D => "D",
            ApproximationState::E => "E",
            ApproximationState::F => "F",
            ApproximationState::G => "G",
            ApproximationState::H => "H",
            ApproximationState::I => "I",
            ApproximationState::K => "K",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels() {
        assert_eq!(ApproximationState::default().to_string(), "entry");
        assert_eq!(ApproximationState::K.to_string(), "K");
        assert!(ApproximationState::I.is_terminal());
        assert!(ApproximationState::H.is_fallback());
        assert!(!ApproximationState::G.is_fallback());
    }
}
