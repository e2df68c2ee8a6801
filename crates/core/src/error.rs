//! Error types for the engine's public API.
//!
//! Missing weather data is never an error: it flows through alignment, the
//! formula library and the persistence policy as NaN. The variants here are
//! hard failures of configuration or input shape, reported before any
//! computation starts.

use std::error::Error;
use std::fmt;

/// Configuration and input-validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FwiError {
    /// A wind-speed unit string was not one of the accepted spellings.
    InvalidWindUnit(String),
    /// A value plane does not match its time axis and cell count, or two
    /// input series disagree on cell count.
    ShapeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    /// A sample time axis is not strictly increasing.
    NonMonotonicTimes(&'static str),
    /// A per-cell initial state was supplied with the wrong length.
    InitialStateLength { cells: usize, provided: usize },
}

impl fmt::Display for FwiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FwiError::InvalidWindUnit(unit) => write!(
                f,
                "no valid wind speed unit provided ('{unit}'); accepted values are 'm/s' and 'km/h'"
            ),
            FwiError::ShapeMismatch {
                what,
                expected,
                actual,
            } => write!(f, "{what}: expected {expected} values, got {actual}"),
            FwiError::NonMonotonicTimes(what) => {
                write!(f, "{what}: sample times must be strictly increasing")
            }
            FwiError::InitialStateLength { cells, provided } => write!(
                f,
                "per-cell initial state has {provided} entries for {cells} cells"
            ),
        }
    }
}

impl Error for FwiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_accepted_units() {
        let err = FwiError::InvalidWindUnit("knots".to_string());
        let msg = err.to_string();
        assert!(msg.contains("knots"));
        assert!(msg.contains("m/s") && msg.contains("km/h"));
    }
}
