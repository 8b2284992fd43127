//! Error types for the gesture analysis system.

use thiserror::Error;

use crate::types::RegionName;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid landmarks for {region}: expected {expected} points, got {actual}")]
    PointCount {
        region: RegionName,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid landmarks for {region}: non-finite coordinate at point {index}")]
    NonFinite { region: RegionName, index: usize },

    #[error("Invalid landmarks for {region}: {reason}")]
    Degenerate {
        region: RegionName,
        reason: &'static str,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for malformed landmark input, which callers treat like an
    /// absent region rather than a session failure.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Error::PointCount { .. } | Error::NonFinite { .. } | Error::Degenerate { .. }
        )
    }

    /// Region the malformed input belonged to, if any.
    pub fn region(&self) -> Option<RegionName> {
        match self {
            Error::PointCount { region, .. }
            | Error::NonFinite { region, .. }
            | Error::Degenerate { region, .. } => Some(*region),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<config::ConfigError> for Error {
    fn from(e: config::ConfigError) -> Self {
        Error::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_classification() {
        let err = Error::PointCount {
            region: RegionName::LeftHand,
            expected: 21,
            actual: 5,
        };
        assert!(err.is_invalid_input());
        assert_eq!(err.region(), Some(RegionName::LeftHand));
        assert_eq!(
            err.to_string(),
            "Invalid landmarks for left_hand: expected 21 points, got 5"
        );

        let err = Error::Config("history_length must be positive".into());
        assert!(!err.is_invalid_input());
        assert_eq!(err.region(), None);
    }
}
