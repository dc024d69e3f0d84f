//! Error types for sheetstyle-core

use std::fmt;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Grid axis an index belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
    Worksheet,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Row => write!(f, "row"),
            Axis::Column => write!(f, "column"),
            Axis::Worksheet => write!(f, "worksheet"),
        }
    }
}

/// Errors that can occur in sheetstyle-core
#[derive(Debug, Error)]
pub enum Error {
    /// A file or part that should exist does not
    #[error("Not found: {0}")]
    NotFound(String),

    /// Wrong file type or unreadable package structure
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Container briefly locked or otherwise inaccessible
    #[error("Package temporarily unavailable: {0}")]
    TransientLock(String),

    /// Index outside the valid bounds of an axis
    #[error("{axis} index {index} out of range ({min}..={max})")]
    OutOfRange {
        axis: Axis,
        index: u32,
        min: u32,
        max: u32,
    },

    /// Operation invoked on a collection or object that cannot support it
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Recognized input whose handling is not implemented
    #[error("Not implemented: {0}")]
    Unimplemented(String),

    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Sheet not found by name
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Style id with no entry in its table
    #[error("Invalid style index: {0}")]
    InvalidStyleIndex(u32),

    /// Serial number that cannot be converted to a date
    #[error("Invalid serial date: {0}")]
    InvalidSerialDate(f64),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Check an index against `min..=max` for an axis
    pub fn check_bounds(axis: Axis, index: u32, min: u32, max: u32) -> Result<()> {
        if index < min || index > max {
            return Err(Error::OutOfRange {
                axis,
                index,
                min,
                max,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_bounds() {
        assert!(Error::check_bounds(Axis::Row, 1, 1, 10).is_ok());
        assert!(Error::check_bounds(Axis::Row, 10, 1, 10).is_ok());

        let err = Error::check_bounds(Axis::Column, 0, 1, 16_384).unwrap_err();
        assert_eq!(err.to_string(), "column index 0 out of range (1..=16384)");
    }
}
