//! Error types for Shipwright core.

use std::{error::Error, fmt, io};

/// Error type for Shipwright core operations.
#[derive(Debug)]
pub enum ShipwrightError {
    /// An underlying I/O error.
    Io(io::Error),
    /// A JSON serialization error.
    Json(serde_json::Error),
}

impl fmt::Display for ShipwrightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
        }
    }
}

impl Error for ShipwrightError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
        }
    }
}

impl From<io::Error> for ShipwrightError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ShipwrightError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Convenience result type for Shipwright core.
pub type Result<T> = std::result::Result<T, ShipwrightError>;
