//! Error types for piste-osm
//!
//! Translation and merging are total and never produce errors. Everything in
//! here belongs to the pipeline side: configuration, dataset access and output.

use std::fmt;

/// Main error type for piste-osm operations
#[derive(Debug)]
pub enum Error {
    /// File I/O error
    IoError(std::io::Error),

    /// Invalid configuration or parameters
    InvalidInput(String),

    /// No dataset driver could be resolved for a path or driver name
    DriverNotFound {
        name: String,
        suggestion: Option<String>,
    },

    /// Source dataset could not be decoded
    ParseError(String),

    /// Feature geometry is not usable by the pipeline
    InvalidGeometry(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::IoError(err) => {
                write!(f, "I/O error: {err}")
            }
            Error::InvalidInput(msg) => {
                write!(f, "Invalid input: {msg}")
            }
            Error::DriverNotFound { name, suggestion } => match suggestion {
                Some(s) => write!(f, "Driver '{name}' not available. Did you mean '{s}'?"),
                None => write!(f, "Driver '{name}' not available"),
            },
            Error::ParseError(msg) => {
                write!(f, "Parse error: {msg}")
            }
            Error::InvalidGeometry(msg) => {
                write!(f, "Invalid geometry: {msg}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::IoError(err.into())
        } else {
            Error::ParseError(err.to_string())
        }
    }
}

/// Convenience result type for piste-osm operations
pub type Result<T> = std::result::Result<T, Error>;
