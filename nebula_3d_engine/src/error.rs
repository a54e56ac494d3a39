//! Error types for the Nebula3D engine
//!
//! This module defines the error types used throughout the engine,
//! including initialization, file access and resource loading.

use thiserror::Error;

/// Result type for Nebula3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Nebula3D engine errors
///
/// Errors are `Clone` so that a failed resource can keep the error that
/// caused its FAILURE state for later inspection.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Initialization failed (engine, renderer, resource manager)
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// Invalid resource (unknown key, wrong type, invalid argument)
    #[error("Invalid resource: {0}")]
    InvalidResource(String),

    /// File could not be found by the file system
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Any other I/O failure while reading a file
    #[error("I/O error on '{path}': {message}")]
    Io { path: String, message: String },

    /// Declarative document is structurally invalid
    #[error("Malformed document '{path}': {reason}")]
    MalformedDocument { path: String, reason: String },

    /// Material document without a `shader` key
    #[error("Material '{0}' has no shader")]
    MissingShader(String),

    /// A dependency of the resource failed to load
    #[error("Dependency '{dependency}' of '{path}' failed")]
    DependencyFailure { path: String, dependency: String },

    /// Image data could not be decoded
    #[error("Decode error on '{path}': {message}")]
    Decode { path: String, message: String },

    /// A singleton lock was poisoned by a panicking thread
    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

impl Error {
    /// Build a `MalformedDocument` error
    pub fn malformed(path: impl Into<String>, reason: impl ToString) -> Self {
        Error::MalformedDocument {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build an `Io` error from a `std::io::Error`
    pub fn io(path: impl Into<String>, error: &std::io::Error) -> Self {
        let path = path.into();
        if error.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound(path)
        } else {
            Error::Io {
                path,
                message: error.to_string(),
            }
        }
    }

    /// Whether the error comes from the content of a document
    pub fn is_document_error(&self) -> bool {
        matches!(self, Error::MalformedDocument { .. } | Error::MissingShader(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
