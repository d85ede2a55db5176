//! Error types for the fixture harness.

use layered_perturb::PerturbError;
use thiserror::Error;

/// Errors that can occur while loading or running fixtures.
#[derive(Debug, Error)]
pub enum SpecError {
    /// Error parsing a fixture file.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Error loading a fixture file.
    #[error("failed to load fixture: {path}: {message}")]
    Load { path: String, message: String },

    /// The engine rejected an input or edit the fixture did not expect to fail.
    #[error("engine error: {0}")]
    Engine(#[from] PerturbError),

    /// A step produced a snapshot that differs from its expectation.
    #[error("assertion failed: {message}")]
    Assertion { message: String },
}

/// Result type for harness operations.
pub type SpecResult<T> = Result<T, SpecError>;
