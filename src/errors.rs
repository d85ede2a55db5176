//! Error types for snapshot construction and rewriting.
//!
//! Every fallible operation returns a [`PerturbResult`]. Errors fall into two
//! classes (see [`ErrorKind`]): malformed input shape, and values that are
//! well-formed but inconsistent with the snapshot they are applied to.

use thiserror::Error;

/// Broad classification of a [`PerturbError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input has the wrong shape (segments, separators, configuration).
    Type,
    /// The input is well-formed but does not fit the snapshot.
    Value,
}

/// Errors that can occur while building or rewriting a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PerturbError {
    /// Construction input or a replacement cannot be represented.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The configuration cannot be used to build snapshots.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// Positions and replacements were supplied in different numbers.
    #[error("cannot replace {words} words at {indices} indices")]
    EditCountMismatch { indices: usize, words: usize },

    /// A word index does not exist in the snapshot.
    #[error("cannot assign word at index {index} (snapshot has {len} words)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The same word position was edited twice in one call.
    #[error("word index {index} was edited more than once")]
    DuplicateIndex { index: usize },

    /// A word could not be located in the text it was tokenized from.
    #[error("word {word:?} at index {index} not found in remaining text")]
    WordNotFound { word: String, index: usize },

    /// The rebuilt text does not tokenize back to the expected words.
    #[error("rewritten text tokenizes to {found:?}, expected {expected:?}")]
    TokenizationDrift {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

impl PerturbError {
    /// Which class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PerturbError::InvalidInput { .. } | PerturbError::InvalidConfig { .. } => {
                ErrorKind::Type
            }
            PerturbError::EditCountMismatch { .. }
            | PerturbError::IndexOutOfRange { .. }
            | PerturbError::DuplicateIndex { .. }
            | PerturbError::WordNotFound { .. }
            | PerturbError::TokenizationDrift { .. } => ErrorKind::Value,
        }
    }

    pub(crate) fn invalid_input(reason: impl Into<String>) -> Self {
        PerturbError::InvalidInput {
            reason: reason.into(),
        }
    }
}

/// Result type for snapshot operations.
pub type PerturbResult<T> = Result<T, PerturbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(PerturbError::invalid_input("x").kind(), ErrorKind::Type);
        assert_eq!(
            PerturbError::IndexOutOfRange { index: 4, len: 4 }.kind(),
            ErrorKind::Value
        );
        assert_eq!(
            PerturbError::EditCountMismatch { indices: 2, words: 1 }.kind(),
            ErrorKind::Value
        );
    }

    #[test]
    fn test_error_messages() {
        let err = PerturbError::EditCountMismatch { indices: 2, words: 1 };
        assert_eq!(err.to_string(), "cannot replace 1 words at 2 indices");

        let err = PerturbError::IndexOutOfRange { index: 7, len: 4 };
        assert_eq!(
            err.to_string(),
            "cannot assign word at index 7 (snapshot has 4 words)"
        );
    }
}
