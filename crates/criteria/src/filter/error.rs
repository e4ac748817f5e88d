//! Error types for building, parsing, and evaluating filters.

use thiserror::Error;

/// A specialized Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while building, parsing, or evaluating a filter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The textual filter is malformed.
    #[error("syntax error: {message} near `{fragment}`")]
    Syntax {
        /// What went wrong.
        message: String,
        /// The part of the input where the problem was found.
        fragment: String,
    },

    /// A condition was constructed with an illegal combination of parts.
    #[error("invalid filter: {reason}")]
    InvalidFilter {
        /// Why the condition is illegal.
        reason: String,
    },

    /// The evaluated object has no field at the referenced path.
    #[error("field not found: {path}")]
    FieldNotFound {
        /// The field path that could not be resolved.
        path: String,
    },

    /// The evaluated object exposes the field in a shape the matcher cannot compare.
    #[error("field {path} is neither single-valued nor a collection")]
    UnsupportedFieldKind {
        /// The field path with the unsupported value.
        path: String,
    },
}

/// Longest fragment of input quoted back in a syntax error.
const MAX_FRAGMENT_CHARS: usize = 40;

impl FilterError {
    /// Creates a syntax error, quoting at most the first few characters of `fragment`.
    pub fn syntax(message: impl Into<String>, fragment: &str) -> Self {
        let mut quoted: String = fragment.chars().take(MAX_FRAGMENT_CHARS).collect();
        if fragment.chars().count() > MAX_FRAGMENT_CHARS {
            quoted.push_str("...");
        }
        FilterError::Syntax {
            message: message.into(),
            fragment: quoted,
        }
    }

    /// Creates an invalid filter error.
    pub fn invalid(reason: impl Into<String>) -> Self {
        FilterError::InvalidFilter {
            reason: reason.into(),
        }
    }

    /// Creates a field not found error.
    pub fn field_not_found(path: impl Into<String>) -> Self {
        FilterError::FieldNotFound { path: path.into() }
    }

    /// Creates an unsupported field kind error.
    pub fn unsupported_field_kind(path: impl Into<String>) -> Self {
        FilterError::UnsupportedFieldKind { path: path.into() }
    }

    /// Returns true if this is a syntax error.
    pub fn is_syntax(&self) -> bool {
        matches!(self, FilterError::Syntax { .. })
    }
}
