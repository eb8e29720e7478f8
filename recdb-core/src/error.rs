//! Errors raised while building or validating the in-memory data model.

use thiserror::Error;

/// Errors that can occur while constructing or mutating core data-model
/// objects (as opposed to parsing/writing, which have their own error types
/// in `recdb-parser`/`recdb-writer`).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A field name did not match `[A-Za-z%][A-Za-z0-9_]*`.
    #[error("invalid field name: {0:?}")]
    InvalidFieldName(String),

    /// A type descriptor could not be parsed.
    #[error("invalid type descriptor: {0}")]
    InvalidTypeDescriptor(String),

    /// A named type could not be resolved, possibly because of a synonym
    /// cycle.
    #[error("unresolved type name: {0:?}")]
    UnresolvedType(String),

    /// A `%size` directive had a malformed value.
    #[error("invalid size constraint: {0:?}")]
    InvalidSizeConstraint(String),
}
