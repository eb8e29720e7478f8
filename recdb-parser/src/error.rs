//! Parser errors.

use thiserror::Error;

/// An error parsing recdb's plain-text record format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParserError {
    /// A line looked like a field but its name wasn't a valid field name.
    #[error("{source:?}:{line}: invalid field name in {text:?}")]
    InvalidField {
        /// Source name, if any (a file path, or a synthetic in-memory name).
        source: Option<String>,
        /// 1-based line number.
        line: u64,
        /// The offending line's text.
        text: String,
    },
    /// A continuation line (`+ ...`) appeared with no preceding field to
    /// continue.
    #[error("{source:?}:{line}: continuation line with no preceding field")]
    DanglingContinuation {
        /// Source name, if any.
        source: Option<String>,
        /// 1-based line number.
        line: u64,
    },
    /// The input could not be read from disk.
    #[error("I/O error reading {0:?}: {1}")]
    Io(String, String),
    /// Two record sets in the same database declared the same non-null
    /// `%rec:` type. Unnamed (default) record sets are exempt: they merge
    /// instead of erroring.
    #[error("{source:?}:{line}: record set type {type_name:?} is already defined")]
    DuplicateRecordType {
        /// Source name, if any.
        source: Option<String>,
        /// 1-based line number of the offending descriptor.
        line: u64,
        /// The duplicated type name.
        type_name: String,
    },
}
