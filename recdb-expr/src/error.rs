//! Errors for the FEX/SEX expression languages.

use thiserror::Error;

/// An error parsing a field expression or selection expression.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExprError {
    /// The field-expression text was malformed.
    #[error("invalid field expression: {0}")]
    InvalidFex(String),
    /// The selection-expression text could not be lexed.
    #[error("unexpected character {0:?} at position {1}")]
    UnexpectedChar(char, usize),
    /// The selection-expression text could not be parsed.
    #[error("parse error: {0}")]
    Syntax(String),
    /// The regular expression inside a `~` match failed to compile.
    #[error("invalid regular expression: {0}")]
    InvalidRegex(String),
}

/// An error evaluating a compiled selection expression against a record.
/// Callers that only need a pass/fail record filter may treat any of these
/// as "this record doesn't match" rather than propagating the error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// A string couldn't be coerced to the type an operator needed.
    #[error("cannot coerce {0:?} to {1}")]
    Coercion(String, &'static str),
    /// Division or modulo by zero.
    #[error("division by zero")]
    DivByZero,
    /// A date/time operator was applied to a non-string value.
    #[error("expected a date string")]
    NotADate,
    /// The right operand of `~` didn't compile as a regular expression.
    #[error("invalid regular expression: {0}")]
    InvalidRegex(String),
}
