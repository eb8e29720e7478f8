//! Errors from query/mutate operations and the integrity checker.

use thiserror::Error;

/// An error building or running a query, mutation, or integrity check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// No `type` was given and the database holds zero or more than one
    /// record set, so there's no unambiguous default.
    #[error("no record type given and the database does not hold exactly one record set")]
    AmbiguousType,
    /// No record set is named the requested type.
    #[error("no record set named {0:?}")]
    UnknownType(String),
    /// `random` was combined with `index_list`/`sex`/`fast_string`.
    #[error("random selection is mutually exclusive with index/sex/fast_string selectors")]
    ConflictingSelectors,
    /// Fewer records exist than `random` asked for.
    #[error("requested {requested} random records but only {available} are available")]
    NotEnoughRecords {
        /// How many random records were requested.
        requested: u64,
        /// How many records the source actually holds.
        available: u64,
    },
    /// A join field has no declared type, so its referred record type can't
    /// be determined.
    #[error("join field {0:?} has no declared type")]
    UnknownField(String),
    /// A join field's declared type isn't `rec`.
    #[error("join field {0:?} is not declared with a rec type")]
    NotAJoinField(String),
    /// The record set a join field refers to declares no primary key.
    #[error("record set {0:?} declares no primary key to join against")]
    NoPrimaryKey(String),
    /// `set`'s `RENAME` action was given a field expression naming more
    /// than one field.
    #[error("RENAME requires a field expression with exactly one element")]
    InvalidRenameFex,
    /// An action that needs a value/new-name argument wasn't given one.
    #[error("this action requires an argument")]
    MissingArgument,
    /// Fetching an externally-referenced descriptor failed.
    #[error("failed to fetch external descriptor: {0}")]
    ExternalFetch(String),
    /// An aggregate function call failed.
    #[error(transparent)]
    Agg(#[from] recdb_agg::AggError),
    /// Encrypting or decrypting a confidential field failed.
    #[error(transparent)]
    Crypto(#[from] recdb_crypto::CryptoError),
}
