//! # recdb
//!
//! A plain-text, human-readable, record-oriented database engine: parse,
//! query, mutate, check the integrity of, and write back databases made of
//! `Name: Value` records, in the spirit of GNU recutils.
//!
//! This crate is a thin facade over its sibling crates — it re-exports their
//! public surface under one stable API and wires the aggregate-function
//! registry into a convenient [`Recdb`] handle, so an external caller depends
//! on `recdb` alone rather than on each piece directly.

#![deny(missing_docs)]
#![deny(unused_imports)]

pub use recdb_agg as agg;
pub use recdb_core as core;
pub use recdb_crypto as crypto;
pub use recdb_expr as expr;
pub use recdb_parser as parser;
pub use recdb_query as query;
pub use recdb_writer as writer;

pub use recdb_core::{Database, Field, Record, RSet, Type, TypeKind};
pub use recdb_query::{
    check_db, check_rset, delete, insert, query as run_query, set, ExternalDescriptorFetcher,
    QueryError, QueryFlags, QueryOptions, Selector, SetAction,
};

use thiserror::Error;

/// The union of every error a `recdb` operation can raise.
///
/// Each sibling crate defines its own error type scoped to its own concern
/// (parsing, writing, expression evaluation, aggregation, encryption,
/// querying); this is the one callers who don't care about the distinction
/// can propagate with a single `?`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A core data-model invariant was violated (e.g. an invalid type
    /// descriptor).
    #[error(transparent)]
    Core(#[from] recdb_core::CoreError),
    /// Parsing the textual format failed.
    #[error(transparent)]
    Parser(#[from] recdb_parser::ParserError),
    /// Compiling or evaluating a field/selection expression failed.
    #[error(transparent)]
    Expr(#[from] recdb_expr::ExprError),
    /// Evaluating a compiled selection expression against a record failed.
    #[error(transparent)]
    Eval(#[from] recdb_expr::EvalError),
    /// An aggregate function call failed.
    #[error(transparent)]
    Agg(#[from] recdb_agg::AggError),
    /// Encrypting or decrypting a confidential field failed.
    #[error(transparent)]
    Crypto(#[from] recdb_crypto::CryptoError),
    /// A query, mutation, or integrity check failed.
    #[error(transparent)]
    Query(#[from] recdb_query::QueryError),
}

/// A loaded database paired with the aggregate-function registry its
/// queries are evaluated against.
///
/// [`recdb_core::Database`] itself stays registry-agnostic (putting the
/// registry there would make `recdb-core` depend on `recdb-agg`, which
/// depends back on `recdb-core` — a cycle); this handle is where the two
/// meet, one layer up.
pub struct Recdb {
    db: Database,
    aggregates: recdb_agg::AggRegistry,
}

impl Recdb {
    /// Wraps an already-parsed database with the standard aggregate
    /// registry (`count`, `sum`, `avg`, `min`, `max`).
    pub fn new(db: Database) -> Self {
        Recdb {
            db,
            aggregates: recdb_agg::AggRegistry::standard(),
        }
    }

    /// Parses `text` and wraps the result.
    pub fn parse(text: &str) -> Result<Self, Error> {
        Ok(Self::new(recdb_parser::parse_str(text)?))
    }

    /// Reads and parses the database file at `path`.
    pub fn read_file(path: impl AsRef<std::path::Path>) -> Result<Self, Error> {
        Ok(Self::new(recdb_parser::read_database_file(path)?))
    }

    /// Replaces the aggregate-function registry (e.g. to register custom
    /// functions beyond the five standard ones).
    pub fn with_aggregates(mut self, aggregates: recdb_agg::AggRegistry) -> Self {
        self.aggregates = aggregates;
        self
    }

    /// The wrapped database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// The wrapped database, mutably.
    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    /// The aggregate-function registry queries are evaluated against.
    pub fn aggregates(&self) -> &recdb_agg::AggRegistry {
        &self.aggregates
    }

    /// Runs a query against the wrapped database.
    pub fn query(&self, opts: &QueryOptions) -> Result<RSet, Error> {
        Ok(recdb_query::query(&self.db, opts, &self.aggregates)?)
    }

    /// Checks the integrity of the whole database, appending
    /// `source:line: error: ...` lines to `errors` and returning the error
    /// count (0 = clean).
    pub fn check(&self, errors: &mut String, fetcher: Option<&dyn ExternalDescriptorFetcher>) -> usize {
        recdb_query::check_db(&self.db, errors, fetcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_queries_a_database() {
        let recdb = Recdb::parse("%rec: Book\n%key: Id\n\nId: 1\nTitle: Recutils Manual\n").unwrap();
        let opts = QueryOptions {
            type_name: Some("Book".to_string()),
            ..Default::default()
        };
        let result = recdb.query(&opts).unwrap();
        assert_eq!(result.num_records(), 1);
    }

    #[test]
    fn checks_integrity_of_a_clean_database() {
        let recdb = Recdb::parse("%rec: Book\n%mandatory: Title\n\nTitle: Recutils Manual\n").unwrap();
        let mut errors = String::new();
        assert_eq!(recdb.check(&mut errors, None), 0);
    }
}
