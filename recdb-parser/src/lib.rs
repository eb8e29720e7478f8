//! # recdb-parser
//!
//! A pull parser for the plain-text record format: reads an
//! in-memory text buffer one item (comment or record) at a time, and a
//! convenience [`Parser::parse_database`] that groups the whole stream into
//! a [`recdb_core::Database`].

mod error;
mod options;
mod parser;

pub use error::ParserError;
pub use options::ParserOptions;
pub use parser::{Cursor, Item, Parser};

use std::path::Path;

use recdb_core::Database;

/// Parses `text` as a complete database, using the default options.
pub fn parse_str(text: &str) -> Result<Database, ParserError> {
    Parser::new(text, ParserOptions::default()).parse_database()
}

/// Reads and parses the file at `path` as a complete database. The parser's
/// [`ParserOptions::source_name`] is set to `path`'s display form.
pub fn read_database_file(path: impl AsRef<Path>) -> Result<Database, ParserError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        tracing::warn!(path = %path.display(), error = %e, "failed to read database file");
        ParserError::Io(path.display().to_string(), e.to_string())
    })?;
    let options = ParserOptions::named(path.display().to_string());
    Parser::new(&text, options).parse_database()
}
