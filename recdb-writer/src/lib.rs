//! # recdb-writer
//!
//! Renders [`recdb_core::Database`]/[`recdb_core::RSet`]/[`recdb_core::Record`]
//! back to text in one of four modes: NORMAL (canonical rec syntax),
//! SEXP (s-expressions), VALUES (one value per line), and VALUES_ROW (one
//! record per line). Also provides an atomic whole-file write.

mod error;
mod file;
mod options;
mod writer;

pub use error::WriterError;
pub use file::write_database_file;
pub use options::{WriterMode, WriterOptions};
pub use writer::Writer;
